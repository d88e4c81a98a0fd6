//! Content loading for Idlemind: job catalogs, interludes, chapters and
//! tuning config from RON, TOML or JSON, plus the embedded default pack.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, default_game_data, load_game_data};
