//! Idlemind Core -- game logic for a narrative idle game about training an AI.
//!
//! The player accepts job offers that cost resources and pay out after a
//! countdown, unlocks more advanced job types, and advances through chapters
//! and interludes. This crate holds all of that logic and no I/O: content
//! comes in as a frozen [`catalog::Catalog`], and saving and animation go out
//! through [`hooks::SessionHooks`].
//!
//! # Session Pipeline
//!
//! Everything runs on a [`session::GameSession`]:
//!
//! 1. **Tick** -- Count active deliveries down, resolve the ones that reach
//!    zero (payouts, win/lose checks, completion counters), then run the
//!    automatic offer timer.
//! 2. **Actions** -- Click, decline, unlock, page turns and story choices.
//! 3. **Re-evaluation** -- A dirty-flag pass after every tick and action:
//!    choice unlocks, sticky visibility, one-shot spawning, pending
//!    interludes, interlude triggers and the chapter watcher.
//!
//! # Key Types
//!
//! - [`session::GameSession`] -- One game, with its own RNG and hooks.
//! - [`state::GameState`] -- Serializable mutable state.
//! - [`catalog::Catalog`] -- Immutable job types, interludes and chapters.
//! - [`generation`] -- Offer generation and duplicate avoidance.
//! - [`acceptance`] -- Acceptance odds and the rejection state machine.
//! - [`fixed::Fixed64`] / [`fixed::Amount`] -- Fixed-point time and money.

pub mod acceptance;
pub mod catalog;
pub mod chapter;
pub mod condition;
pub mod config;
pub mod delivery;
pub mod dirty;
pub mod event;
pub mod fixed;
pub mod generation;
pub mod hooks;
pub mod id;
pub mod interlude;
pub mod resource;
pub mod rng;
pub mod session;
pub mod state;
pub mod story;
pub mod unlock;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
