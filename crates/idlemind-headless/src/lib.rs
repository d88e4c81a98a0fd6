//! Headless driver for Idlemind sessions.
//!
//! [`autoplay`] plays a session with a simple greedy policy so content packs
//! can be exercised end to end without a frontend.

pub mod autoplay;
