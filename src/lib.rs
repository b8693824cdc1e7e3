//! Daily Verse CLI Library
//!
//! A verse of the day, reference search and mood categories backed by a
//! local cache. The binary is a thin wrapper around `app::App`; everything
//! is exposed here for integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod data;
pub mod favorites;
pub mod history;
pub mod output;
pub mod storage;
