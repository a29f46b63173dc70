//! Core types and trait definitions for the Crimefiles interrogation engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends and language-model clients implement the traits defined
//! here; the orchestrator in `crimefiles-dialogue` depends only on them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod case;
pub mod context;
pub mod error;
pub mod generate;
pub mod persona;
pub mod signals;
pub mod store;
pub mod thread;

pub use error::{Error, Result};
