//! Core types, the inference engine, and trait definitions for Somnia.
//!
//! Somnia is a backward-chaining expert system: it walks disease hypotheses
//! in a fixed order and asks only the yes/no questions needed to prove one of
//! them or rule them all out.
//!
//! This crate has no HTTP or database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod diagnosis;
pub mod engine;
pub mod error;
pub mod history;
pub mod knowledge;
pub mod seed;
pub mod session;
pub mod store;

pub use diagnosis::{Diagnoser, StartRequest, StepOutcome, StepView};
pub use error::{Error, ErrorKind, Result};
