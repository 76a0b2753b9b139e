//! Counting engine for chat "count to infinity" games.
//!
//! The hard part is reading a number out of arbitrary text: digits from many
//! scripts, Roman and CJK numerals, vulgar fractions and small arithmetic
//! expressions. The chat platform and durable storage live behind ports
//! (traits) implemented by adapter crates.

pub mod config;
pub mod counter;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod eval;
pub mod logging;
pub mod messaging;
pub mod normalize;
pub mod numeral;
pub mod policy;
pub mod sequence;
pub mod store;
pub mod tokenizer;

pub use errors::{Error, Result};
