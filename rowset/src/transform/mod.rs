//! Row transformation.
//!
//! - Builder: compiles the per-definition row construction routine
//! - Materializer: applies it to every row of a loaded dataset, in place

pub mod builder;
pub mod materializer;

pub use builder::{RowBuilder, RowDecorator};
pub use materializer::materialize;
