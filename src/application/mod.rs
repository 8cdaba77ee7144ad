//! Application layer orchestrating a merge batch.
//!
//! `MergeEngine` drives validation file by file, feeds accepted documents to
//! the `TargetDocument` aggregator and hands the result to the
//! `OutputSizeGuard`. Outcomes are reported through a `tokio` channel.

pub mod aggregator;
pub mod engine;
pub mod output;
