//! Integration tests for pnmconv crates.
//!
//! This crate contains end-to-end tests that verify the interaction
//! between the codec, the convolver and the schedulers.
