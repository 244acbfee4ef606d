//! Engine module housing the verification facade.
//!
//! `VerificationEngine` (`core`) wires the normalizer, feature extractor,
//! signature store and matcher behind the enroll / reset / analyze
//! operations callers use.

pub mod core;

pub use core::VerificationEngine;
