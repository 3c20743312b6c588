//! Failure and latency injection.
//!
//! # Design Decisions
//! - Randomness is an explicit, injectable dependency ([`RandomSource`])
//! - Policies hold no mutable state; each request draws independently

pub mod policy;
pub mod random;

pub use policy::{FailureInjectionPolicy, LatencyInjection};
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
