//! Load generators driven by the orchestrator.
//!
//! # Responsibilities
//! - Produce recognisable CPU, heap and stack signatures for profilers
//! - Fan out bursts of HTTP probes
//! - Run the deliberately expensive prime sieve
//!
//! # Design Decisions
//! - Generators are plain functions; handlers move blocking ones onto
//!   `spawn_blocking` so the runtime keeps serving other requests
//! - Sizes and time caps come from `ScenarioConfig`, never from the request
//! - Resource exhaustion degrades into a report instead of an error

pub mod cpu;
pub mod memory;
pub mod primes;
pub mod sorting;
pub mod traffic;

pub use cpu::{cpu_intensive, deep_recursion, long_function, LongRunReport};
pub use memory::{heap_break, stack_break, HeapReport, StackReport};
pub use primes::{prime_median, MedianReport, PrimeMedian};
pub use sorting::{bubble_sort, generate_test_array, quick_sort};
pub use traffic::{fan_out, simulate_traffic, TrafficPlan, TrafficReport};
