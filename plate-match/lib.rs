//! Descriptor matching between two feature sets.

mod filter;
mod matcher;

pub use filter::{correspondences, retain_best};
pub use matcher::{hamming_distance, HammingMatcher};
