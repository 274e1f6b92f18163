//! Vibe matching for connoisseur.
//!
//! Finds the catalog tracks nearest to a query vibe in normalized feature
//! space, and permanently excludes every track it returns so the same track
//! is never recommended twice by one engine.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod engine;
pub mod error;
pub mod exclusion;
pub mod matcher;

pub use engine::VibeEngine;
pub use error::{SearchError, SearchResult};
pub use exclusion::{ExclusionGuard, ExclusionSet};
pub use matcher::{Candidate, Match, MatchRecord, Matcher};
