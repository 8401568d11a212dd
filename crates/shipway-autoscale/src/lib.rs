//! shipway-autoscale — step-scaling evaluator.
//!
//! Mirrors the step-function policy the platform's autoscaler executes
//! against the default queue's depth metric, so a scaling table can be
//! verified locally before it ships.
//!
//! # Scaling Algorithm
//!
//! ```text
//! target = baseline
//! for step in table:
//!     if metric in [step.lower, step.upper):   // absent bound = open
//!         target += step.change                // additive on overlap
//! clamp(target, min, max)
//! ```
//!
//! Overlapping ranges apply additively, not first-match: a table of
//! open-ended steps at 100, 200 and 500 messages grows capacity
//! cumulatively as the backlog climbs. Malformed tables never reach
//! this crate — they are rejected by `shipway_config::validate_steps`
//! at composition time.

pub mod evaluator;

pub use evaluator::{ScaleDecision, decide, evaluate};
