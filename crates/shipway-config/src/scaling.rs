//! Worker scaling-step tables.
//!
//! A table is an ordered sequence of threshold rules evaluated against a
//! queue-depth metric by the platform's autoscaler. Each rule contributes
//! its `change` to the worker count whenever the metric falls inside
//! `[lower, upper)`; an absent bound is open-ended. Matching is additive:
//! a table like `[{lower: 100, change: +1}, {lower: 200, change: +1}]`
//! adds two workers once the metric passes 200.
//!
//! Tables are validated here, at configuration time. The executing
//! autoscaler clamps silently, so a bad table would otherwise only show
//! up as mysterious capacity behavior in a live environment.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// One threshold rule in a scaling-step table.
///
/// `lower` and `upper` are metric bounds; either may be absent, in which
/// case the range is open on that side. `change` is the signed delta
/// applied to the worker count while the metric is inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<i64>,
    pub change: i32,
}

impl ScalingStep {
    /// Whether `metric` falls inside this step's half-open range.
    pub fn contains(&self, metric: f64) -> bool {
        self.lower.is_none_or(|l| metric >= l as f64)
            && self.upper.is_none_or(|u| metric < u as f64)
    }

    /// Sort key for table ordering. A floor step (no lower bound) sorts
    /// before everything else.
    fn bound(&self) -> f64 {
        self.lower.map_or(f64::NEG_INFINITY, |l| l as f64)
    }

    fn effective_lower(&self) -> f64 {
        self.lower.map_or(f64::NEG_INFINITY, |l| l as f64)
    }

    fn effective_upper(&self) -> f64 {
        self.upper.map_or(f64::INFINITY, |u| u as f64)
    }
}

/// Validate a scaling-step table.
///
/// Hard errors: a step with `lower > upper`, a table not sorted by
/// increasing bound, or a table whose first step carries a lower bound
/// (every table must open with a floor step so that low metric values
/// resolve to the minimum capacity).
///
/// Overlapping ranges are legal — additive matching depends on them —
/// but each overlapping pair is logged as a warning so an unintended
/// first-match table is visible before deploy.
pub fn validate_steps(steps: &[ScalingStep]) -> ConfigResult<()> {
    for (index, step) in steps.iter().enumerate() {
        if let (Some(lower), Some(upper)) = (step.lower, step.upper)
            && lower > upper
        {
            return Err(ConfigError::InvertedStep { index, lower, upper });
        }
    }

    for (index, pair) in steps.windows(2).enumerate() {
        if pair[1].bound() < pair[0].bound() {
            return Err(ConfigError::UnsortedSteps { index: index + 1 });
        }
    }

    match steps.first() {
        None => return Err(ConfigError::MissingFloorStep),
        Some(first) if first.lower.is_some() => return Err(ConfigError::MissingFloorStep),
        Some(_) => {}
    }

    for (a, b) in overlapping_pairs(steps) {
        warn!(
            step_a = a,
            step_b = b,
            "scaling steps have overlapping ranges; both will apply additively"
        );
    }

    Ok(())
}

/// Index pairs of steps whose ranges intersect.
pub fn overlapping_pairs(steps: &[ScalingStep]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..steps.len() {
        for j in (i + 1)..steps.len() {
            let lo = steps[i].effective_lower().max(steps[j].effective_lower());
            let hi = steps[i].effective_upper().min(steps[j].effective_upper());
            if lo < hi {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
