//! Step-table evaluation against an observed metric value.

use tracing::debug;

use shipway_config::ScalingStep;

/// A scaling decision for a worker service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    /// Scale to the specified task count.
    ScaleTo(u32),
    /// No change needed.
    NoChange,
}

/// Evaluate a scaling-step table.
///
/// Every step whose range contains `metric` contributes its `change`
/// to `baseline`; the net result is clamped to `[min, max]`. The
/// executing autoscaler clamps the same way, silently.
pub fn evaluate(steps: &[ScalingStep], metric: f64, baseline: u32, min: u32, max: u32) -> u32 {
    let mut target = i64::from(baseline);
    for step in steps {
        if step.contains(metric) {
            target += i64::from(step.change);
        }
    }
    target.clamp(i64::from(min), i64::from(max)) as u32
}

/// Compare the evaluated target against the current task count.
///
/// `current` doubles as the baseline the table applies to, which is how
/// the platform autoscaler treats step adjustments.
pub fn decide(
    steps: &[ScalingStep],
    metric: f64,
    current: u32,
    min: u32,
    max: u32,
) -> ScaleDecision {
    let target = evaluate(steps, metric, current, min, max);
    if target == current {
        ScaleDecision::NoChange
    } else {
        debug!(metric, from = current, to = target, "step scaling adjustment");
        ScaleDecision::ScaleTo(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(lower: Option<i64>, upper: Option<i64>, change: i32) -> ScalingStep {
        ScalingStep { lower, upper, change }
    }

    /// The staging table: 0 msgs → 1 worker, 10+ msgs → 2 workers.
    fn staging_table() -> Vec<ScalingStep> {
        vec![step(None, Some(0), 0), step(Some(10), None, 1)]
    }

    /// The production table: +1 at 100, +1 more at 200, +2 more at 500.
    fn production_table() -> Vec<ScalingStep> {
        vec![
            step(None, Some(0), 0),
            step(Some(100), None, 1),
            step(Some(200), None, 1),
            step(Some(500), None, 2),
        ]
    }

    #[test]
    fn staging_table_targets() {
        let table = staging_table();
        assert_eq!(evaluate(&table, 5.0, 1, 1, 2), 1);
        assert_eq!(evaluate(&table, 15.0, 1, 1, 2), 2);
        // Would be 2 anyway, stays clamped at max.
        assert_eq!(evaluate(&table, 1000.0, 1, 1, 2), 2);
    }

    #[test]
    fn production_table_targets() {
        let table = production_table();
        assert_eq!(evaluate(&table, 50.0, 2, 2, 5), 2);
        assert_eq!(evaluate(&table, 150.0, 2, 2, 5), 3);
        assert_eq!(evaluate(&table, 250.0, 2, 2, 5), 4);
        // 2 + 1 + 1 + 2 = 6, clamped to 5.
        assert_eq!(evaluate(&table, 600.0, 2, 2, 5), 5);
    }

    #[test]
    fn non_overlapping_table_applies_exactly_one_step() {
        let table = vec![
            step(None, Some(0), 0),
            step(Some(10), Some(50), 1),
            step(Some(50), Some(100), 2),
            step(Some(100), None, 3),
        ];
        assert_eq!(evaluate(&table, 25.0, 1, 1, 10), 2);
        assert_eq!(evaluate(&table, 50.0, 1, 1, 10), 3);
        assert_eq!(evaluate(&table, 99.9, 1, 1, 10), 3);
        assert_eq!(evaluate(&table, 100.0, 1, 1, 10), 4);
    }

    #[test]
    fn floor_behavior_below_every_bound() {
        // Metric below the lowest lower bound matches only the floor
        // step, which contributes nothing: capacity = min.
        let table = production_table();
        assert_eq!(evaluate(&table, -5.0, 2, 2, 5), 2);
        assert_eq!(evaluate(&table, 0.0, 2, 2, 5), 2);
    }

    #[test]
    fn negative_change_clamped_to_min() {
        let table = vec![step(None, Some(10), -3), step(Some(10), None, 0)];
        assert_eq!(evaluate(&table, 5.0, 4, 2, 8), 2);
    }

    #[test]
    fn boundary_is_half_open() {
        let table = staging_table();
        // 10 is inside [10, inf), 9.999… is not.
        assert_eq!(evaluate(&table, 10.0, 1, 1, 2), 2);
        assert_eq!(evaluate(&table, 9.99, 1, 1, 2), 1);
    }

    #[test]
    fn decide_reports_no_change_at_target() {
        let table = staging_table();
        assert_eq!(decide(&table, 5.0, 1, 1, 2), ScaleDecision::NoChange);
        assert_eq!(decide(&table, 15.0, 1, 1, 2), ScaleDecision::ScaleTo(2));
        assert_eq!(decide(&table, 15.0, 2, 1, 2), ScaleDecision::NoChange);
    }
}
