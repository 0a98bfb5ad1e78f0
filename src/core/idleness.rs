use crate::core::policy::IdlenessRule;
use crate::domain::model::Sample;

/// Classify a utilization series. Every sample counts: the metrics provider
/// scopes the series to the lookback window, and its oldest period may be
/// stamped slightly before `window.start`. An empty series counts as "no
/// activity observed".
pub fn is_idle(rule: IdlenessRule, samples: &[Sample], cpu_threshold: f64) -> bool {
    match rule {
        IdlenessRule::AlwaysIdle => true,
        IdlenessRule::MaxBelowThreshold => peak(samples).map_or(true, |max| max < cpu_threshold),
        IdlenessRule::ZeroActivity => {
            samples.is_empty() || samples.iter().map(|s| s.value).sum::<f64>() == 0.0
        }
    }
}

/// Highest sampled value.
pub fn peak(samples: &[Sample]) -> Option<f64> {
    samples.iter().map(|s| s.value).reduce(f64::max)
}
