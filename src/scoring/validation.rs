use super::config::{NonFinishPolicy, ScoringConfig};
use super::points::Points;

/// Validate a series' scoring configuration.
/// Returns all validation errors at once (not just the first).
///
/// `prefix` names the config location in messages, e.g. `series[spring].scoring`.
pub fn validate_scoring(prefix: &str, config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.races_per_throwout == Some(0) {
        errors.push(format!(
            "{}.races_per_throwout: must be at least 1 (omit it for no throwouts)",
            prefix
        ));
    }

    if config.min_races_to_qualify == 0 {
        errors.push(format!("{}.min_races_to_qualify: must be at least 1", prefix));
    }

    if let NonFinishPolicy::Fixed(points) = config.non_finish {
        match Points::from_f64(points) {
            Some(p) if p >= Points::ZERO => {}
            _ => errors.push(format!(
                "{}.non_finish.fixed: must be a non-negative number, got {}",
                prefix, points
            )),
        }
    }

    if let Err(e) = humantime::parse_duration(config.tie_resolution.trim()) {
        errors.push(format!(
            "{}.tie_resolution: invalid duration '{}' - {}",
            prefix, config.tie_resolution, e
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
