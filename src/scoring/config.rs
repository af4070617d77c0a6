use serde::{Deserialize, Serialize};

/// Series-level scoring configuration.
///
/// Every field is optional in YAML; missing fields fall back to the values in
/// [`ScoringConfig::default`].
///
/// Example YAML:
/// ```yaml
/// scoring:
///   races_per_throwout: 5
///   max_throwouts: 3
///   min_races_to_qualify: 4
///   non_finish: entrants-plus-one
///   ties: shared
///   tie_resolution: 1s
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ScoringConfig {
    /// One throwout per this many scheduled races (None = no throwouts)
    pub races_per_throwout: Option<u32>,

    /// Upper bound on the throwout count (None = unbounded)
    pub max_throwouts: Option<u32>,

    /// Finished races required for a numeric series total
    pub min_races_to_qualify: u32,

    /// Points awarded to entrants who did not finish
    pub non_finish: NonFinishPolicy,

    /// How equal corrected times are ranked
    pub ties: TiePolicy,

    /// Corrected times are compared after rounding to this resolution
    /// (humantime format, "0s" compares exactly)
    pub tie_resolution: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            races_per_throwout: None,
            max_throwouts: None,
            min_races_to_qualify: 1,
            non_finish: NonFinishPolicy::EntrantsPlusOne,
            ties: TiePolicy::Shared,
            tie_resolution: "1s".to_string(),
        }
    }
}

impl ScoringConfig {
    /// Number of throwouts for a series with `races_scheduled` races.
    pub fn throwout_count(&self, races_scheduled: usize) -> usize {
        let step = match self.races_per_throwout {
            Some(step) if step > 0 => step as usize,
            _ => return 0,
        };
        let count = races_scheduled / step;
        match self.max_throwouts {
            Some(max) => count.min(max as usize),
            None => count,
        }
    }

    /// Tie resolution in seconds; unparseable values are rejected by
    /// validation, so they fall back to exact comparison here.
    pub fn tie_resolution_secs(&self) -> f64 {
        humantime::parse_duration(self.tie_resolution.trim())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Penalty policy for entrants with a non-finish code (DNF, DSQ, ...).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum NonFinishPolicy {
    /// Number of race entrants (finishers and non-finishers, RC excluded) plus one
    EntrantsPlusOne,
    /// Number of finishers plus one
    FinishersPlusOne,
    /// A fixed number of points
    Fixed(f64),
}

/// Ranking of finishers whose corrected times are equal.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TiePolicy {
    /// Tied finishers share the average of the places they span
    Shared,
    /// Tied finishers are placed in the order they were entered
    InputOrder,
}
