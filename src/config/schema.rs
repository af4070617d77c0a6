use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scoring::{NonFinishCode, ScoringConfig};

/// Top-level dataset document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub fleets: Vec<FleetConfig>,
    pub skippers: Vec<SkipperConfig>,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FleetConfig {
    pub name: String,
    pub boats: Vec<BoatConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BoatConfig {
    pub code: String,
    /// Display name (defaults to the code)
    #[serde(default)]
    pub name: Option<String>,
    /// Portsmouth number
    pub handicap: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SkipperConfig {
    pub id: String,
    /// Display name (defaults to the id)
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SeriesConfig {
    pub name: String,
    pub fleet: String,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub races: Vec<RaceConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RaceConfig {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Skippers serving race committee
    #[serde(default)]
    pub rc: Vec<String>,
    #[serde(default)]
    pub results: Vec<EntryConfig>,
}

/// One race entry: exactly one of `time` or `finish` must be given.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EntryConfig {
    pub skipper: String,
    pub boat: String,
    /// Elapsed time: "M:SS", "H:MM:SS" or a humantime duration ("45m 12s")
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub finish: Option<NonFinishCode>,
}
