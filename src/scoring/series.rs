use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::config::ScoringConfig;
use super::points::Points;
use super::race::Race;

/// Qualification status of a skipper in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Qualification {
    Qualified,
    /// Did not qualify: too few finished races
    Dnq,
    /// No finished races at all ("na")
    NoRaces,
}

impl Qualification {
    pub fn label(&self) -> &'static str {
        match self {
            Qualification::Qualified => "Q",
            Qualification::Dnq => "DNQ",
            Qualification::NoRaces => "na",
        }
    }
}

/// Series points as published: counted points plus total, or a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointsList {
    Counted { points: Vec<Points>, total: Points },
    Dnq,
    NotApplicable,
}

/// Derived standing of one skipper in one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub skipper: String,
    pub finished_races: usize,
    pub rc_races: usize,
    pub throwouts: usize,
    /// Low-N list, ascending: finished points with the worst `throwouts` dropped
    pub counted: Vec<Points>,
    /// Finished points removed as throwouts, ascending
    pub dropped: Vec<Points>,
    pub status: Qualification,
    /// Points substituted for each RC race (qualified skippers with RC duty only)
    pub rc_points: Option<Points>,
}

impl Standing {
    /// Sum of the counted list, reported only for qualified skippers.
    pub fn total(&self) -> Option<Points> {
        match self.status {
            Qualification::Qualified => Some(self.counted.iter().sum()),
            Qualification::Dnq | Qualification::NoRaces => None,
        }
    }

    /// Total used for ranking: counted points plus RC substitutions.
    pub fn ranking_total(&self) -> Option<Points> {
        let total = self.total()?;
        let rc = self.rc_points.map_or(Points::ZERO, |p| p * self.rc_races);
        Some(total + rc)
    }

    pub fn points_list(&self) -> PointsList {
        match self.status {
            Qualification::Qualified => PointsList::Counted {
                points: self.counted.clone(),
                total: self.counted.iter().sum(),
            },
            Qualification::Dnq => PointsList::Dnq,
            Qualification::NoRaces => PointsList::NotApplicable,
        }
    }
}

/// An ordered, immutable sequence of scored races.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    fleet: String,
    scoring: ScoringConfig,
    races: Vec<Race>,
}

impl Series {
    pub fn new(name: String, fleet: String, scoring: ScoringConfig, races: Vec<Race>) -> Self {
        Self {
            name,
            fleet,
            scoring,
            races,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fleet(&self) -> &str {
        &self.fleet
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn races(&self) -> &[Race] {
        &self.races
    }

    /// Race by 1-based number.
    pub fn race(&self, number: usize) -> Option<&Race> {
        number.checked_sub(1).and_then(|i| self.races.get(i))
    }

    /// Every skipper with a result or RC duty in any race, sorted by id.
    pub fn all_skippers(&self) -> BTreeSet<&str> {
        self.races
            .iter()
            .flat_map(|r| {
                r.skipper_race_points()
                    .keys()
                    .chain(r.rc_skippers().iter())
                    .map(String::as_str)
            })
            .collect()
    }

    pub fn throwout_count(&self) -> usize {
        self.scoring.throwout_count(self.races.len())
    }

    pub fn finished_race_count(&self, skipper: &str) -> usize {
        self.races
            .iter()
            .filter(|r| r.skipper_race_points().contains_key(skipper))
            .count()
    }

    pub fn rc_race_count(&self, skipper: &str) -> usize {
        self.races
            .iter()
            .filter(|r| r.rc_skippers().contains(skipper))
            .count()
    }

    /// Compute the standing for one skipper.
    pub fn standing(&self, skipper: &str) -> Standing {
        let mut finished: Vec<Points> = self
            .races
            .iter()
            .filter_map(|r| r.skipper_race_points().get(skipper).copied())
            .collect();
        finished.sort();

        let throwouts = self.throwout_count();
        let keep = finished.len().saturating_sub(throwouts);
        let dropped = finished.split_off(keep);
        let counted = finished;
        let finished_races = counted.len() + dropped.len();

        let status = if finished_races == 0 {
            Qualification::NoRaces
        } else if finished_races < self.scoring.min_races_to_qualify as usize || counted.is_empty()
        {
            Qualification::Dnq
        } else {
            Qualification::Qualified
        };

        let rc_races = self.rc_race_count(skipper);
        // Undefined only without counted races; ranking still requires qualification
        let rc_points = if rc_races > 0 {
            Points::mean(&counted)
        } else {
            None
        };

        Standing {
            skipper: skipper.to_string(),
            finished_races,
            rc_races,
            throwouts,
            counted,
            dropped,
            status,
            rc_points,
        }
    }

    pub fn skipper_points_list(&self, skipper: &str) -> PointsList {
        self.standing(skipper).points_list()
    }

    pub fn skipper_rc_points(&self, skipper: &str) -> Option<Points> {
        self.standing(skipper).rc_points
    }

    /// Standings for every skipper, best first: qualified skippers by ranking
    /// total, then DNQ, then skippers with no finished races. Equal totals
    /// are ordered by skipper id.
    pub fn standings(&self) -> Vec<Standing> {
        let skippers: Vec<&str> = self.all_skippers().into_iter().collect();
        let mut standings: Vec<Standing> = skippers.par_iter().map(|s| self.standing(s)).collect();
        standings.sort_by(compare_standings);
        standings
    }
}

fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    a.status
        .cmp(&b.status)
        .then_with(|| a.ranking_total().cmp(&b.ranking_total()))
        .then_with(|| a.skipper.cmp(&b.skipper))
}
