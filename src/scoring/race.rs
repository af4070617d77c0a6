use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use super::config::{NonFinishPolicy, ScoringConfig, TiePolicy};
use super::points::Points;

/// Outcome codes for entrants that started scoring but have no finish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NonFinishCode {
    Dnf,
    Dns,
    Dsq,
    Ocs,
    Ret,
}

impl fmt::Display for NonFinishCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            NonFinishCode::Dnf => "DNF",
            NonFinishCode::Dns => "DNS",
            NonFinishCode::Dsq => "DSQ",
            NonFinishCode::Ocs => "OCS",
            NonFinishCode::Ret => "RET",
        };
        f.write_str(code)
    }
}

/// Finish signal for one entrant, already normalized upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Finish {
    /// Handicap-corrected time in seconds
    Corrected(f64),
    NonFinish(NonFinishCode),
}

/// Raw entry for one skipper in one race.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceEntry {
    pub skipper: String,
    pub boat: String,
    /// Elapsed time as recorded, kept for display and export
    pub elapsed: Option<Duration>,
    pub finish: Finish,
}

/// A scored entry: the raw entry plus its place and points.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryResult {
    pub entry: RaceEntry,
    /// 1-based finishing place; tied finishers share the first place of their span
    pub place: Option<usize>,
    pub points: Points,
}

/// What one skipper got out of one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePointsResult {
    Points(Points),
    /// Served as race committee; no points earned directly
    Rc,
    /// Not associated with the race
    Absent,
}

/// A scored race. Immutable once built by [`Race::score`].
#[derive(Debug, Clone, PartialEq)]
pub struct Race {
    index: usize,
    date: Option<NaiveDate>,
    results: Vec<EntryResult>,
    points: BTreeMap<String, Points>,
    rc: BTreeSet<String>,
}

impl Race {
    /// Score one race with low-point scoring.
    ///
    /// `index` is the 0-based position of the race in its series. Entrants
    /// also listed in `rc` are dropped from the ranking and recorded as RC
    /// only. Finishers are ranked by corrected time (quantized to the tie
    /// resolution) and then by entry order; non-finishers get the series
    /// penalty.
    pub fn score(
        index: usize,
        date: Option<NaiveDate>,
        entries: Vec<RaceEntry>,
        rc: BTreeSet<String>,
        scoring: &ScoringConfig,
    ) -> Self {
        let entries: Vec<RaceEntry> = entries
            .into_iter()
            .filter(|e| !rc.contains(&e.skipper))
            .collect();

        let resolution = scoring.tie_resolution_secs();
        let quantize = |secs: f64| {
            if resolution > 0.0 {
                (secs / resolution).round()
            } else {
                secs
            }
        };

        let mut order: Vec<(usize, f64)> = entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| match e.finish {
                Finish::Corrected(secs) => Some((i, quantize(secs))),
                Finish::NonFinish(_) => None,
            })
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let mut placed: Vec<Option<(usize, Points)>> = vec![None; entries.len()];
        let mut ranked = Vec::with_capacity(entries.len());
        let mut start = 0;
        while start < order.len() {
            let mut end = start + 1;
            if scoring.ties == TiePolicy::Shared {
                while end < order.len() && order[end].1 == order[start].1 {
                    end += 1;
                }
            }
            let points = Points::shared_place(start + 1, end - start);
            for &(i, _) in &order[start..end] {
                placed[i] = Some((start + 1, points));
                ranked.push(i);
            }
            start = end;
        }

        let penalty = match scoring.non_finish {
            NonFinishPolicy::EntrantsPlusOne => Points::from_place(entries.len() + 1),
            NonFinishPolicy::FinishersPlusOne => Points::from_place(order.len() + 1),
            // Validated at load time
            NonFinishPolicy::Fixed(p) => Points::from_f64(p).unwrap_or(Points::ZERO),
        };
        ranked.extend((0..entries.len()).filter(|&i| placed[i].is_none()));

        let mut slots: Vec<Option<RaceEntry>> = entries.into_iter().map(Some).collect();
        let mut results = Vec::with_capacity(ranked.len());
        let mut points = BTreeMap::new();
        for i in ranked {
            let Some(entry) = slots[i].take() else {
                continue;
            };
            let (place, pts) = match placed[i] {
                Some((place, pts)) => (Some(place), pts),
                None => (None, penalty),
            };
            points.entry(entry.skipper.clone()).or_insert(pts);
            results.push(EntryResult {
                entry,
                place,
                points: pts,
            });
        }

        Self {
            index,
            date,
            results,
            points,
            rc,
        }
    }

    /// 0-based position within the series.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based race number as shown to users and in dumps.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Scored entries: finishers by place, then non-finishers in entry order.
    pub fn results(&self) -> &[EntryResult] {
        &self.results
    }

    /// Skipper → points for this race. RC and absent skippers are not included.
    pub fn skipper_race_points(&self) -> &BTreeMap<String, Points> {
        &self.points
    }

    /// Skippers who served race committee for this race.
    pub fn rc_skippers(&self) -> &BTreeSet<String> {
        &self.rc
    }

    pub fn result_for(&self, skipper: &str) -> RacePointsResult {
        if let Some(points) = self.points.get(skipper) {
            RacePointsResult::Points(*points)
        } else if self.rc.contains(skipper) {
            RacePointsResult::Rc
        } else {
            RacePointsResult::Absent
        }
    }
}
