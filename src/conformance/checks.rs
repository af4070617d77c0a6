//! Field-by-field comparison of engine standings against a reference dump.
//!
//! Each check is an independent pure function of the engine's view of one
//! skipper and that skipper's reference record. [`check_skipper`] runs them in
//! a fixed order and stops at the first mismatch.

use rayon::prelude::*;
use std::fmt;

use super::dump::{format_values, DumpValue, ReferenceDump, ReferenceRecord};
use crate::output::format_points_list;
use crate::scoring::{Points, PointsList, RacePointsResult, Series, Standing};

/// Whether a mismatch is a different value or a differently typed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    Value,
    /// A string where a number was expected (or similar)
    Encoding,
}

/// First disagreement found for one skipper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub skipper: String,
    pub field: String,
    pub kind: MismatchKind,
    pub engine: String,
    pub reference: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skipper {} Parameter `{}` Engine=`{}` != Reference=`{}`",
            self.skipper, self.field, self.engine, self.reference
        )?;
        if self.kind == MismatchKind::Encoding {
            write!(f, " (number/string encoding)")?;
        }
        Ok(())
    }
}

/// The engine-side data a check needs for one skipper.
pub struct SkipperView<'a> {
    pub series: &'a Series,
    pub skipper: &'a str,
    pub standing: Standing,
}

impl<'a> SkipperView<'a> {
    pub fn new(series: &'a Series, skipper: &'a str) -> Self {
        Self {
            series,
            skipper,
            standing: series.standing(skipper),
        }
    }

    fn mismatch(
        &self,
        field: impl Into<String>,
        kind: MismatchKind,
        engine: impl ToString,
        reference: impl ToString,
    ) -> Mismatch {
        Mismatch {
            skipper: self.skipper.to_string(),
            field: field.into(),
            kind,
            engine: engine.to_string(),
            reference: reference.to_string(),
        }
    }
}

pub type Check = fn(&SkipperView<'_>, &ReferenceRecord) -> Option<Mismatch>;

/// Checks in the order they run.
pub const CHECKS: [Check; 5] = [
    check_finished_race_count,
    check_series_points,
    check_race_results,
    check_rc_race_count,
    check_rc_points,
];

/// Run every check for one skipper, stopping at the first mismatch.
pub fn check_skipper(view: &SkipperView<'_>, record: &ReferenceRecord) -> Option<Mismatch> {
    CHECKS.iter().find_map(|check| check(view, record))
}

/// Compare every skipper in `series` with `dump`. Returns one mismatch at most
/// per skipper, in skipper id order; an empty list means the series passes.
pub fn check_series(series: &Series, dump: &ReferenceDump) -> Vec<Mismatch> {
    let skippers: Vec<&str> = series.all_skippers().into_iter().collect();
    skippers
        .par_iter()
        .filter_map(|&skipper| {
            let view = SkipperView::new(series, skipper);
            match dump.skip.get(skipper) {
                Some(record) => check_skipper(&view, record),
                None => Some(view.mismatch("Record", MismatchKind::Value, "present", "missing")),
            }
        })
        .collect()
}

fn compare_count(
    view: &SkipperView<'_>,
    field: &str,
    engine: usize,
    reference: &DumpValue,
) -> Option<Mismatch> {
    let matches = match reference {
        DumpValue::Integer(n) => i64::try_from(engine).is_ok_and(|e| e == *n),
        DumpValue::Number(x) => engine as f64 == *x,
        DumpValue::Text(_) => {
            return Some(view.mismatch(field, MismatchKind::Encoding, engine, reference));
        }
    };
    (!matches).then(|| view.mismatch(field, MismatchKind::Value, engine, reference))
}

pub fn check_finished_race_count(view: &SkipperView<'_>, record: &ReferenceRecord) -> Option<Mismatch> {
    compare_count(view, "Count", view.standing.finished_races, &record.finished_races)
}

pub fn check_series_points(view: &SkipperView<'_>, record: &ReferenceRecord) -> Option<Mismatch> {
    let reference = &record.low_n_list;

    let counted = match view.standing.points_list() {
        PointsList::Counted { points, .. } => points,
        PointsList::Dnq | PointsList::NotApplicable => {
            let label = view.standing.status.label();
            return match reference.as_slice() {
                [single] => match single.as_text() {
                    // The reference does not distinguish DNQ from na
                    Some("na") | Some("DNQ") => None,
                    _ => Some(view.mismatch("Point String", MismatchKind::Value, label, single)),
                },
                _ => Some(view.mismatch(
                    "Array Length",
                    MismatchKind::Value,
                    1,
                    format_values(reference),
                )),
            };
        }
    };

    let engine_list = format_points_list(&counted);
    let mut reference_points = Vec::with_capacity(reference.len());
    for value in reference {
        match value.as_points() {
            Some(p) => reference_points.push(p),
            None => {
                return Some(view.mismatch(
                    "Number/String",
                    MismatchKind::Encoding,
                    engine_list,
                    format_values(reference),
                ));
            }
        }
    }

    if counted.len() != reference_points.len() {
        return Some(view.mismatch(
            "Point Count",
            MismatchKind::Value,
            counted.len(),
            reference_points.len(),
        ));
    }

    let mut engine_sorted = counted.clone();
    engine_sorted.sort();
    reference_points.sort();
    for (i, (a, b)) in engine_sorted.iter().zip(&reference_points).enumerate() {
        if a != b {
            return Some(view.mismatch(format!("Point[{}]", i), MismatchKind::Value, a, b));
        }
    }

    let engine_sum: Points = counted.iter().sum();
    let reference_sum: Points = reference_points.iter().sum();
    (engine_sum != reference_sum)
        .then(|| view.mismatch("Sum Count", MismatchKind::Value, engine_sum, reference_sum))
}

pub fn check_race_results(view: &SkipperView<'_>, record: &ReferenceRecord) -> Option<Mismatch> {
    for race in view.series.races() {
        let field = || format!("Race[{}]", race.number());
        let engine = race.result_for(view.skipper);
        let reference = u32::try_from(race.number())
            .ok()
            .and_then(|n| record.race.get(&n));

        let mismatch = match (engine, reference) {
            (RacePointsResult::Absent, None) => None,
            (RacePointsResult::Points(p), Some(value @ DumpValue::Text(_))) => {
                Some(view.mismatch(field(), MismatchKind::Encoding, p, value))
            }
            (RacePointsResult::Points(p), Some(value)) => (value.as_points() != Some(p))
                .then(|| view.mismatch(field(), MismatchKind::Value, p, value)),
            (RacePointsResult::Rc, Some(value)) => (value.as_text() != Some("RC"))
                .then(|| view.mismatch(field(), MismatchKind::Value, "RC", value)),
            (engine, reference) => Some(view.mismatch(
                field(),
                MismatchKind::Value,
                format_race_result(engine),
                reference.map_or_else(|| "none".to_string(), ToString::to_string),
            )),
        };
        if mismatch.is_some() {
            return mismatch;
        }
    }
    None
}

pub fn check_rc_race_count(view: &SkipperView<'_>, record: &ReferenceRecord) -> Option<Mismatch> {
    compare_count(view, "RC Count", view.standing.rc_races, &record.rced_races)
}

pub fn check_rc_points(view: &SkipperView<'_>, record: &ReferenceRecord) -> Option<Mismatch> {
    let reference = &record.rc_points;
    match view.standing.rc_points {
        None => (reference.as_text() != Some("na"))
            .then(|| view.mismatch("RC Points", MismatchKind::Value, "na", reference)),
        Some(engine) => {
            // Numeric strings are accepted here: the reference prints RC points as text
            let parsed = match reference {
                DumpValue::Text(s) if s == "na" => {
                    return Some(view.mismatch("RC Points", MismatchKind::Value, engine, reference));
                }
                DumpValue::Text(s) => match Points::parse_decimal(s) {
                    Some(p) => p,
                    None => {
                        return Some(view.mismatch(
                            "RC Points",
                            MismatchKind::Encoding,
                            engine,
                            reference,
                        ));
                    }
                },
                other => match other.as_points() {
                    Some(p) => p,
                    None => {
                        return Some(view.mismatch("RC Points", MismatchKind::Value, engine, reference));
                    }
                },
            };
            (parsed != engine)
                .then(|| view.mismatch("RC Points", MismatchKind::Value, engine, reference))
        }
    }
}

fn format_race_result(result: RacePointsResult) -> String {
    match result {
        RacePointsResult::Points(p) => p.to_string(),
        RacePointsResult::Rc => "RC".to_string(),
        RacePointsResult::Absent => "none".to_string(),
    }
}
