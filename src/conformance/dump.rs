use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::scoring::{Points, PointsList, RacePointsResult, Series};

/// A scalar as it appears in a dump. Strings are kept apart from numbers so a
/// numeric field that arrives quoted can be reported instead of coerced.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DumpValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl DumpValue {
    pub fn text(s: &str) -> Self {
        DumpValue::Text(s.to_string())
    }

    pub fn points(p: Points) -> Self {
        DumpValue::Number(p.as_f64())
    }

    /// Numeric value rounded to one decimal. Strings are never coerced.
    pub fn as_points(&self) -> Option<Points> {
        match self {
            DumpValue::Integer(n) => n.checked_mul(10).map(Points::from_tenths),
            DumpValue::Number(f) => Points::from_f64(*f),
            DumpValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DumpValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for DumpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpValue::Integer(n) => write!(f, "{}", n),
            DumpValue::Number(x) => write!(f, "{}", x),
            DumpValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Format a list of dump values as `[a, b, c]`.
pub fn format_values(values: &[DumpValue]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Per-skipper record of a scorer dump.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReferenceRecord {
    pub finished_races: DumpValue,
    #[serde(default)]
    pub low_n_list: Vec<DumpValue>,
    /// 1-based race number → points or "RC"; absent races are omitted
    #[serde(default)]
    pub race: BTreeMap<u32, DumpValue>,
    pub rced_races: DumpValue,
    pub rc_points: DumpValue,
}

/// Whole scorer dump, keyed by skipper id under `skip`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReferenceDump {
    #[serde(default)]
    pub skip: BTreeMap<String, ReferenceRecord>,
}

impl ReferenceDump {
    pub fn parse(yaml: &str) -> anyhow::Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| anyhow::anyhow!("invalid dump YAML: {}", e))
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_saphyr::to_string(self).map_err(|e| anyhow::anyhow!("failed to serialize dump: {}", e))
    }

    /// The engine's own results for `series` in dump form.
    pub fn from_series(series: &Series) -> Self {
        let skip = series
            .all_skippers()
            .into_iter()
            .map(|skipper| (skipper.to_string(), engine_record(series, skipper)))
            .collect();
        Self { skip }
    }
}

fn engine_record(series: &Series, skipper: &str) -> ReferenceRecord {
    let standing = series.standing(skipper);

    let low_n_list = match standing.points_list() {
        PointsList::Counted { points, .. } => points.into_iter().map(DumpValue::points).collect(),
        PointsList::Dnq => vec![DumpValue::text("DNQ")],
        PointsList::NotApplicable => vec![DumpValue::text("na")],
    };

    let race = series
        .races()
        .iter()
        .filter_map(|r| {
            let value = match r.result_for(skipper) {
                RacePointsResult::Points(p) => DumpValue::points(p),
                RacePointsResult::Rc => DumpValue::text("RC"),
                RacePointsResult::Absent => return None,
            };
            Some((r.number() as u32, value))
        })
        .collect();

    ReferenceRecord {
        finished_races: DumpValue::Integer(standing.finished_races as i64),
        low_n_list,
        race,
        rced_races: DumpValue::Integer(standing.rc_races as i64),
        rc_points: standing
            .rc_points
            .map_or_else(|| DumpValue::text("na"), DumpValue::points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"
skip:
  alice:
    finished_races: 3
    low_n_list: [1, 2.5, '3']
    race:
      1: 1
      2: RC
      3: 2.5
    rced_races: 1
    rc_points: '2.3'
  bob:
    finished_races: 0
    low_n_list: [na]
    rced_races: 0
    rc_points: na
"#;

    #[test]
    fn test_parse_reference_dump() {
        let dump = ReferenceDump::parse(DUMP).unwrap();
        let alice = &dump.skip["alice"];
        assert_eq!(alice.finished_races, DumpValue::Integer(3));
        assert_eq!(
            alice.low_n_list,
            vec![
                DumpValue::Integer(1),
                DumpValue::Number(2.5),
                DumpValue::text("3"),
            ]
        );
        assert_eq!(alice.race[&2], DumpValue::text("RC"));
        assert_eq!(alice.race[&3].as_points(), Some(Points::from_tenths(25)));
        assert_eq!(alice.rc_points, DumpValue::text("2.3"));

        let bob = &dump.skip["bob"];
        assert!(bob.race.is_empty());
        assert_eq!(bob.low_n_list, vec![DumpValue::text("na")]);
    }

    #[test]
    fn test_strings_are_not_coerced() {
        assert_eq!(DumpValue::text("2.5").as_points(), None);
        assert_eq!(DumpValue::Integer(4).as_points(), Some(Points::from_place(4)));
        assert_eq!(DumpValue::Number(2.25).as_points(), Some(Points::from_tenths(22)));
    }

    #[test]
    fn test_display_shows_raw_representation() {
        assert_eq!(DumpValue::Number(2.5).to_string(), "2.5");
        assert_eq!(DumpValue::text("2.5").to_string(), "'2.5'");
        assert_eq!(
            format_values(&[DumpValue::Integer(1), DumpValue::text("DNQ")]),
            "[1, 'DNQ']"
        );
    }

    #[test]
    fn test_missing_skip_section_is_empty() {
        let dump = ReferenceDump::parse("{}").unwrap();
        assert!(dump.skip.is_empty());
    }
}
