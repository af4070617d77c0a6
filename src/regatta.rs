//! The loaded, immutable regatta dataset: catalog plus scored series.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Component, Path};

use crate::catalog::{Boat, Fleet, Skipper};
use crate::config::{self, parse_elapsed, Config, EntryConfig, SeriesConfig};
use crate::error::LoadError;
use crate::scoring::{validate_scoring, Finish, Race, RaceEntry, Series};

/// Everything needed to score and check a set of series.
///
/// Built once by [`Regatta::load`] or [`Regatta::from_config`]; there is no
/// way to mutate it afterwards.
#[derive(Debug, Clone)]
pub struct Regatta {
    fleets: BTreeMap<String, Fleet>,
    skippers: BTreeMap<String, Skipper>,
    series: Vec<Series>,
}

impl Regatta {
    /// Load, validate and score a dataset file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let config = config::load_config(path)?;
        Self::from_config(config)
    }

    /// Validate a parsed dataset and score every race.
    ///
    /// All validation errors are collected before failing.
    pub fn from_config(config: Config) -> Result<Self, LoadError> {
        let mut errors = Vec::new();

        let mut fleets = BTreeMap::new();
        for fleet in config.fleets {
            let mut codes = HashSet::new();
            let mut boats = Vec::new();
            for boat in fleet.boats {
                if !codes.insert(boat.code.clone()) {
                    errors.push(format!(
                        "fleets[{}].boats: duplicate boat code '{}'",
                        fleet.name, boat.code
                    ));
                    continue;
                }
                if !(boat.handicap.is_finite() && boat.handicap > 0.0) {
                    errors.push(format!(
                        "fleets[{}].boats[{}].handicap: must be positive, got {}",
                        fleet.name, boat.code, boat.handicap
                    ));
                }
                boats.push(Boat {
                    name: boat.name.unwrap_or_else(|| boat.code.clone()),
                    code: boat.code,
                    fleet: fleet.name.clone(),
                    handicap: boat.handicap,
                });
            }
            if fleets.contains_key(&fleet.name) {
                errors.push(format!("fleets: duplicate fleet name '{}'", fleet.name));
                continue;
            }
            fleets.insert(fleet.name.clone(), Fleet::new(fleet.name, boats));
        }

        let mut skippers = BTreeMap::new();
        for skipper in config.skippers {
            if skippers.contains_key(&skipper.id) {
                errors.push(format!("skippers: duplicate skipper id '{}'", skipper.id));
                continue;
            }
            skippers.insert(
                skipper.id.clone(),
                Skipper {
                    name: skipper.name.unwrap_or_else(|| skipper.id.clone()),
                    id: skipper.id,
                },
            );
        }

        let mut series = Vec::new();
        let mut series_names = HashSet::new();
        for series_config in config.series {
            if !series_names.insert(series_config.name.clone()) {
                errors.push(format!("series: duplicate series name '{}'", series_config.name));
                continue;
            }
            if let Some(s) = build_series(series_config, &fleets, &skippers, &mut errors) {
                series.push(s);
            }
        }

        if !errors.is_empty() {
            return Err(LoadError::Invalid(errors));
        }

        tracing::debug!(
            fleets = fleets.len(),
            skippers = skippers.len(),
            series = series.len(),
            "Loaded regatta dataset"
        );

        Ok(Self {
            fleets,
            skippers,
            series,
        })
    }

    pub fn fleet(&self, name: &str) -> Option<&Fleet> {
        self.fleets.get(name)
    }

    /// Display name for a skipper id, falling back to the id itself.
    pub fn skipper_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.skippers.get(id).map_or(id, |s| s.name.as_str())
    }

    /// Series in configuration order.
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn series_by_name(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name() == name)
    }
}

fn build_series(
    config: SeriesConfig,
    fleets: &BTreeMap<String, Fleet>,
    skippers: &BTreeMap<String, Skipper>,
    errors: &mut Vec<String>,
) -> Option<Series> {
    let prefix = format!("series[{}]", config.name);
    let errors_before = errors.len();

    if !is_plain_name(&config.name) {
        errors.push(format!(
            "{}.name: must be a plain directory name (no path separators, '.' or '..')",
            prefix
        ));
    }

    if let Err(scoring_errors) = validate_scoring(&format!("{}.scoring", prefix), &config.scoring) {
        errors.extend(scoring_errors);
    }

    let fleet = fleets.get(&config.fleet);
    if fleet.is_none() {
        errors.push(format!("{}.fleet: unknown fleet '{}'", prefix, config.fleet));
    }

    let mut races = Vec::with_capacity(config.races.len());
    for (index, race) in config.races.into_iter().enumerate() {
        let race_prefix = format!("{}.races[{}]", prefix, index + 1);

        let mut rc = BTreeSet::new();
        for id in race.rc {
            if !skippers.contains_key(&id) {
                errors.push(format!("{}.rc: unknown skipper '{}'", race_prefix, id));
            }
            if !rc.insert(id.clone()) {
                errors.push(format!("{}.rc: skipper '{}' listed twice", race_prefix, id));
            }
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(race.results.len());
        for entry in race.results {
            if !skippers.contains_key(&entry.skipper) {
                errors.push(format!(
                    "{}.results: unknown skipper '{}'",
                    race_prefix, entry.skipper
                ));
            }
            if !seen.insert(entry.skipper.clone()) {
                errors.push(format!(
                    "{}.results: skipper '{}' entered twice",
                    race_prefix, entry.skipper
                ));
            }
            if rc.contains(&entry.skipper) {
                errors.push(format!(
                    "{}.results: skipper '{}' is also on race committee",
                    race_prefix, entry.skipper
                ));
            }
            // Without a fleet there is nothing to resolve boats against
            let Some(fleet) = fleet else {
                continue;
            };
            match build_entry(entry, fleet, &race_prefix) {
                Ok(entry) => entries.push(entry),
                Err(message) => errors.push(message),
            }
        }

        races.push(Race::score(index, race.date, entries, rc, &config.scoring));
    }

    if errors.len() > errors_before {
        return None;
    }

    tracing::debug!(series = %config.name, races = races.len(), "Scored series");
    Some(Series::new(config.name, config.fleet, config.scoring, races))
}

/// Series names become directory names in the conformance harness, so they
/// must be a single normal path component.
pub(crate) fn is_plain_name(name: &str) -> bool {
    if name.contains(|c: char| c == '/' || c == '\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn build_entry(entry: EntryConfig, fleet: &Fleet, prefix: &str) -> Result<RaceEntry, String> {
    let boat = fleet.get_boat(&entry.boat).ok_or_else(|| {
        format!(
            "{}.results[{}].boat: '{}' is not in fleet '{}'",
            prefix, entry.skipper, entry.boat, fleet.name
        )
    })?;

    let (elapsed, finish) = match (&entry.time, entry.finish) {
        (Some(time), None) => {
            let elapsed = parse_elapsed(time).map_err(|e| {
                format!(
                    "{}.results[{}].time: invalid '{}' - {}",
                    prefix, entry.skipper, time, e
                )
            })?;
            (Some(elapsed), Finish::Corrected(boat.corrected_secs(elapsed)))
        }
        (None, Some(code)) => (None, Finish::NonFinish(code)),
        (Some(_), Some(_)) => {
            return Err(format!(
                "{}.results[{}]: give either time or finish, not both",
                prefix, entry.skipper
            ))
        }
        (None, None) => {
            return Err(format!(
                "{}.results[{}]: missing time or finish code",
                prefix, entry.skipper
            ))
        }
    };

    Ok(RaceEntry {
        skipper: entry.skipper,
        boat: entry.boat,
        elapsed,
        finish,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::scoring::{Points, PointsList};

    const DATASET: &str = r#"
fleets:
  - name: club
    boats:
      - { code: LASER, name: Laser, handicap: 1100 }
      - { code: TOPPER, name: Topper, handicap: 1365 }
skippers:
  - { id: alice, name: Alice Cole }
  - { id: bob, name: Bob Dane }
  - { id: carol, name: Carol Eve }
series:
  - name: spring
    fleet: club
    scoring:
      min_races_to_qualify: 2
    races:
      - rc: [carol]
        results:
          - { skipper: alice, boat: LASER, time: "55:00" }
          - { skipper: bob, boat: TOPPER, time: "1:05:00" }
      - results:
          - { skipper: alice, boat: LASER, finish: DNF }
          - { skipper: bob, boat: LASER, time: "50:00" }
          - { skipper: carol, boat: LASER, time: "52:00" }
"#;

    fn regatta_from(yaml: &str) -> Result<Regatta, LoadError> {
        Regatta::from_config(parse_config(yaml).unwrap())
    }

    #[test]
    fn test_builds_scored_series() {
        let regatta = regatta_from(DATASET).unwrap();
        let series = regatta.series_by_name("spring").unwrap();
        assert_eq!(series.races().len(), 2);

        // Race 1: alice 3300*1000/1100 = 3000s corrected, bob 3900*1000/1365 = 2857s
        let race1 = series.race(1).unwrap();
        assert_eq!(race1.skipper_race_points()["bob"], Points::from_place(1));
        assert_eq!(race1.skipper_race_points()["alice"], Points::from_place(2));
        assert!(race1.rc_skippers().contains("carol"));

        // Race 2: alice DNF with 3 entrants -> 4.0
        let race2 = series.race(2).unwrap();
        assert_eq!(race2.skipper_race_points()["alice"], Points::from_place(4));

        assert_eq!(
            series.skipper_points_list("bob"),
            PointsList::Counted {
                points: vec![Points::from_place(1), Points::from_place(1)],
                total: Points::from_place(2),
            }
        );
        assert_eq!(series.skipper_points_list("carol"), PointsList::Dnq);
        assert_eq!(regatta.skipper_name("alice"), "Alice Cole");
        assert_eq!(regatta.skipper_name("zed"), "zed");
    }

    #[test]
    fn test_unknown_references_are_collected() {
        let yaml = r#"
fleets:
  - name: club
    boats: [{ code: LASER, handicap: 1100 }]
skippers: [{ id: alice }]
series:
  - name: s1
    fleet: club
    races:
      - rc: [nobody]
        results:
          - { skipper: ghost, boat: LASER, time: "10:00" }
          - { skipper: alice, boat: OPTI, time: "10:00" }
  - name: s2
    fleet: dinghies
"#;
        let err = regatta_from(yaml).unwrap_err();
        let messages = err.messages();
        assert_eq!(messages.len(), 4, "{:?}", messages);
        assert!(messages.iter().any(|m| m.contains("rc: unknown skipper 'nobody'")));
        assert!(messages.iter().any(|m| m.contains("unknown skipper 'ghost'")));
        assert!(messages.iter().any(|m| m.contains("'OPTI' is not in fleet 'club'")));
        assert!(messages.iter().any(|m| m.contains("series[s2].fleet: unknown fleet 'dinghies'")));
    }

    #[test]
    fn test_rc_and_result_in_same_race_rejected() {
        let yaml = r#"
fleets:
  - name: club
    boats: [{ code: LASER, handicap: 1100 }]
skippers: [{ id: alice }]
series:
  - name: s1
    fleet: club
    races:
      - rc: [alice]
        results:
          - { skipper: alice, boat: LASER, time: "10:00" }
"#;
        let err = regatta_from(yaml).unwrap_err();
        assert!(err.messages()[0].contains("also on race committee"));
    }

    #[test]
    fn test_entry_shape_errors() {
        let yaml = r#"
fleets:
  - name: club
    boats: [{ code: LASER, handicap: 0 }]
skippers: [{ id: a }, { id: b }, { id: c }, { id: a }]
series:
  - name: s1
    fleet: club
    scoring: { races_per_throwout: 0 }
    races:
      - results:
          - { skipper: a, boat: LASER }
          - { skipper: b, boat: LASER, time: "10:00", finish: DNF }
          - { skipper: c, boat: LASER, time: "soon" }
"#;
        let err = regatta_from(yaml).unwrap_err();
        let messages = err.messages();
        assert!(messages.iter().any(|m| m.contains("handicap: must be positive")));
        assert!(messages.iter().any(|m| m.contains("duplicate skipper id 'a'")));
        assert!(messages.iter().any(|m| m.contains("races_per_throwout")));
        assert!(messages.iter().any(|m| m.contains("missing time or finish code")));
        assert!(messages.iter().any(|m| m.contains("not both")));
        assert!(messages.iter().any(|m| m.contains("time: invalid 'soon'")));
    }

    #[test]
    fn test_close_finish_in_same_class_is_not_a_tie() {
        let yaml = r#"
fleets:
  - name: club
    boats: [{ code: LASER, handicap: 1100 }]
skippers: [{ id: a }, { id: b }]
series:
  - name: s1
    fleet: club
    races:
      - results:
          - { skipper: a, boat: LASER, time: "45:02" }
          - { skipper: b, boat: LASER, time: "45:06" }
"#;
        let regatta = regatta_from(yaml).unwrap();
        let race = regatta.series()[0].race(1).unwrap();
        // 2456.4s vs 2460.0s corrected, well apart at 1s resolution
        assert_eq!(race.skipper_race_points()["a"], Points::from_place(1));
        assert_eq!(race.skipper_race_points()["b"], Points::from_place(2));
    }

    #[test]
    fn test_unknown_fleet_reported_once() {
        let yaml = r#"
fleets: []
skippers: [{ id: a }, { id: b }]
series:
  - name: s1
    fleet: dinghies
    races:
      - results:
          - { skipper: a, boat: LASER, time: "10:00" }
          - { skipper: b, boat: LASER, time: "11:00" }
"#;
        let messages = regatta_from(yaml).unwrap_err().messages().to_vec();
        assert_eq!(messages, vec!["series[s1].fleet: unknown fleet 'dinghies'".to_string()]);
    }

    #[test]
    fn test_series_name_must_be_plain_directory_name() {
        for name in ["../victim", "/tmp/x", "a/b", "..", ".", "a\\b"] {
            let yaml = format!(
                r#"
fleets:
  - name: club
    boats: [{{ code: LASER, handicap: 1100 }}]
skippers: [{{ id: a }}]
series:
  - name: "{}"
    fleet: club
"#,
                name.replace('\\', "\\\\")
            );
            let err = regatta_from(&yaml).unwrap_err();
            assert!(
                err.messages().iter().any(|m| m.contains(".name: must be a plain directory name")),
                "{:?} accepted: {:?}",
                name,
                err.messages()
            );
        }
    }

    #[test]
    fn test_plain_name() {
        assert!(is_plain_name("spring-2024"));
        assert!(is_plain_name("Summer Evening"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name("../victim"));
        assert!(!is_plain_name("/home/x"));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("a\\b"));
    }

    #[test]
    fn test_duplicate_series_and_double_entry() {
        let yaml = r#"
fleets:
  - name: club
    boats: [{ code: LASER, handicap: 1100 }]
skippers: [{ id: a }]
series:
  - name: s1
    fleet: club
    races:
      - results:
          - { skipper: a, boat: LASER, time: "10:00" }
          - { skipper: a, boat: LASER, time: "11:00" }
  - name: s1
    fleet: club
"#;
        let messages = regatta_from(yaml).unwrap_err().messages().to_vec();
        assert!(messages.iter().any(|m| m.contains("entered twice")));
        assert!(messages.iter().any(|m| m.contains("duplicate series name 's1'")));
    }
}
