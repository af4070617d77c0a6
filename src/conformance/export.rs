use anyhow::{Context, Result};
use std::collections::BTreeMap;

use crate::config::{EntryConfig, RaceConfig, SeriesConfig};
use crate::output::format_clock;
use crate::regatta::Regatta;
use crate::scoring::{Finish, Series};

/// Input files handed to a reference scorer for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceInput {
    /// `boats.yaml`: boat code → handicap for the series' fleet
    pub boats: BTreeMap<String, f64>,
    /// `series.yaml`: scoring parameters and race entries
    pub series: SeriesConfig,
}

impl ReferenceInput {
    pub fn from_series(regatta: &Regatta, series: &Series) -> Self {
        let boats = regatta
            .fleet(series.fleet())
            .map(|fleet| {
                fleet
                    .boats()
                    .map(|b| (b.code.clone(), b.handicap))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            boats,
            series: series_config(series),
        }
    }

    pub fn boats_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(&self.boats)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to serialize boats")
    }

    pub fn series_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(&self.series)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to serialize series")
    }
}

/// Rebuild the configuration form of a scored series. Entries come out in
/// scored order, which keeps tied finishers in their original relative order.
fn series_config(series: &Series) -> SeriesConfig {
    let races = series
        .races()
        .iter()
        .map(|race| RaceConfig {
            date: race.date(),
            rc: race.rc_skippers().iter().cloned().collect(),
            results: race
                .results()
                .iter()
                .map(|result| {
                    let entry = &result.entry;
                    let finish = match entry.finish {
                        Finish::Corrected(_) => None,
                        Finish::NonFinish(code) => Some(code),
                    };
                    EntryConfig {
                        skipper: entry.skipper.clone(),
                        boat: entry.boat.clone(),
                        time: entry.elapsed.map(format_clock),
                        finish,
                    }
                })
                .collect(),
        })
        .collect();

    SeriesConfig {
        name: series.name().to_string(),
        fleet: series.fleet().to_string(),
        scoring: series.scoring().clone(),
        races,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, BoatConfig, Config, FleetConfig, SkipperConfig};
    use crate::scoring::NonFinishCode;

    const DATASET: &str = r#"
fleets:
  - name: club
    boats:
      - { code: LASER, handicap: 1100 }
      - { code: RS200, handicap: 1046 }
  - name: keel
    boats:
      - { code: J24, handicap: 930 }
skippers: [{ id: a }, { id: b }, { id: c }]
series:
  - name: spring
    fleet: club
    scoring: { races_per_throwout: 3 }
    races:
      - date: 2024-04-06
        rc: [c]
        results:
          - { skipper: b, boat: RS200, finish: DNS }
          - { skipper: a, boat: LASER, time: "45:12" }
"#;

    #[test]
    fn test_boats_limited_to_series_fleet() {
        let regatta = Regatta::from_config(parse_config(DATASET).unwrap()).unwrap();
        let input = ReferenceInput::from_series(&regatta, &regatta.series()[0]);
        assert_eq!(input.boats.len(), 2);
        assert_eq!(input.boats["LASER"], 1100.0);
        assert!(!input.boats.contains_key("J24"));
    }

    #[test]
    fn test_series_config_round_trips_into_same_scores() {
        let regatta = Regatta::from_config(parse_config(DATASET).unwrap()).unwrap();
        let series = &regatta.series()[0];
        let input = ReferenceInput::from_series(&regatta, series);

        let race = &input.series.races[0];
        assert_eq!(race.rc, vec!["c".to_string()]);
        assert_eq!(race.results[0].skipper, "a");
        assert_eq!(race.results[0].time.as_deref(), Some("0:45:12"));
        assert_eq!(race.results[1].finish, Some(NonFinishCode::Dns));
        assert_eq!(race.results[1].time, None);
        assert_eq!(input.series.scoring.races_per_throwout, Some(3));

        // Re-loading the exported series reproduces the standings
        let config = Config {
            fleets: vec![FleetConfig {
                name: "club".to_string(),
                boats: input
                    .boats
                    .iter()
                    .map(|(code, handicap)| BoatConfig {
                        code: code.clone(),
                        name: None,
                        handicap: *handicap,
                    })
                    .collect(),
            }],
            skippers: ["a", "b", "c"]
                .iter()
                .map(|id| SkipperConfig {
                    id: id.to_string(),
                    name: None,
                })
                .collect(),
            series: vec![input.series.clone()],
        };
        let reloaded = Regatta::from_config(config).unwrap();
        assert_eq!(reloaded.series()[0].standings(), series.standings());
    }

    #[test]
    fn test_series_yaml_parses_back() {
        let regatta = Regatta::from_config(parse_config(DATASET).unwrap()).unwrap();
        let input = ReferenceInput::from_series(&regatta, &regatta.series()[0]);
        let yaml = input.series_yaml().unwrap();
        let parsed: SeriesConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(parsed, input.series);

        let boats: BTreeMap<String, f64> = serde_saphyr::from_str(&input.boats_yaml().unwrap()).unwrap();
        assert_eq!(boats, input.boats);
    }
}
