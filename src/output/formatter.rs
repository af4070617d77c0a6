use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::conformance::{SeriesCheck, SeriesOutcome};
use crate::regatta::Regatta;
use crate::scoring::{Finish, Points, Race, Series, Standing};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a duration as "H:MM:SS", with milliseconds only when present.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    let clock = format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);
    if millis == 0 {
        clock
    } else {
        format!("{}.{:03}", clock, millis)
    }
}

/// Format corrected seconds the same way, rounded to the nearest second.
fn format_corrected(secs: f64) -> String {
    if secs.is_finite() && secs >= 0.0 {
        format_clock(Duration::from_secs(secs.round() as u64))
    } else {
        "-".to_string()
    }
}

/// Format points as "[1.0, 2.5, 3.0]"
pub fn format_points_list(points: &[Points]) -> String {
    let items: Vec<String> = points.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// One published standings row.
#[derive(Debug, Clone, Serialize)]
pub struct StandingRow {
    /// Shared by skippers with equal ranking totals; None when not qualified
    pub place: Option<usize>,
    pub skipper: String,
    pub name: String,
    pub status: &'static str,
    pub finished_races: usize,
    pub rc_races: usize,
    pub counted: Vec<Points>,
    pub total: Option<Points>,
    pub rc_points: Option<Points>,
    pub ranking_total: Option<Points>,
}

/// Turn ordered standings into rows with places assigned.
pub fn standing_rows(regatta: &Regatta, standings: &[Standing]) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = Vec::with_capacity(standings.len());
    for (i, standing) in standings.iter().enumerate() {
        let ranking_total = standing.ranking_total();
        let place = match (ranking_total, rows.last()) {
            (None, _) => None,
            (Some(total), Some(prev)) if prev.ranking_total == Some(total) => prev.place,
            (Some(_), _) => Some(i + 1),
        };
        rows.push(StandingRow {
            place,
            skipper: standing.skipper.clone(),
            name: regatta.skipper_name(&standing.skipper).to_string(),
            status: standing.status.label(),
            finished_races: standing.finished_races,
            rc_races: standing.rc_races,
            counted: standing.counted.clone(),
            total: standing.total(),
            rc_points: standing.rc_points,
            ranking_total,
        });
    }
    rows
}

/// Format a series' standings as a table.
/// Columns: place, name, ranking total, finished/RC race counts, counted points.
pub fn format_standings_table(regatta: &Regatta, series: &Series, use_colors: bool) -> String {
    let header = format!(
        "{} ({} races, {} throwouts)",
        series.name(),
        series.races().len(),
        series.throwout_count()
    );
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    let rows = standing_rows(regatta, &series.standings());
    if rows.is_empty() {
        lines.push("  No results recorded.".to_string());
        return lines.join("\n");
    }

    for row in rows {
        let place = row
            .place
            .map_or_else(|| "   ".to_string(), |p| format!("{:>2}.", p));
        let score = row
            .ranking_total
            .map_or_else(|| row.status.to_string(), |t| t.to_string());
        let counts = format!("{}F/{}RC", row.finished_races, row.rc_races);
        let detail = match row.rc_points {
            Some(rc) => format!("{} rc={}", format_points_list(&row.counted), rc),
            None => format_points_list(&row.counted),
        };

        if use_colors {
            let score = if row.place.is_some() {
                format!("{:>7}", score).bold().to_string()
            } else {
                format!("{:>7}", score).dimmed().to_string()
            };
            lines.push(format!(
                "{} {:<24} {}  {:<8} {}",
                place.dimmed(),
                row.name,
                score,
                counts,
                detail.dimmed()
            ));
        } else {
            lines.push(format!(
                "{} {:<24} {:>7}  {:<8} {}",
                place, row.name, score, counts, detail
            ));
        }
    }

    lines.join("\n")
}

/// Format one race's results: finishers, non-finishers, then RC.
pub fn format_race_table(regatta: &Regatta, series: &Series, race: &Race, use_colors: bool) -> String {
    let date = race
        .date()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default();
    let header = format!("{} race {}{}", series.name(), race.number(), date);
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for result in race.results() {
        let entry = &result.entry;
        let place = result
            .place
            .map_or_else(|| "   ".to_string(), |p| format!("{:>2}.", p));
        let elapsed = entry.elapsed.map_or_else(|| "-".to_string(), format_clock);
        let outcome = match entry.finish {
            Finish::Corrected(secs) => format_corrected(secs),
            Finish::NonFinish(code) => code.to_string(),
        };
        let line = format!(
            "{} {:<24} {:<8} {:>10} {:>10} {:>6}",
            place,
            regatta.skipper_name(&entry.skipper),
            entry.boat,
            elapsed,
            outcome,
            result.points
        );
        lines.push(line);
    }

    for skipper in race.rc_skippers() {
        let line = format!("    {:<24} RC", regatta.skipper_name(skipper));
        lines.push(if use_colors {
            line.dimmed().to_string()
        } else {
            line
        });
    }

    lines.join("\n")
}

/// Format the outcome of checking one series against the reference scorer.
/// Passing series produce a single line; failures list every problem.
pub fn format_series_check(check: &SeriesCheck, use_colors: bool) -> String {
    let (title, details): (String, Vec<String>) = match &check.outcome {
        SeriesOutcome::Passed => (format!("Series {} OK", check.series), vec![]),
        SeriesOutcome::Mismatched(mismatches) => (
            format!("Series {} Check Error", check.series),
            mismatches.iter().map(ToString::to_string).collect(),
        ),
        SeriesOutcome::ProcessFailed { status, stderr } => {
            let status = status.map_or_else(|| "signal".to_string(), |c| c.to_string());
            let mut details = vec![format!("reference exited with {}", status)];
            details.extend(stderr.lines().map(|l| l.trim().to_string()));
            (format!("Series {} Process Error", check.series), details)
        }
        SeriesOutcome::MalformedOutput { message } => (
            format!("Series {} Malformed Output", check.series),
            vec![message.clone()],
        ),
        SeriesOutcome::SetupFailed { message } => (
            format!("Series {} Setup Error", check.series),
            vec![message.clone()],
        ),
    };

    let title = match (use_colors, check.passed()) {
        (false, _) => title,
        (true, true) => title.green().to_string(),
        (true, false) => title.red().bold().to_string(),
    };

    std::iter::once(title)
        .chain(details.into_iter().map(|d| format!("    {}", d)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::{Mismatch, MismatchKind};
    use crate::config::parse_config;

    fn regatta() -> Regatta {
        let yaml = r#"
fleets:
  - name: club
    boats: [{ code: LASER, handicap: 1000 }]
skippers:
  - { id: a, name: Anna }
  - { id: b, name: Ben }
  - { id: c, name: Cat }
series:
  - name: spring
    fleet: club
    races:
      - date: 2024-05-01
        rc: [c]
        results:
          - { skipper: a, boat: LASER, time: "10:00" }
          - { skipper: b, boat: LASER, finish: DNF }
      - results:
          - { skipper: b, boat: LASER, time: "9:00" }
          - { skipper: a, boat: LASER, time: "9:00" }
"#;
        Regatta::from_config(parse_config(yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::from_secs(45 * 60 + 12)), "0:45:12");
        assert_eq!(format_clock(Duration::from_secs(3930)), "1:05:30");
        assert_eq!(format_clock(Duration::from_millis(59_500)), "0:00:59.500");
    }

    #[test]
    fn test_format_points_list() {
        let pts = [Points::from_place(1), Points::from_tenths(25)];
        assert_eq!(format_points_list(&pts), "[1.0, 2.5]");
        assert_eq!(format_points_list(&[]), "[]");
    }

    #[test]
    fn test_standing_rows_share_places() {
        let regatta = regatta();
        let series = &regatta.series()[0];
        let rows = standing_rows(&regatta, &series.standings());

        // a: 1.0 + 1.5 = 2.5; b: 3.0 + 1.5 = 4.5; c: RC only
        assert_eq!(rows[0].skipper, "a");
        assert_eq!(rows[0].place, Some(1));
        assert_eq!(rows[0].ranking_total, Some(Points::from_tenths(25)));
        assert_eq!(rows[1].place, Some(2));
        assert_eq!(rows[2].skipper, "c");
        assert_eq!(rows[2].place, None);
        assert_eq!(rows[2].status, "na");
    }

    #[test]
    fn test_standings_table_plain() {
        let regatta = regatta();
        let table = format_standings_table(&regatta, &regatta.series()[0], false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "spring (2 races, 0 throwouts)");
        assert!(lines[1].starts_with(" 1. Anna"));
        assert!(lines[1].contains("2.5"));
        assert!(lines[3].contains("na"));
    }

    #[test]
    fn test_race_table_plain() {
        let regatta = regatta();
        let series = &regatta.series()[0];
        let table = format_race_table(&regatta, series, series.race(1).unwrap(), false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "spring race 1 (2024-05-01)");
        assert!(lines[1].contains("Anna"));
        assert!(lines[1].contains("0:10:00"));
        assert!(lines[2].contains("DNF"));
        assert!(lines[2].trim_end().ends_with("3.0"));
        assert!(lines[3].contains("Cat"));
        assert!(lines[3].trim_end().ends_with("RC"));
    }

    #[test]
    fn test_series_check_formatting() {
        let failed = SeriesCheck {
            series: "spring".to_string(),
            outcome: SeriesOutcome::Mismatched(vec![Mismatch {
                skipper: "a".to_string(),
                field: "Count".to_string(),
                kind: MismatchKind::Value,
                engine: "2".to_string(),
                reference: "3".to_string(),
            }]),
        };
        assert_eq!(
            format_series_check(&failed, false),
            "Series spring Check Error\n    Skipper a Parameter `Count` Engine=`2` != Reference=`3`"
        );

        let crashed = SeriesCheck {
            series: "autumn".to_string(),
            outcome: SeriesOutcome::ProcessFailed {
                status: Some(2),
                stderr: "line one\n  line two  \n".to_string(),
            },
        };
        assert_eq!(
            format_series_check(&crashed, false),
            "Series autumn Process Error\n    reference exited with 2\n    line one\n    line two"
        );

        let passed = SeriesCheck {
            series: "summer".to_string(),
            outcome: SeriesOutcome::Passed,
        };
        assert_eq!(format_series_check(&passed, false), "Series summer OK");
    }
}
