use anyhow::{bail, Result};
use std::time::Duration;

/// Parse an elapsed race time.
///
/// Accepts clock notation ("45:12", "1:05:30", "59:59.5") or any humantime
/// duration ("45m 12s", "1h 5m").
pub fn parse_elapsed(s: &str) -> Result<Duration> {
    let s = s.trim();
    if !s.contains(':') {
        return Ok(humantime::parse_duration(s)?);
    }

    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, sec] => ("0", *m, *sec),
        [h, m, sec] => (*h, *m, *sec),
        _ => bail!("Invalid time format: {}", s),
    };

    let hours: u64 = hours.parse()?;
    let minutes: u64 = minutes.parse()?;
    let seconds: f64 = seconds.parse()?;
    if parts.len() == 3 && minutes >= 60 {
        bail!("Minutes must be below 60: {}", s);
    }
    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        bail!("Seconds must be between 0 and 60: {}", s);
    }

    Ok(Duration::from_secs(hours * 3600 + minutes * 60) + Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_seconds() {
        assert_eq!(parse_elapsed("45:12").unwrap(), Duration::from_secs(45 * 60 + 12));
    }

    #[test]
    fn test_parse_hours_minutes_seconds() {
        assert_eq!(parse_elapsed("1:05:30").unwrap(), Duration::from_secs(3930));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        assert_eq!(parse_elapsed("0:59.5").unwrap(), Duration::from_millis(59_500));
    }

    #[test]
    fn test_parse_long_minutes_without_hours() {
        // Minute counts above 60 are fine when no hour field is given
        assert_eq!(parse_elapsed("75:00").unwrap(), Duration::from_secs(4500));
    }

    #[test]
    fn test_parse_humantime() {
        assert_eq!(parse_elapsed("45m 12s").unwrap(), Duration::from_secs(2712));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_elapsed("1:60:00").is_err());
        assert!(parse_elapsed("10:75").is_err());
        assert!(parse_elapsed("1:2:3:4").is_err());
        assert!(parse_elapsed("fast").is_err());
        assert!(parse_elapsed("").is_err());
    }
}
