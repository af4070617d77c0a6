pub mod formatter;

pub use formatter::{
    format_clock, format_points_list, format_race_table, format_series_check,
    format_standings_table, should_use_colors, standing_rows, StandingRow,
};
