pub mod config;
pub mod points;
pub mod race;
pub mod series;
pub mod validation;

pub use config::{NonFinishPolicy, ScoringConfig, TiePolicy};
pub use points::Points;
pub use race::{EntryResult, Finish, NonFinishCode, Race, RaceEntry, RacePointsResult};
pub use series::{PointsList, Qualification, Series, Standing};
pub use validation::validate_scoring;
