use std::collections::BTreeMap;
use std::time::Duration;

/// A sailor who can enter races or serve on race committee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipper {
    pub id: String,
    pub name: String,
}

/// A boat class within a fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct Boat {
    pub code: String,
    pub name: String,
    pub fleet: String,
    /// Portsmouth number on the 1000 scale: higher is slower
    pub handicap: f64,
}

/// Handicap of a boat whose corrected time equals its elapsed time.
pub const PORTSMOUTH_BASE: f64 = 1000.0;

impl Boat {
    /// Corrected time in seconds for an elapsed time sailed in this boat.
    pub fn corrected_secs(&self, elapsed: Duration) -> f64 {
        elapsed.as_secs_f64() * PORTSMOUTH_BASE / self.handicap
    }
}

/// Named group of boats scored together.
#[derive(Debug, Clone, PartialEq)]
pub struct Fleet {
    pub name: String,
    boats: BTreeMap<String, Boat>,
}

impl Fleet {
    pub fn new(name: String, boats: impl IntoIterator<Item = Boat>) -> Self {
        Self {
            name,
            boats: boats.into_iter().map(|b| (b.code.clone(), b)).collect(),
        }
    }

    pub fn get_boat(&self, code: &str) -> Option<&Boat> {
        self.boats.get(code)
    }

    pub fn boats(&self) -> impl Iterator<Item = &Boat> {
        self.boats.values()
    }
}
