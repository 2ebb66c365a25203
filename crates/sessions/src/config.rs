use picking::{Location, Result};
use serde::{Deserialize, Serialize};

/// Settings the service applies to every new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Where workers begin walking; the optimizer measures the first leg from here.
    pub start_location: Location,
}

impl ServiceConfig {
    pub fn new(start_location: Location) -> Self {
        Self { start_location }
    }

    /// Dock location `A-01-01-01`.
    pub fn with_default_start() -> Result<Self> {
        Location::new("A", "01", "01", Some("01".to_string())).map(Self::new)
    }
}
