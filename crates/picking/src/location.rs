//! Warehouse addresses and the travel-distance proxy used for routing.

use serde::{Deserialize, Serialize};

use crate::errors::{PickError, Result};

/// Cost of moving between two different aisles, per unit of aisle number.
const AISLE_WEIGHT: f64 = 100.0;
/// Cost of moving along an aisle, per bay.
const BAY_WEIGHT: f64 = 10.0;
/// Cost of reaching up or down, per level.
const LEVEL_WEIGHT: f64 = 2.0;

/// A physical pick face: aisle, bay, level and an optional slot position.
///
/// Coordinates are free-form labels (`"A"`, `"A12"`, `"03"`); their numeric
/// value is recovered by [`numeric_part`] when distances are computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LocationFields")]
pub struct Location {
    aisle: String,
    bay: String,
    level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<String>,
}

/// Wire form of [`Location`], validated through [`Location::new`].
#[derive(Deserialize)]
struct LocationFields {
    aisle: String,
    bay: String,
    level: String,
    #[serde(default)]
    position: Option<String>,
}

impl TryFrom<LocationFields> for Location {
    type Error = PickError;

    fn try_from(fields: LocationFields) -> Result<Self> {
        Self::new(fields.aisle, fields.bay, fields.level, fields.position)
    }
}

impl Location {
    /// Creates a location, rejecting empty aisle, bay or level labels.
    pub fn new(
        aisle: impl Into<String>,
        bay: impl Into<String>,
        level: impl Into<String>,
        position: Option<String>,
    ) -> Result<Self> {
        let aisle = non_empty(aisle.into(), "location.aisle")?;
        let bay = non_empty(bay.into(), "location.bay")?;
        let level = non_empty(level.into(), "location.level")?;
        Ok(Self {
            aisle,
            bay,
            level,
            position: position.filter(|p| !p.trim().is_empty()),
        })
    }

    pub fn aisle(&self) -> &str {
        &self.aisle
    }

    pub fn bay(&self) -> &str {
        &self.bay
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn position(&self) -> Option<&str> {
        self.position.as_deref()
    }

    /// Numeric value of the bay label (`"B07"` → 7).
    pub fn bay_number(&self) -> u64 {
        numeric_part(&self.bay)
    }

    /// Weighted Manhattan distance proxy between two pick faces.
    ///
    /// Crossing aisles costs 100 per aisle number and ignores bay and level.
    /// Within an aisle, each bay costs 10 and each level costs 2. Aisles are
    /// compared by label, so `"A"` and `"B"` are different aisles even though
    /// both have numeric value 0.
    pub fn distance_from(&self, other: &Location) -> f64 {
        if self.aisle != other.aisle {
            return abs_diff(&self.aisle, &other.aisle) * AISLE_WEIGHT;
        }
        abs_diff(&self.bay, &other.bay) * BAY_WEIGHT
            + abs_diff(&self.level, &other.level) * LEVEL_WEIGHT
    }

    /// Returns `true` if both locations share an aisle label.
    pub fn is_same_aisle(&self, other: &Location) -> bool {
        self.aisle == other.aisle
    }

    /// Returns `true` for neighbouring bays in the same aisle.
    pub fn is_adjacent(&self, other: &Location) -> bool {
        self.is_same_aisle(other) && self.bay_number().abs_diff(other.bay_number()) == 1
    }

    /// Label shown on handheld screens, e.g. `A-01-02` or `A-01-02-03`.
    pub fn display_string(&self) -> String {
        match &self.position {
            Some(position) => format!("{}-{}-{}-{}", self.aisle, self.bay, self.level, position),
            None => format!("{}-{}-{}", self.aisle, self.bay, self.level),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_string())
    }
}

/// Extracts the numeric value of a coordinate label by dropping every
/// non-digit character. Labels without digits, or whose digits overflow,
/// count as 0.
pub fn numeric_part(label: &str) -> u64 {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn abs_diff(a: &str, b: &str) -> f64 {
    numeric_part(a).abs_diff(numeric_part(b)) as f64
}

fn non_empty(value: String, field: &str) -> Result<String> {
    if value.trim().is_empty() {
        Err(PickError::validation(field, "must not be empty"))
    } else {
        Ok(value)
    }
}
