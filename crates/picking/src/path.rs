//! The ordered result of path optimization.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{PickError, Result};
use crate::identifiers::InstructionId;
use crate::location::Location;

/// Which heuristic produced a [`PickPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    NearestNeighbor,
    SShape,
    /// Input order, no optimization.
    Sequential,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NearestNeighbor => "NEAREST_NEIGHBOR",
            Self::SShape => "S_SHAPE",
            Self::Sequential => "SEQUENTIAL",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stop on the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub instruction_id: InstructionId,
    pub location: Location,
    pub sequence_number: u32,
    /// Distance from the previous stop (or the start location for the first stop).
    pub distance_from_previous: f64,
}

/// An immutable visiting order for a set of instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PickPathFields")]
pub struct PickPath {
    nodes: Vec<PathNode>,
    total_distance: f64,
    estimated_duration: Duration,
    algorithm: Algorithm,
}

#[derive(Deserialize)]
struct PickPathFields {
    nodes: Vec<PathNode>,
    total_distance: f64,
    estimated_duration: Duration,
    algorithm: Algorithm,
}

impl TryFrom<PickPathFields> for PickPath {
    type Error = PickError;

    fn try_from(fields: PickPathFields) -> Result<Self> {
        Self::new(
            fields.nodes,
            fields.total_distance,
            fields.estimated_duration,
            fields.algorithm,
        )
    }
}

impl PickPath {
    /// Builds a path, rejecting empty node lists and negative or non-finite
    /// distances.
    pub fn new(
        nodes: Vec<PathNode>,
        total_distance: f64,
        estimated_duration: Duration,
        algorithm: Algorithm,
    ) -> Result<Self> {
        if nodes.is_empty() {
            return Err(PickError::validation("nodes", "path must have at least one node"));
        }
        if !(total_distance.is_finite() && total_distance >= 0.0) {
            return Err(PickError::validation(
                "total_distance",
                format!("must be a non-negative number, got {total_distance}"),
            ));
        }
        if let Some(node) = nodes
            .iter()
            .find(|n| !(n.distance_from_previous.is_finite() && n.distance_from_previous >= 0.0))
        {
            return Err(PickError::validation(
                "distance_from_previous",
                format!(
                    "node {} has invalid distance {}",
                    node.instruction_id, node.distance_from_previous
                ),
            ));
        }
        Ok(Self {
            nodes,
            total_distance,
            estimated_duration,
            algorithm,
        })
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn estimated_duration(&self) -> Duration {
        self.estimated_duration
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn first_node(&self) -> &PathNode {
        // Non-empty by construction.
        &self.nodes[0]
    }

    pub fn node_at(&self, index: usize) -> Option<&PathNode> {
        self.nodes.get(index)
    }

    pub fn total_picks(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_optimized(&self) -> bool {
        self.algorithm != Algorithm::Sequential
    }

    /// Share of the route covered once `current_node_index` stops are done.
    pub fn calculate_progress(&self, current_node_index: usize) -> f64 {
        current_node_index as f64 / self.nodes.len() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, seq: u32, distance: f64) -> PathNode {
        PathNode {
            instruction_id: InstructionId::new(id).unwrap(),
            location: Location::new("A", "01", "01", None).unwrap(),
            sequence_number: seq,
            distance_from_previous: distance,
        }
    }

    #[test]
    fn empty_paths_are_rejected() {
        let err = PickPath::new(vec![], 0.0, Duration::ZERO, Algorithm::Sequential).unwrap_err();
        assert!(matches!(err, PickError::Validation { ref field, .. } if field == "nodes"));
    }

    #[test]
    fn negative_distances_are_rejected() {
        assert!(PickPath::new(vec![node("I-1", 0, 0.0)], -1.0, Duration::ZERO, Algorithm::SShape).is_err());
        assert!(PickPath::new(vec![node("I-1", 0, -5.0)], 0.0, Duration::ZERO, Algorithm::SShape).is_err());
    }

    #[test]
    fn accessors_and_progress() {
        let path = PickPath::new(
            vec![node("I-1", 0, 10.0), node("I-2", 1, 20.0)],
            30.0,
            Duration::from_secs(51),
            Algorithm::NearestNeighbor,
        )
        .unwrap();
        assert_eq!(path.total_picks(), 2);
        assert_eq!(path.first_node().instruction_id.as_str(), "I-1");
        assert!(path.node_at(2).is_none());
        assert!(path.is_optimized());
        assert_eq!(path.calculate_progress(1), 50.0);
        assert_eq!(path.algorithm().to_string(), "NEAREST_NEIGHBOR");
    }

    #[test]
    fn deserializing_an_empty_path_fails_instead_of_building_one() {
        let path = PickPath::new(
            vec![node("I-1", 0, 10.0)],
            10.0,
            Duration::from_secs(22),
            Algorithm::NearestNeighbor,
        )
        .unwrap();
        let mut raw = serde_json::to_value(&path).unwrap();
        let restored: PickPath = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(restored, path);

        raw["nodes"] = serde_json::json!([]);
        let err = serde_json::from_value::<PickPath>(raw).unwrap_err();
        assert!(err.to_string().contains("path must have at least one node"));
    }
}
