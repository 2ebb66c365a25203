//! Route ordering for pick instructions.
//!
//! Two interchangeable heuristics sit behind [`RouteHeuristic`]:
//!
//! | Heuristic | Used for | Cost |
//! |-----------|----------|------|
//! | [`NearestNeighbor`] | up to [`NEAREST_NEIGHBOR_MAX_PICKS`] instructions | O(n²) distance evaluations |
//! | [`SShape`] | larger lists spanning many aisles | O(n log n) |
//!
//! [`select_heuristic`] picks one by list size. [`Sequential`] keeps input
//! order and serves as both a fallback and the baseline for
//! [`PathOptimizationService::calculate_savings`].

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::errors::{PickError, Result};
use crate::instruction::PickInstruction;
use crate::location::Location;
use crate::path::{Algorithm, PathNode, PickPath};

/// Largest list handled by nearest-neighbor; longer lists use S-shape.
pub const NEAREST_NEIGHBOR_MAX_PICKS: usize = 10;

/// Average walking speed, in distance units per second.
pub const WALKING_SPEED: f64 = 1.4;

/// Average time spent at a pick face, in seconds.
pub const PICK_TIME_SECONDS: f64 = 15.0;

// ---------------------------------------------------------------------------
// Heuristics
// ---------------------------------------------------------------------------

/// A visiting-order heuristic.
pub trait RouteHeuristic: Send + Sync {
    /// Name recorded on the resulting [`PickPath`].
    fn algorithm(&self) -> Algorithm;

    /// Returns `instructions` in visiting order, starting from `start`.
    fn order<'a>(
        &self,
        instructions: &'a [PickInstruction],
        start: &Location,
    ) -> Vec<&'a PickInstruction>;
}

/// Greedy: always walk to the closest unvisited location next.
///
/// Ties go to the instruction that appears first in the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl RouteHeuristic for NearestNeighbor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::NearestNeighbor
    }

    fn order<'a>(
        &self,
        instructions: &'a [PickInstruction],
        start: &Location,
    ) -> Vec<&'a PickInstruction> {
        let mut remaining: Vec<&PickInstruction> = instructions.iter().collect();
        let mut ordered = Vec::with_capacity(remaining.len());
        let mut current = start;

        while !remaining.is_empty() {
            let mut nearest = 0;
            let mut best = f64::INFINITY;
            for (index, candidate) in remaining.iter().enumerate() {
                let distance = current.distance_from(candidate.location());
                if distance < best {
                    best = distance;
                    nearest = index;
                }
            }
            let next = remaining.remove(nearest);
            current = next.location();
            ordered.push(next);
        }
        ordered
    }
}

/// Boustrophedon walk through the racking.
///
/// Aisles are visited in lexicographic label order (so `"A10"` comes before
/// `"A2"`). Bays are walked ascending in the first aisle, descending in the
/// second, and so on, so the worker never backtracks within an aisle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SShape;

impl RouteHeuristic for SShape {
    fn algorithm(&self) -> Algorithm {
        Algorithm::SShape
    }

    fn order<'a>(
        &self,
        instructions: &'a [PickInstruction],
        _start: &Location,
    ) -> Vec<&'a PickInstruction> {
        let mut by_aisle: BTreeMap<&str, Vec<&PickInstruction>> = BTreeMap::new();
        for instruction in instructions {
            by_aisle
                .entry(instruction.location().aisle())
                .or_default()
                .push(instruction);
        }

        let mut ordered = Vec::with_capacity(instructions.len());
        let mut ascending = true;
        for (_, mut aisle) in by_aisle {
            // Stable sort: equal bays keep input order.
            if ascending {
                aisle.sort_by_key(|i| i.location().bay_number());
            } else {
                aisle.sort_by(|a, b| b.location().bay_number().cmp(&a.location().bay_number()));
            }
            ordered.extend(aisle);
            ascending = !ascending;
        }
        ordered
    }
}

/// Input order, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl RouteHeuristic for Sequential {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sequential
    }

    fn order<'a>(
        &self,
        instructions: &'a [PickInstruction],
        _start: &Location,
    ) -> Vec<&'a PickInstruction> {
        instructions.iter().collect()
    }
}

/// Chooses the heuristic for a list of `count` instructions.
pub fn select_heuristic(count: usize) -> &'static dyn RouteHeuristic {
    if count <= NEAREST_NEIGHBOR_MAX_PICKS {
        &NearestNeighbor
    } else {
        &SShape
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Stateless façade that turns instruction lists into [`PickPath`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathOptimizationService;

impl PathOptimizationService {
    pub fn new() -> Self {
        Self
    }

    /// Orders `instructions` with the heuristic suited to their count.
    pub fn optimize_path(
        &self,
        instructions: &[PickInstruction],
        start: &Location,
    ) -> Result<PickPath> {
        ensure_not_empty(instructions)?;
        debug!(count = instructions.len(), "Optimizing pick path");
        self.optimize_with(select_heuristic(instructions.len()), instructions, start)
    }

    pub fn optimize_with_nearest_neighbor(
        &self,
        instructions: &[PickInstruction],
        start: &Location,
    ) -> Result<PickPath> {
        self.optimize_with(&NearestNeighbor, instructions, start)
    }

    pub fn optimize_with_s_shape(
        &self,
        instructions: &[PickInstruction],
        start: &Location,
    ) -> Result<PickPath> {
        self.optimize_with(&SShape, instructions, start)
    }

    /// Runs a specific heuristic.
    pub fn optimize_with(
        &self,
        heuristic: &dyn RouteHeuristic,
        instructions: &[PickInstruction],
        start: &Location,
    ) -> Result<PickPath> {
        ensure_not_empty(instructions)?;
        let ordered = heuristic.order(instructions, start);
        let path = build_path(&ordered, Some(start), heuristic.algorithm())?;
        debug!(
            algorithm = %path.algorithm(),
            nodes = path.total_picks(),
            distance = path.total_distance(),
            duration_secs = path.estimated_duration().as_secs(),
            "Pick path generated"
        );
        Ok(path)
    }

    /// Input-order path with no start location: the first stop has distance 0.
    pub fn create_sequential_path(&self, instructions: &[PickInstruction]) -> Result<PickPath> {
        ensure_not_empty(instructions)?;
        let ordered: Vec<&PickInstruction> = instructions.iter().collect();
        build_path(&ordered, None, Algorithm::Sequential)
    }

    /// Percentage of distance saved by `optimized` relative to walking the
    /// instructions in input order. Zero when the sequential route has no
    /// length.
    pub fn calculate_savings(
        &self,
        optimized: &PickPath,
        instructions: &[PickInstruction],
    ) -> Result<f64> {
        let sequential = self.create_sequential_path(instructions)?.total_distance();
        if sequential == 0.0 {
            return Ok(0.0);
        }
        Ok((sequential - optimized.total_distance()) / sequential * 100.0)
    }
}

/// Walking time plus dwell time, rounded to whole seconds.
pub fn estimate_duration(total_distance: f64, pick_count: usize) -> Duration {
    let seconds = total_distance / WALKING_SPEED + pick_count as f64 * PICK_TIME_SECONDS;
    Duration::from_secs(seconds.round() as u64)
}

fn build_path(
    ordered: &[&PickInstruction],
    start: Option<&Location>,
    algorithm: Algorithm,
) -> Result<PickPath> {
    let mut nodes = Vec::with_capacity(ordered.len());
    let mut total_distance = 0.0;
    let mut previous = start;

    for (sequence_number, instruction) in (0u32..).zip(ordered) {
        let location = instruction.location();
        let distance = previous.map_or(0.0, |p| p.distance_from(location));
        nodes.push(PathNode {
            instruction_id: instruction.instruction_id().clone(),
            location: location.clone(),
            sequence_number,
            distance_from_previous: distance,
        });
        total_distance += distance;
        previous = Some(location);
    }

    let duration = estimate_duration(total_distance, ordered.len());
    PickPath::new(nodes, total_distance, duration, algorithm)
}

fn ensure_not_empty(instructions: &[PickInstruction]) -> Result<()> {
    if instructions.is_empty() {
        Err(PickError::validation("instructions", "cannot be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::{InstructionId, Sku};
    use crate::types::Priority;

    fn instruction(id: &str, aisle: &str, bay: &str) -> PickInstruction {
        PickInstruction::new(
            InstructionId::new(id).unwrap(),
            Sku::new(format!("SKU-{id}")).unwrap(),
            1,
            Location::new(aisle, bay, "01", Some("01".into())).unwrap(),
            Priority::Normal,
        )
        .unwrap()
    }

    fn ids(path: &PickPath) -> Vec<&str> {
        path.nodes().iter().map(|n| n.instruction_id.as_str()).collect()
    }

    fn start() -> Location {
        Location::new("A", "01", "01", Some("01".into())).unwrap()
    }

    #[test]
    fn selector_switches_at_ten() {
        assert_eq!(select_heuristic(1).algorithm(), Algorithm::NearestNeighbor);
        assert_eq!(select_heuristic(10).algorithm(), Algorithm::NearestNeighbor);
        assert_eq!(select_heuristic(11).algorithm(), Algorithm::SShape);
    }

    #[test]
    fn nearest_neighbor_walks_outward_from_start() {
        let instructions = vec![
            instruction("I-4", "A", "04"),
            instruction("I-2", "A", "02"),
            instruction("I-3", "A", "03"),
        ];
        let path = PathOptimizationService::new()
            .optimize_path(&instructions, &start())
            .unwrap();

        assert_eq!(path.algorithm(), Algorithm::NearestNeighbor);
        assert_eq!(ids(&path), ["I-2", "I-3", "I-4"]);
        let steps: Vec<f64> = path.nodes().iter().map(|n| n.distance_from_previous).collect();
        assert_eq!(steps, [10.0, 10.0, 10.0]);
        assert!(steps.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(path.total_distance(), 30.0);
        let seqs: Vec<u32> = path.nodes().iter().map(|n| n.sequence_number).collect();
        assert_eq!(seqs, [0, 1, 2]);
    }

    #[test]
    fn nearest_neighbor_ties_go_to_input_order() {
        // Bays 00 and 02 are both 10 away from bay 01.
        let instructions = vec![instruction("LATER", "A", "02"), instruction("EARLIER", "A", "00")];
        let path = PathOptimizationService::new()
            .optimize_with_nearest_neighbor(&instructions, &start())
            .unwrap();
        assert_eq!(ids(&path)[0], "LATER");
    }

    #[test]
    fn s_shape_alternates_direction_per_aisle() {
        let mut instructions = Vec::new();
        for bay in 1..=6 {
            instructions.push(instruction(&format!("A-{bay}"), "A", &format!("{bay:02}")));
            instructions.push(instruction(&format!("B-{bay}"), "B", &format!("{bay:02}")));
        }
        let path = PathOptimizationService::new()
            .optimize_path(&instructions, &start())
            .unwrap();

        assert_eq!(path.algorithm(), Algorithm::SShape);
        assert_eq!(
            ids(&path),
            ["A-1", "A-2", "A-3", "A-4", "A-5", "A-6", "B-6", "B-5", "B-4", "B-3", "B-2", "B-1"]
        );
        assert!(path.total_distance() > 0.0);
    }

    #[test]
    fn s_shape_orders_aisle_labels_as_strings() {
        let instructions = vec![
            instruction("IN-A2", "A2", "01"),
            instruction("IN-A10", "A10", "01"),
        ];
        let path = PathOptimizationService::new()
            .optimize_with_s_shape(&instructions, &start())
            .unwrap();
        // Lexicographic, not numeric: "A10" < "A2".
        assert_eq!(ids(&path), ["IN-A10", "IN-A2"]);
    }

    #[test]
    fn duration_combines_walking_and_dwell_time() {
        assert_eq!(estimate_duration(0.0, 2), Duration::from_secs(30));
        // 14 / 1.4 = 10 seconds of walking.
        assert_eq!(estimate_duration(14.0, 1), Duration::from_secs(25));
    }

    #[test]
    fn sequential_path_keeps_input_order_without_start_distance() {
        let instructions = vec![instruction("I-1", "A", "01"), instruction("I-2", "A", "05")];
        let path = PathOptimizationService::new()
            .create_sequential_path(&instructions)
            .unwrap();
        assert_eq!(path.algorithm(), Algorithm::Sequential);
        assert!(!path.is_optimized());
        assert_eq!(ids(&path), ["I-1", "I-2"]);
        assert_eq!(path.nodes()[0].distance_from_previous, 0.0);
        assert_eq!(path.total_distance(), 40.0);
    }

    #[test]
    fn savings_against_sequential_baseline() {
        let service = PathOptimizationService::new();
        let instructions = vec![
            instruction("I-7", "A", "07"),
            instruction("I-1", "A", "01"),
            instruction("I-5", "A", "05"),
        ];
        // Sequential: 07 -> 01 -> 05 = 60 + 40 = 100.
        // Nearest neighbor from 01: 01 -> 05 -> 07 = 0 + 40 + 20 = 60.
        let optimized = service.optimize_path(&instructions, &start()).unwrap();
        assert_eq!(service.calculate_savings(&optimized, &instructions).unwrap(), 40.0);
    }

    #[test]
    fn savings_are_zero_for_a_zero_length_baseline() {
        let service = PathOptimizationService::new();
        let instructions = vec![instruction("I-1", "A", "03")];
        let optimized = service.optimize_path(&instructions, &start()).unwrap();
        assert_eq!(service.calculate_savings(&optimized, &instructions).unwrap(), 0.0);
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = PathOptimizationService::new()
            .optimize_path(&[], &start())
            .unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }
}
