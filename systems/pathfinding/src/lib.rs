#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* search over the toroidal grid.
//!
//! Searches are stateless: every call starts from scratch against the
//! occupancy it is handed, so callers may re-plan every turn while the grid
//! changes underneath them.

use std::{cmp::Reverse, collections::BinaryHeap};

use log::trace;
use overmind_core::{Path, Position};
use overmind_world::OccupancyView;

/// How the search treats occupied cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathMode {
    /// Occupied cells are impassable and an occupied goal is unreachable.
    Safe,
    /// Occupancy is ignored; the goal may hold a ship that is about to be rammed.
    Unsafe,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    position: Position,
    parent: Option<usize>,
    cost: u32,
}

/// Finds a cardinal-step route from `start` to `goal`.
///
/// The returned path excludes `start` and ends on `goal`. `None` means the
/// ship is already at the goal, the goal is occupied in safe mode, or the
/// frontier emptied before the goal was discovered. Within equal `g + h`
/// estimates, the node discovered first is expanded first.
#[must_use]
pub fn find_path(
    view: OccupancyView<'_>,
    start: Position,
    goal: Position,
    mode: PathMode,
) -> Option<Path> {
    let dimensions = view.dimensions();
    let start = dimensions.normalize(start);
    let goal = dimensions.normalize(goal);

    if start == goal {
        return None;
    }

    if mode == PathMode::Safe && view.is_occupied(goal) {
        return None;
    }

    let mut discovered = vec![false; dimensions.cell_count()];
    let mut nodes = vec![Node {
        position: start,
        parent: None,
        cost: 0,
    }];
    discovered[dimensions.index(start)] = true;

    // Entries are (f bits, node index); f is never negative so the bit pattern
    // orders like the value, and node indices record discovery order.
    let mut frontier: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();
    let mut head = 0;

    loop {
        let current = nodes[head];

        for neighbor in dimensions.cardinals(current.position) {
            let slot = dimensions.index(neighbor);
            if discovered[slot] {
                continue;
            }

            if neighbor == goal {
                let steps = trace_back(&nodes, head, goal);
                trace!(
                    "path {:?} -> {:?} found with {} steps ({} nodes)",
                    start,
                    goal,
                    steps.len(),
                    nodes.len()
                );
                return Some(Path::from_steps(steps));
            }

            if mode == PathMode::Safe && view.is_occupied(neighbor) {
                continue;
            }

            discovered[slot] = true;
            let cost = current.cost + 1;
            let estimate = f64::from(cost) + dimensions.toroidal_distance(neighbor, goal);
            frontier.push(Reverse((estimate.to_bits(), nodes.len())));
            nodes.push(Node {
                position: neighbor,
                parent: Some(head),
                cost,
            });
        }

        let Some(Reverse((_, next))) = frontier.pop() else {
            trace!("no path {:?} -> {:?} ({} nodes)", start, goal, nodes.len());
            return None;
        };
        head = next;
    }
}

fn trace_back(nodes: &[Node], from: usize, goal: Position) -> Vec<Position> {
    let mut steps = vec![goal];
    let mut cursor = Some(from);

    while let Some(index) = cursor {
        let node = nodes[index];
        if node.parent.is_none() {
            break;
        }
        steps.push(node.position);
        cursor = node.parent;
    }

    steps.reverse();
    steps
}
