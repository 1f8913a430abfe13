//! Move-or-mine heuristics shared by the gatherer phases.

use overmind_core::{Rules, ShipSnapshot};

/// Fraction of a cell's resource paid to leave it.
fn move_cost(rules: &Rules, cell_halite: u32) -> f64 {
    f64::from(cell_halite) / f64::from(rules.move_cost_ratio)
}

/// Fraction of a cell's resource a ship mines by staying.
fn stay_value(rules: &Rules, cell_halite: u32) -> f64 {
    f64::from(cell_halite) / f64::from(rules.extract_ratio)
}

/// Reports whether leaving a cell holding `cell_halite` to travel is worthwhile.
///
/// The ship must afford the departure and the cell must not be worth more to
/// mine than half of the cargo already carried.
#[must_use]
pub fn is_efficient_to_seek(rules: &Rules, ship: &ShipSnapshot, cell_halite: u32) -> bool {
    let affordable = move_cost(rules, cell_halite) <= f64::from(ship.halite);
    let worth_staying = stay_value(rules, cell_halite) > f64::from(ship.halite) / 2.0;
    affordable && !worth_staying
}

/// Reports whether stepping from `current` onto a neighbour holding `next` pays.
///
/// The neighbour's yield must beat the current yield plus three times the
/// departure cost.
#[must_use]
pub fn is_efficient_to_gather(rules: &Rules, ship: &ShipSnapshot, current: u32, next: u32) -> bool {
    let cost = move_cost(rules, current);
    cost <= f64::from(ship.halite)
        && stay_value(rules, next) > stay_value(rules, current) + 3.0 * cost
}
