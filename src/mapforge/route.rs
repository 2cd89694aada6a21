use axial::Qr;
use pathfinding::prelude::astar;

use crate::mapforge::{store::MapStore, terrain::Registry};

/// Cost of stepping onto `qr`, or `None` where movement is impossible: unpainted cells,
/// ids the registry does not know, and unwalkable terrain.
pub fn step_cost(store: &MapStore, registry: &Registry, qr: Qr) -> Option<u32> {
    let terrain = registry.get(store.get(qr)?)?;
    terrain.properties.is_walkable.then_some(terrain.properties.move_cost)
}

/// Cheapest walk from `from` to `to`, both ends included, with its total cost.
///
/// Entering a cell costs its terrain's move cost; the starting cell is free. Both ends must
/// be walkable.
pub fn route(store: &MapStore, registry: &Registry, from: Qr, to: Qr) -> Option<(Vec<Qr>, u32)> {
    step_cost(store, registry, from)?;
    step_cost(store, registry, to)?;
    astar(
        &from,
        |&qr| store.neighbors(qr).into_iter()
            .filter_map(|(n, _)| step_cost(store, registry, n).map(|cost| (n, cost))),
        |&qr| qr.distance(&to) as u32,
        |&qr| qr == to,
    )
}
