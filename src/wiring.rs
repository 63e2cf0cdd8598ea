//! Pairing two workers as neighbors before either one starts exchanging
//! borders (spec §4.4).

use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::worker::{monitor::NeighborAddr, Worker};
use std::sync::Arc;

/// Record `b` as `a`'s neighbor in `direction`, and symmetrically `a` as
/// `b`'s neighbor in `direction.opposite()`.
///
/// Only valid before either worker has processed a border message: this is
/// checked conservatively, per spec §9, as `iteration == 0` and an empty
/// `pending_borders`. Adding a second neighbor for a direction that is
/// already wired is a contract error (spec §4.3.1).
pub fn connect(a: &Worker, b: &Worker, direction: Direction) -> Result<()> {
    let swap = Arc::as_ptr(&a.state) as usize > Arc::as_ptr(&b.state) as usize;

    // Lock in a stable order (by the address of the shared state) so two
    // concurrent `connect` calls naming the same pair of workers in
    // opposite order can never deadlock on each other's mutex.
    let (mut lower_guard, mut higher_guard) = if swap {
        (b.state.monitor.lock(), a.state.monitor.lock())
    } else {
        (a.state.monitor.lock(), b.state.monitor.lock())
    };

    for guard in [&lower_guard, &higher_guard] {
        if guard.iteration != 0 || !guard.pending_borders.is_empty() {
            return Err(Error::contract(
                "cannot wire neighbors after a worker has begun iterating",
            ));
        }
    }

    let (a_guard, b_guard) = if swap {
        (&mut higher_guard, &mut lower_guard)
    } else {
        (&mut lower_guard, &mut higher_guard)
    };

    if a_guard.neighbors.contains_key(&direction) {
        return Err(Error::contract(format!(
            "{direction} neighbor is already wired"
        )));
    }
    let opposite = direction.opposite();
    if b_guard.neighbors.contains_key(&opposite) {
        return Err(Error::contract(format!(
            "{opposite} neighbor is already wired"
        )));
    }

    a_guard.neighbors.insert(
        direction,
        NeighborAddr {
            host: b.host.clone(),
            border_port: b.border_port,
        },
    );
    b_guard.neighbors.insert(
        opposite,
        NeighborAddr {
            host: a.host.clone(),
            border_port: a.border_port,
        },
    );

    Ok(())
}

/// Wire `direction` to a neighbor reachable at `host:border_port`, without a
/// local handle to the other side (spec §4.4's one-sided form, used when the
/// neighbor is a separate `tile_worker` process started independently — each
/// side of the pair is wired by its own CLI invocation).
///
/// Unlike [`connect`], this only touches `worker`'s own neighbor map; the
/// caller is responsible for wiring the opposite direction on the other
/// process.
pub fn connect_remote(worker: &Worker, direction: Direction, host: String, border_port: u16) -> Result<()> {
    let mut guard = worker.state.monitor.lock();

    if guard.iteration != 0 || !guard.pending_borders.is_empty() {
        return Err(Error::contract(
            "cannot wire neighbors after a worker has begun iterating",
        ));
    }

    if guard.neighbors.contains_key(&direction) {
        return Err(Error::contract(format!(
            "{direction} neighbor is already wired"
        )));
    }

    guard
        .neighbors
        .insert(direction, NeighborAddr { host, border_port });
    Ok(())
}
