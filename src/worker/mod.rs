//! The tile worker: owns a [`Grid`], listens on three endpoints, and
//! drives the border-exchange barrier of spec §4.3.2.

mod listen;
pub(crate) mod monitor;

use crate::direction::Direction;
use crate::domain::Grid;
use crate::error::Result;
use crate::net::MessageChannel;
use monitor::{Monitor, NeighborAddr};
use parking_lot::{Condvar, Mutex, MutexGuard};
use serde_json::json;
use std::collections::HashMap;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Everything shared between a worker's three listener threads and its
/// handle, behind one lock plus one condition variable (spec §9). Uses
/// `parking_lot` rather than `std::sync` so a panicking connection handler
/// can't poison the monitor and wedge every other in-flight request.
pub(crate) struct State {
    pub(crate) monitor: Mutex<Monitor>,
    pub(crate) has_iterated: Condvar,
    shutdown: AtomicBool,
}

/// A handle to a running tile worker. A worker is owned by whoever called
/// `start`; other workers reference it only via its listening endpoints
/// (`host`, `border_port`, ...), exactly as spec §3 describes — never a
/// cross-process object reference.
pub struct Worker {
    pub host: String,
    pub border_port: u16,
    pub wait_port: u16,
    pub cells_port: u16,
    pub(crate) state: Arc<State>,
}

impl Worker {
    /// Spawn a worker holding `initial_cells`. Blocks until all three
    /// listening endpoints are bound and ready (spec §4.3.1).
    pub fn start(initial_cells: Vec<Vec<i64>>) -> Result<Worker> {
        let grid = Grid::new(initial_cells)?;
        let host = "127.0.0.1".to_string();

        let border_listener = TcpListener::bind((host.as_str(), 0))?;
        let wait_listener = TcpListener::bind((host.as_str(), 0))?;
        let cells_listener = TcpListener::bind((host.as_str(), 0))?;

        let border_port = border_listener.local_addr()?.port();
        let wait_port = wait_listener.local_addr()?.port();
        let cells_port = cells_listener.local_addr()?.port();

        let state = Arc::new(State {
            monitor: Mutex::new(Monitor::new(grid)),
            has_iterated: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        listen::spawn_border_listener(border_listener, Arc::clone(&state));
        listen::spawn_wait_listener(wait_listener, Arc::clone(&state));
        listen::spawn_cells_listener(cells_listener, Arc::clone(&state));

        tracing::info!(host, border_port, wait_port, cells_port, "worker ready");

        Ok(Worker {
            host,
            border_port,
            wait_port,
            cells_port,
            state,
        })
    }

    /// Wire `other` as this worker's neighbor in `direction`, and
    /// symmetrically wire this worker as `other`'s neighbor in
    /// `direction.opposite()` (spec §4.3.1/§4.4).
    pub fn connect(&self, other: &Worker, direction: Direction) -> Result<()> {
        crate::wiring::connect(self, other, direction)
    }

    /// Wire a neighbor reachable at `host:border_port` without a local
    /// handle to it (spec §4.4's one-sided form, for pairing with a
    /// separately started `tile_worker` process).
    pub fn connect_remote(&self, direction: Direction, host: String, border_port: u16) -> Result<()> {
        crate::wiring::connect_remote(self, direction, host, border_port)
    }

    /// Request a snapshot at generation `generation` (or the current one,
    /// if `None`). In no-neighbor mode this drives local advances itself;
    /// in connected mode it nudges the barrier forward by sending this
    /// tile's borders, then waits (spec §4.3.1).
    pub fn cells(&self, generation: Option<u64>) -> Result<Vec<Vec<i64>>> {
        cells_on(&self.state, generation)
    }

    /// Block until `iteration >= generation`, then reply with a snapshot.
    /// Never sends this tile's own borders; progress must come from a peer
    /// or from a `cells()` call elsewhere (spec §4.3.1).
    pub fn wait_for_cells(&self, generation: u64) -> Result<Vec<Vec<i64>>> {
        wait_for_cells_on(&self.state, generation)
    }

    /// Best-effort shutdown: flags the worker as done and wakes each
    /// blocked `accept()` with a loopback dial, so the listener threads can
    /// notice the flag and exit. Spec leaves `terminate()`'s exact
    /// semantics unspecified (§6); this is the simplest implementation
    /// consistent with "the worker never self-restarts" (§7).
    pub fn terminate(&self) {
        self.state.shutdown.store(true, Ordering::SeqCst);
        for port in [self.border_port, self.wait_port, self.cells_port] {
            let _ = TcpStream::connect((self.host.as_str(), port));
        }
        self.state.has_iterated.notify_all();
    }
}

/// Shared by [`Worker::cells`] and the `cells_port` connection handler
/// (spec §4.3.1's two ways a local `cells` call can be made: through the
/// handle directly, or by a peer dialing in over TCP).
pub(crate) fn cells_on(state: &Arc<State>, generation: Option<u64>) -> Result<Vec<Vec<i64>>> {
    let mut guard = state.monitor.lock();

    if guard.neighbors.is_empty() {
        if let Some(target) = generation {
            while guard.iteration < target {
                guard.advance()?;
            }
        }
        return Ok(guard.grid.snapshot());
    }

    let target = match generation {
        None => return Ok(guard.grid.snapshot()),
        Some(target) if guard.iteration >= target => return Ok(guard.grid.snapshot()),
        Some(target) => target,
    };

    let plan = guard.claim_send_plan();
    MutexGuard::unlocked(&mut guard, || {
        if let Some(plan) = plan {
            send_borders(plan);
        }
    });

    while guard.iteration < target {
        state.has_iterated.wait(&mut guard);
    }
    Ok(guard.grid.snapshot())
}

/// Shared by [`Worker::wait_for_cells`] and the `wait_port` connection
/// handler.
pub(crate) fn wait_for_cells_on(state: &Arc<State>, generation: u64) -> Result<Vec<Vec<i64>>> {
    let mut guard = state.monitor.lock();
    while guard.iteration < generation {
        state.has_iterated.wait(&mut guard);
    }
    Ok(guard.grid.snapshot())
}

/// R2 — send this tile's border to every neighbor in `plan`, fire-and-forget
/// and concurrently (spec §4.3.2). Never called while the monitor is held.
pub(crate) fn send_borders(plan: HashMap<Direction, (NeighborAddr, Vec<i64>)>) {
    let handles: Vec<_> = plan
        .into_iter()
        .map(|(direction, (addr, strip))| {
            thread::spawn(move || {
                let toward = direction.opposite();
                if let Err(error) = send_border_to(&addr, toward, &strip) {
                    tracing::warn!(%direction, host = %addr.host, port = addr.border_port, %error, "border send failed");
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }
}

fn send_border_to(addr: &NeighborAddr, toward: Direction, strip: &[i64]) -> Result<()> {
    let stream = TcpStream::connect((addr.host.as_str(), addr.border_port))?;
    let mut channel = MessageChannel::new(stream);
    channel.send(&json!({ toward.tag(): strip }))?;
    channel.close()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spec §8's literal "Single worker" scenario: a `Worker` with no wired
    /// neighbors drives its own local advances when asked for a generation
    /// past the current one.
    #[test]
    fn single_worker_with_no_neighbors_advances_locally() {
        let worker = Worker::start(vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 0, 0]]).unwrap();
        let cells = worker.cells(Some(1)).unwrap();
        assert_eq!(cells, vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 0, 0]]);
    }

    /// SPEC_FULL.md §B's `cells` generation-count test, reproduced against a
    /// real `Worker` rather than a bare `Grid`: asking for a generation
    /// several steps ahead drives exactly that many local advances.
    #[test]
    fn cells_iterates_the_requested_number_of_generations() {
        let worker = Worker::start(vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]]).unwrap();
        // A blinker oscillates with period 2: back to its starting shape at
        // generation 2, and in its rotated phase at generation 3.
        let at_two = worker.cells(Some(2)).unwrap();
        assert_eq!(at_two, vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]]);

        let at_three = worker.cells(Some(3)).unwrap();
        assert_eq!(at_three, vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 0, 0]]);
    }

    #[test]
    fn cells_with_no_generation_returns_the_current_snapshot_without_advancing() {
        let worker = Worker::start(vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 0, 0]]).unwrap();
        let cells = worker.cells(None).unwrap();
        assert_eq!(cells, vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 0, 0]]);
    }
}
