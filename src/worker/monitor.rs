//! The barrier state: one `Mutex`-guarded struct plus one `Condvar`, per
//! spec §3/§9. Every mutation to `iteration`, `pending_borders`, and
//! `is_border_sent` goes through here, under a single lock, so an advance
//! is never observed half-done.

use crate::direction::Direction;
use crate::domain::Grid;
use crate::error::Result;
use std::collections::HashMap;

/// The address a neighboring tile's border endpoint can be reached at.
/// Copied by value at wiring time; never a cross-process object reference
/// (spec §9).
#[derive(Debug, Clone)]
pub struct NeighborAddr {
    pub host: String,
    pub border_port: u16,
}

/// Everything the barrier protocol touches, behind one lock.
pub struct Monitor {
    pub grid: Grid,
    pub iteration: u64,
    pub neighbors: HashMap<Direction, NeighborAddr>,
    pub pending_borders: HashMap<Direction, Vec<i64>>,
    pub is_border_sent: bool,
}

impl Monitor {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            iteration: 0,
            neighbors: HashMap::new(),
            pending_borders: HashMap::new(),
            is_border_sent: false,
        }
    }

    /// Whether every wired neighbor has a pending border waiting (spec
    /// §3: "an advance occurs iff `keys(pending_borders) = keys(neighbors)`").
    pub fn round_is_ready(&self) -> bool {
        !self.neighbors.is_empty()
            && self
                .neighbors
                .keys()
                .all(|direction| self.pending_borders.contains_key(direction))
    }

    /// R3 — advance one generation and reset the round's bookkeeping,
    /// atomically with respect to any waiter on `has_iterated`. Only valid
    /// to call once `round_is_ready()` holds.
    pub fn advance(&mut self) -> Result<()> {
        let next = self.grid.iterate(&self.pending_borders)?;
        self.grid = next;
        self.iteration += 1;
        self.pending_borders.clear();
        self.is_border_sent = false;
        Ok(())
    }

    /// If this round hasn't sent its own border to neighbors yet, claim the
    /// one-shot latch and return the (neighbor, border-strip) pairs to
    /// send. Returns `None` if some other caller already claimed it this
    /// round, or there are no neighbors to send to.
    ///
    /// Must be called while holding the lock; the returned plan is
    /// executed by the caller *after* releasing it, since R2's network
    /// sends must never happen while the monitor is held (spec §5).
    pub fn claim_send_plan(&mut self) -> Option<HashMap<Direction, (NeighborAddr, Vec<i64>)>> {
        if self.neighbors.is_empty() || self.is_border_sent {
            return None;
        }
        self.is_border_sent = true;

        Some(
            self.neighbors
                .iter()
                .map(|(direction, addr)| (*direction, (addr.clone(), self.grid.border_at(*direction))))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Grid {
        Grid::new(vec![vec![0i64; n]; n]).unwrap()
    }

    #[test]
    fn round_is_not_ready_with_no_neighbors() {
        let monitor = Monitor::new(grid(3));
        assert!(!monitor.round_is_ready());
    }

    #[test]
    fn round_becomes_ready_once_every_neighbor_direction_is_pending() {
        let mut monitor = Monitor::new(grid(3));
        monitor.neighbors.insert(
            Direction::Up,
            NeighborAddr { host: "127.0.0.1".into(), border_port: 1 },
        );
        monitor.neighbors.insert(
            Direction::Right,
            NeighborAddr { host: "127.0.0.1".into(), border_port: 2 },
        );

        monitor.pending_borders.insert(Direction::Up, vec![0, 0, 0]);
        assert!(!monitor.round_is_ready());

        monitor.pending_borders.insert(Direction::Right, vec![0, 0, 0]);
        assert!(monitor.round_is_ready());
    }

    #[test]
    fn claim_send_plan_is_one_shot() {
        let mut monitor = Monitor::new(grid(3));
        monitor.neighbors.insert(
            Direction::Up,
            NeighborAddr { host: "127.0.0.1".into(), border_port: 1 },
        );

        let plan = monitor.claim_send_plan();
        assert!(plan.is_some());
        assert!(monitor.claim_send_plan().is_none());
    }

    #[test]
    fn advance_clears_round_state() {
        let mut monitor = Monitor::new(grid(3));
        monitor.neighbors.insert(
            Direction::Up,
            NeighborAddr { host: "127.0.0.1".into(), border_port: 1 },
        );
        monitor.pending_borders.insert(Direction::Up, vec![0, 0, 0]);
        monitor.is_border_sent = true;

        monitor.advance().unwrap();

        assert_eq!(monitor.iteration, 1);
        assert!(monitor.pending_borders.is_empty());
        assert!(!monitor.is_border_sent);
    }
}
