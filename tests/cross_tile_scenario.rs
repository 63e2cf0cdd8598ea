//! The literal three-tile end-to-end scenario from spec §8: a single
//! `cells(1)` call on one tile cascades a full round across all three.

use std::thread;
use tilelife::{Direction, Worker};

#[test]
fn three_tiles_converge_on_generation_one_from_a_single_call() {
    let center = Worker::start(vec![vec![0, 1, 0], vec![0, 0, 0], vec![0, 0, 1]]).unwrap();
    let up = Worker::start(vec![vec![0, 0, 0], vec![0, 0, 0], vec![1, 0, 1]]).unwrap();
    let right = Worker::start(vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 0]]).unwrap();

    center.connect(&up, Direction::Up).unwrap();
    center.connect(&right, Direction::Right).unwrap();
    right.connect(&up, Direction::UpLeft).unwrap();

    thread::scope(|scope| {
        let up_handle = scope.spawn(|| up.wait_for_cells(1).unwrap());
        let right_handle = scope.spawn(|| right.wait_for_cells(1).unwrap());

        let center_cells = center.cells(Some(1)).unwrap();
        assert_eq!(center_cells, vec![vec![0, 1, 1], vec![0, 0, 1], vec![0, 0, 0]]);

        let up_cells = up_handle.join().unwrap();
        assert_eq!(up_cells, vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 1, 1]]);

        let right_cells = right_handle.join().unwrap();
        assert_eq!(right_cells, vec![vec![1, 0, 0], vec![1, 0, 0], vec![0, 0, 0]]);
    });
}
