//! The three listener threads (`border_port`, `wait_port`, `cells_port`)
//! and their per-connection handlers (spec §4.3/§6).

use super::{cells_on, send_borders, wait_for_cells_on, State};
use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::net::MessageChannel;
use serde_json::Value;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

pub(super) fn spawn_border_listener(listener: TcpListener, state: Arc<State>) {
    spawn_accept_loop(listener, state, "border_port", |stream, state| {
        handle_border_connection(stream, &state)
    });
}

pub(super) fn spawn_wait_listener(listener: TcpListener, state: Arc<State>) {
    spawn_accept_loop(listener, state, "wait_port", |stream, state| {
        handle_wait_connection(stream, &state)
    });
}

pub(super) fn spawn_cells_listener(listener: TcpListener, state: Arc<State>) {
    spawn_accept_loop(listener, state, "cells_port", |stream, state| {
        handle_cells_connection(stream, &state)
    });
}

/// Accept connections until `terminate()` sets the shutdown flag, spawning
/// one handler thread per connection (spec §5's "cooperative concurrency":
/// several requests may be in flight on each listener at once).
fn spawn_accept_loop(
    listener: TcpListener,
    state: Arc<State>,
    name: &'static str,
    handle: fn(TcpStream, Arc<State>) -> Result<()>,
) {
    thread::spawn(move || {
        for incoming in listener.incoming() {
            if state.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let stream = match incoming {
                Ok(stream) => stream,
                Err(error) => {
                    tracing::warn!(%name, %error, "accept failed");
                    continue;
                }
            };

            let state = Arc::clone(&state);
            thread::spawn(move || {
                if let Err(error) = handle(stream, state) {
                    tracing::warn!(%name, %error, "connection failed");
                }
            });
        }
    });
}

/// R1 — a border message arrives: `{direction_tag: strip}`, exactly one
/// entry (spec §6). No reply body is sent; the caller observes R1's
/// completion as the connection closing.
fn handle_border_connection(stream: TcpStream, state: &Arc<State>) -> Result<()> {
    let mut channel = MessageChannel::new(stream);
    let message = channel.recv()?;
    let (direction, strip) = parse_border_message(message)?;

    receive_border(state, direction, strip)?;

    channel.close()
}

fn parse_border_message(message: Value) -> Result<(Direction, Vec<i64>)> {
    let object = message
        .as_object()
        .ok_or_else(|| Error::contract("border message must be a JSON object"))?;

    if object.len() != 1 {
        return Err(Error::contract(format!(
            "border message must have exactly one entry, got {}",
            object.len()
        )));
    }

    let (tag, strip_value) = object.iter().next().expect("checked len == 1 above");
    let direction = Direction::from_tag(tag)
        .ok_or_else(|| Error::contract(format!("unknown direction {tag:?}")))?;
    let strip: Vec<i64> = serde_json::from_value(strip_value.clone())
        .map_err(|e| Error::contract(format!("border strip must be an array of integers: {e}")))?;

    Ok((direction, strip))
}

/// R1's three numbered steps, run under the monitor lock, plus R3 inline
/// when this message completes the round. R2 (the resulting border sends)
/// happens after the lock is released, in `send_borders`.
fn receive_border(state: &Arc<State>, direction: Direction, strip: Vec<i64>) -> Result<()> {
    let mut guard = state.monitor.lock();

    let expected = guard.grid.expected_border_len(direction);
    if strip.len() != expected {
        return Err(Error::contract(format!(
            "border for {direction} has length {}, expected {expected}",
            strip.len()
        )));
    }

    // R1 step 1: a second arrival for a direction whose slot is still full
    // means last round's exchange hasn't finished; block until it has.
    while guard.pending_borders.contains_key(&direction) {
        state.has_iterated.wait(&mut guard);
    }

    // R1 step 2.
    guard.pending_borders.insert(direction, strip);

    // R1 step 3: the one-shot send latch.
    let plan = guard.claim_send_plan();

    // R1 step 4 / R3: advance if every wired neighbor has now checked in.
    if guard.round_is_ready() {
        guard.advance()?;
        state.has_iterated.notify_all();
    }

    drop(guard);

    if let Some(plan) = plan {
        send_borders(plan);
    }

    Ok(())
}

/// `cells_port`: request is `null` or a non-negative integer generation.
fn handle_cells_connection(stream: TcpStream, state: &Arc<State>) -> Result<()> {
    let mut channel = MessageChannel::new(stream);
    let request = channel.recv()?;
    let generation = parse_generation_request(request)?;

    let cells = cells_on(state, generation)?;
    channel.send(&serde_json::to_value(cells).expect("grid is always serializable"))?;
    channel.close()
}

/// `wait_port`: request is a non-negative integer generation.
fn handle_wait_connection(stream: TcpStream, state: &Arc<State>) -> Result<()> {
    let mut channel = MessageChannel::new(stream);
    let request = channel.recv()?;
    let generation = request
        .as_u64()
        .ok_or_else(|| Error::contract("wait_port request must be a non-negative integer"))?;

    let cells = wait_for_cells_on(state, generation)?;
    channel.send(&serde_json::to_value(cells).expect("grid is always serializable"))?;
    channel.close()
}

fn parse_generation_request(request: Value) -> Result<Option<u64>> {
    match request {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| Error::contract("cells_port generation must be a non-negative integer")),
        _ => Err(Error::contract("cells_port request must be null or an integer")),
    }
}
