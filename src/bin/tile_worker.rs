//! Command-line harness for a single tile worker: starts one [`Worker`],
//! wires it to any neighbors named on the command line, then serves border
//! and cells traffic until told to quit.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tilelife::{Direction, Worker};

/// Start a tile worker with an initial grid and optional neighbor wiring.
#[derive(Parser, Debug)]
#[command(name = "tile_worker", version, about = "A single Game of Life tile worker")]
struct Args {
    /// Initial cells as an inline JSON array of arrays, e.g. `[[0,1],[1,0]]`.
    #[arg(long, conflicts_with_all = ["file", "pattern"])]
    cells: Option<String>,

    /// Path to a file containing the initial cells as JSON.
    #[arg(long, conflicts_with_all = ["cells", "pattern"])]
    file: Option<PathBuf>,

    /// Name of a built-in starting pattern (glider, blinker, toad, block).
    #[arg(long, conflicts_with_all = ["cells", "file"])]
    pattern: Option<String>,

    /// Grid height to render `--pattern` into.
    #[arg(long, default_value_t = 10, requires = "pattern")]
    rows: usize,

    /// Grid width to render `--pattern` into.
    #[arg(long, default_value_t = 10, requires = "pattern")]
    cols: usize,

    /// Wire a neighbor, as `DIRECTION=host:port` (e.g. `UP=127.0.0.1:9001`).
    /// May be repeated once per direction.
    #[arg(long = "neighbor", value_name = "DIRECTION=HOST:PORT")]
    neighbors: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let initial_cells = load_initial_cells(&args)?;

    let worker = Worker::start(initial_cells).context("failed to start tile worker")?;
    tracing::info!(
        host = %worker.host,
        border_port = worker.border_port,
        wait_port = worker.wait_port,
        cells_port = worker.cells_port,
        "tile_worker listening"
    );

    for spec in &args.neighbors {
        let (direction, host, port) = parse_neighbor_spec(spec)?;
        worker
            .connect_remote(direction, host, port)
            .with_context(|| format!("failed to wire neighbor {spec}"))?;
    }

    println!(
        "{}",
        serde_json::json!({
            "host": worker.host,
            "border_port": worker.border_port,
            "wait_port": worker.wait_port,
            "cells_port": worker.cells_port,
        })
    );
    io::stdout().flush().ok();

    run_command_loop(&worker)
}

/// Reads newline-delimited commands from stdin until `quit` or EOF:
/// `cells [generation]` prints a snapshot, `wait <generation>` blocks for one.
fn run_command_loop(worker: &Worker) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("quit") => break,
            Some("cells") => {
                let generation = parts.next().and_then(|s| s.parse().ok());
                match worker.cells(generation) {
                    Ok(cells) => println!("{}", serde_json::to_string(&cells)?),
                    Err(error) => eprintln!("error: {error}"),
                }
            }
            Some("wait") => {
                let Some(generation) = parts.next().and_then(|s| s.parse().ok()) else {
                    eprintln!("error: wait requires a generation number");
                    continue;
                };
                match worker.wait_for_cells(generation) {
                    Ok(cells) => println!("{}", serde_json::to_string(&cells)?),
                    Err(error) => eprintln!("error: {error}"),
                }
            }
            Some(other) => eprintln!("error: unknown command {other:?}"),
            None => {}
        }
    }

    worker.terminate();
    Ok(())
}

fn load_initial_cells(args: &Args) -> Result<Vec<Vec<i64>>> {
    if let Some(inline) = &args.cells {
        return serde_json::from_str(inline).context("--cells is not valid JSON");
    }

    if let Some(path) = &args.file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return serde_json::from_str(&contents)
            .with_context(|| format!("{} does not contain a valid cells array", path.display()));
    }

    if let Some(name) = &args.pattern {
        let pattern = tilelife::presets::by_name(name)
            .ok_or_else(|| anyhow::anyhow!("unknown pattern {name:?}"))?;
        return Ok(pattern.into_grid(args.rows, args.cols)?);
    }

    bail!("one of --cells, --file, or --pattern is required")
}

fn parse_neighbor_spec(spec: &str) -> Result<(Direction, String, u16)> {
    let (direction_tag, address) = spec
        .split_once('=')
        .with_context(|| format!("neighbor {spec:?} must be DIRECTION=host:port"))?;
    let direction = Direction::from_tag(direction_tag)
        .with_context(|| format!("unknown direction {direction_tag:?} in {spec:?}"))?;
    let (host, port) = address
        .rsplit_once(':')
        .with_context(|| format!("neighbor {spec:?} must be DIRECTION=host:port"))?;
    let port: u16 = port
        .parse()
        .with_context(|| format!("invalid port in neighbor {spec:?}"))?;
    Ok((direction, host.to_string(), port))
}
