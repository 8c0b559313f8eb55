//! flood-runner: headless runner for the meshflood simulation.
//!
//! Usage:
//!   flood-runner --seed 12345 --ticks 2000 --config data/settings.json
//!   flood-runner --seed 12345 --ipc-mode

use anyhow::Result;
use meshflood_core::{
    command::InputEvent,
    config::SimConfig,
    event::SimEvent,
    registry::Registry,
    surface::FrameRecorder,
};
use std::collections::BTreeMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Input { event: InputEvent },
    Quit,
}

/// Running totals over every tick of a run.
#[derive(Default)]
struct RunTally {
    ticks:      u64,
    by_type:    BTreeMap<&'static str, u64>,
    peak_rings: usize,
    rects:      u64,
}

impl RunTally {
    fn record(&mut self, events: &[SimEvent], frame: &FrameRecorder) {
        for event in events {
            *self.by_type.entry(event.type_name()).or_default() += 1;
            if let SimEvent::TickCompleted { .. } = event {
                self.ticks += 1;
            }
        }
        self.peak_rings = self.peak_rings.max(frame.ring_count());
        self.rects += frame.rect_count() as u64;
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 2000u64);
    let fps = parse_arg(&args, "--fps", 0u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if !ipc_mode {
        println!("meshflood — flood-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  config:    {}", config_path.unwrap_or("(built-in defaults)"));
        println!("  nodes:     {}", config.starting_node_count);
        println!();
    }

    let run_id = format!("run-{seed}-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S"));
    let mut registry = Registry::build(run_id.clone(), seed, config)?;

    if ipc_mode {
        run_ipc_loop(&mut registry)?;
    } else {
        let tally = run_headless(&mut registry, ticks, fps)?;
        print_summary(&registry, &tally);
    }

    Ok(())
}

fn run_headless(registry: &mut Registry, ticks: u64, fps: u32) -> Result<RunTally> {
    let mut tally = RunTally::default();
    let mut frame = FrameRecorder::new();
    let frame_budget = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));

    for _ in 0..ticks {
        if !registry.is_running() {
            break;
        }
        let started = Instant::now();
        frame.clear();
        let events = registry.tick(&mut frame)?;
        tally.record(&events, &frame);

        if let Some(budget) = frame_budget {
            if let Some(rest) = budget.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
    Ok(tally)
}

fn run_ipc_loop(registry: &mut Registry) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut frame = FrameRecorder::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("rejected control line: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => {
                for _ in 0..count {
                    if !registry.is_running() {
                        break;
                    }
                    frame.clear();
                    registry.tick(&mut frame)?;
                }
            }
            IpcCommand::Input { event } => registry.queue_input(event),
            IpcCommand::GetState => {}
        }

        writeln!(stdout, "{}", serde_json::to_string(&registry.snapshot())?)?;
        stdout.flush()?;

        if !registry.is_running() {
            break;
        }
    }
    Ok(())
}

fn print_summary(registry: &Registry, tally: &RunTally) {
    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", registry.run_id);
    println!("  ticks run:      {}", tally.ticks);
    println!("  final tick:     {}", registry.clock.current_tick);
    println!("  live nodes:     {}", registry.nodes().len());
    println!("  live signals:   {}", registry.signals().len());
    println!("  peak rings:     {}", tally.peak_rings);
    println!("  rects drawn:    {}", tally.rects);

    println!();
    println!("=== EVENTS ===");
    for (name, count) in &tally.by_type {
        println!("  {name:<22} {count}");
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
