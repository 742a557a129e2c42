use clap::Parser;
use pacman_grid::constants::{DEFAULT_MAX_TICKS, TICK_MS};
use pacman_grid::layout::{parse_layout, render_rows, LayoutError, ParsedLayout};
use pacman_grid::navigation::{find_nearest, shortest_path};
use pacman_grid::session::{Session, SessionOptions};
use pacman_grid::types::{Direction, GameStatus, SessionEvent, UnitId, UnitKind};
use pacman_grid::world::Player;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const AUTOPILOT_MOVE_EVERY_TICKS: u64 = 4;

const DEFAULT_LAYOUT: [&str; 11] = [
    "#################",
    "#.......#.......#",
    "#.##.##.#.##.##.#",
    "#...............#",
    "#.##.#.###.#.##.#",
    "#....#..B..#....#",
    "####.### ###.####",
    "#......KIC......#",
    "####.#######.####",
    "#.......P.......#",
    "#################",
];

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Text layout file; the built-in maze is used when absent.
    #[arg(long)]
    layout: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,
    #[arg(long, default_value_t = 1)]
    runs: u32,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum LoadError {
    #[error("cannot read layout: {0}")]
    Io(#[from] io::Error),
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
}

#[derive(Clone, Debug)]
struct Scenario {
    name: String,
    rows: Vec<String>,
    seed: u32,
    max_ticks: u64,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    status: GameStatus,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    ticks: u64,
    score: u32,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: usize,
    #[serde(rename = "remainingPellets")]
    remaining_pellets: usize,
    deaths: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "statusCounts")]
    status_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let run_id = default_run_id(seed, run_started_at_ms);

    let rows = match load_rows(cli.layout.as_deref()) {
        Ok(rows) => rows,
        Err(error) => {
            emit_log(
                "error",
                "layout_load_failed",
                &run_id,
                None,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut results = Vec::new();
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration_ms = 0u64;

    for scenario in resolve_scenarios(&cli, &rows, seed) {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({ "maxTicks": scenario.max_ticks }),
        );
        let result = match run_scenario(&scenario) {
            Ok(result) => result,
            Err(error) => {
                emit_log(
                    "error",
                    "scenario_failed",
                    &run_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &result.anomalies {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(result.ticks),
                json!({ "message": anomaly }),
            );
        }
        has_anomaly |= !result.anomalies.is_empty();
        total_duration_ms += result.duration_ms;
        *status_counts.entry(status_key(result.status)).or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(result.ticks),
            json!({
                "status": result.status,
                "durationMs": result.duration_ms,
                "score": result.score,
            }),
        );
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(error) => {
                emit_log(
                    "error",
                    "result_serialize_failed",
                    &run_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        }
        results.push(result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        now_ms(),
        results,
        status_counts,
        total_duration_ms,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "averageDurationMs": summary.average_duration_ms,
            "statusCounts": summary.status_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_rows(path: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let rows: Vec<String> = match path {
        Some(path) => std::fs::read_to_string(path)?
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .filter(|line| !line.is_empty())
            .collect(),
        None => DEFAULT_LAYOUT.iter().map(|row| row.to_string()).collect(),
    };
    parse_layout(&rows)?;
    Ok(rows)
}

fn resolve_scenarios(cli: &Cli, rows: &[String], seed: u32) -> Vec<Scenario> {
    (0..cli.runs.max(1))
        .map(|run| Scenario {
            name: format!("run-{}", run + 1),
            rows: rows.to_vec(),
            seed: seed.wrapping_add(run),
            max_ticks: cli.max_ticks.max(1),
        })
        .collect()
}

fn run_scenario(scenario: &Scenario) -> Result<ScenarioResultLine, LoadError> {
    let ParsedLayout { mut world, width, .. } = parse_layout(&scenario.rows)?;
    let player = world
        .register_player(Player::new())
        .map_err(LayoutError::from)?;
    let mut session = Session::new(
        world,
        SessionOptions {
            seed: scenario.seed,
        },
    );
    session.start();

    let mut anomalies = Vec::new();
    let mut pellets_eaten = 0usize;
    let mut deaths = 0usize;
    let mut tick = 0u64;

    while session.is_in_progress() {
        if tick >= scenario.max_ticks {
            anomalies.push("tick safety limit exceeded".to_string());
            break;
        }
        tick += 1;

        if tick % AUTOPILOT_MOVE_EVERY_TICKS == 0 {
            if let Some(dir) = autopilot_move(&session, player) {
                if let Err(error) = session.move_unit(player, dir) {
                    anomalies.push(format!("player move failed: {error}"));
                    break;
                }
            }
        }
        if let Err(error) = session.step(TICK_MS) {
            anomalies.push(format!("ghost step failed: {error}"));
            break;
        }
        if let Err(error) = session.world().check_invariants() {
            anomalies.push(format!("occupancy invariant broken: {error}"));
            break;
        }

        for event in session.drain_events() {
            match event {
                SessionEvent::PelletConsumed { .. } => pellets_eaten += 1,
                SessionEvent::PlayerKilled { .. } => deaths += 1,
                _ => {}
            }
        }
    }

    debug!(board = ?render_rows(session.world(), width), "final board");
    let summary = session.build_summary();
    let score = summary
        .ranking
        .iter()
        .find(|entry| entry.player_id == player)
        .map(|entry| entry.score)
        .unwrap_or(0);

    Ok(ScenarioResultLine {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        status: summary.status,
        duration_ms: summary.duration_ms,
        ticks: summary.ticks,
        score,
        pellets_eaten,
        remaining_pellets: summary.remaining_pellets,
        deaths,
        anomalies,
    })
}

/// Walks towards the nearest pellet.
fn autopilot_move(session: &Session, player: UnitId) -> Option<Direction> {
    let world = session.world();
    let from = world.unit(player)?.square()?;
    let pellet = find_nearest(world, UnitKind::Pellet, from)?;
    let target = world.unit(pellet)?.square()?;
    shortest_path(world.board(), from, target, Some(UnitKind::Player))?
        .first()
        .copied()
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    status_counts: BTreeMap<String, usize>,
    total_duration_ms: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_duration_ms = if scenario_count == 0 {
        0
    } else {
        total_duration_ms / scenario_count as u64
    };
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        average_duration_ms,
        status_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn status_key(status: GameStatus) -> String {
    match status {
        GameStatus::NotStarted => "not_started",
        GameStatus::Running => "running",
        GameStatus::Stopped => "stopped",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    }
    .to_string()
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(seed: u32, max_ticks: u64) -> Scenario {
        Scenario {
            name: "test".to_string(),
            rows: DEFAULT_LAYOUT.iter().map(|row| row.to_string()).collect(),
            seed,
            max_ticks,
        }
    }

    fn make_result(status: GameStatus, duration_ms: u64) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            status,
            duration_ms,
            ticks: duration_ms / TICK_MS,
            score: 0,
            pellets_eaten: 0,
            remaining_pellets: 0,
            deaths: 0,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn default_layout_is_playable() {
        let rows = load_rows(None).expect("built-in layout parses");
        let layout = parse_layout(&rows).expect("built-in layout parses");
        assert_eq!(layout.world.player_starts().len(), 1);
        assert!(layout.world.remaining_pellets() > 0);
        assert_eq!(layout.world.ghosts().count(), 4);
    }

    #[test]
    fn same_seed_gives_same_result_line() {
        let a = run_scenario(&scenario(7, 2_000)).expect("scenario runs");
        let b = run_scenario(&scenario(7, 2_000)).expect("scenario runs");
        assert_eq!(
            serde_json::to_string(&a).expect("serializable"),
            serde_json::to_string(&b).expect("serializable")
        );
        assert!(a.ticks <= 2_000);
        assert!(a.pellets_eaten > 0);
    }

    #[test]
    fn tick_limit_is_reported_as_anomaly() {
        let result = run_scenario(&scenario(3, 1)).expect("scenario runs");
        if result.status == GameStatus::Running {
            assert_eq!(result.anomalies, vec!["tick safety limit exceeded".to_string()]);
        }
    }

    #[test]
    fn autopilot_heads_for_nearest_pellet() {
        let mut world = parse_layout(&["#####", "# P.#", "#####"])
            .expect("valid layout")
            .world;
        let player = world.register_player(Player::new()).expect("start exists");
        let session = Session::new(world, SessionOptions::default());
        assert_eq!(autopilot_move(&session, player), Some(Direction::East));
    }

    #[test]
    fn resolve_scenarios_bumps_seed_per_run() {
        let cli = Cli::parse_from(["simulate", "--runs", "3", "--seed", "10"]);
        let rows = load_rows(None).expect("built-in layout parses");
        let scenarios = resolve_scenarios(&cli, &rows, 10);
        let seeds: Vec<u32> = scenarios.iter().map(|s| s.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12]);
        assert_eq!(scenarios[0].max_ticks, DEFAULT_MAX_TICKS);
    }

    #[test]
    fn build_run_summary_calculates_average_duration() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_result(GameStatus::Lost, 60_000),
                make_result(GameStatus::Won, 90_000),
            ],
            BTreeMap::from([("lost".to_string(), 1usize), ("won".to_string(), 1usize)]),
            150_000,
        );
        assert_eq!(summary.average_duration_ms, 75_000);
        assert_eq!(summary.scenario_count, 2);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("pacman-grid-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_result(GameStatus::Won, 60_000)],
            BTreeMap::from([("won".to_string(), 1usize)]),
            60_000,
        );
        assert!(write_summary(&target, &summary).is_err());
    }
}
