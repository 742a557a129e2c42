use tracing::{debug, error, info, trace};

use crate::board::{Board, BoardError};
use crate::collisions::PlayerCollisions;
use crate::npc;
use crate::rng::Rng;
use crate::scoring::{DefaultPointCalculator, PointCalculator};
use crate::types::{
    Direction, GameStatus, GameSummary, GhostView, PlayerView, ScoreEntry, SessionEvent, Snapshot,
    UnitId,
};
use crate::world::{Player, Unit, World};

#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub seed: u32,
}

#[derive(Clone, Copy, Debug)]
struct GhostClock {
    unit: UnitId,
    next_move_at_ms: u64,
}

/// One game on one world. Ghosts move on their own jittered clocks in unit
/// id order; every move, whoever makes it, goes through `move_unit`.
#[derive(Debug)]
pub struct Session<P = DefaultPointCalculator> {
    world: World,
    collisions: PlayerCollisions<P>,
    rng: Rng,
    status: GameStatus,
    clocks: Vec<GhostClock>,
    events: Vec<SessionEvent>,
    elapsed_ms: u64,
    tick_counter: u64,
}

impl Session<DefaultPointCalculator> {
    pub fn new(world: World, options: SessionOptions) -> Self {
        Self::with_points(world, DefaultPointCalculator, options)
    }
}

impl<P: PointCalculator> Session<P> {
    pub fn with_points(world: World, points: P, options: SessionOptions) -> Self {
        let mut rng = Rng::new(options.seed);
        let clocks = world
            .ghosts()
            .map(|(unit, ghost)| GhostClock {
                unit,
                next_move_at_ms: ghost.next_interval_ms(&mut rng),
            })
            .collect();

        Self {
            world,
            collisions: PlayerCollisions::new(points),
            rng,
            status: GameStatus::NotStarted,
            clocks,
            events: Vec::new(),
            elapsed_ms: 0,
            tick_counter: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn board(&self) -> &Board {
        self.world.board()
    }

    pub fn points(&self) -> &P {
        self.collisions.points()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn is_any_player_alive(&self) -> bool {
        self.world.is_any_player_alive()
    }

    pub fn remaining_pellets(&self) -> usize {
        self.world.remaining_pellets()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn register_player(&mut self, player: Player) -> Result<UnitId, BoardError> {
        self.world.register_player(player)
    }

    pub fn start(&mut self) {
        if self.status.is_terminal() || self.status == GameStatus::Running {
            trace!(status = ?self.status, "start ignored");
            return;
        }
        if !self.world.is_any_player_alive() || self.world.remaining_pellets() == 0 {
            trace!(
                players_alive = self.world.is_any_player_alive(),
                pellets = self.world.remaining_pellets(),
                "start ignored"
            );
            return;
        }
        self.set_status(GameStatus::Running);
        self.events.push(SessionEvent::Started);
    }

    pub fn stop(&mut self) {
        if self.status != GameStatus::Running {
            trace!(status = ?self.status, "stop ignored");
            return;
        }
        self.set_status(GameStatus::Stopped);
        self.events.push(SessionEvent::Stopped);
    }

    /// Turns `unit` towards `dir` and steps it there if the neighbour admits
    /// it, then resolves collisions with whoever was already standing there.
    /// Outside a running game, or for a dead player, nothing happens.
    pub fn move_unit(&mut self, unit: UnitId, dir: Direction) -> Result<(), BoardError> {
        if !self.is_in_progress() {
            trace!(%unit, ?dir, status = ?self.status, "move ignored");
            return Ok(());
        }
        let entry = self.world.unit(unit).ok_or(BoardError::UnknownUnit(unit))?;
        if entry.as_player().is_some_and(|player| !player.is_alive()) {
            trace!(%unit, "dead player cannot move");
            return Ok(());
        }
        let kind = entry.kind();
        let square = entry.square();
        if let Some(entry) = self.world.unit_mut(unit) {
            entry.set_direction(dir);
        }

        let Some(square) = square else {
            return Ok(());
        };
        let board = self.world.board();
        let Some(target) = board.neighbour(square, dir) else {
            return Ok(());
        };
        if !board.terrain(target).is_some_and(|terrain| terrain.admits(kind)) {
            debug!(%unit, ?dir, "move blocked");
            return Ok(());
        }

        let already_there: Vec<UnitId> = board
            .occupants(target)
            .iter()
            .copied()
            .filter(|occupant| *occupant != unit)
            .collect();
        if let Err(err) = self.world.occupy(unit, target) {
            error!(%unit, %target, %err, "occupancy fault");
            return Err(err);
        }
        debug!(%unit, ?dir, from = %square, to = %target, "moved");

        for occupant in already_there {
            if let Some(event) = self.collisions.collide(&mut self.world, unit, occupant)? {
                self.events.push(event);
            }
        }
        self.update_status();
        Ok(())
    }

    /// Advances the clock and lets every ghost whose time has come make one
    /// move.
    pub fn step(&mut self, dt_ms: u64) -> Result<(), BoardError> {
        if !self.is_in_progress() {
            return Ok(());
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);

        for idx in 0..self.clocks.len() {
            if !self.is_in_progress() {
                break;
            }
            let clock = self.clocks[idx];
            if clock.next_move_at_ms > self.elapsed_ms {
                continue;
            }
            let Some(interval) = self
                .world
                .unit(clock.unit)
                .and_then(Unit::as_ghost)
                .map(|ghost| ghost.next_interval_ms(&mut self.rng))
            else {
                continue;
            };
            self.clocks[idx].next_move_at_ms = self.elapsed_ms.saturating_add(interval);

            if let Some(dir) = npc::next_move(&self.world, clock.unit, &mut self.rng) {
                self.move_unit(clock.unit, dir)?;
            }
        }
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let players = self
            .world
            .units()
            .filter_map(|(id, unit)| {
                let player = unit.as_player()?;
                Some(PlayerView {
                    id,
                    cell: unit.square(),
                    dir: unit.direction(),
                    alive: player.is_alive(),
                    score: player.score(),
                    killer: player.killer(),
                })
            })
            .collect();
        let ghosts = self
            .clocks
            .iter()
            .filter_map(|clock| {
                let unit = self.world.unit(clock.unit)?;
                let ghost = unit.as_ghost()?;
                Some(GhostView {
                    id: clock.unit,
                    ghost_kind: ghost.kind(),
                    cell: unit.square(),
                    dir: unit.direction(),
                    next_move_at_ms: clock.next_move_at_ms,
                })
            })
            .collect();

        Snapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            status: self.status,
            remaining_pellets: self.world.remaining_pellets(),
            players,
            ghosts,
            events: if include_events {
                self.drain_events()
            } else {
                Vec::new()
            },
        }
    }

    pub fn build_summary(&self) -> GameSummary {
        let mut ranking: Vec<ScoreEntry> = self
            .world
            .players()
            .map(|(id, player)| ScoreEntry {
                player_id: id,
                score: player.score(),
                alive: player.is_alive(),
                killer: player.killer(),
            })
            .collect();
        ranking.sort_by(|a, b| b.score.cmp(&a.score));

        GameSummary {
            status: self.status,
            duration_ms: self.elapsed_ms,
            ticks: self.tick_counter,
            remaining_pellets: self.world.remaining_pellets(),
            ranking,
        }
    }

    fn update_status(&mut self) {
        if self.world.remaining_pellets() == 0 {
            self.set_status(GameStatus::Won);
            self.events.push(SessionEvent::Won);
        } else if !self.world.is_any_player_alive() {
            self.set_status(GameStatus::Lost);
            self.events.push(SessionEvent::Lost);
        }
    }

    fn set_status(&mut self, status: GameStatus) {
        info!(from = ?self.status, to = ?status, tick = self.tick_counter, "status changed");
        self.status = status;
    }
}
