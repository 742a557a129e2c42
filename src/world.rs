use tracing::trace;

use crate::board::{Board, BoardError};
use crate::npc::Ghost;
use crate::types::{CellId, Direction, UnitId, UnitKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    alive: bool,
    killer: Option<UnitId>,
    score: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            alive: true,
            killer: None,
            score: 0,
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    pub fn killer(&self) -> Option<UnitId> {
        self.killer
    }

    pub fn set_killer(&mut self, killer: UnitId) {
        self.killer = Some(killer);
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pellet {
    value: u32,
}

impl Pellet {
    pub fn new(value: u32) -> Self {
        Self { value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

#[derive(Clone, Debug)]
pub enum Role {
    Player(Player),
    Ghost(Ghost),
    Pellet(Pellet),
}

#[derive(Clone, Debug)]
pub struct Unit {
    role: Role,
    square: Option<CellId>,
    direction: Direction,
}

impl Unit {
    fn new(role: Role) -> Self {
        Self {
            role,
            square: None,
            direction: Direction::East,
        }
    }

    pub fn kind(&self) -> UnitKind {
        match &self.role {
            Role::Player(_) => UnitKind::Player,
            Role::Ghost(ghost) => UnitKind::Ghost(ghost.kind()),
            Role::Pellet(_) => UnitKind::Pellet,
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn square(&self) -> Option<CellId> {
        self.square
    }

    pub fn has_square(&self) -> bool {
        self.square.is_some()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.role {
            Role::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.role {
            Role::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_ghost(&self) -> Option<&Ghost> {
        match &self.role {
            Role::Ghost(ghost) => Some(ghost),
            _ => None,
        }
    }

    pub fn as_pellet(&self) -> Option<&Pellet> {
        match &self.role {
            Role::Pellet(pellet) => Some(pellet),
            _ => None,
        }
    }
}

/// Board plus the arena of units standing on it. A unit's square is a
/// lookup-only back reference; the cell's occupant list is authoritative
/// and both sides change together in `occupy` / `leave_square`.
#[derive(Clone, Debug)]
pub struct World {
    board: Board,
    units: Vec<Unit>,
    player_starts: Vec<CellId>,
    next_start: usize,
}

impl World {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            units: Vec::new(),
            player_starts: Vec::new(),
            next_start: 0,
        }
    }

    pub fn with_player_starts(board: Board, starts: Vec<CellId>) -> Result<Self, BoardError> {
        if let Some(unknown) = starts.iter().find(|start| !board.contains(**start)) {
            return Err(BoardError::UnknownCell(*unknown));
        }
        let mut world = Self::new(board);
        world.player_starts = starts;
        Ok(world)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player_starts(&self) -> &[CellId] {
        &self.player_starts
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.0)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id.0)
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        self.units
            .iter()
            .enumerate()
            .map(|(idx, unit)| (UnitId(idx), unit))
    }

    pub fn kind_of(&self, id: UnitId) -> Option<UnitKind> {
        self.unit(id).map(Unit::kind)
    }

    pub fn add_unit(&mut self, role: Role, at: Option<CellId>) -> Result<UnitId, BoardError> {
        if let Some(cell) = at {
            self.board.cell(cell)?;
        }
        self.units.push(Unit::new(role));
        let id = UnitId(self.units.len() - 1);
        if let Some(cell) = at {
            self.occupy(id, cell)?;
        }
        Ok(id)
    }

    /// Places a fresh player on the next start square, cycling through them.
    pub fn register_player(&mut self, player: Player) -> Result<UnitId, BoardError> {
        if self.player_starts.is_empty() {
            return Err(BoardError::NoStartSquare);
        }
        let start = self.player_starts[self.next_start % self.player_starts.len()];
        self.next_start += 1;
        self.add_unit(Role::Player(player), Some(start))
    }

    /// Moves `unit` onto `target` regardless of the target's terrain.
    pub fn occupy(&mut self, unit: UnitId, target: CellId) -> Result<(), BoardError> {
        self.board.cell(target)?;
        let current = self
            .unit(unit)
            .ok_or(BoardError::UnknownUnit(unit))?
            .square;
        if let Some(old) = current {
            if !self.board.occupants(old).contains(&unit) {
                return Err(BoardError::MissingOccupant { unit, cell: old });
            }
        }
        if current != Some(target) && self.board.occupants(target).contains(&unit) {
            return Err(BoardError::AlreadyOccupant { unit, cell: target });
        }

        if let Some(old) = current {
            self.board.remove(old, unit)?;
        }
        self.board.put(target, unit)?;
        self.units[unit.0].square = Some(target);
        trace!(%unit, from = ?current, to = %target, "occupy");
        Ok(())
    }

    /// Takes `unit` off the board. A unit without a square is left as is.
    pub fn leave_square(&mut self, unit: UnitId) -> Result<(), BoardError> {
        let current = self
            .unit(unit)
            .ok_or(BoardError::UnknownUnit(unit))?
            .square;
        let Some(old) = current else {
            return Ok(());
        };
        self.board.remove(old, unit)?;
        self.units[unit.0].square = None;
        trace!(%unit, from = %old, "leave square");
        Ok(())
    }

    /// Follows the unit's facing `count` links; `None` when a link runs out.
    pub fn squares_ahead_of(&self, unit: UnitId, count: usize) -> Option<CellId> {
        let unit = self.unit(unit)?;
        let mut destination = unit.square?;
        for _ in 0..count {
            destination = self.board.neighbour(destination, unit.direction)?;
        }
        Some(destination)
    }

    pub fn players(&self) -> impl Iterator<Item = (UnitId, &Player)> {
        self.units()
            .filter_map(|(id, unit)| unit.as_player().map(|player| (id, player)))
    }

    pub fn ghosts(&self) -> impl Iterator<Item = (UnitId, &Ghost)> {
        self.units()
            .filter_map(|(id, unit)| unit.as_ghost().map(|ghost| (id, ghost)))
    }

    pub fn is_any_player_alive(&self) -> bool {
        self.players().any(|(_, player)| player.is_alive())
    }

    /// Pellets still standing on a square.
    pub fn remaining_pellets(&self) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.as_pellet().is_some() && unit.has_square())
            .count()
    }

    /// Verifies both directions of the unit/cell relation.
    pub fn check_invariants(&self) -> Result<(), BoardError> {
        for (id, unit) in self.units() {
            if let Some(cell) = unit.square {
                if !self.board.occupants(cell).contains(&id) {
                    return Err(BoardError::MissingOccupant { unit: id, cell });
                }
            }
        }
        for (cell_id, cell) in self.board.cells() {
            for occupant in cell.occupants() {
                let unit = self
                    .unit(*occupant)
                    .ok_or(BoardError::UnknownUnit(*occupant))?;
                if unit.square != Some(cell_id) {
                    return Err(BoardError::MissingOccupant {
                        unit: *occupant,
                        cell: cell_id,
                    });
                }
            }
        }
        Ok(())
    }
}
