use thiserror::Error;

use crate::types::{CellId, Direction, UnitId, UnitKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("unknown cell: {0}")]
    UnknownCell(CellId),

    #[error("unknown unit: {0}")]
    UnknownUnit(UnitId),

    #[error("{unit} is already listed as an occupant of {cell}")]
    AlreadyOccupant { unit: UnitId, cell: CellId },

    #[error("{unit} records {cell} as its square but is not among its occupants")]
    MissingOccupant { unit: UnitId, cell: CellId },

    #[error("no player start square on this board")]
    NoStartSquare,
}

/// Accessibility policy of a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terrain {
    Ground,
    Wall,
}

impl Terrain {
    pub fn admits(self, _unit: UnitKind) -> bool {
        match self {
            Self::Ground => true,
            Self::Wall => false,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Self::Ground => ' ',
            Self::Wall => '#',
        }
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    terrain: Terrain,
    neighbours: [Option<CellId>; 4],
    occupants: Vec<UnitId>,
}

impl Cell {
    fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            neighbours: [None; 4],
            occupants: Vec::new(),
        }
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn neighbour(&self, dir: Direction) -> Option<CellId> {
        self.neighbours[dir.index()]
    }

    /// Occupants in arrival order, oldest first.
    pub fn occupants(&self) -> &[UnitId] {
        &self.occupants
    }
}

/// Directed graph of squares. Links are set one way at a time; only the
/// occupant lists change once play begins.
#[derive(Clone, Debug, Default)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cell(&mut self, terrain: Terrain) -> CellId {
        self.cells.push(Cell::new(terrain));
        CellId(self.cells.len() - 1)
    }

    /// One-way link: `from` reaches `to` by moving `dir`.
    pub fn link(&mut self, from: CellId, to: CellId, dir: Direction) -> Result<(), BoardError> {
        self.cell(to)?;
        let cell = self.cell_mut(from)?;
        cell.neighbours[dir.index()] = Some(to);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, id: CellId) -> bool {
        id.0 < self.cells.len()
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell, BoardError> {
        self.cells.get(id.0).ok_or(BoardError::UnknownCell(id))
    }

    fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell, BoardError> {
        self.cells.get_mut(id.0).ok_or(BoardError::UnknownCell(id))
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (CellId(idx), cell))
    }

    pub fn neighbour(&self, id: CellId, dir: Direction) -> Option<CellId> {
        self.cells.get(id.0).and_then(|cell| cell.neighbour(dir))
    }

    pub fn terrain(&self, id: CellId) -> Option<Terrain> {
        self.cells.get(id.0).map(|cell| cell.terrain)
    }

    pub fn occupants(&self, id: CellId) -> &[UnitId] {
        self.cells
            .get(id.0)
            .map(|cell| cell.occupants.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn put(&mut self, id: CellId, unit: UnitId) -> Result<(), BoardError> {
        let cell = self.cell_mut(id)?;
        if cell.occupants.contains(&unit) {
            return Err(BoardError::AlreadyOccupant { unit, cell: id });
        }
        cell.occupants.push(unit);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: CellId, unit: UnitId) -> Result<(), BoardError> {
        let cell = self.cell_mut(id)?;
        let Some(pos) = cell.occupants.iter().position(|occupant| *occupant == unit) else {
            return Err(BoardError::MissingOccupant { unit, cell: id });
        };
        cell.occupants.remove(pos);
        Ok(())
    }
}
