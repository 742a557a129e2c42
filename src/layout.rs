use thiserror::Error;

use crate::board::{Board, BoardError, Terrain};
use crate::constants::PELLET_VALUE;
use crate::npc::Ghost;
use crate::types::{CellId, Direction, GhostKind};
use crate::world::{Pellet, Role, World};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} is {found} wide, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile {glyph:?} at ({x}, {y})")]
    UnknownTile { glyph: char, x: usize, y: usize },

    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Clone, Debug)]
pub struct ParsedLayout {
    pub world: World,
    pub width: usize,
    pub height: usize,
}

impl ParsedLayout {
    /// Cells are created row-major, so the id follows from the coordinates.
    pub fn cell_at(&self, x: usize, y: usize) -> CellId {
        CellId(y * self.width + x)
    }
}

#[derive(Clone, Copy)]
enum Tile {
    Wall,
    Ground,
    Pellet,
    PlayerStart,
    Ghost(GhostKind),
}

impl Tile {
    fn parse(glyph: char) -> Option<Self> {
        let tile = match glyph {
            '#' => Self::Wall,
            ' ' => Self::Ground,
            '.' => Self::Pellet,
            'P' => Self::PlayerStart,
            'B' | 'G' => Self::Ghost(GhostKind::Blinky),
            'K' => Self::Ghost(GhostKind::Pinky),
            'I' => Self::Ghost(GhostKind::Inky),
            'C' => Self::Ghost(GhostKind::Clyde),
            _ => return None,
        };
        Some(tile)
    }

    fn terrain(self) -> Terrain {
        match self {
            Self::Wall => Terrain::Wall,
            Self::Ground | Self::Pellet | Self::PlayerStart | Self::Ghost(_) => Terrain::Ground,
        }
    }
}

/// Builds a world from text rows. Every square links to its four grid
/// neighbours with wrap-around at the edges; players are not placed, their
/// start squares are recorded for `World::register_player`.
pub fn parse_layout<S: AsRef<str>>(rows: &[S]) -> Result<ParsedLayout, LayoutError> {
    let grid: Vec<Vec<char>> = rows.iter().map(|row| row.as_ref().chars().collect()).collect();
    let width = grid.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(LayoutError::Empty);
    }
    let height = grid.len();

    let mut tiles = Vec::with_capacity(width * height);
    for (y, row) in grid.iter().enumerate() {
        if row.len() != width {
            return Err(LayoutError::Ragged {
                row: y,
                expected: width,
                found: row.len(),
            });
        }
        for (x, glyph) in row.iter().enumerate() {
            let tile = Tile::parse(*glyph).ok_or(LayoutError::UnknownTile {
                glyph: *glyph,
                x,
                y,
            })?;
            tiles.push(tile);
        }
    }

    let mut board = Board::new();
    for tile in &tiles {
        board.add_cell(tile.terrain());
    }
    for y in 0..height {
        for x in 0..width {
            let from = CellId(y * width + x);
            for dir in Direction::ALL {
                let (dx, dy) = dir.delta();
                let nx = wrap(x, dx, width);
                let ny = wrap(y, dy, height);
                board.link(from, CellId(ny * width + nx), dir)?;
            }
        }
    }

    let starts = tiles
        .iter()
        .enumerate()
        .filter(|(_, tile)| matches!(tile, Tile::PlayerStart))
        .map(|(idx, _)| CellId(idx))
        .collect();
    let mut world = World::with_player_starts(board, starts)?;
    for (idx, tile) in tiles.iter().enumerate() {
        let role = match tile {
            Tile::Pellet => Role::Pellet(Pellet::new(PELLET_VALUE)),
            Tile::Ghost(kind) => Role::Ghost(Ghost::new(*kind)),
            Tile::Wall | Tile::Ground | Tile::PlayerStart => continue,
        };
        world.add_unit(role, Some(CellId(idx)))?;
    }

    Ok(ParsedLayout {
        world,
        width,
        height,
    })
}

fn wrap(pos: usize, delta: i32, len: usize) -> usize {
    (pos as i64 + delta as i64).rem_euclid(len as i64) as usize
}

/// Text picture of the board: the most recent occupant's marker, otherwise
/// the terrain marker.
pub fn render_rows(world: &World, width: usize) -> Vec<String> {
    let glyphs: Vec<char> = world
        .board()
        .cells()
        .map(|(_, cell)| {
            cell.occupants()
                .last()
                .and_then(|occupant| world.kind_of(*occupant))
                .map(|kind| kind.marker())
                .unwrap_or_else(|| cell.terrain().marker())
        })
        .collect();
    if width == 0 {
        return Vec::new();
    }
    glyphs
        .chunks(width)
        .map(|row| row.iter().collect())
        .collect()
}
