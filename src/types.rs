use std::fmt;

use serde::Serialize;

/// Compass direction. `ALL` is the one iteration order every search and
/// neighbour enumeration uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::West => 2,
            Self::East => 3,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CellId(pub usize);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnitId(pub usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostKind {
    pub fn marker(self) -> char {
        match self {
            Self::Blinky => 'B',
            Self::Pinky => 'K',
            Self::Inky => 'I',
            Self::Clyde => 'C',
        }
    }
}

/// Runtime kind of a unit; collision dispatch and searches match on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "ghost", rename_all = "snake_case")]
pub enum UnitKind {
    Player,
    Ghost(GhostKind),
    Pellet,
}

impl UnitKind {
    pub fn is_ghost(self) -> bool {
        matches!(self, Self::Ghost(_))
    }

    pub fn marker(self) -> char {
        match self {
            Self::Player => 'P',
            Self::Ghost(kind) => kind.marker(),
            Self::Pellet => '.',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    Running,
    Stopped,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Started,
    Stopped,
    PlayerKilled {
        player: UnitId,
        ghost: UnitId,
    },
    PelletConsumed {
        player: UnitId,
        pellet: UnitId,
        value: u32,
    },
    Won,
    Lost,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub id: UnitId,
    pub cell: Option<CellId>,
    pub dir: Direction,
    pub alive: bool,
    pub score: u32,
    pub killer: Option<UnitId>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: UnitId,
    #[serde(rename = "type")]
    pub ghost_kind: GhostKind,
    pub cell: Option<CellId>,
    pub dir: Direction,
    #[serde(rename = "nextMoveAtMs")]
    pub next_move_at_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub status: GameStatus,
    #[serde(rename = "remainingPellets")]
    pub remaining_pellets: usize,
    pub players: Vec<PlayerView>,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<SessionEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoreEntry {
    #[serde(rename = "playerId")]
    pub player_id: UnitId,
    pub score: u32,
    pub alive: bool,
    pub killer: Option<UnitId>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub status: GameStatus,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub ticks: u64,
    #[serde(rename = "remainingPellets")]
    pub remaining_pellets: usize,
    pub ranking: Vec<ScoreEntry>,
}
