use crate::constants::{CLYDE_SHYNESS, INKY_SQUARES_AHEAD, PINKY_SQUARES_AHEAD};
use crate::navigation::{find_nearest, follow_path, shortest_path};
use crate::types::{CellId, Direction, GhostKind, UnitId, UnitKind};
use crate::world::World;

fn position(world: &World, me: UnitId) -> Option<(CellId, UnitKind)> {
    let unit = world.unit(me)?;
    Some((unit.square()?, unit.kind()))
}

fn first_step_towards(world: &World, me: UnitId, target: CellId) -> Option<Direction> {
    let (square, kind) = position(world, me)?;
    let path = shortest_path(world.board(), square, target, Some(kind))?;
    path.first().copied()
}

/// Straight chase of the nearest player.
pub(super) fn blinky(world: &World, me: UnitId) -> Option<Direction> {
    let (square, _) = position(world, me)?;
    let player = find_nearest(world, UnitKind::Player, square)?;
    let target = world.unit(player)?.square()?;
    first_step_towards(world, me, target)
}

/// Heads for the square a few steps in front of the nearest player.
pub(super) fn pinky(world: &World, me: UnitId) -> Option<Direction> {
    let (square, _) = position(world, me)?;
    let player = find_nearest(world, UnitKind::Player, square)?;
    let target = world.squares_ahead_of(player, PINKY_SQUARES_AHEAD)?;
    first_step_towards(world, me, target)
}

/// Mirrors Blinky through the square two ahead of the player: the raw path
/// Blinky -> ahead is walked again starting at `ahead`, and Inky chases
/// whatever square that lands on.
pub(super) fn inky(world: &World, me: UnitId) -> Option<Direction> {
    let (square, _) = position(world, me)?;
    let blinky = find_nearest(world, UnitKind::Ghost(GhostKind::Blinky), square)?;
    let player = find_nearest(world, UnitKind::Player, square)?;

    let blinky_square = world.unit(blinky)?.square()?;
    let ahead = world.squares_ahead_of(player, INKY_SQUARES_AHEAD)?;
    let first_half = shortest_path(world.board(), blinky_square, ahead, None)?;
    let destination = follow_path(world.board(), ahead, &first_half)?;
    first_step_towards(world, me, destination)
}

/// Chases from afar, turns tail once within `CLYDE_SHYNESS` hops.
pub(super) fn clyde(world: &World, me: UnitId) -> Option<Direction> {
    let (square, kind) = position(world, me)?;
    let player = find_nearest(world, UnitKind::Player, square)?;
    let target = world.unit(player)?.square()?;

    let path = shortest_path(world.board(), square, target, Some(kind))?;
    let first = *path.first()?;
    if path.len() <= CLYDE_SHYNESS {
        Some(first.opposite())
    } else {
        Some(first)
    }
}
