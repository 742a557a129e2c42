//! Breadth-first searches over the board graph.
//!
//! Every search expands neighbours in `Direction::ALL` order, so ties between
//! equally distant candidates always resolve the same way on the same board.

use std::collections::VecDeque;

use crate::board::Board;
use crate::types::{CellId, Direction, UnitId, UnitKind};
use crate::world::World;

/// Nearest unit of `kind` reachable from `from` over raw links (terrain is
/// ignored). The start square itself is checked first.
pub fn find_nearest(world: &World, kind: UnitKind, from: CellId) -> Option<UnitId> {
    let board = world.board();
    if !board.contains(from) {
        return None;
    }

    let mut visited = vec![false; board.len()];
    let mut queue = VecDeque::new();
    visited[from.0] = true;
    queue.push_back(from);

    while let Some(cell) = queue.pop_front() {
        if let Some(found) = find_unit(world, kind, cell) {
            return Some(found);
        }
        for dir in Direction::ALL {
            let Some(next) = board.neighbour(cell, dir) else {
                continue;
            };
            if !visited[next.0] {
                visited[next.0] = true;
                queue.push_back(next);
            }
        }
    }
    None
}

/// Shortest direction sequence from `from` to `to`.
///
/// With a `traveller`, a step is only taken into squares whose terrain admits
/// that kind of unit; without one every link is usable. Returns an empty path
/// when `from == to` and `None` when `to` cannot be reached.
pub fn shortest_path(
    board: &Board,
    from: CellId,
    to: CellId,
    traveller: Option<UnitKind>,
) -> Option<Vec<Direction>> {
    if from == to {
        return Some(Vec::new());
    }
    if !board.contains(from) || !board.contains(to) {
        return None;
    }

    let mut came_from: Vec<Option<(CellId, Direction)>> = vec![None; board.len()];
    let mut visited = vec![false; board.len()];
    let mut queue = VecDeque::new();
    visited[from.0] = true;
    queue.push_back(from);

    while let Some(cell) = queue.pop_front() {
        if cell == to {
            return Some(reconstruct_path(&came_from, from, to));
        }
        for dir in Direction::ALL {
            let Some(next) = board.neighbour(cell, dir) else {
                continue;
            };
            if visited[next.0] {
                continue;
            }
            if let Some(kind) = traveller {
                let admitted = board
                    .terrain(next)
                    .map(|terrain| terrain.admits(kind))
                    .unwrap_or(false);
                if !admitted {
                    continue;
                }
            }
            visited[next.0] = true;
            came_from[next.0] = Some((cell, dir));
            queue.push_back(next);
        }
    }
    None
}

fn reconstruct_path(
    came_from: &[Option<(CellId, Direction)>],
    from: CellId,
    to: CellId,
) -> Vec<Direction> {
    let mut path = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let Some((previous, dir)) = came_from[cursor.0] else {
            break;
        };
        path.push(dir);
        cursor = previous;
    }
    path.reverse();
    path
}

/// Walks `path` link by link from `start`.
pub fn follow_path(board: &Board, start: CellId, path: &[Direction]) -> Option<CellId> {
    path.iter()
        .try_fold(start, |cell, dir| board.neighbour(cell, *dir))
}

/// Any unit of `kind` on the board, scanning squares in id order.
pub fn find_unit_in_board(world: &World, kind: UnitKind) -> Option<UnitId> {
    world
        .board()
        .cells()
        .find_map(|(cell, _)| find_unit(world, kind, cell))
}

fn find_unit(world: &World, kind: UnitKind, cell: CellId) -> Option<UnitId> {
    world
        .board()
        .occupants(cell)
        .iter()
        .copied()
        .find(|occupant| world.kind_of(*occupant) == Some(kind))
}
