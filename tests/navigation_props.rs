use std::collections::VecDeque;

use pacman_grid::layout::parse_layout;
use pacman_grid::navigation::{find_nearest, follow_path, shortest_path};
use pacman_grid::types::{CellId, Direction, UnitKind};
use proptest::prelude::*;
use proptest::sample::Index;

fn grid() -> impl Strategy<Value = Vec<String>> {
    (2usize..8, 2usize..8).prop_flat_map(|(width, height)| {
        prop::collection::vec(
            prop::collection::vec(prop::sample::select(vec!['#', ' ', '.']), width),
            height,
        )
        .prop_map(|rows| rows.into_iter().map(|row| row.into_iter().collect()).collect())
    })
}

/// Hop counts from `from` on the wrapped grid, computed on coordinates.
fn reference_distances(rows: &[String], from: usize, respect_walls: bool) -> Vec<Option<usize>> {
    let tiles: Vec<Vec<char>> = rows.iter().map(|row| row.chars().collect()).collect();
    let height = tiles.len();
    let width = tiles[0].len();
    let mut dist = vec![None; width * height];
    let mut queue = VecDeque::new();
    dist[from] = Some(0);
    queue.push_back(from);

    while let Some(idx) = queue.pop_front() {
        let (x, y) = (idx % width, idx / width);
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let nx = (x as i64 + dx as i64).rem_euclid(width as i64) as usize;
            let ny = (y as i64 + dy as i64).rem_euclid(height as i64) as usize;
            let next = ny * width + nx;
            if respect_walls && tiles[ny][nx] == '#' {
                continue;
            }
            if dist[next].is_none() {
                dist[next] = Some(dist[idx].unwrap_or(0) + 1);
                queue.push_back(next);
            }
        }
    }
    dist
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn path_to_self_is_empty(rows in grid(), at in any::<Index>()) {
        let layout = parse_layout(&rows).expect("generated layout parses");
        let cell = CellId(at.index(layout.world.board().len()));
        prop_assert_eq!(
            shortest_path(layout.world.board(), cell, cell, Some(UnitKind::Player)),
            Some(Vec::new())
        );
        prop_assert_eq!(shortest_path(layout.world.board(), cell, cell, None), Some(Vec::new()));
    }

    #[test]
    fn constrained_paths_are_shortest_and_admissible(
        rows in grid(),
        from in any::<Index>(),
        to in any::<Index>()
    ) {
        let layout = parse_layout(&rows).expect("generated layout parses");
        let board = layout.world.board();
        let from = from.index(board.len());
        let to = to.index(board.len());
        let expected = reference_distances(&rows, from, true)[to];

        let path = shortest_path(board, CellId(from), CellId(to), Some(UnitKind::Player));
        match (path, expected) {
            (None, None) => {}
            (Some(path), Some(hops)) => {
                prop_assert_eq!(path.len(), hops);
                let mut cell = CellId(from);
                for dir in &path {
                    cell = board.neighbour(cell, *dir).expect("path follows links");
                    let admitted = board
                        .terrain(cell)
                        .map(|terrain| terrain.admits(UnitKind::Player))
                        .unwrap_or(false);
                    prop_assert!(admitted);
                }
                prop_assert_eq!(cell, CellId(to));
                prop_assert_eq!(follow_path(board, CellId(from), &path), Some(CellId(to)));
            }
            (path, hops) => prop_assert!(false, "path {:?} but reference {:?}", path, hops),
        }
    }

    #[test]
    fn raw_paths_ignore_walls(rows in grid(), from in any::<Index>(), to in any::<Index>()) {
        let layout = parse_layout(&rows).expect("generated layout parses");
        let board = layout.world.board();
        let from = from.index(board.len());
        let to = to.index(board.len());
        let hops = reference_distances(&rows, from, false)[to];

        let path = shortest_path(board, CellId(from), CellId(to), None);
        prop_assert_eq!(path.map(|path| path.len()), hops);
    }

    #[test]
    fn nearest_pellet_is_at_minimum_distance(rows in grid(), from in any::<Index>()) {
        let layout = parse_layout(&rows).expect("generated layout parses");
        let world = &layout.world;
        let from = from.index(world.board().len());
        let dist = reference_distances(&rows, from, false);
        let closest = world
            .units()
            .filter(|(_, unit)| unit.kind() == UnitKind::Pellet)
            .filter_map(|(_, unit)| unit.square())
            .filter_map(|cell| dist[cell.0])
            .min();

        let found = find_nearest(world, UnitKind::Pellet, CellId(from));
        match (found, closest) {
            (None, None) => {}
            (Some(pellet), Some(best)) => {
                prop_assert_eq!(world.kind_of(pellet), Some(UnitKind::Pellet));
                let square = world.unit(pellet).and_then(|unit| unit.square());
                let square = square.expect("pellet stands on a square");
                prop_assert_eq!(dist[square.0], Some(best));
            }
            (found, closest) => prop_assert!(false, "found {:?} but reference {:?}", found, closest),
        }
    }

    #[test]
    fn parsed_worlds_keep_occupancy_consistent(rows in grid()) {
        let layout = parse_layout(&rows).expect("generated layout parses");
        prop_assert!(layout.world.check_invariants().is_ok());
        let pellets = rows.iter().flat_map(|row| row.chars()).filter(|c| *c == '.').count();
        prop_assert_eq!(layout.world.remaining_pellets(), pellets);
    }

    #[test]
    fn opposite_flips_every_direction_back(idx in 0usize..4) {
        let dir = Direction::ALL[idx];
        prop_assert_ne!(dir.opposite(), dir);
        prop_assert_eq!(dir.opposite().opposite(), dir);
    }
}
