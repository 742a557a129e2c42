use crate::constants::{GHOST_INTERVAL_VARIATION_MS, GHOST_MOVE_INTERVAL_MS, PINKY_MOVE_INTERVAL_MS};
use crate::rng::Rng;
use crate::types::{Direction, GhostKind, UnitId};
use crate::world::World;

mod strategy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ghost {
    kind: GhostKind,
    move_interval_ms: u64,
    interval_variation_ms: u64,
}

impl Ghost {
    pub fn new(kind: GhostKind) -> Self {
        let move_interval_ms = match kind {
            GhostKind::Pinky => PINKY_MOVE_INTERVAL_MS,
            GhostKind::Blinky | GhostKind::Inky | GhostKind::Clyde => GHOST_MOVE_INTERVAL_MS,
        };
        Self::with_interval(kind, move_interval_ms, GHOST_INTERVAL_VARIATION_MS)
    }

    pub fn with_interval(kind: GhostKind, move_interval_ms: u64, interval_variation_ms: u64) -> Self {
        Self {
            kind,
            move_interval_ms,
            interval_variation_ms,
        }
    }

    pub fn kind(&self) -> GhostKind {
        self.kind
    }

    pub fn move_interval_ms(&self) -> u64 {
        self.move_interval_ms
    }

    /// Delay until this ghost's next move: base interval plus jitter below
    /// the variation.
    pub fn next_interval_ms(&self, rng: &mut Rng) -> u64 {
        self.move_interval_ms + rng.below(self.interval_variation_ms)
    }
}

/// Move chosen by the ghost's own strategy, if it has one this turn.
pub fn next_ai_move(world: &World, ghost: UnitId) -> Option<Direction> {
    let kind = world.unit(ghost)?.as_ghost()?.kind();
    match kind {
        GhostKind::Blinky => strategy::blinky(world, ghost),
        GhostKind::Pinky => strategy::pinky(world, ghost),
        GhostKind::Inky => strategy::inky(world, ghost),
        GhostKind::Clyde => strategy::clyde(world, ghost),
    }
}

/// Uniform pick among directions whose neighbour admits the unit.
pub fn random_move(world: &World, unit: UnitId, rng: &mut Rng) -> Option<Direction> {
    let unit = world.unit(unit)?;
    let square = unit.square()?;
    let board = world.board();
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|dir| {
            board
                .neighbour(square, *dir)
                .and_then(|next| board.terrain(next))
                .map(|terrain| terrain.admits(unit.kind()))
                .unwrap_or(false)
        })
        .collect();
    rng.pick_index(open.len()).map(|idx| open[idx])
}

pub fn next_move(world: &World, ghost: UnitId, rng: &mut Rng) -> Option<Direction> {
    next_ai_move(world, ghost).or_else(|| random_move(world, ghost, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::parse_layout;
    use crate::navigation::find_unit_in_board;
    use crate::types::UnitKind;

    #[test]
    fn interval_jitter_stays_below_variation() {
        let ghost = Ghost::new(GhostKind::Clyde);
        let mut rng = Rng::new(11);
        for _ in 0..1_000 {
            let interval = ghost.next_interval_ms(&mut rng);
            assert!(interval >= GHOST_MOVE_INTERVAL_MS);
            assert!(interval < GHOST_MOVE_INTERVAL_MS + GHOST_INTERVAL_VARIATION_MS);
        }
    }

    #[test]
    fn pinky_moves_faster_than_the_rest() {
        assert!(
            Ghost::new(GhostKind::Pinky).move_interval_ms()
                < Ghost::new(GhostKind::Blinky).move_interval_ms()
        );
    }

    #[test]
    fn random_move_only_picks_open_squares() {
        let layout = parse_layout(&["###", "#C ", "###"]).expect("valid layout");
        let clyde = find_unit_in_board(&layout.world, UnitKind::Ghost(GhostKind::Clyde))
            .expect("clyde placed");
        let mut rng = Rng::new(5);
        for _ in 0..50 {
            assert_eq!(
                random_move(&layout.world, clyde, &mut rng),
                Some(Direction::East)
            );
        }
    }

    #[test]
    fn boxed_in_ghost_has_no_move() {
        let layout = parse_layout(&["###", "#C#", "###"]).expect("valid layout");
        let clyde = find_unit_in_board(&layout.world, UnitKind::Ghost(GhostKind::Clyde))
            .expect("clyde placed");
        let mut rng = Rng::new(5);
        assert_eq!(next_move(&layout.world, clyde, &mut rng), None);
    }

    #[test]
    fn strategy_without_target_falls_back_to_random() {
        // No player on the board, so Clyde's own strategy has nothing to do.
        let layout = parse_layout(&["#####", "# C #", "#####"]).expect("valid layout");
        let clyde = find_unit_in_board(&layout.world, UnitKind::Ghost(GhostKind::Clyde))
            .expect("clyde placed");
        assert_eq!(next_ai_move(&layout.world, clyde), None);

        let mut rng = Rng::new(9);
        let dir = next_move(&layout.world, clyde, &mut rng).expect("corridor is open");
        assert!(matches!(dir, Direction::West | Direction::East));
    }

    #[test]
    fn non_ghost_units_have_no_ai_move() {
        let mut layout = parse_layout(&["#P.#"]).expect("valid layout");
        let player = layout
            .world
            .register_player(crate::world::Player::new())
            .expect("start exists");
        assert_eq!(next_ai_move(&layout.world, player), None);
    }
}
