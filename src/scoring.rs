use crate::npc::Ghost;
use crate::world::{Pellet, Player};

/// Receives the scoring-relevant collisions of a session.
pub trait PointCalculator {
    fn collided_with_a_ghost(&mut self, player: &mut Player, ghost: &Ghost);

    fn consumed_a_pellet(&mut self, player: &mut Player, pellet: &Pellet);
}

/// Pellets are worth their value; meeting a ghost costs nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPointCalculator;

impl PointCalculator for DefaultPointCalculator {
    fn collided_with_a_ghost(&mut self, _player: &mut Player, _ghost: &Ghost) {}

    fn consumed_a_pellet(&mut self, player: &mut Player, pellet: &Pellet) {
        player.add_points(pellet.value());
    }
}
