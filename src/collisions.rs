use tracing::debug;

use crate::board::BoardError;
use crate::scoring::PointCalculator;
use crate::types::{SessionEvent, UnitId, UnitKind};
use crate::world::World;

/// Resolves what happens when a unit steps onto a square someone already
/// holds. Outcomes depend only on the two kinds; the player/ghost pair is
/// handled the same whichever of them moved.
#[derive(Debug)]
pub struct PlayerCollisions<P> {
    points: P,
}

impl<P: PointCalculator> PlayerCollisions<P> {
    pub fn new(points: P) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &P {
        &self.points
    }

    pub fn collide(
        &mut self,
        world: &mut World,
        mover: UnitId,
        occupant: UnitId,
    ) -> Result<Option<SessionEvent>, BoardError> {
        let mover_kind = world.kind_of(mover).ok_or(BoardError::UnknownUnit(mover))?;
        let occupant_kind = world
            .kind_of(occupant)
            .ok_or(BoardError::UnknownUnit(occupant))?;

        match (mover_kind, occupant_kind) {
            (UnitKind::Player, UnitKind::Ghost(_)) => self.player_versus_ghost(world, mover, occupant),
            (UnitKind::Ghost(_), UnitKind::Player) => self.player_versus_ghost(world, occupant, mover),
            (UnitKind::Player, UnitKind::Pellet) => self.player_versus_pellet(world, mover, occupant),
            (UnitKind::Pellet, UnitKind::Player) => self.player_versus_pellet(world, occupant, mover),
            _ => Ok(None),
        }
    }

    fn player_versus_ghost(
        &mut self,
        world: &mut World,
        player: UnitId,
        ghost: UnitId,
    ) -> Result<Option<SessionEvent>, BoardError> {
        let ghost_data = world
            .unit(ghost)
            .and_then(|unit| unit.as_ghost())
            .cloned()
            .ok_or(BoardError::UnknownUnit(ghost))?;
        let player_data = world
            .unit_mut(player)
            .and_then(|unit| unit.as_player_mut())
            .ok_or(BoardError::UnknownUnit(player))?;
        if !player_data.is_alive() {
            return Ok(None);
        }

        self.points.collided_with_a_ghost(player_data, &ghost_data);
        player_data.set_alive(false);
        player_data.set_killer(ghost);
        debug!(%player, %ghost, kind = ?ghost_data.kind(), "player killed");
        Ok(Some(SessionEvent::PlayerKilled { player, ghost }))
    }

    fn player_versus_pellet(
        &mut self,
        world: &mut World,
        player: UnitId,
        pellet: UnitId,
    ) -> Result<Option<SessionEvent>, BoardError> {
        let pellet_data = world
            .unit(pellet)
            .and_then(|unit| unit.as_pellet())
            .cloned()
            .ok_or(BoardError::UnknownUnit(pellet))?;
        world.leave_square(pellet)?;

        let player_data = world
            .unit_mut(player)
            .and_then(|unit| unit.as_player_mut())
            .ok_or(BoardError::UnknownUnit(player))?;
        self.points.consumed_a_pellet(player_data, &pellet_data);
        debug!(%player, %pellet, value = pellet_data.value(), "pellet consumed");
        Ok(Some(SessionEvent::PelletConsumed {
            player,
            pellet,
            value: pellet_data.value(),
        }))
    }
}
