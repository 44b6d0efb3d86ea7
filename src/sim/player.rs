//! Player movement and room cycling

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::{clamp_to_field, field_center};

/// Directional key state for one physics step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveInput {
    /// Velocity for this input. Up beats down and left beats right.
    pub fn velocity(&self, speed: f32) -> Vec2 {
        let y = if self.up {
            -speed
        } else if self.down {
            speed
        } else {
            0.0
        };
        let x = if self.left {
            -speed
        } else if self.right {
            speed
        } else {
            0.0
        };
        Vec2::new(x, y)
    }
}

/// The player sprite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Current room (1-based), picks the background
    pub room: u8,
}

impl Player {
    /// Player centred in the field, in room 1
    pub fn new(field: Vec2) -> Self {
        Self {
            pos: field_center(field),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            room: 1,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    /// Integrate one step, keeping the player inside `field`.
    ///
    /// Returns true if the player walked into the next room.
    pub fn step(&mut self, velocity: Vec2, dt: f32, field: Vec2) -> bool {
        self.pos = clamp_to_field(self.pos + velocity * dt, self.size, field);

        if self.pos.x + ROOM_EDGE_MARGIN >= field.x || self.pos.y + ROOM_EDGE_MARGIN >= field.y {
            self.room = self.room % ROOM_COUNT + 1;
            self.pos = field_center(field);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_priority() {
        let input = MoveInput {
            up: true,
            down: true,
            left: false,
            right: true,
        };
        assert_eq!(input.velocity(320.0), Vec2::new(320.0, -320.0));
        assert_eq!(MoveInput::default().velocity(320.0), Vec2::ZERO);
    }

    #[test]
    fn test_clamped_to_field() {
        let field = Vec2::new(800.0, 600.0);
        let mut player = Player::new(field);
        player.step(Vec2::new(-10_000.0, -10_000.0), 1.0, field);
        assert_eq!(player.pos, Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0));
        assert_eq!(player.room, 1);
    }

    #[test]
    fn test_edge_cycles_rooms() {
        let field = Vec2::new(800.0, 600.0);
        let mut player = Player::new(field);

        assert!(player.step(Vec2::new(10_000.0, 0.0), 1.0, field));
        assert_eq!(player.room, 2);
        assert_eq!(player.pos, field_center(field));

        assert!(player.step(Vec2::new(0.0, 10_000.0), 1.0, field));
        assert_eq!(player.room, 1);
    }
}
