//! Tunables for the simulation.
//!
//! Defaults reproduce the classic arena: 64px blocks on a 1024x600 field,
//! 13px steps, bombs that arm after one second and burst after three or four.

use crate::error::ConfigError;
use clap::ValueEnum;
use shared::{Position, BLOCK_SIZE, HEIGHT, WIDTH};
use std::time::Duration;

/// Playfield dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldConfig {
    pub block_size: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            width: WIDTH,
            height: HEIGHT,
        }
    }
}

impl WorldConfig {
    /// Exclusive upper bound for a sprite's top-left x.
    pub fn x_max(&self) -> i32 {
        self.width - self.block_size
    }

    /// Exclusive upper bound for a sprite's top-left y.
    pub fn y_max(&self) -> i32 {
        self.height - self.block_size
    }
}

/// Where newly connected players appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpawnPolicy {
    /// Every player starts at the top-left corner.
    #[default]
    Origin,
    /// Players are dealt the four corner cells in turn.
    Corners,
}

impl SpawnPolicy {
    /// Spawn position for the `slot`-th player currently in the game.
    pub fn spawn_point(&self, slot: usize, world: &WorldConfig) -> Position {
        match self {
            SpawnPolicy::Origin => Position::ORIGIN,
            SpawnPolicy::Corners => {
                let block = world.block_size;
                let right = ((world.x_max() - 1) / block) * block;
                let bottom = ((world.y_max() - 1) / block) * block;
                match slot % 4 {
                    0 => Position::new(0, 0),
                    1 => Position::new(right, bottom),
                    2 => Position::new(right, 0),
                    _ => Position::new(0, bottom),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub world: WorldConfig,
    /// Pixels travelled by one move command.
    pub step_size: i32,
    /// Time after placement before a bomb blocks movement.
    pub arming_delay: Duration,
    /// Fuses are drawn in whole seconds from `min_fuse_secs..max_fuse_secs`.
    pub min_fuse_secs: u64,
    pub max_fuse_secs: u64,
    pub explosion_lifetime: Duration,
    pub spawn: SpawnPolicy,
    /// Remove dead players from the roster after this long. `None` keeps them
    /// until they disconnect.
    pub dead_player_grace: Option<Duration>,
    pub max_players: usize,
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            step_size: 13,
            arming_delay: Duration::from_secs(1),
            min_fuse_secs: 3,
            max_fuse_secs: 5,
            explosion_lifetime: Duration::from_secs(1),
            spawn: SpawnPolicy::Origin,
            dead_player_grace: None,
            max_players: 32,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.block_size <= 0 || world.x_max() <= 0 || world.y_max() <= 0 {
            return Err(ConfigError::InvalidWorld {
                width: world.width,
                height: world.height,
                block_size: world.block_size,
            });
        }
        if self.step_size <= 0 {
            return Err(ConfigError::InvalidStepSize(self.step_size));
        }
        if self.min_fuse_secs > self.max_fuse_secs {
            return Err(ConfigError::InvalidFuseRange {
                min: self.min_fuse_secs,
                max: self.max_fuse_secs,
            });
        }
        if self.max_players == 0 {
            return Err(ConfigError::NoPlayerSlots);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.x_max(), 960);
        assert_eq!(config.world.y_max(), 536);
    }

    #[test]
    fn test_rejects_inverted_fuse_range() {
        let config = GameConfig {
            min_fuse_secs: 5,
            max_fuse_secs: 4,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFuseRange { min: 5, max: 4 })
        ));
    }

    #[test]
    fn test_accepts_fixed_fuse() {
        let config = GameConfig {
            min_fuse_secs: 4,
            max_fuse_secs: 4,
            ..GameConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_world() {
        let config = GameConfig {
            world: WorldConfig {
                block_size: 64,
                width: 64,
                height: 600,
            },
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorld { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_step_and_capacity() {
        let config = GameConfig {
            step_size: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStepSize(0))
        ));

        let config = GameConfig {
            max_players: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoPlayerSlots)));
    }

    #[test]
    fn test_origin_spawn_is_fixed() {
        let world = WorldConfig::default();
        for slot in 0..6 {
            assert_eq!(SpawnPolicy::Origin.spawn_point(slot, &world), Position::ORIGIN);
        }
    }

    #[test]
    fn test_corner_spawns_stay_in_bounds() {
        let world = WorldConfig::default();
        let corners: Vec<Position> = (0..4)
            .map(|slot| SpawnPolicy::Corners.spawn_point(slot, &world))
            .collect();

        assert_eq!(
            corners,
            vec![
                Position::new(0, 0),
                Position::new(896, 512),
                Position::new(896, 0),
                Position::new(0, 512),
            ]
        );
        assert_eq!(SpawnPolicy::Corners.spawn_point(4, &world), corners[0]);
        for corner in corners {
            assert!(corner.x < world.x_max() && corner.y < world.y_max());
        }
    }
}
