//! Static arena geometry: playfield bounds and the fixed wall grid.

use crate::config::WorldConfig;
use crate::entity::Wall;
use crate::physics::Rect;
use shared::Position;

#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    walls: Vec<Wall>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let walls = generate_walls(&config);
        Self { config, walls }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn block_size(&self) -> i32 {
        self.config.block_size
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall_positions(&self) -> Vec<Position> {
        self.walls.iter().map(Wall::position).collect()
    }

    /// A sprite's top-left must lie in `[0, x_max) x [0, y_max)`.
    pub fn in_bounds(&self, pos: Position) -> bool {
        (0..self.config.x_max()).contains(&pos.x) && (0..self.config.y_max()).contains(&pos.y)
    }

    pub fn collides_with_wall(&self, rect: &Rect) -> bool {
        self.walls.iter().any(|wall| wall.rect().intersects(rect))
    }
}

/// Checkerboard layout: a wall on every cell whose column and row are both
/// odd, never on the top row or left column.
fn generate_walls(config: &WorldConfig) -> Vec<Wall> {
    let block = config.block_size;
    let columns = config.x_max() / block;
    let rows = config.y_max() / block;

    let mut walls = Vec::new();
    for i in 1..=columns {
        for j in 1..=rows {
            if i % 2 == 1 && j % 2 == 1 {
                walls.push(Wall::new(Position::new(i * block, j * block), block));
            }
        }
    }
    walls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wall_layout() {
        let world = World::new(WorldConfig::default());
        let walls = world.wall_positions();

        assert_eq!(walls.len(), 32);
        assert_eq!(walls.first(), Some(&Position::new(64, 64)));
        assert_eq!(walls.last(), Some(&Position::new(960, 448)));
        for wall in &walls {
            assert!(wall.x >= 64 && wall.y >= 64);
            assert_eq!((wall.x / 64) % 2, 1);
            assert_eq!((wall.y / 64) % 2, 1);
        }
    }

    #[test]
    fn test_wall_layout_is_deterministic() {
        let first = World::new(WorldConfig::default()).wall_positions();
        let second = World::new(WorldConfig::default()).wall_positions();
        assert_eq!(first, second);
    }

    #[test]
    fn test_small_world_walls() {
        let world = World::new(WorldConfig {
            block_size: 10,
            width: 60,
            height: 40,
        });
        // x_max = 50 -> columns 1..=5, y_max = 30 -> rows 1..=3
        assert_eq!(
            world.wall_positions(),
            vec![
                Position::new(10, 10),
                Position::new(10, 30),
                Position::new(30, 10),
                Position::new(30, 30),
                Position::new(50, 10),
                Position::new(50, 30),
            ]
        );
    }

    #[test]
    fn test_bounds() {
        let world = World::new(WorldConfig::default());
        assert!(world.in_bounds(Position::new(0, 0)));
        assert!(world.in_bounds(Position::new(959, 535)));
        assert!(!world.in_bounds(Position::new(960, 0)));
        assert!(!world.in_bounds(Position::new(0, 536)));
        assert!(!world.in_bounds(Position::new(-1, 0)));
        assert!(!world.in_bounds(Position::new(0, -13)));
    }

    #[test]
    fn test_wall_collision() {
        let world = World::new(WorldConfig::default());
        assert!(world.collides_with_wall(&Rect::new(13, 13, 64, 64)));
        assert!(!world.collides_with_wall(&Rect::new(0, 0, 64, 64)));
        assert!(!world.collides_with_wall(&Rect::new(128, 0, 64, 64)));
        // column 128 is a corridor between walls, no overlap while aligned
        assert!(!world.collides_with_wall(&Rect::new(128, 13, 64, 64)));
        assert!(world.collides_with_wall(&Rect::new(140, 13, 64, 64)));
    }
}
