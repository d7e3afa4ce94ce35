//! Arena entities: players, bombs, explosions and walls.
//!
//! Every entity is a `block`-sized square anchored at its top-left corner.
//! Timed behaviour takes `now` explicitly so callers control the clock.

use crate::physics::Rect;
use crate::world::World;
use rand::seq::SliceRandom;
use rand::Rng;
use shared::Position;
use std::time::{Duration, Instant};

/// Blast extents and their relative weights; long blasts are rare.
pub const BLAST_EXTENTS: [(i32, u32); 7] = [(1, 1), (2, 5), (3, 7), (4, 6), (5, 3), (6, 2), (8, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wall {
    rect: Rect,
}

impl Wall {
    pub fn new(position: Position, size: i32) -> Self {
        Self {
            rect: Rect::square(position, size),
        }
    }

    pub fn position(&self) -> Position {
        self.rect.top_left()
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    rect: Rect,
    alive: bool,
    died_at: Option<Instant>,
}

impl Player {
    pub fn new(position: Position, size: i32) -> Self {
        Self {
            rect: Rect::square(position, size),
            alive: true,
            died_at: None,
        }
    }

    pub fn position(&self) -> Position {
        self.rect.top_left()
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Moves by `(dx, dy)` if the destination is in bounds and clear of walls
    /// and primed bombs. Returns whether the move was applied; a rejected move
    /// leaves the player where it was.
    pub fn try_move(&mut self, dx: i32, dy: i32, world: &World, bombs: &[Bomb], now: Instant) -> bool {
        if !self.alive {
            return false;
        }

        let candidate = self.rect.translate(dx, dy);
        if !world.in_bounds(candidate.top_left()) || world.collides_with_wall(&candidate) {
            return false;
        }

        let blocked = bombs
            .iter()
            .any(|bomb| bomb.is_primed(now) && bomb.rect().intersects(&candidate));
        if blocked {
            return false;
        }

        self.rect = candidate;
        true
    }

    pub fn kill(&mut self, now: Instant) {
        if self.alive {
            self.alive = false;
            self.died_at = Some(now);
        }
    }

    /// How long the player has been dead, `None` while alive.
    pub fn dead_for(&self, now: Instant) -> Option<Duration> {
        self.died_at.map(|died_at| now.saturating_duration_since(died_at))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bomb {
    rect: Rect,
    placed_at: Instant,
    fuse: Duration,
    arming_delay: Duration,
}

impl Bomb {
    pub fn new(
        position: Position,
        size: i32,
        placed_at: Instant,
        fuse: Duration,
        arming_delay: Duration,
    ) -> Self {
        Self {
            rect: Rect::square(position, size),
            placed_at,
            fuse,
            arming_delay,
        }
    }

    pub fn position(&self) -> Position {
        self.rect.top_left()
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn fuse(&self) -> Duration {
        self.fuse
    }

    pub fn is_exploded(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.placed_at) >= self.fuse
    }

    /// A primed bomb obstructs movement.
    pub fn is_primed(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.placed_at) >= self.arming_delay
    }
}

/// Shape of a blast, in blocks, relative to the bomb.
///
/// Cells run from `offset_x` to `length - 1` along the bomb's row and from
/// `offset_y` to `height - 1` along its column. Offsets are never positive,
/// so the bomb's own cell is always covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlastExtents {
    pub length: i32,
    pub height: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl BlastExtents {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let length = draw_extent(rng);
        let height = draw_extent(rng);
        Self {
            length,
            height,
            offset_x: rng.gen_range(-(length / 2)..=0),
            offset_y: rng.gen_range(-(height / 2)..=0),
        }
    }
}

fn draw_extent<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    BLAST_EXTENTS
        .choose_weighted(rng, |&(_, weight)| weight)
        .map(|&(extent, _)| extent)
        .unwrap_or(1)
}

/// Expands blast extents into block-sized cells around `origin`.
/// Overlapping cells are kept.
pub fn blast_cells(origin: Position, block: i32, extents: &BlastExtents) -> Vec<Rect> {
    let horizontal = (extents.offset_x..extents.length)
        .map(|i| Rect::new(origin.x + block * i, origin.y, block, block));
    let vertical = (extents.offset_y..extents.height)
        .map(|j| Rect::new(origin.x, origin.y + block * j, block, block));
    horizontal.chain(vertical).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explosion {
    origin: Position,
    cells: Vec<Rect>,
    created_at: Instant,
    lifetime: Duration,
}

impl Explosion {
    pub fn new<R: Rng + ?Sized>(
        origin: Position,
        block: i32,
        created_at: Instant,
        lifetime: Duration,
        rng: &mut R,
    ) -> Self {
        Self::with_extents(origin, block, created_at, lifetime, &BlastExtents::random(rng))
    }

    pub fn with_extents(
        origin: Position,
        block: i32,
        created_at: Instant,
        lifetime: Duration,
        extents: &BlastExtents,
    ) -> Self {
        Self {
            origin,
            cells: blast_cells(origin, block, extents),
            created_at,
            lifetime,
        }
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn cells(&self) -> &[Rect] {
        &self.cells
    }

    pub fn cell_positions(&self) -> Vec<Position> {
        self.cells.iter().map(Rect::top_left).collect()
    }

    pub fn collides_with(&self, rect: &Rect) -> bool {
        self.cells.iter().any(|cell| cell.intersects(rect))
    }

    pub fn is_over(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BLOCK: i32 = 64;
    const ARMING: Duration = Duration::from_secs(1);

    fn world() -> World {
        World::new(WorldConfig::default())
    }

    #[test]
    fn test_player_moves_in_open_space() {
        let world = world();
        let now = Instant::now();
        let mut player = Player::new(Position::ORIGIN, BLOCK);

        assert!(player.try_move(13, 0, &world, &[], now));
        assert_eq!(player.position(), Position::new(13, 0));
        assert!(player.try_move(0, 13, &world, &[], now));
        assert_eq!(player.position(), Position::new(13, 13));
    }

    #[test]
    fn test_player_rejects_out_of_bounds() {
        let world = world();
        let now = Instant::now();
        let mut player = Player::new(Position::ORIGIN, BLOCK);

        assert!(!player.try_move(0, -13, &world, &[], now));
        assert!(!player.try_move(-13, 0, &world, &[], now));
        assert_eq!(player.position(), Position::ORIGIN);

        let mut edge = Player::new(Position::new(950, 0), BLOCK);
        assert!(!edge.try_move(13, 0, &world, &[], now));
        assert_eq!(edge.position(), Position::new(950, 0));
    }

    #[test]
    fn test_player_rejects_wall() {
        let world = world();
        let now = Instant::now();
        // directly above the wall at (64, 64), sliding right overlaps it
        let mut player = Player::new(Position::new(0, 13), BLOCK);

        assert!(!player.try_move(13, 0, &world, &[], now));
        assert_eq!(player.position(), Position::new(0, 13));
    }

    #[test]
    fn test_unprimed_bomb_does_not_block() {
        let world = world();
        let placed_at = Instant::now();
        let bombs = vec![Bomb::new(Position::new(26, 0), BLOCK, placed_at, Duration::from_secs(3), ARMING)];
        let mut player = Player::new(Position::ORIGIN, BLOCK);

        let before_arming = placed_at + Duration::from_millis(999);
        assert!(player.try_move(13, 0, &world, &bombs, before_arming));
        assert_eq!(player.position(), Position::new(13, 0));
    }

    #[test]
    fn test_primed_bomb_blocks() {
        let world = world();
        let placed_at = Instant::now();
        let bombs = vec![Bomb::new(Position::new(80, 0), BLOCK, placed_at, Duration::from_secs(3), ARMING)];
        let mut player = Player::new(Position::ORIGIN, BLOCK);

        let armed = placed_at + ARMING;
        assert!(!player.try_move(26, 0, &world, &bombs, armed));
        assert_eq!(player.position(), Position::ORIGIN);
        // moving away is still allowed
        assert!(player.try_move(0, 13, &world, &bombs, armed));
    }

    #[test]
    fn test_dead_player_cannot_move() {
        let world = world();
        let now = Instant::now();
        let mut player = Player::new(Position::ORIGIN, BLOCK);
        player.kill(now);

        assert!(!player.is_alive());
        assert!(!player.try_move(13, 0, &world, &[], now));
        assert_eq!(player.position(), Position::ORIGIN);
    }

    #[test]
    fn test_kill_records_time_once() {
        let start = Instant::now();
        let mut player = Player::new(Position::ORIGIN, BLOCK);
        assert_eq!(player.dead_for(start), None);

        player.kill(start);
        player.kill(start + Duration::from_secs(5));
        assert_eq!(
            player.dead_for(start + Duration::from_secs(10)),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_bomb_fuse_boundary() {
        let placed_at = Instant::now();
        let bomb = Bomb::new(Position::ORIGIN, BLOCK, placed_at, Duration::from_secs(3), ARMING);

        assert!(!bomb.is_exploded(placed_at));
        assert!(!bomb.is_exploded(placed_at + Duration::from_millis(2999)));
        assert!(bomb.is_exploded(placed_at + Duration::from_secs(3)));
        assert!(bomb.is_exploded(placed_at + Duration::from_secs(30)));
    }

    #[test]
    fn test_bomb_arming_boundary() {
        let placed_at = Instant::now();
        let bomb = Bomb::new(Position::ORIGIN, BLOCK, placed_at, Duration::from_secs(3), ARMING);

        assert!(!bomb.is_primed(placed_at));
        assert!(!bomb.is_primed(placed_at + Duration::from_millis(999)));
        assert!(bomb.is_primed(placed_at + ARMING));
    }

    #[test]
    fn test_blast_cells_from_fixed_extents() {
        let extents = BlastExtents {
            length: 3,
            height: 2,
            offset_x: -1,
            offset_y: 0,
        };
        let cells = blast_cells(Position::new(128, 128), BLOCK, &extents);
        let positions: Vec<Position> = cells.iter().map(Rect::top_left).collect();

        assert_eq!(
            positions,
            vec![
                Position::new(64, 128),
                Position::new(128, 128),
                Position::new(192, 128),
                Position::new(256, 128),
                Position::new(128, 128),
                Position::new(128, 192),
            ]
        );
        assert!(cells.iter().all(|cell| cell.width == BLOCK && cell.height == BLOCK));
    }

    #[test]
    fn test_random_blasts_always_cover_origin() {
        let origin = Position::new(128, 128);
        let now = Instant::now();

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let explosion = Explosion::new(origin, BLOCK, now, Duration::from_secs(1), &mut rng);
            let covered = explosion
                .cell_positions()
                .iter()
                .filter(|&&cell| cell == origin)
                .count();
            assert_eq!(covered, 2, "seed {seed}");
        }
    }

    #[test]
    fn test_random_extents_are_drawn_from_table() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let extents = BlastExtents::random(&mut rng);
            for (extent, offset) in [
                (extents.length, extents.offset_x),
                (extents.height, extents.offset_y),
            ] {
                assert!(BLAST_EXTENTS.iter().any(|&(e, _)| e == extent));
                assert!(offset <= 0 && offset >= -(extent / 2));
            }
        }
    }

    #[test]
    fn test_same_seed_same_blast() {
        let now = Instant::now();
        let a = Explosion::new(Position::ORIGIN, BLOCK, now, Duration::from_secs(1), &mut StdRng::seed_from_u64(9));
        let b = Explosion::new(Position::ORIGIN, BLOCK, now, Duration::from_secs(1), &mut StdRng::seed_from_u64(9));
        assert_eq!(a.cell_positions(), b.cell_positions());
    }

    #[test]
    fn test_explosion_collision_and_lifetime() {
        let created_at = Instant::now();
        let extents = BlastExtents {
            length: 2,
            height: 1,
            offset_x: 0,
            offset_y: 0,
        };
        let explosion = Explosion::with_extents(
            Position::ORIGIN,
            BLOCK,
            created_at,
            Duration::from_secs(1),
            &extents,
        );

        assert!(explosion.collides_with(&Rect::new(100, 10, BLOCK, BLOCK)));
        assert!(!explosion.collides_with(&Rect::new(128, 0, BLOCK, BLOCK)));
        assert!(!explosion.collides_with(&Rect::new(0, 64, BLOCK, BLOCK)));

        assert!(!explosion.is_over(created_at + Duration::from_millis(999)));
        assert!(explosion.is_over(created_at + Duration::from_secs(1)));
    }
}
