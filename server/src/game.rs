use crate::client_manager::SessionId;
use crate::config::GameConfig;
use crate::entity::{Bomb, Explosion, Player};
use crate::error::ConfigError;
use crate::world::World;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Direction, Position, Snapshot};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// What changed during one physics pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsReport {
    pub kills: usize,
    pub expired_explosions: usize,
    pub detonations: usize,
}

pub struct GameState {
    pub tick: u32,
    config: GameConfig,
    world: World,
    players: BTreeMap<SessionId, Player>,
    bombs: Vec<Bomb>,
    explosions: Vec<Explosion>,
    rng: StdRng,
}

impl GameState {
    /// Builds an empty arena, seeding the RNG from `rng_seed` when set.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            tick: 0,
            world: World::new(config.world),
            config,
            players: BTreeMap::new(),
            bombs: Vec::new(),
            explosions: Vec::new(),
            rng,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self, id: &SessionId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn add_player(&mut self, id: SessionId) -> Position {
        let spawn = self
            .config
            .spawn
            .spawn_point(self.players.len(), self.world.config());
        let player = Player::new(spawn, self.world.block_size());

        info!("Added player {} at ({})", id, spawn);
        self.players.insert(id, player);
        spawn
    }

    pub fn remove_player(&mut self, id: &SessionId) -> bool {
        let removed = self.players.remove(id).is_some();
        if removed {
            info!("Removed player {}", id);
        }
        removed
    }

    /// Steps a live player one `step_size` in `direction`. Unknown or dead
    /// players and blocked moves leave the world unchanged.
    pub fn move_player(&mut self, id: SessionId, direction: Direction, now: Instant) -> bool {
        let Some(player) = self.players.get_mut(&id) else {
            return false;
        };
        if !player.is_alive() {
            return false;
        }

        let (ux, uy) = direction.unit();
        let step = self.config.step_size;
        let moved = player.try_move(ux * step, uy * step, &self.world, &self.bombs, now);
        if !moved {
            trace!("Rejected {:?} move for player {} at ({})", direction, id, player.position());
        }
        moved
    }

    /// Drops a bomb under a live player.
    pub fn place_bomb(&mut self, id: SessionId, now: Instant) -> Option<Position> {
        let position = self
            .players
            .get(&id)
            .filter(|player| player.is_alive())?
            .position();

        let fuse = self.draw_fuse();
        self.bombs.push(Bomb::new(
            position,
            self.world.block_size(),
            now,
            fuse,
            self.config.arming_delay,
        ));

        debug!("Player {} placed bomb at ({}) with {:?} fuse", id, position, fuse);
        Some(position)
    }

    fn draw_fuse(&mut self) -> Duration {
        let (min, max) = (self.config.min_fuse_secs, self.config.max_fuse_secs);
        let secs = if min < max {
            self.rng.gen_range(min..max)
        } else {
            min
        };
        Duration::from_secs(secs)
    }

    /// Runs explosions against players, retires finished explosions, then
    /// turns expired bombs into new explosions.
    pub fn update(&mut self, now: Instant) -> PhysicsReport {
        let mut report = PhysicsReport::default();

        for explosion in &self.explosions {
            for (id, player) in self.players.iter_mut() {
                if player.is_alive() && explosion.collides_with(player.rect()) {
                    player.kill(now);
                    report.kills += 1;
                    debug!("Player {} caught in blast from ({})", id, explosion.origin());
                }
            }
        }

        let before = self.explosions.len();
        self.explosions.retain(|explosion| !explosion.is_over(now));
        report.expired_explosions = before - self.explosions.len();

        let (exploded, armed): (Vec<Bomb>, Vec<Bomb>) = std::mem::take(&mut self.bombs)
            .into_iter()
            .partition(|bomb| bomb.is_exploded(now));
        self.bombs = armed;

        for bomb in exploded {
            let explosion = Explosion::new(
                bomb.position(),
                self.world.block_size(),
                now,
                self.config.explosion_lifetime,
                &mut self.rng,
            );
            debug!(
                "Bomb at ({}) exploded into {} cells",
                bomb.position(),
                explosion.cells().len()
            );
            self.explosions.push(explosion);
            report.detonations += 1;
        }

        report
    }

    /// Removes players that have been dead longer than the configured grace
    /// period and returns their sessions. Does nothing without a grace period.
    pub fn expire_dead_players(&mut self, now: Instant) -> Vec<SessionId> {
        let Some(grace) = self.config.dead_player_grace else {
            return Vec::new();
        };

        let expired: Vec<SessionId> = self
            .players
            .iter()
            .filter(|(_, player)| player.dead_for(now).is_some_and(|dead| dead >= grace))
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            self.players.remove(id);
            info!("Expired dead player {}", id);
        }
        expired
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            players: self
                .players
                .values()
                .filter(|player| player.is_alive())
                .map(Player::position)
                .collect(),
            bombs: self.bombs.iter().map(Bomb::position).collect(),
            explosions: self
                .explosions
                .iter()
                .map(Explosion::cell_positions)
                .collect(),
            walls: self.world.wall_positions(),
        }
    }
}
