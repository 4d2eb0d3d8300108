//! Turn controller: applies one movement command, resolves pickups and
//! level completion, runs the monster phase on cadence and checks for death.

use crate::config::GameConfig;
use crate::entity::{Dir, Item, ItemKind, MonsterKind, Player, Pos};
use crate::error::GameError;
use crate::event::GameEvent;
use crate::level::{generate_level, SpawnPool};
use crate::pursuit::{Hit, Monsters};
use crate::rng::{self, GameRng};
use crate::tile::{Grid, Tile};
use crate::view::GameView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Dir),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Terminal: health reached zero. Every later command is rejected.
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    /// False when the step was blocked by the grid edge or a wall.
    pub moved: bool,
    pub level_cleared: bool,
    pub status: GameStatus,
}

/// Per-level state, rebuilt wholesale on every transition.
#[derive(Debug, Clone)]
pub struct Level {
    pub grid: Grid,
    pub monsters: Monsters,
    pub fuel: Option<Item>,
    pub health_potion: Option<Item>,
    pub ghost_item: Option<Item>,
}

impl Level {
    /// Generate a grid and draw seekers and items from its spawn pool.
    pub fn generate(
        rng: &mut GameRng,
        config: &GameConfig,
        with_ghost: bool,
    ) -> Result<Self, GameError> {
        let grid = generate_level(rng, config.wall_cap);
        let mut pool = SpawnPool::from_grid(&grid);

        let seekers = pool.draw_many(rng, config.seeker_count)?;
        let ghost_item = if with_ghost {
            Some(Item {
                kind: ItemKind::GhostPowerUp,
                pos: pool.draw(rng)?,
            })
        } else {
            None
        };
        let fuel = Item {
            kind: ItemKind::Fuel,
            pos: pool.draw(rng)?,
        };
        let health_potion = Item {
            kind: ItemKind::HealthPotion,
            pos: pool.draw(rng)?,
        };

        Ok(Self {
            grid,
            monsters: Monsters::with_seekers(seekers),
            fuel: Some(fuel),
            health_potion: Some(health_potion),
            ghost_item,
        })
    }
}

pub struct Game {
    config: GameConfig,
    rng: GameRng,
    level: Level,
    player: Player,
    cleared: u32,
    turn: u32,
    fuel_collected: bool,
    potion_collected: bool,
    status: GameStatus,
}

impl Game {
    /// Start a new game. The first level always carries a ghost item.
    pub fn new(
        config: GameConfig,
        seed: u64,
        events: &mut Vec<GameEvent>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = rng::seeded(seed);
        let level = Level::generate(&mut rng, &config, true)?;
        let player = Player::new(Pos::new(0, 0), config.max_health);
        let mut game = Self::from_parts(config, seed, level, player, 0)?;
        game.rng = rng;
        game.place_player();
        events.push(GameEvent::LevelTrack { level: 0 });
        tracing::info!(seed, "game started");
        Ok(game)
    }

    /// Assemble a game around a prepared level. The player keeps the given
    /// position; no arrival bonus is applied.
    pub fn from_parts(
        config: GameConfig,
        seed: u64,
        level: Level,
        player: Player,
        cleared: u32,
    ) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: rng::seeded(seed),
            level,
            player,
            cleared,
            turn: 1,
            fuel_collected: false,
            potion_collected: false,
            status: GameStatus::Playing,
        })
    }

    /// Set the turn counter, which drives monster cadence.
    pub fn with_turn(mut self, turn: u32) -> Self {
        self.turn = turn;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.level.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn monsters(&self) -> &Monsters {
        &self.level.monsters
    }

    pub fn fuel(&self) -> Option<&Item> {
        self.level.fuel.as_ref()
    }

    pub fn health_potion(&self) -> Option<&Item> {
        self.level.health_potion.as_ref()
    }

    pub fn ghost_item(&self) -> Option<&Item> {
        self.level.ghost_item.as_ref()
    }

    pub fn cleared(&self) -> u32 {
        self.cleared
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn fuel_collected(&self) -> bool {
        self.fuel_collected
    }

    pub fn potion_collected(&self) -> bool {
        self.potion_collected
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn view(&self) -> GameView<'_> {
        GameView {
            grid: &self.level.grid,
            player: match self.status {
                GameStatus::Playing => Some(&self.player),
                GameStatus::Dead => None,
            },
            seekers: self.level.monsters.seekers(),
            chasers: self.level.monsters.chasers(),
            fuel: self.level.fuel.as_ref(),
            health_potion: self.level.health_potion.as_ref(),
            ghost_item: self.level.ghost_item.as_ref(),
            cleared: self.cleared,
            turn: self.turn,
            fuel_collected: self.fuel_collected,
        }
    }

    /// Run one full turn for `command`.
    ///
    /// A blocked step still counts as a turn, so monsters keep their cadence.
    pub fn apply(
        &mut self,
        command: Command,
        events: &mut Vec<GameEvent>,
    ) -> Result<TurnOutcome, GameError> {
        if self.status == GameStatus::Dead {
            return Err(GameError::PlayerDead);
        }
        let Command::Move(dir) = command;

        let cleared_before = self.cleared;
        let moved = self.move_player(dir, events)?;
        self.update_monsters(events);

        if self.player.is_dead() {
            self.status = GameStatus::Dead;
            events.push(GameEvent::PlayerDied);
            tracing::info!(
                turn = self.turn,
                cleared = self.cleared,
                health = self.player.health,
                "player died"
            );
        }
        self.turn = self.turn.wrapping_add(1);

        Ok(TurnOutcome {
            moved,
            level_cleared: self.cleared != cleared_before,
            status: self.status,
        })
    }

    fn move_player(&mut self, dir: Dir, events: &mut Vec<GameEvent>) -> Result<bool, GameError> {
        let Some(dest) = self.player.pos.step(dir) else {
            return Ok(false);
        };
        if self.level.grid.get(dest).blocks() && !self.player.ghost {
            return Ok(false);
        }
        self.player.pos = dest;

        self.collect_items(events);
        match self.level.grid.get(dest) {
            Tile::Nest => self.trigger_nest(dest, events),
            Tile::Car if self.fuel_collected => self.next_level(events)?,
            _ => {}
        }
        Ok(true)
    }

    fn collect_items(&mut self, events: &mut Vec<GameEvent>) {
        let pos = self.player.pos;
        if take_if_at(&mut self.level.fuel, pos) {
            self.fuel_collected = true;
            events.push(GameEvent::PickedUp(ItemKind::Fuel));
            tracing::info!(x = pos.x, y = pos.y, "fuel collected");
        }
        if take_if_at(&mut self.level.health_potion, pos) {
            self.potion_collected = true;
            self.player.heal_capped(self.config.potion_heal);
            events.push(GameEvent::PickedUp(ItemKind::HealthPotion));
            tracing::info!(health = self.player.health, "health potion collected");
        }
        if take_if_at(&mut self.level.ghost_item, pos) {
            self.player.ghost = true;
            events.push(GameEvent::PickedUp(ItemKind::GhostPowerUp));
            tracing::info!("ghost phase active");
        }
    }

    fn trigger_nest(&mut self, nest: Pos, events: &mut Vec<GameEvent>) {
        let limit = (self.cleared as usize).min(self.config.chaser_capacity);
        let Some(spawn) = self
            .level
            .monsters
            .spawn_chaser(&self.level.grid, self.player.pos, limit)
        else {
            return;
        };
        events.push(GameEvent::ChaserSpawned(spawn.pos));
        if let Some(hit) = spawn.hit {
            self.resolve_hit(hit, events);
        }
        if self.config.convert_nests {
            self.level.grid.set(nest, Tile::Dirt);
        }
    }

    /// Advance to the next level. The player keeps its health, is moved to
    /// the new car and receives the uncapped arrival bonus.
    fn next_level(&mut self, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        let cleared = self.cleared + 1;
        let with_ghost = cleared % self.config.ghost_interval == 0;
        // Nothing changes unless the new level could be built.
        let level = Level::generate(&mut self.rng, &self.config, with_ghost)?;

        self.cleared = cleared;
        self.fuel_collected = false;
        self.potion_collected = false;
        self.player.ghost = false;
        self.level = level;
        self.place_player();

        events.push(GameEvent::LevelCleared {
            cleared: self.cleared,
        });
        events.push(GameEvent::LevelTrack {
            level: self.cleared,
        });
        tracing::info!(
            cleared = self.cleared,
            health = self.player.health,
            ghost_item = with_ghost,
            "level cleared"
        );
        Ok(())
    }

    fn place_player(&mut self) {
        if let Some(car) = self.level.grid.car_position() {
            self.player.pos = car;
            self.player.heal_uncapped(self.config.arrival_bonus);
        }
    }

    fn update_monsters(&mut self, events: &mut Vec<GameEvent>) {
        let player = self.player.pos;
        let mut hits = Vec::new();
        if self.turn % self.config.seeker_cadence == 0 {
            hits.extend(self.level.monsters.seeker_phase(&self.level.grid, player));
        }
        if self.turn % self.config.chaser_cadence == 0 {
            hits.extend(self.level.monsters.chaser_phase(&self.level.grid, player));
        }
        for hit in hits {
            self.resolve_hit(hit, events);
        }
    }

    fn resolve_hit(&mut self, hit: Hit, events: &mut Vec<GameEvent>) {
        let damage = match hit.kind {
            MonsterKind::Seeker => {
                events.push(GameEvent::HitEffect);
                self.config.seeker_damage
            }
            MonsterKind::Chaser => self.config.chaser_damage,
        };
        self.player.damage(damage);
        tracing::debug!(
            kind = ?hit.kind,
            contact = hit.contact,
            damage,
            health = self.player.health,
            "player hit"
        );
    }
}

fn take_if_at(slot: &mut Option<Item>, pos: Pos) -> bool {
    if slot.map_or(false, |item| item.pos == pos) {
        *slot = None;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Monster;
    use crate::tile::{GRID_H, GRID_W};

    fn open_level() -> Level {
        Level {
            grid: Grid::filled(Tile::Grass),
            monsters: Monsters::new(),
            fuel: None,
            health_potion: None,
            ghost_item: None,
        }
    }

    fn game_at(level: Level, pos: Pos) -> Game {
        let player = Player::new(pos, 100);
        Game::from_parts(GameConfig::default(), 1, level, player, 0).unwrap()
    }

    #[test]
    fn wall_blocks_player_but_still_costs_a_turn() {
        let mut level = open_level();
        level.grid.set(Pos::new(5, 4), Tile::Wall);
        let mut game = game_at(level, Pos::new(5, 5));
        let mut events = Vec::new();
        let outcome = game.apply(Command::Move(Dir::Up), &mut events).unwrap();
        assert!(!outcome.moved);
        assert_eq!(game.player().pos, Pos::new(5, 5));
        assert_eq!(game.turn(), 2);
    }

    #[test]
    fn grid_edge_blocks_even_in_ghost_phase() {
        let mut game = game_at(open_level(), Pos::new(0, 0));
        game.player.ghost = true;
        let mut events = Vec::new();
        let outcome = game.apply(Command::Move(Dir::Left), &mut events).unwrap();
        assert!(!outcome.moved);
        assert_eq!(game.player().pos, Pos::new(0, 0));
    }

    #[test]
    fn ghost_phase_walks_through_walls() {
        let mut level = open_level();
        level.grid.set(Pos::new(6, 5), Tile::Wall);
        level.ghost_item = Some(Item {
            kind: ItemKind::GhostPowerUp,
            pos: Pos::new(5, 6),
        });
        let mut game = game_at(level, Pos::new(5, 5));
        let mut events = Vec::new();

        game.apply(Command::Move(Dir::Down), &mut events).unwrap();
        assert!(game.player().ghost);
        assert!(game.ghost_item().is_none());
        assert!(events.contains(&GameEvent::PickedUp(ItemKind::GhostPowerUp)));

        game.apply(Command::Move(Dir::Up), &mut events).unwrap();
        let outcome = game.apply(Command::Move(Dir::Right), &mut events).unwrap();
        assert!(outcome.moved);
        assert_eq!(game.player().pos, Pos::new(6, 5));
    }

    #[test]
    fn nest_spawns_chaser_only_after_a_clear() {
        let mut level = open_level();
        level.grid.set(Pos::new(5, 6), Tile::Nest);
        let mut game = game_at(level.clone(), Pos::new(5, 5));
        let mut events = Vec::new();
        game.apply(Command::Move(Dir::Down), &mut events).unwrap();
        assert_eq!(game.monsters().live_chasers(), 0);

        let player = Player::new(Pos::new(5, 5), 100);
        let mut game = Game::from_parts(GameConfig::default(), 1, level, player, 1).unwrap();
        game.apply(Command::Move(Dir::Down), &mut events).unwrap();
        assert_eq!(game.monsters().live_chasers(), 1);
        assert_eq!(game.monsters().chasers()[0].pos, Pos::new(5, 7));
        assert!(events.contains(&GameEvent::ChaserSpawned(Pos::new(5, 7))));
        // Nest stays a nest unless conversion is enabled.
        assert_eq!(game.grid().get(Pos::new(5, 6)), Tile::Nest);
    }

    #[test]
    fn chaser_capacity_caps_spawns_above_the_clear_count() {
        let mut level = open_level();
        level.grid.set(Pos::new(5, 6), Tile::Nest);
        let config = GameConfig {
            chaser_capacity: 1,
            ..GameConfig::default()
        };
        let player = Player::new(Pos::new(5, 5), 100);
        let mut game = Game::from_parts(config, 1, level, player, 5).unwrap();
        let mut events = Vec::new();
        for _ in 0..3 {
            game.apply(Command::Move(Dir::Down), &mut events).unwrap();
            game.apply(Command::Move(Dir::Up), &mut events).unwrap();
        }
        assert_eq!(game.monsters().live_chasers(), 1);
        let spawned = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ChaserSpawned(_)))
            .count();
        assert_eq!(spawned, 1);
    }

    #[test]
    fn from_parts_rejects_invalid_config() {
        let config = GameConfig {
            seeker_cadence: 0,
            ..GameConfig::default()
        };
        let player = Player::new(Pos::new(5, 5), 100);
        let result = Game::from_parts(config, 1, open_level(), player, 0);
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn failed_transition_leaves_the_level_untouched() {
        let mut level = open_level();
        level.grid.set(Pos::new(6, 5), Tile::Car);
        level.fuel = Some(Item {
            kind: ItemKind::Fuel,
            pos: Pos::new(5, 4),
        });
        let player = Player::new(Pos::new(5, 5), 100);
        let mut game = Game::from_parts(GameConfig::default(), 1, level, player, 0).unwrap();
        let mut events = Vec::new();
        game.apply(Command::Move(Dir::Up), &mut events).unwrap();
        game.apply(Command::Move(Dir::Down), &mut events).unwrap();
        assert!(game.fuel_collected());

        // No generated grid can hold this many seekers.
        game.config.seeker_count = GRID_W * GRID_H;
        let result = game.apply(Command::Move(Dir::Right), &mut events);
        assert!(matches!(result, Err(GameError::SpawnPoolExhausted { .. })));
        assert_eq!(game.cleared(), 0);
        assert!(game.fuel_collected());
        assert_eq!(game.grid().get(Pos::new(6, 5)), Tile::Car);
        assert_eq!(game.grid().count(Tile::Grass), GRID_W * GRID_H - 1);
    }

    #[test]
    fn nest_converts_to_dirt_when_enabled() {
        let mut level = open_level();
        level.grid.set(Pos::new(5, 6), Tile::Nest);
        let config = GameConfig {
            convert_nests: true,
            ..GameConfig::default()
        };
        let player = Player::new(Pos::new(5, 5), 100);
        let mut game = Game::from_parts(config, 1, level, player, 2).unwrap();
        let mut events = Vec::new();
        game.apply(Command::Move(Dir::Down), &mut events).unwrap();
        assert_eq!(game.monsters().live_chasers(), 1);
        assert_eq!(game.grid().get(Pos::new(5, 6)), Tile::Dirt);
    }

    #[test]
    fn seekers_act_on_every_fifth_turn() {
        let mut level = open_level();
        level.monsters = Monsters::with_seekers([Pos::new(10, 5)]);
        let mut game = game_at(level, Pos::new(2, 5));
        let mut events = Vec::new();
        for _ in 0..4 {
            game.apply(Command::Move(Dir::Up), &mut events).unwrap();
            assert_eq!(game.monsters().seekers()[0].pos, Pos::new(10, 5));
        }
        game.apply(Command::Move(Dir::Up), &mut events).unwrap();
        assert_eq!(game.monsters().seekers()[0].pos, Pos::new(9, 5));
    }

    #[test]
    fn seeker_melee_deals_ten_and_rings() {
        let mut level = open_level();
        level.monsters = Monsters::with_seekers([Pos::new(6, 4)]);
        let mut game = game_at(level, Pos::new(5, 5)).with_turn(5);
        let mut events = Vec::new();
        game.apply(Command::Move(Dir::Up), &mut events).unwrap();
        assert_eq!(game.player().health, 90);
        assert_eq!(game.monsters().seekers()[0].pos, Pos::new(6, 4));
        assert_eq!(events, vec![GameEvent::HitEffect]);
    }

    #[test]
    fn chaser_melee_is_silent() {
        let mut level = open_level();
        level
            .monsters
            .push(Monster::new(MonsterKind::Chaser, Pos::new(5, 3)));
        let mut game = game_at(level, Pos::new(5, 5)).with_turn(2);
        let mut events = Vec::new();
        game.apply(Command::Move(Dir::Up), &mut events).unwrap();
        assert_eq!(game.player().health, 80);
        assert!(events.is_empty());
    }

    #[test]
    fn commands_after_death_are_rejected() {
        let mut level = open_level();
        level
            .monsters
            .push(Monster::new(MonsterKind::Chaser, Pos::new(5, 3)));
        let mut player = Player::new(Pos::new(5, 5), 100);
        player.health = 20;
        let mut game = Game::from_parts(GameConfig::default(), 1, level, player, 0)
            .unwrap()
            .with_turn(2);
        let mut events = Vec::new();
        let outcome = game.apply(Command::Move(Dir::Up), &mut events).unwrap();
        assert_eq!(outcome.status, GameStatus::Dead);
        assert!(game.view().player.is_none());
        assert_eq!(
            game.apply(Command::Move(Dir::Up), &mut events),
            Err(GameError::PlayerDead)
        );
    }
}
