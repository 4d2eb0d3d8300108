//! Turn-based simulation core for a tile-grid escape game.
//!
//! The player collects fuel on a generated 25x18 map and drives off from the
//! car to reach the next level while seekers and chasers close in. Drawing,
//! sound and input live outside the core: a shell feeds [`game::Command`]s to
//! [`game::Game::apply`], draws [`view::GameView`] snapshots and routes the
//! emitted [`event::GameEvent`]s to its audio.

pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod game;
pub mod level;
pub mod pursuit;
pub mod rng;
pub mod tile;
pub mod view;

pub use config::GameConfig;
pub use entity::{Dir, Item, ItemKind, Monster, MonsterKind, Player, Pos};
pub use error::GameError;
pub use event::{AudioNotifier, GameEvent};
pub use game::{Command, Game, GameStatus, Level, TurnOutcome};
pub use tile::{Grid, Tile, GRID_H, GRID_W};
pub use view::{GameView, Renderer};
