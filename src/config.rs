use std::str::FromStr;

use crate::error::GameError;
use crate::tile::{GRID_H, GRID_W};

const DEFAULT_SEEKER_COUNT: usize = 5;
const DEFAULT_CHASER_CAPACITY: usize = 50;
const DEFAULT_SEEKER_CADENCE: u32 = 5;
const DEFAULT_CHASER_CADENCE: u32 = 2;
const DEFAULT_SEEKER_DAMAGE: i32 = 10;
const DEFAULT_CHASER_DAMAGE: i32 = 20;
const DEFAULT_MAX_HEALTH: i32 = 100;
const DEFAULT_POTION_HEAL: i32 = 20;
const DEFAULT_ARRIVAL_BONUS: i32 = 30;
const DEFAULT_GHOST_INTERVAL: u32 = 3;
const DEFAULT_WALL_CAP: usize = 100;

/// Items drawn from the spawn pool besides seekers: fuel, potion, ghost.
const ITEM_DRAWS: usize = 3;

/// Gameplay tunables. Caps that used to be array sizes live here as limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub seeker_count: usize,
    pub chaser_capacity: usize,
    pub seeker_cadence: u32,
    pub chaser_cadence: u32,
    pub seeker_damage: i32,
    pub chaser_damage: i32,
    pub max_health: i32,
    pub potion_heal: i32,
    pub arrival_bonus: i32,
    pub ghost_interval: u32,
    pub wall_cap: usize,
    /// Turn a nest into dirt once it has produced a chaser.
    pub convert_nests: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seeker_count: DEFAULT_SEEKER_COUNT,
            chaser_capacity: DEFAULT_CHASER_CAPACITY,
            seeker_cadence: DEFAULT_SEEKER_CADENCE,
            chaser_cadence: DEFAULT_CHASER_CADENCE,
            seeker_damage: DEFAULT_SEEKER_DAMAGE,
            chaser_damage: DEFAULT_CHASER_DAMAGE,
            max_health: DEFAULT_MAX_HEALTH,
            potion_heal: DEFAULT_POTION_HEAL,
            arrival_bonus: DEFAULT_ARRIVAL_BONUS,
            ghost_interval: DEFAULT_GHOST_INTERVAL,
            wall_cap: DEFAULT_WALL_CAP,
            convert_nests: false,
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with `ESCAPE_*` environment variables. Values that
    /// fail to parse or are zero are ignored.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            seeker_count: env_or("ESCAPE_SEEKERS", d.seeker_count),
            chaser_capacity: env_or("ESCAPE_CHASER_CAPACITY", d.chaser_capacity),
            seeker_cadence: env_or("ESCAPE_SEEKER_CADENCE", d.seeker_cadence),
            chaser_cadence: env_or("ESCAPE_CHASER_CADENCE", d.chaser_cadence),
            seeker_damage: env_or("ESCAPE_SEEKER_DAMAGE", d.seeker_damage),
            chaser_damage: env_or("ESCAPE_CHASER_DAMAGE", d.chaser_damage),
            max_health: env_or("ESCAPE_MAX_HEALTH", d.max_health),
            potion_heal: env_or("ESCAPE_POTION_HEAL", d.potion_heal),
            arrival_bonus: env_or("ESCAPE_ARRIVAL_BONUS", d.arrival_bonus),
            ghost_interval: env_or("ESCAPE_GHOST_INTERVAL", d.ghost_interval),
            wall_cap: env_or("ESCAPE_WALL_CAP", d.wall_cap),
            convert_nests: std::env::var("ESCAPE_CONVERT_NESTS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(d.convert_nests),
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.seeker_cadence == 0 || self.chaser_cadence == 0 {
            return Err(GameError::InvalidConfig("cadence must be non-zero".into()));
        }
        if self.ghost_interval == 0 {
            return Err(GameError::InvalidConfig(
                "ghost interval must be non-zero".into(),
            ));
        }
        if self.max_health <= 0 {
            return Err(GameError::InvalidConfig("max health must be positive".into()));
        }
        let amounts = [
            ("seeker damage", self.seeker_damage),
            ("chaser damage", self.chaser_damage),
            ("potion heal", self.potion_heal),
            ("arrival bonus", self.arrival_bonus),
        ];
        if let Some((name, _)) = amounts.iter().find(|(_, v)| *v < 0) {
            return Err(GameError::InvalidConfig(format!("{name} must not be negative")));
        }
        // Only counts that cannot fit even an all-open grid beside the car are
        // rejected here. The real pool depends on the drawn tiles, so a level
        // that still comes up short fails with `SpawnPoolExhausted`.
        if self.seeker_count + ITEM_DRAWS > GRID_W * GRID_H - 1 {
            return Err(GameError::InvalidConfig(format!(
                "{} seekers cannot fit the spawn pool",
                self.seeker_count
            )));
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + PartialEq + Default,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .filter(|v| *v != T::default())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_cadence_is_rejected() {
        let config = GameConfig {
            chaser_cadence: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn oversized_seeker_count_is_rejected() {
        let config = GameConfig {
            seeker_count: GRID_W * GRID_H,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let config = GameConfig {
            seeker_damage: -10,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(GameError::InvalidConfig(
                "seeker damage must not be negative".into()
            ))
        );
        let config = GameConfig {
            arrival_bonus: -1,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn seeker_count_just_inside_the_grid_passes_validation() {
        let config = GameConfig {
            seeker_count: GRID_W * GRID_H - 1 - ITEM_DRAWS,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn env_or_overlays_only_parsable_non_zero_values() {
        std::env::set_var("ESCAPE_TEST_ENV_OR_VALID", "7");
        std::env::set_var("ESCAPE_TEST_ENV_OR_BAD", "seven");
        std::env::set_var("ESCAPE_TEST_ENV_OR_ZERO", "0");
        assert_eq!(env_or("ESCAPE_TEST_ENV_OR_VALID", 3u32), 7);
        assert_eq!(env_or("ESCAPE_TEST_ENV_OR_BAD", 3u32), 3);
        assert_eq!(env_or("ESCAPE_TEST_ENV_OR_ZERO", 3u32), 3);
        assert_eq!(env_or("ESCAPE_TEST_ENV_OR_MISSING", 3u32), 3);
        assert_eq!(env_or("ESCAPE_TEST_ENV_OR_VALID", -1i32), 7);
    }
}
