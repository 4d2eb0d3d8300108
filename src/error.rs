#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Commands are rejected once the player has died.
    #[error("player is dead")]
    PlayerDead,

    #[error("spawn pool exhausted: requested {requested}, {remaining} remaining")]
    SpawnPoolExhausted { requested: usize, remaining: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
