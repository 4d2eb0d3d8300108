use crate::entity::{ItemKind, Pos};

/// Notifications emitted by the simulation for the surrounding shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Start background music for this level (0 is the first level).
    LevelTrack { level: u32 },
    /// A seeker struck the player.
    HitEffect,
    PickedUp(ItemKind),
    ChaserSpawned(Pos),
    LevelCleared { cleared: u32 },
    PlayerDied,
}

/// Audio side of the shell. Both calls are fire-and-forget.
pub trait AudioNotifier {
    fn play_level_track(&mut self, level: u32);
    fn play_hit_effect(&mut self);
}

/// Route the audio-relevant events of one turn to `audio`.
pub fn dispatch_audio(events: &[GameEvent], audio: &mut impl AudioNotifier) {
    for event in events {
        match event {
            GameEvent::LevelTrack { level } => audio.play_level_track(*level),
            GameEvent::HitEffect => audio.play_hit_effect(),
            _ => {}
        }
    }
}
