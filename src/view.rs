use crate::entity::{Item, Monster, Player};
use crate::tile::Grid;

/// Read-only snapshot of everything a renderer draws after a turn.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub grid: &'a Grid,
    /// `None` once the player has died.
    pub player: Option<&'a Player>,
    pub seekers: &'a [Monster],
    pub chasers: &'a [Monster],
    pub fuel: Option<&'a Item>,
    pub health_potion: Option<&'a Item>,
    pub ghost_item: Option<&'a Item>,
    pub cleared: u32,
    pub turn: u32,
    pub fuel_collected: bool,
}

impl<'a> GameView<'a> {
    pub fn items(&self) -> impl Iterator<Item = &'a Item> + 'a {
        self.fuel
            .into_iter()
            .chain(self.health_potion)
            .chain(self.ghost_item)
    }
}

/// Drawing side of the shell; called once per completed turn.
pub trait Renderer {
    type Error;

    fn update(&mut self, view: &GameView<'_>) -> Result<(), Self::Error>;
}
