//! Monster pursuit: single-axis steps toward the player, melee hits, and
//! chaser spawning next to the player.

use crate::entity::{Monster, MonsterKind, Pos};
use crate::tile::{Grid, Tile};

/// Neighbours tried, in order, when a nest produces a chaser: down, up,
/// right, left, then the diagonals.
const SPAWN_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Cardinal cells tried when a fresh chaser lands somewhere it cannot stay.
const RELOCATE_OFFSETS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(Pos),
    /// The chosen cell held the player; the monster stays and strikes.
    Attacked,
    Stayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub kind: MonsterKind,
    /// Damage from already sharing the player's cell rather than a melee step.
    pub contact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaserSpawn {
    pub pos: Pos,
    pub hit: Option<Hit>,
}

/// Live seekers and chasers of the current level.
#[derive(Debug, Clone, Default)]
pub struct Monsters {
    seekers: Vec<Monster>,
    chasers: Vec<Monster>,
}

impl Monsters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seekers(positions: impl IntoIterator<Item = Pos>) -> Self {
        Self {
            seekers: positions
                .into_iter()
                .map(|p| Monster::new(MonsterKind::Seeker, p))
                .collect(),
            chasers: Vec::new(),
        }
    }

    pub fn push(&mut self, monster: Monster) {
        match monster.kind {
            MonsterKind::Seeker => self.seekers.push(monster),
            MonsterKind::Chaser => self.chasers.push(monster),
        }
    }

    pub fn seekers(&self) -> &[Monster] {
        &self.seekers
    }

    pub fn chasers(&self) -> &[Monster] {
        &self.chasers
    }

    pub fn live_chasers(&self) -> usize {
        self.chasers.iter().filter(|m| m.alive).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Monster> {
        self.seekers.iter().chain(self.chasers.iter())
    }

    /// Whether any live seeker or chaser stands on `pos`.
    pub fn occupied(&self, pos: Pos) -> bool {
        self.iter().any(|m| m.alive && m.pos == pos)
    }

    /// Move every live seeker once, in order. A seeker already sharing the
    /// player's cell deals contact damage before it steps.
    pub fn seeker_phase(&mut self, grid: &Grid, player: Pos) -> Vec<Hit> {
        let mut hits = Vec::new();
        for idx in 0..self.seekers.len() {
            if !self.seekers[idx].alive {
                continue;
            }
            if self.seekers[idx].pos == player {
                hits.push(Hit {
                    kind: MonsterKind::Seeker,
                    contact: true,
                });
            }
            let step = pursuit_step(grid, self, self.seekers[idx].pos, player);
            if let Some(hit) = self.apply(MonsterKind::Seeker, idx, step) {
                hits.push(hit);
            }
        }
        hits
    }

    /// Move every live chaser once, in order.
    pub fn chaser_phase(&mut self, grid: &Grid, player: Pos) -> Vec<Hit> {
        let mut hits = Vec::new();
        for idx in 0..self.chasers.len() {
            if !self.chasers[idx].alive {
                continue;
            }
            let step = pursuit_step(grid, self, self.chasers[idx].pos, player);
            if let Some(hit) = self.apply(MonsterKind::Chaser, idx, step) {
                hits.push(hit);
            }
        }
        hits
    }

    fn apply(&mut self, kind: MonsterKind, idx: usize, step: Step) -> Option<Hit> {
        let monster = match kind {
            MonsterKind::Seeker => &mut self.seekers[idx],
            MonsterKind::Chaser => &mut self.chasers[idx],
        };
        match step {
            Step::Moved(pos) => {
                monster.pos = pos;
                None
            }
            Step::Attacked => Some(Hit {
                kind,
                contact: false,
            }),
            Step::Stayed => None,
        }
    }

    /// Place a chaser next to a player standing on a nest.
    ///
    /// Nothing spawns when the player is on the grid edge or `limit` live
    /// chasers already exist. The chaser goes to the first in-bounds non-wall
    /// neighbour in spawn order; if that cell is the car or another monster,
    /// it is shifted to a free cardinal neighbour, or takes a pursuit step when
    /// none is free.
    pub fn spawn_chaser(&mut self, grid: &Grid, player: Pos, limit: usize) -> Option<ChaserSpawn> {
        if self.live_chasers() >= limit || player.on_edge(grid.width(), grid.height()) {
            return None;
        }
        let pos = SPAWN_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| player.offset(dx, dy))
            .find(|p| !grid.get(*p).blocks())?;

        let needs_relocation = grid.get(pos) == Tile::Car || self.occupied(pos);
        self.chasers.push(Monster::new(MonsterKind::Chaser, pos));
        let idx = self.chasers.len() - 1;

        let mut hit = None;
        if needs_relocation {
            let free = RELOCATE_OFFSETS
                .iter()
                .filter_map(|&(dx, dy)| pos.offset(dx, dy))
                .find(|p| {
                    !matches!(grid.get(*p), Tile::Wall | Tile::Car)
                        && *p != player
                        && !self.occupied(*p)
                });
            match free {
                Some(free) => self.chasers[idx].pos = free,
                None => {
                    let step = pursuit_step(grid, self, pos, player);
                    hit = self.apply(MonsterKind::Chaser, idx, step);
                }
            }
        }

        let pos = self.chasers[idx].pos;
        tracing::info!(x = pos.x, y = pos.y, relocated = needs_relocation, "chaser spawned");
        Some(ChaserSpawn { pos, hit })
    }
}

/// One pursuit step for a monster at `from` chasing `target`.
///
/// Candidate moves are tried in fixed order (left, right, up, down), each only
/// when it reduces the offset on its axis. The first candidate that is on the
/// grid, not a wall and not held by a live monster is chosen. If that cell is
/// the target, the monster attacks instead of moving.
pub fn pursuit_step(grid: &Grid, monsters: &Monsters, from: Pos, target: Pos) -> Step {
    let candidates = [
        (from.x > target.x, (-1, 0)),
        (from.x < target.x, (1, 0)),
        (from.y > target.y, (0, -1)),
        (from.y < target.y, (0, 1)),
    ];
    let chosen = candidates
        .iter()
        .filter(|(wanted, _)| *wanted)
        .filter_map(|&(_, (dx, dy))| from.offset(dx, dy))
        .find(|p| !grid.get(*p).blocks() && !monsters.occupied(*p));

    match chosen {
        Some(p) if p == target => Step::Attacked,
        Some(p) => Step::Moved(p),
        None => Step::Stayed,
    }
}
