use crate::tile::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell by a signed offset, `None` when it leaves the grid.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Pos> {
        let nx = self.x as isize + dx;
        let ny = self.y as isize + dy;
        if Grid::in_bounds(nx, ny) {
            Some(Pos::new(nx as usize, ny as usize))
        } else {
            None
        }
    }

    pub fn step(self, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    pub fn on_edge(self, width: usize, height: usize) -> bool {
        self.x == 0 || self.y == 0 || self.x + 1 == width || self.y + 1 == height
    }
}

/// The four movement commands. `Up` decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub pos: Pos,
    pub health: i32,
    pub max_health: i32,
    /// Ghost-phase: walls do not block the player until the next level.
    pub ghost: bool,
}

impl Player {
    pub fn new(pos: Pos, max_health: i32) -> Self {
        Self {
            pos,
            health: max_health,
            max_health,
            ghost: false,
        }
    }

    pub fn damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    /// Heal without crossing the declared maximum. Health already above the
    /// maximum is left as is.
    pub fn heal_capped(&mut self, amount: i32) {
        if self.health < self.max_health {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    /// Heal ignoring the maximum (arrival bonus at the car).
    pub fn heal_uncapped(&mut self, amount: i32) {
        self.health += amount;
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonsterKind {
    Seeker,
    Chaser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monster {
    pub kind: MonsterKind,
    pub pos: Pos,
    pub alive: bool,
}

impl Monster {
    pub fn new(kind: MonsterKind, pos: Pos) -> Self {
        Self {
            kind,
            pos,
            alive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Fuel,
    HealthPotion,
    GhostPowerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Pos,
}
