use crate::entity::Pos;

pub const GRID_W: usize = 25;
pub const GRID_H: usize = 18;

/// Terrain kinds a level is built from.
///
/// Only `Wall` blocks movement. `Car` is the unique entry and exit of a level,
/// `Nest` looks like dirt but spawns a chaser when the player steps on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Car,
    Dirt,
    Nest,
    Grass,
    Road,
    Wall,
}

impl Tile {
    /// Every variant that the generator draws for ordinary cells.
    pub const DRAWABLE: [Tile; 5] = [Tile::Dirt, Tile::Nest, Tile::Grass, Tile::Road, Tile::Wall];

    /// Candidates for the per-level replacement of surplus walls.
    pub const WALL_FALLBACKS: [Tile; 3] = [Tile::Grass, Tile::Dirt, Tile::Nest];

    pub fn blocks(self) -> bool {
        self == Tile::Wall
    }

    /// Tiles an item or seeker may start on.
    pub fn is_spawnable(self) -> bool {
        !matches!(self, Tile::Car | Tile::Wall | Tile::Nest)
    }
}

/// Fixed 25x18 tile grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Tile>,
}

impl Grid {
    pub fn filled(tile: Tile) -> Self {
        Self {
            cells: vec![tile; GRID_W * GRID_H],
        }
    }

    pub fn width(&self) -> usize {
        GRID_W
    }

    pub fn height(&self) -> usize {
        GRID_H
    }

    pub fn in_bounds(x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < GRID_W && (y as usize) < GRID_H
    }

    pub fn get(&self, pos: Pos) -> Tile {
        self.cells[pos.y * GRID_W + pos.x]
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        self.cells[pos.y * GRID_W + pos.x] = tile;
    }

    /// Tile at signed coordinates, `None` when off the grid.
    pub fn tile_at(&self, x: isize, y: isize) -> Option<Tile> {
        if Self::in_bounds(x, y) {
            Some(self.get(Pos::new(x as usize, y as usize)))
        } else {
            None
        }
    }

    /// Location of the car. A generated level always has exactly one.
    pub fn car_position(&self) -> Option<Pos> {
        self.positions().find(|p| self.get(*p) == Tile::Car)
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|t| **t == tile).count()
    }

    /// All coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        (0..GRID_H).flat_map(|y| (0..GRID_W).map(move |x| Pos::new(x, y)))
    }
}
