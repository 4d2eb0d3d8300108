//! Level generation and spawn placement.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::entity::Pos;
use crate::error::GameError;
use crate::tile::{Grid, Tile, GRID_H, GRID_W};

/// First row the car may be placed on; keeps it in the lower half.
const CAR_MIN_ROW: usize = GRID_H / 2;

/// Build a fresh level grid.
///
/// Cells are drawn independently, in row-major order, from every tile but
/// `Car`. Only the first road drawn survives; later roads become grass. Once
/// more than `wall_cap` walls have been drawn, further walls are replaced by a
/// fallback tile chosen once per level. Reachability of the car is not
/// checked.
pub fn generate_level(rng: &mut impl Rng, wall_cap: usize) -> Grid {
    let car = Pos::new(rng.gen_range(0..GRID_W), rng.gen_range(CAR_MIN_ROW..GRID_H));
    let fallback = *Tile::WALL_FALLBACKS
        .choose(rng)
        .unwrap_or(&Tile::Grass);

    let mut grid = Grid::filled(Tile::Grass);
    let mut roads = 0usize;
    let mut walls = 0usize;
    for y in 0..GRID_H {
        for x in 0..GRID_W {
            let pos = Pos::new(x, y);
            if pos == car {
                grid.set(pos, Tile::Car);
                continue;
            }
            let mut tile = Tile::DRAWABLE[rng.gen_range(0..Tile::DRAWABLE.len())];
            match tile {
                Tile::Road => {
                    roads += 1;
                    if roads > 1 {
                        tile = Tile::Grass;
                    }
                }
                Tile::Wall => {
                    walls += 1;
                    if walls > wall_cap {
                        tile = fallback;
                    }
                }
                _ => {}
            }
            grid.set(pos, tile);
        }
    }

    tracing::debug!(
        car_x = car.x,
        car_y = car.y,
        walls = grid.count(Tile::Wall),
        nests = grid.count(Tile::Nest),
        roads = grid.count(Tile::Road),
        ?fallback,
        "generated level"
    );
    grid
}

/// Positions still free for seekers and items on the current level.
///
/// Draws remove the chosen cell, so no two draws from one pool coincide.
#[derive(Debug, Clone)]
pub struct SpawnPool {
    cells: Vec<Pos>,
}

impl SpawnPool {
    /// Every cell that is not car, wall or nest, in row-major order.
    pub fn from_grid(grid: &Grid) -> Self {
        let cells = grid
            .positions()
            .filter(|p| grid.get(*p).is_spawnable())
            .collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    /// Remove and return one uniformly chosen candidate.
    pub fn draw(&mut self, rng: &mut impl Rng) -> Result<Pos, GameError> {
        if self.cells.is_empty() {
            return Err(GameError::SpawnPoolExhausted {
                requested: 1,
                remaining: 0,
            });
        }
        let idx = rng.gen_range(0..self.cells.len());
        Ok(self.cells.remove(idx))
    }

    pub fn draw_many(&mut self, rng: &mut impl Rng, n: usize) -> Result<Vec<Pos>, GameError> {
        if n > self.cells.len() {
            return Err(GameError::SpawnPoolExhausted {
                requested: n,
                remaining: self.cells.len(),
            });
        }
        (0..n).map(|_| self.draw(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng;
    use std::collections::HashSet;

    #[test]
    fn exactly_one_car_in_lower_half() {
        for seed in 0..200 {
            let grid = generate_level(&mut rng::seeded(seed), 100);
            assert_eq!(grid.count(Tile::Car), 1, "seed {seed}");
            let car = grid.car_position().unwrap();
            assert!(car.x < GRID_W);
            assert!((9..18).contains(&car.y), "seed {seed}: car row {}", car.y);
        }
    }

    #[test]
    fn at_most_one_road() {
        for seed in 0..200 {
            let grid = generate_level(&mut rng::seeded(seed), 100);
            assert!(grid.count(Tile::Road) <= 1, "seed {seed}");
        }
    }

    #[test]
    fn surplus_walls_become_a_single_fallback_tile() {
        // A cap of 10 is always exceeded on a 450-cell grid with 1/5 wall odds.
        for seed in 0..50 {
            let mut rng_a = rng::seeded(seed);
            let capped = generate_level(&mut rng_a, 10);
            assert_eq!(capped.count(Tile::Wall), 10, "seed {seed}");

            // Same seed without a cap draws the identical sequence, so every
            // cell that differs must be a wall replaced by the one fallback.
            let mut rng_b = rng::seeded(seed);
            let uncapped = generate_level(&mut rng_b, usize::MAX);
            let replaced: HashSet<Tile> = capped
                .positions()
                .filter(|p| capped.get(*p) != uncapped.get(*p))
                .map(|p| {
                    assert_eq!(uncapped.get(p), Tile::Wall);
                    capped.get(p)
                })
                .collect();
            assert_eq!(replaced.len(), 1, "seed {seed}: {replaced:?}");
            let fallback = replaced.into_iter().next().unwrap();
            assert!(Tile::WALL_FALLBACKS.contains(&fallback));
        }
    }

    #[test]
    fn pool_skips_blocked_tiles() {
        let grid = generate_level(&mut rng::seeded(7), 100);
        let pool = SpawnPool::from_grid(&grid);
        let blocked = grid.count(Tile::Car) + grid.count(Tile::Wall) + grid.count(Tile::Nest);
        assert_eq!(pool.len(), GRID_W * GRID_H - blocked);
        assert!(!pool.contains(grid.car_position().unwrap()));
    }

    #[test]
    fn draws_never_repeat() {
        let grid = generate_level(&mut rng::seeded(3), 100);
        let mut pool = SpawnPool::from_grid(&grid);
        let total = pool.len();
        let mut rng = rng::seeded(4);
        let drawn = pool.draw_many(&mut rng, total).unwrap();
        let unique: HashSet<Pos> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), total);
        assert!(pool.is_empty());
    }

    #[test]
    fn exhausted_pool_reports_error() {
        let mut grid = Grid::filled(Tile::Wall);
        grid.set(Pos::new(0, 0), Tile::Grass);
        let mut pool = SpawnPool::from_grid(&grid);
        let mut rng = rng::seeded(1);
        assert_eq!(
            pool.draw_many(&mut rng, 2),
            Err(GameError::SpawnPoolExhausted {
                requested: 2,
                remaining: 1
            })
        );
        assert_eq!(pool.draw(&mut rng), Ok(Pos::new(0, 0)));
        assert!(pool.draw(&mut rng).is_err());
    }
}
