use crate::ant::AntId;

/// Cell coordinate on the toroidal lattice. Ordered row-major (y, then x) so
/// coordinate ties in movement decisions resolve the same way every run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

/// The 8 neighbour offsets in row-major order.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Bounded toroidal lattice owning the ant occupancy index. Multiple ants
/// may share a cell; movement is never blocked.
///
/// Coordinates handed to mutating methods must come from this grid's own
/// wrapping/neighbour queries; out-of-range input is a programming error
/// and panics rather than being clamped.
#[derive(Clone, Debug)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    occupants: Vec<Vec<AntId>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            occupants: vec![Vec::new(); width * height],
        }
    }

    fn index(&self, coord: Coord) -> usize {
        assert!(
            (coord.x as usize) < self.width && (coord.y as usize) < self.height,
            "coordinate ({}, {}) out of range for {}x{} grid",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        coord.y as usize * self.width + coord.x as usize
    }

    /// Wrap arbitrary integer coordinates onto the torus.
    pub fn wrap(&self, x: i64, y: i64) -> Coord {
        Coord {
            x: x.rem_euclid(self.width as i64) as u16,
            y: y.rem_euclid(self.height as i64) as u16,
        }
    }

    /// All cells within Chebyshev `radius` of `coord`, centre excluded,
    /// in row-major order with toroidal wrapping.
    pub fn neighbours(&self, coord: Coord, radius: u32) -> Vec<Coord> {
        let r = radius as i64;
        let mut out = Vec::with_capacity(((2 * r + 1) * (2 * r + 1) - 1) as usize);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                out.push(self.wrap(coord.x as i64 + dx, coord.y as i64 + dy));
            }
        }
        out
    }

    /// The 8 immediately adjacent cells, offset order fixed by
    /// `NEIGHBOUR_OFFSETS`.
    pub fn adjacent(&self, coord: Coord) -> [Coord; 8] {
        NEIGHBOUR_OFFSETS
            .map(|(dx, dy)| self.wrap(coord.x as i64 + dx as i64, coord.y as i64 + dy as i64))
    }

    pub fn occupants_at(&self, coord: Coord) -> &[AntId] {
        &self.occupants[self.index(coord)]
    }

    pub fn insert(&mut self, id: AntId, coord: Coord) {
        let idx = self.index(coord);
        let cell = &mut self.occupants[idx];
        match cell.binary_search(&id) {
            Ok(_) => panic!("ant {id:?} already present at ({}, {})", coord.x, coord.y),
            Err(pos) => cell.insert(pos, id),
        }
    }

    pub fn remove(&mut self, id: AntId, coord: Coord) {
        let idx = self.index(coord);
        let cell = &mut self.occupants[idx];
        match cell.binary_search(&id) {
            Ok(pos) => {
                cell.remove(pos);
            }
            Err(_) => panic!("ant {id:?} missing from its indexed cell ({}, {})", coord.x, coord.y),
        }
    }

    /// Relocate one ant. Never blocked under the default multi-occupancy
    /// policy; both coordinates must be in range.
    pub fn move_to(&mut self, id: AntId, from: Coord, to: Coord) {
        if from == to {
            return;
        }
        self.remove(id, from);
        self.insert(id, to);
    }

    /// Signed per-axis displacement from `from` to `to` along the shortest
    /// wrapped path.
    pub fn toroidal_delta(&self, from: Coord, to: Coord) -> (i32, i32) {
        let half_w = (self.width / 2) as i64;
        let half_h = (self.height / 2) as i64;
        let mut dx = to.x as i64 - from.x as i64;
        let mut dy = to.y as i64 - from.y as i64;
        if dx > half_w {
            dx -= self.width as i64;
        } else if dx < -half_w {
            dx += self.width as i64;
        }
        if dy > half_h {
            dy -= self.height as i64;
        } else if dy < -half_h {
            dy += self.height as i64;
        }
        (dx as i32, dy as i32)
    }

    /// One-cell step from `from` toward `to` along the shortest wrapped
    /// vector. Returns `from` when already there.
    pub fn toroidal_step(&self, from: Coord, to: Coord) -> Coord {
        let (dx, dy) = self.toroidal_delta(from, to);
        self.wrap(
            from.x as i64 + dx.signum() as i64,
            from.y as i64 + dy.signum() as i64,
        )
    }

    pub fn toroidal_manhattan(&self, a: Coord, b: Coord) -> u32 {
        let (dx, dy) = self.toroidal_delta(a, b);
        dx.unsigned_abs() + dy.unsigned_abs()
    }

    /// Iterate occupied cells with their occupants, row-major.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Coord, &[AntId])> + '_ {
        self.occupants.iter().enumerate().filter_map(|(i, ids)| {
            if ids.is_empty() {
                None
            } else {
                let coord = Coord {
                    x: (i % self.width) as u16,
                    y: (i / self.width) as u16,
                };
                Some((coord, ids.as_slice()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_wrap_and_keep_row_major_order() {
        let grid = Grid::new(8, 8);
        let n = grid.neighbours(Coord::new(0, 0), 1);
        assert_eq!(
            n,
            vec![
                Coord::new(7, 7),
                Coord::new(0, 7),
                Coord::new(1, 7),
                Coord::new(7, 0),
                Coord::new(1, 0),
                Coord::new(7, 1),
                Coord::new(0, 1),
                Coord::new(1, 1),
            ]
        );
    }

    #[test]
    fn occupancy_tracks_moves() {
        let mut grid = Grid::new(4, 4);
        let a = AntId(1);
        let b = AntId(2);
        let cell = Coord::new(2, 2);
        grid.insert(a, cell);
        grid.insert(b, cell);
        assert_eq!(grid.occupants_at(cell), &[a, b]);

        grid.move_to(a, cell, Coord::new(3, 2));
        assert_eq!(grid.occupants_at(cell), &[b]);
        assert_eq!(grid.occupants_at(Coord::new(3, 2)), &[a]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_insert_is_fatal() {
        let mut grid = Grid::new(4, 4);
        grid.insert(AntId(1), Coord::new(4, 0));
    }

    #[test]
    fn toroidal_step_takes_short_way_round() {
        let grid = Grid::new(10, 10);
        let from = Coord::new(9, 0);
        let to = Coord::new(1, 9);
        // Shortest path crosses both seams.
        assert_eq!(grid.toroidal_step(from, to), Coord::new(0, 9));
        assert_eq!(grid.toroidal_manhattan(from, to), 3);
    }

    #[test]
    fn step_at_destination_is_identity() {
        let grid = Grid::new(10, 10);
        let here = Coord::new(4, 4);
        assert_eq!(grid.toroidal_step(here, here), here);
    }
}
