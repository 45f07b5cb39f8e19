use crate::config::SimConfig;
use crate::grid::Coord;
use serde::{Deserialize, Serialize};

/// The three trail purposes each tribe maintains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PheromoneKind {
    Home,
    Resource,
    War,
}

impl PheromoneKind {
    pub const ALL: [PheromoneKind; 3] =
        [PheromoneKind::Home, PheromoneKind::Resource, PheromoneKind::War];
}

/// Saturation ceiling for resource and war trails; the rendering layer
/// maps [0, MAX_LEVEL] onto its colour ramp for those kinds. Home trails
/// are uncapped and accumulate freely.
pub const MAX_LEVEL: f64 = 1.0;

/// Levels below this are snapped to zero during evaporation so stale
/// trails vanish instead of lingering asymptotically.
const SNAP_TO_ZERO: f64 = 1e-4;

/// Dense scalar trail field over the grid. One per (tribe, kind).
///
/// Values are always finite, >= 0 and at most the field's cap; a
/// non-finite or negative deposit is a programming error.
#[derive(Clone, Debug)]
pub struct PheromoneField {
    width: usize,
    height: usize,
    cap: f64,
    data: Vec<f64>,
    // Diffusion scratch, allocated once and swapped, never per-tick.
    buffer: Vec<f64>,
}

impl PheromoneField {
    /// Uncapped field; deposits accumulate up to floating-point range.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_cap(width, height, f64::INFINITY)
    }

    /// Field whose deposits saturate at `cap`.
    pub fn with_cap(width: usize, height: usize, cap: f64) -> Self {
        assert!(cap > 0.0, "pheromone cap must be positive");
        Self {
            width,
            height,
            cap,
            data: vec![0.0; width * height],
            buffer: vec![0.0; width * height],
        }
    }

    fn index(&self, coord: Coord) -> usize {
        assert!(
            (coord.x as usize) < self.width && (coord.y as usize) < self.height,
            "coordinate ({}, {}) out of range for {}x{} field",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        coord.y as usize * self.width + coord.x as usize
    }

    pub fn level_at(&self, coord: Coord) -> f64 {
        self.data[self.index(coord)]
    }

    /// Add `amount` at `coord`, saturating at the field's cap (if any).
    pub fn deposit(&mut self, coord: Coord, amount: f64) {
        assert!(
            amount.is_finite() && amount >= 0.0,
            "pheromone deposit must be finite and non-negative, got {amount}"
        );
        let idx = self.index(coord);
        self.data[idx] = (self.data[idx] + amount).min(self.cap);
    }

    /// Multiply every cell by `factor` in (0, 1], snapping near-zero
    /// residue to zero.
    pub fn evaporate(&mut self, factor: f64) {
        debug_assert!((0.0..=1.0).contains(&factor) && factor > 0.0);
        for v in &mut self.data {
            *v *= factor;
            if *v < SNAP_TO_ZERO {
                *v = 0.0;
            }
        }
    }

    /// Spread `rate` of each cell's level to its 8 toroidal neighbours,
    /// cardinal directions weighted above diagonals, via double-buffer swap.
    pub fn diffuse(&mut self, rate: f64) {
        if rate <= 0.0 {
            return;
        }
        const CARDINAL_WEIGHT: f64 = 1.0;
        const DIAGONAL_WEIGHT: f64 = std::f64::consts::FRAC_1_SQRT_2;
        const TOTAL_WEIGHT: f64 = 4.0 * CARDINAL_WEIGHT + 4.0 * DIAGONAL_WEIGHT;

        self.buffer.fill(0.0);
        let (w, h) = (self.width as i64, self.height as i64);
        for y in 0..h {
            for x in 0..w {
                let idx = (y * w + x) as usize;
                let val = self.data[idx];
                if val < SNAP_TO_ZERO {
                    continue;
                }
                let spread = val * rate;
                self.buffer[idx] += val - spread;
                for (dx, dy) in crate::grid::NEIGHBOUR_OFFSETS {
                    let nx = (x + dx as i64).rem_euclid(w);
                    let ny = (y + dy as i64).rem_euclid(h);
                    let weight = if dx.abs() + dy.abs() == 1 {
                        CARDINAL_WEIGHT
                    } else {
                        DIAGONAL_WEIGHT
                    };
                    self.buffer[(ny * w + nx) as usize] += spread * weight / TOTAL_WEIGHT;
                }
            }
        }
        std::mem::swap(&mut self.data, &mut self.buffer);
    }

    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }
}

/// The home/resource/war trail triple owned by one tribe.
#[derive(Clone, Debug)]
pub struct TrailMaps {
    home: PheromoneField,
    resource: PheromoneField,
    war: PheromoneField,
}

impl TrailMaps {
    /// Home is uncapped so long-lived nest gradients keep strengthening;
    /// resource and war saturate at the render ceiling.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            home: PheromoneField::new(width, height),
            resource: PheromoneField::with_cap(width, height, MAX_LEVEL),
            war: PheromoneField::with_cap(width, height, MAX_LEVEL),
        }
    }

    pub fn field(&self, kind: PheromoneKind) -> &PheromoneField {
        match kind {
            PheromoneKind::Home => &self.home,
            PheromoneKind::Resource => &self.resource,
            PheromoneKind::War => &self.war,
        }
    }

    pub fn field_mut(&mut self, kind: PheromoneKind) -> &mut PheromoneField {
        match kind {
            PheromoneKind::Home => &mut self.home,
            PheromoneKind::Resource => &mut self.resource,
            PheromoneKind::War => &mut self.war,
        }
    }

    /// One maintenance pass: evaporate all three trails with their
    /// configured factors, then diffuse.
    pub fn maintain(&mut self, config: &SimConfig) {
        self.home.evaporate(config.home_evaporation);
        self.resource.evaporate(config.resource_evaporation);
        self.war.evaporate(config.war_evaporation);
        if config.diffusion_rate > 0.0 {
            self.home.diffuse(config.diffusion_rate);
            self.resource.diffuse(config.diffusion_rate);
            self.war.diffuse(config.diffusion_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_deposit_saturates_at_max_level() {
        let mut field = PheromoneField::with_cap(4, 4, MAX_LEVEL);
        let cell = Coord::new(1, 1);
        field.deposit(cell, 0.7);
        field.deposit(cell, 0.7);
        assert_eq!(field.level_at(cell), MAX_LEVEL);
    }

    #[test]
    fn uncapped_deposits_accumulate_past_the_render_ceiling() {
        let mut field = PheromoneField::new(4, 4);
        let cell = Coord::new(1, 1);
        field.deposit(cell, 0.7);
        field.deposit(cell, 0.7);
        assert_eq!(field.level_at(cell), 1.4);
    }

    #[test]
    fn trail_maps_cap_resource_and_war_but_not_home() {
        let mut maps = TrailMaps::new(4, 4);
        let cell = Coord::new(2, 2);
        for kind in PheromoneKind::ALL {
            maps.field_mut(kind).deposit(cell, 0.8);
            maps.field_mut(kind).deposit(cell, 0.8);
        }
        assert_eq!(maps.field(PheromoneKind::Home).level_at(cell), 1.6);
        assert_eq!(maps.field(PheromoneKind::Resource).level_at(cell), MAX_LEVEL);
        assert_eq!(maps.field(PheromoneKind::War).level_at(cell), MAX_LEVEL);
    }

    #[test]
    #[should_panic(expected = "finite and non-negative")]
    fn negative_deposit_is_fatal() {
        let mut field = PheromoneField::new(4, 4);
        field.deposit(Coord::new(0, 0), -0.1);
    }

    #[test]
    fn evaporation_decays_and_snaps_to_zero() {
        let mut field = PheromoneField::new(4, 4);
        let cell = Coord::new(2, 3);
        field.deposit(cell, 0.5);
        field.evaporate(0.5);
        assert!((field.level_at(cell) - 0.25).abs() < 1e-12);
        for _ in 0..20 {
            field.evaporate(0.5);
        }
        assert_eq!(field.level_at(cell), 0.0);
    }

    #[test]
    fn values_stay_finite_and_nonnegative() {
        let mut field = PheromoneField::with_cap(8, 8, MAX_LEVEL);
        for i in 0..64u16 {
            field.deposit(Coord::new(i % 8, i / 8), (i as f64) * 0.02);
            field.evaporate(0.9);
            field.diffuse(0.1);
        }
        assert!(field
            .values()
            .iter()
            .all(|v| v.is_finite() && (0.0..=MAX_LEVEL).contains(v)));
    }

    #[test]
    fn diffusion_spreads_without_creating_mass() {
        let mut field = PheromoneField::new(8, 8);
        let centre = Coord::new(4, 4);
        field.deposit(centre, 0.8);
        let before = field.total();
        field.diffuse(0.2);
        let after = field.total();
        assert!((before - after).abs() < 1e-9, "diffusion must conserve mass");
        assert!(field.level_at(centre) < 0.8);
        assert!(field.level_at(Coord::new(4, 3)) > 0.0);
    }
}
