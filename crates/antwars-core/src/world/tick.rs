//! One simulation tick: maintenance, agent decisions, bookkeeping.
//!
//! The agent phase reads only tick-start state and writes nothing; every
//! effect is buffered as an `AntIntent` and committed in the bookkeeping
//! phase in a fixed order. Determinism rests on three rules: ants decide
//! in ascending-id order and draw from the RNG only in that order, intents
//! commit in ascending-id order within each commit stage, and tribes act
//! in ascending-id order wherever they act at all.

use crate::ant::{Ant, AntId, AntState};
use crate::config::SimConfig;
use crate::grid::{Coord, Grid, NEIGHBOUR_OFFSETS};
use crate::pheromone::{PheromoneField, PheromoneKind};
use crate::tribe::TribeId;
use crate::world::World;
use rand::Rng;
use rayon::prelude::*;

/// Buffered outcome of one ant's decision, applied at bookkeeping.
struct AntIntent {
    id: AntId,
    tribe: TribeId,
    from: Coord,
    action: AntAction,
    /// Pheromone laid at `from` on the acting tribe's own trail map.
    deposit: Option<(PheromoneKind, f64)>,
}

enum AntAction {
    /// Stand and trade blows with the lowest-id adjacent enemy.
    Fight { target: AntId },
    /// Hand the carried load to the home tribe; only valid at the home cell.
    Deliver,
    /// Follow the home trail (or the direct fallback step) one cell.
    MoveHome { to: Coord },
    /// Move one cell and attempt a harvest at the destination.
    Forage { to: Coord, request: u32 },
}

impl World {
    /// Advance the world by one tick.
    pub fn step(&mut self) {
        self.tick_index += 1;
        self.births_last_tick = 0;
        self.deaths_last_tick = 0;

        self.maintenance_phase();
        let intents = self.agent_phase();
        self.bookkeeping_phase(intents);

        #[cfg(debug_assertions)]
        self.check_invariants();
    }

    /// Evaporate and diffuse every tribe's trails, then regrow resources.
    /// Tribes own disjoint trail maps, so they maintain in parallel without
    /// affecting the result.
    fn maintenance_phase(&mut self) {
        let config = &self.config;
        self.tribes
            .par_iter_mut()
            .for_each(|tribe| tribe.trails.maintain(config));
        self.resources.regenerate(self.config.regeneration_rate);
    }

    /// Let every live ant observe the post-maintenance world and pick one
    /// action. No world state changes here; all reads see the same frozen
    /// tick-start snapshot regardless of ant order.
    fn agent_phase(&mut self) -> Vec<AntIntent> {
        let World {
            config,
            grid,
            tribes,
            ants,
            rng,
            ..
        } = self;

        let mut intents = Vec::with_capacity(ants.len());
        for i in 0..ants.len() {
            let ant = &ants[i];
            let tribe = &tribes[ant.tribe.0 as usize];

            let action;
            let deposit;
            if let Some(target) = lowest_adjacent_enemy(ants, grid, ant.pos, ant.tribe) {
                action = AntAction::Fight { target };
                deposit = Some((PheromoneKind::War, config.war_deposit));
            } else if ant.carrying > 0 {
                if ant.pos == tribe.home {
                    action = AntAction::Deliver;
                } else {
                    let to = ascend_trail(
                        grid,
                        tribe.trails.field(PheromoneKind::Home),
                        ant.pos,
                        ant.heading,
                        config.gradient_threshold,
                    )
                    .unwrap_or_else(|| grid.toroidal_step(ant.pos, tribe.home));
                    action = AntAction::MoveHome { to };
                }
                let strength = config.resource_deposit * f64::from(ant.carrying)
                    / f64::from(config.carry_capacity);
                deposit = Some((PheromoneKind::Resource, strength));
            } else {
                let to = explore_move(
                    grid,
                    tribe.trails.field(PheromoneKind::Resource),
                    ant.pos,
                    config.gradient_threshold,
                    rng,
                );
                action = AntAction::Forage {
                    to,
                    request: config.carry_capacity,
                };
                deposit = home_trail_deposit(grid, config, ant.pos, tribe.home);
            }

            intents.push(AntIntent {
                id: ant.id,
                tribe: ant.tribe,
                from: ant.pos,
                action,
                deposit,
            });
        }
        intents
    }

    /// Commit buffered intents. Stage order is fixed: deposits, moves,
    /// harvests, deliveries, combat damage, deaths, spawns.
    fn bookkeeping_phase(&mut self, intents: Vec<AntIntent>) {
        // Deposits land on the committing tribe's own maps and only become
        // visible to sensing after the next maintenance pass.
        for intent in &intents {
            if let Some((kind, amount)) = intent.deposit {
                if amount > 0.0 {
                    self.tribes[intent.tribe.0 as usize].deposit(kind, intent.from, amount);
                }
            }
        }

        // Moves. Co-location is allowed, so no intent can invalidate another.
        for intent in &intents {
            let to = match intent.action {
                AntAction::MoveHome { to } => to,
                AntAction::Forage { to, .. } => to,
                _ => continue,
            };
            self.grid.move_to(intent.id, intent.from, to);
            let (dx, dy) = self.grid.toroidal_delta(intent.from, to);
            let idx = self.ant_index(intent.id);
            let ant = &mut self.ants[idx];
            ant.pos = to;
            if dx != 0 || dy != 0 {
                ant.heading = Some((dx.signum() as i8, dy.signum() as i8));
            }
        }

        // Harvests resolve against live cell stock in ascending-id order,
        // so two foragers on one cell split it first-id-first.
        for intent in &intents {
            let request = match intent.action {
                AntAction::Forage { request, .. } => request,
                _ => continue,
            };
            let idx = self.ant_index(intent.id);
            let pos = self.ants[idx].pos;
            let granted = self.resources.harvest(pos, request);
            let ant = &mut self.ants[idx];
            if granted > 0 {
                ant.carrying = granted;
                ant.state = AntState::ReturningWithResource;
            } else {
                ant.state = AntState::Exploring;
            }
        }

        // Deliveries: an ant hands over its load the tick it stands on its
        // home cell, whether it started there or just arrived.
        for intent in &intents {
            match intent.action {
                AntAction::MoveHome { .. } => {
                    let idx = self.ant_index(intent.id);
                    let home = self.tribes[intent.tribe.0 as usize].home;
                    if self.ants[idx].pos == home {
                        let load = self.ants[idx].carrying;
                        self.ants[idx].carrying = 0;
                        self.ants[idx].state = AntState::Exploring;
                        self.tribes[intent.tribe.0 as usize].deliver(load);
                    } else {
                        self.ants[idx].state = AntState::ReturningWithResource;
                    }
                }
                AntAction::Deliver => {
                    let idx = self.ant_index(intent.id);
                    let load = self.ants[idx].carrying;
                    self.ants[idx].carrying = 0;
                    self.ants[idx].state = AntState::Exploring;
                    self.tribes[intent.tribe.0 as usize].deliver(load);
                }
                _ => {}
            }
        }

        // Combat: every fighter lands its blow, so a mutual lethal exchange
        // kills both ants.
        let damage = self.config.combat_damage;
        for intent in &intents {
            let target = match intent.action {
                AntAction::Fight { target } => target,
                _ => continue,
            };
            let idx = self.ant_index(intent.id);
            self.ants[idx].state = AntState::Fighting;
            let target_idx = self.ant_index(target);
            let victim = &mut self.ants[target_idx];
            victim.health = victim.health.saturating_sub(damage);
        }

        let dead: Vec<(AntId, TribeId, Coord)> = self
            .ants
            .iter()
            .filter(|a| a.health == 0)
            .map(|a| (a.id, a.tribe, a.pos))
            .collect();
        for &(id, tribe, pos) in &dead {
            self.grid.remove(id, pos);
            self.tribes[tribe.0 as usize].remove(id);
        }
        self.ants.retain(|a| a.health > 0);
        self.deaths_last_tick = dead.len();
        self.total_deaths += dead.len();

        self.spawn_phase();
    }

    /// At most one new ant per tribe per tick, in ascending tribe order.
    fn spawn_phase(&mut self) {
        for tribe_idx in 0..self.tribes.len() {
            if self.ants.len() >= Self::MAX_TOTAL_ANTS {
                break;
            }
            let Some(next_id) = self.next_ant_id.checked_add(1) else {
                break;
            };
            if !self.tribes[tribe_idx].can_spawn(self.config.spawn_threshold) {
                continue;
            }
            let tribe = &mut self.tribes[tribe_idx];
            tribe.pay_spawn_cost(self.config.spawn_cost);
            let id = AntId(self.next_ant_id);
            self.next_ant_id = next_id;
            tribe.register(id);
            let home = tribe.home;
            let tribe_id = tribe.id;
            self.grid.insert(id, home);
            // Fresh ids are strictly increasing, so pushing keeps `ants`
            // sorted.
            self.ants
                .push(Ant::new(id, tribe_id, home, self.config.initial_health));
            self.births_last_tick += 1;
            self.total_births += 1;
        }
    }
}

/// Lowest-id enemy on the ant's own cell or any of the 8 adjacent cells.
fn lowest_adjacent_enemy(
    ants: &[Ant],
    grid: &Grid,
    pos: Coord,
    tribe: TribeId,
) -> Option<AntId> {
    let mut best: Option<AntId> = None;
    let mut consider = |cell: Coord| {
        for &occupant in grid.occupants_at(cell) {
            let idx = ants
                .binary_search_by_key(&occupant, |a| a.id)
                .unwrap_or_else(|_| panic!("occupant {occupant:?} not in live registry"));
            if ants[idx].tribe != tribe && best.map_or(true, |b| occupant < b) {
                best = Some(occupant);
            }
        }
    };
    consider(pos);
    for cell in grid.adjacent(pos) {
        consider(cell);
    }
    best
}

/// Steepest-ascent step over the 8 neighbours of `pos`. A neighbour is a
/// candidate only when its level beats both the current cell and the
/// sensing threshold. Ties prefer the ant's current heading, then the
/// lowest coordinate.
fn ascend_trail(
    grid: &Grid,
    field: &PheromoneField,
    pos: Coord,
    heading: Option<(i8, i8)>,
    threshold: f64,
) -> Option<Coord> {
    let here = field.level_at(pos);
    let mut best: Option<(Coord, (i8, i8), f64)> = None;
    for &(dx, dy) in &NEIGHBOUR_OFFSETS {
        let cell = grid.wrap(i64::from(pos.x) + i64::from(dx), i64::from(pos.y) + i64::from(dy));
        let level = field.level_at(cell);
        if level <= threshold || level <= here {
            continue;
        }
        let step = (dx as i8, dy as i8);
        let wins = match &best {
            None => true,
            Some((best_cell, best_step, best_level)) => {
                if level != *best_level {
                    level > *best_level
                } else {
                    let cand_heads = heading == Some(step);
                    let best_heads = heading == Some(*best_step);
                    (cand_heads && !best_heads) || (cand_heads == best_heads && cell < *best_cell)
                }
            }
        };
        if wins {
            best = Some((cell, step, level));
        }
    }
    best.map(|(cell, _, _)| cell)
}

/// Exploring move: weighted draw over neighbours whose resource-trail level
/// clears the threshold, with weight level^2 so stronger trails dominate.
/// Falls back to a uniform draw when no neighbour carries signal.
fn explore_move<R: Rng + ?Sized>(
    grid: &Grid,
    field: &PheromoneField,
    pos: Coord,
    threshold: f64,
    rng: &mut R,
) -> Coord {
    let cells = grid.adjacent(pos);
    let weights: Vec<f64> = cells
        .iter()
        .map(|&c| {
            let level = field.level_at(c);
            if level > threshold {
                level * level
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        let mut roll = rng.random::<f64>() * total;
        for (cell, weight) in cells.iter().zip(&weights) {
            roll -= weight;
            if roll <= 0.0 {
                return *cell;
            }
        }
        // Float slack can leave roll marginally positive after the last
        // nonzero weight.
        cells[cells.len() - 1]
    } else {
        cells[rng.random_range(0..cells.len())]
    }
}

/// Home pheromone for an exploring ant, scaled down linearly with toroidal
/// Manhattan distance from home and absent outside the trail radius.
fn home_trail_deposit(
    grid: &Grid,
    config: &SimConfig,
    pos: Coord,
    home: Coord,
) -> Option<(PheromoneKind, f64)> {
    let dist = grid.toroidal_manhattan(pos, home);
    if dist > config.home_trail_radius {
        return None;
    }
    let proximity = 1.0 - f64::from(dist) / f64::from(config.home_trail_radius.max(1));
    let amount = config.home_deposit * proximity;
    if amount > 0.0 {
        Some((PheromoneKind::Home, amount))
    } else {
        None
    }
}
