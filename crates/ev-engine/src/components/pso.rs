//! Particle swarm building blocks.

use ev_types::{dominance, Bounds, Dominance, EvRng, EvResult, Solution};
use rand::Rng;

use super::archive::Archive;
use super::mutation::Mutation;
use super::ranking::crowding_distance;
use super::unknown_component;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityInitialization {
    /// All velocities start at zero.
    Default,
    /// Half the distance to a random point of the search space.
    Spso2007,
    /// Uniform in `[lower - x, upper - x]`.
    Spso2011,
}

impl VelocityInitialization {
    pub fn from_name(name: &str) -> EvResult<Self> {
        match name {
            "defaultVelocityInitialization" => Ok(Self::Default),
            "SPSO2007VelocityInitialization" => Ok(Self::Spso2007),
            "SPSO2011VelocityInitialization" => Ok(Self::Spso2011),
            other => Err(unknown_component("velocity initialization", other)),
        }
    }

    pub fn initialize(&self, swarm: &[Solution], bounds: &[Bounds], rng: &mut EvRng) -> Vec<Vec<f64>> {
        swarm
            .iter()
            .map(|particle| {
                particle
                    .variables
                    .iter()
                    .zip(bounds)
                    .map(|(x, b)| match self {
                        Self::Default => 0.0,
                        Self::Spso2007 => (b.lower + rng.gen::<f64>() * b.width() - x) / 2.0,
                        Self::Spso2011 => (b.lower - x) + rng.gen::<f64>() * b.width(),
                    })
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InertiaWeight {
    Constant(f64),
    RandomSelected { min: f64, max: f64 },
    LinearIncreasing { min: f64, max: f64, max_iterations: usize, swarm_size: usize },
    LinearDecreasing { min: f64, max: f64, max_iterations: usize, swarm_size: usize },
}

impl InertiaWeight {
    /// Weight for the step taken after `evaluations` evaluations.
    pub fn compute(&self, evaluations: usize, rng: &mut EvRng) -> f64 {
        let progress = |max_iterations: usize, swarm_size: usize| {
            let iteration = evaluations / swarm_size.max(1);
            (iteration as f64 / max_iterations.max(1) as f64).min(1.0)
        };
        match *self {
            Self::Constant(weight) => weight,
            Self::RandomSelected { min, max } => min + rng.gen::<f64>() * (max - min),
            Self::LinearIncreasing {
                min,
                max,
                max_iterations,
                swarm_size,
            } => min + (max - min) * progress(max_iterations, swarm_size),
            Self::LinearDecreasing {
                min,
                max,
                max_iterations,
                swarm_size,
            } => max - (max - min) * progress(max_iterations, swarm_size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityUpdateKind {
    Default,
    /// Constriction coefficient plus per-variable speed limits.
    Constrained,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityUpdate {
    pub kind: VelocityUpdateKind,
    pub c1: (f64, f64),
    pub c2: (f64, f64),
}

impl VelocityUpdate {
    pub fn from_name(name: &str, c1: (f64, f64), c2: (f64, f64)) -> EvResult<Self> {
        let kind = match name {
            "defaultVelocityUpdate" => VelocityUpdateKind::Default,
            "constrainedVelocityUpdate" => VelocityUpdateKind::Constrained,
            other => return Err(unknown_component("velocity update", other)),
        };
        Ok(Self { kind, c1, c2 })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &self,
        velocity: &mut [f64],
        position: &[f64],
        local_best: &[f64],
        global_best: &[f64],
        inertia: f64,
        bounds: &[Bounds],
        rng: &mut EvRng,
    ) {
        let c1 = self.c1.0 + rng.gen::<f64>() * (self.c1.1 - self.c1.0);
        let c2 = self.c2.0 + rng.gen::<f64>() * (self.c2.1 - self.c2.0);
        let chi = match self.kind {
            VelocityUpdateKind::Default => 1.0,
            VelocityUpdateKind::Constrained => constriction(c1 + c2),
        };
        for j in 0..velocity.len() {
            let r1 = rng.gen::<f64>();
            let r2 = rng.gen::<f64>();
            let v = chi
                * (inertia * velocity[j]
                    + c1 * r1 * (local_best[j] - position[j])
                    + c2 * r2 * (global_best[j] - position[j]));
            velocity[j] = match self.kind {
                VelocityUpdateKind::Default => v,
                VelocityUpdateKind::Constrained => {
                    let limit = bounds[j].width() / 2.0;
                    v.clamp(-limit, limit)
                }
            };
        }
    }
}

fn constriction(phi: f64) -> f64 {
    if phi <= 4.0 {
        1.0
    } else {
        2.0 / (2.0 - phi - (phi * phi - 4.0 * phi).sqrt()).abs()
    }
}

/// Moves a particle and damps its velocity when it hits a bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    pub lower_limit_factor: f64,
    pub upper_limit_factor: f64,
}

impl PositionUpdate {
    pub fn apply(&self, position: &mut [f64], velocity: &mut [f64], bounds: &[Bounds]) {
        for j in 0..position.len() {
            position[j] += velocity[j];
            if position[j] < bounds[j].lower {
                position[j] = bounds[j].lower;
                velocity[j] *= self.lower_limit_factor;
            } else if position[j] > bounds[j].upper {
                position[j] = bounds[j].upper;
                velocity[j] *= self.upper_limit_factor;
            }
        }
    }
}

/// Mutates every `frequency`-th particle.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyPerturbation {
    pub mutation: Mutation,
    pub frequency: usize,
}

impl FrequencyPerturbation {
    pub fn apply(&self, swarm: &mut [Solution], bounds: &[Bounds], iteration: usize, rng: &mut EvRng) {
        let frequency = self.frequency.max(1);
        for particle in swarm.iter_mut().step_by(frequency) {
            self.mutation.execute(particle, bounds, iteration, rng);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalBestSelection {
    /// Least crowded of `size` random leaders.
    Tournament { size: usize },
    Random,
}

impl GlobalBestSelection {
    pub fn from_name(name: &str, tournament_size: impl FnOnce() -> EvResult<usize>) -> EvResult<Self> {
        match name {
            "tournament" => Ok(Self::Tournament {
                size: tournament_size()?,
            }),
            "random" => Ok(Self::Random),
            other => Err(unknown_component("global best selection", other)),
        }
    }

    pub fn select<'a>(&self, leaders: &'a Archive, rng: &mut EvRng) -> Option<&'a Solution> {
        let members = leaders.solutions();
        if members.is_empty() {
            return None;
        }
        let index = match self {
            Self::Random => rng.gen_range(0..members.len()),
            Self::Tournament { size } => {
                let refs: Vec<&Solution> = members.iter().collect();
                let crowding = crowding_distance(&refs);
                let mut best = rng.gen_range(0..members.len());
                for _ in 1..(*size).max(1) {
                    let rival = rng.gen_range(0..members.len());
                    if crowding[rival] > crowding[best] {
                        best = rival;
                    }
                }
                best
            }
        };
        members.get(index)
    }
}

/// Replaces a particle's memory unless the new position is dominated by it.
pub fn update_local_best(best: &mut Solution, candidate: &Solution) {
    if dominance(&candidate.objectives, &best.objectives) != Dominance::DominatedBy {
        *best = candidate.clone();
    }
}
