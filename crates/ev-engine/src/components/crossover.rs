use ev_types::{Bounds, EvRng, EvResult, Solution};
use rand::Rng;

use super::repair::RepairStrategy;
use super::unknown_component;

const EPSILON: f64 = 1.0e-14;

#[derive(Debug, Clone, PartialEq)]
pub enum CrossoverKind {
    Sbx { distribution_index: f64 },
    BlxAlpha { alpha: f64 },
    WholeArithmetic,
}

/// Two-parent, two-child real-coded crossover.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossover {
    pub kind: CrossoverKind,
    pub probability: f64,
    pub repair: RepairStrategy,
}

impl Crossover {
    pub const PARENTS: usize = 2;
    pub const CHILDREN: usize = 2;

    pub fn new(kind: CrossoverKind, probability: f64, repair: RepairStrategy) -> Self {
        Self {
            kind,
            probability,
            repair,
        }
    }

    /// The operator named `name`, reading its own parameters through `real`.
    pub fn from_name(
        name: &str,
        probability: f64,
        repair: RepairStrategy,
        real: impl Fn(&str) -> EvResult<f64>,
    ) -> EvResult<Self> {
        let kind = match name {
            "SBX" => CrossoverKind::Sbx {
                distribution_index: real("sbxDistributionIndex")?,
            },
            "BLX_ALPHA" => CrossoverKind::BlxAlpha {
                alpha: real("blxAlphaCrossoverAlphaValue")?,
            },
            "wholeArithmetic" => CrossoverKind::WholeArithmetic,
            other => return Err(unknown_component("crossover", other)),
        };
        Ok(Self::new(kind, probability, repair))
    }

    pub fn execute(
        &self,
        first: &Solution,
        second: &Solution,
        bounds: &[Bounds],
        rng: &mut EvRng,
    ) -> [Solution; 2] {
        let objectives = first.number_of_objectives();
        let mut a = first.variables.clone();
        let mut b = second.variables.clone();

        if rng.gen::<f64>() <= self.probability {
            match &self.kind {
                CrossoverKind::Sbx { distribution_index } => {
                    self.sbx(&mut a, &mut b, bounds, *distribution_index, rng)
                }
                CrossoverKind::BlxAlpha { alpha } => self.blx_alpha(&mut a, &mut b, bounds, *alpha, rng),
                CrossoverKind::WholeArithmetic => self.whole_arithmetic(&mut a, &mut b, bounds, rng),
            }
        }

        [Solution::new(a, objectives), Solution::new(b, objectives)]
    }

    fn sbx(&self, a: &mut [f64], b: &mut [f64], bounds: &[Bounds], index: f64, rng: &mut EvRng) {
        for i in 0..a.len() {
            if rng.gen::<f64>() > 0.5 || (a[i] - b[i]).abs() <= EPSILON {
                continue;
            }
            let (y1, y2) = if a[i] < b[i] { (a[i], b[i]) } else { (b[i], a[i]) };
            let (lower, upper) = (bounds[i].lower, bounds[i].upper);
            let u = rng.gen::<f64>();

            let spread = |beta: f64| {
                let alpha = 2.0 - beta.powf(-(index + 1.0));
                if u <= 1.0 / alpha {
                    (u * alpha).powf(1.0 / (index + 1.0))
                } else {
                    (1.0 / (2.0 - u * alpha)).powf(1.0 / (index + 1.0))
                }
            };

            let beta_q = spread(1.0 + 2.0 * (y1 - lower) / (y2 - y1));
            let c1 = 0.5 * ((y1 + y2) - beta_q * (y2 - y1));
            let beta_q = spread(1.0 + 2.0 * (upper - y2) / (y2 - y1));
            let c2 = 0.5 * ((y1 + y2) + beta_q * (y2 - y1));

            let c1 = self.repair.repair(c1, &bounds[i], rng);
            let c2 = self.repair.repair(c2, &bounds[i], rng);
            if rng.gen::<f64>() <= 0.5 {
                a[i] = c2;
                b[i] = c1;
            } else {
                a[i] = c1;
                b[i] = c2;
            }
        }
    }

    fn blx_alpha(&self, a: &mut [f64], b: &mut [f64], bounds: &[Bounds], alpha: f64, rng: &mut EvRng) {
        for i in 0..a.len() {
            let (min, max) = (a[i].min(b[i]), a[i].max(b[i]));
            let range = max - min;
            let low = min - alpha * range;
            let high = max + alpha * range;
            a[i] = self.repair.repair(low + rng.gen::<f64>() * (high - low), &bounds[i], rng);
            b[i] = self.repair.repair(low + rng.gen::<f64>() * (high - low), &bounds[i], rng);
        }
    }

    fn whole_arithmetic(&self, a: &mut [f64], b: &mut [f64], bounds: &[Bounds], rng: &mut EvRng) {
        let weight = rng.gen::<f64>();
        for i in 0..a.len() {
            let (x, y) = (a[i], b[i]);
            a[i] = self.repair.repair(weight * x + (1.0 - weight) * y, &bounds[i], rng);
            b[i] = self.repair.repair((1.0 - weight) * x + weight * y, &bounds[i], rng);
        }
    }
}
