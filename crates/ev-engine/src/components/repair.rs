use ev_types::{Bounds, EvRng, EvResult};
use rand::Rng;

use super::unknown_component;

/// How a variable that left its bounds is brought back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// Resample uniformly inside the bounds.
    Random,
    /// Move to the opposite bound.
    Round,
    /// Clamp to the violated bound.
    Bounds,
}

impl RepairStrategy {
    pub fn from_name(name: &str) -> EvResult<Self> {
        match name {
            "random" => Ok(Self::Random),
            "round" => Ok(Self::Round),
            "bounds" => Ok(Self::Bounds),
            other => Err(unknown_component("repair strategy", other)),
        }
    }

    pub fn repair(&self, value: f64, bounds: &Bounds, rng: &mut EvRng) -> f64 {
        if bounds.contains(value) {
            return value;
        }
        match self {
            Self::Random => bounds.lower + rng.gen::<f64>() * bounds.width(),
            Self::Round => {
                if value < bounds.lower {
                    bounds.upper
                } else {
                    bounds.lower
                }
            }
            Self::Bounds => bounds.clamp(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_types::seeded_rng;

    #[test]
    fn test_repairs() {
        let bounds = Bounds::new(0.0, 1.0);
        let mut rng = seeded_rng(3);
        assert_eq!(RepairStrategy::Bounds.repair(1.7, &bounds, &mut rng), 1.0);
        assert_eq!(RepairStrategy::Round.repair(-0.2, &bounds, &mut rng), 1.0);
        assert_eq!(RepairStrategy::Round.repair(0.4, &bounds, &mut rng), 0.4);
        let random = RepairStrategy::Random.repair(3.0, &bounds, &mut rng);
        assert!(bounds.contains(random));
        assert!(RepairStrategy::from_name("wrap").is_err());
    }
}
