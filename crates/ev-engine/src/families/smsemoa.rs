use std::sync::Arc;

use ev_space::catalogue::smsemoa_space;
use ev_space::{AlgorithmConfiguration, ParameterSpace};
use ev_types::EvResult;

use crate::algorithm::Algorithm;
use crate::builder::{AlgorithmFamily, BuildContext};
use crate::components::Replacement;

use super::nsgaii::{assemble_generational, inject_generational};

/// Steady-state SMS-EMOA: one offspring per step, the member of the worst
/// front with the least hypervolume contribution is discarded.
pub struct SmsEmoa {
    space: Arc<ParameterSpace>,
}

impl SmsEmoa {
    pub fn new() -> EvResult<Self> {
        Ok(Self {
            space: Arc::new(smsemoa_space()?),
        })
    }
}

impl AlgorithmFamily for SmsEmoa {
    fn name(&self) -> &str {
        "SMSEMOA"
    }

    fn parameter_space(&self) -> &Arc<ParameterSpace> {
        &self.space
    }

    fn inject_non_configurables(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &mut BuildContext,
    ) -> EvResult<()> {
        inject_generational(configuration, context)
    }

    fn assemble(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &BuildContext,
    ) -> EvResult<Box<dyn Algorithm>> {
        assemble_generational(
            self.name(),
            Replacement::HypervolumeContribution,
            configuration,
            context,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigurableAlgorithmBuilder;
    use ev_types::{Problem, Zdt, ZdtVariant};

    #[test]
    fn test_steady_state_run() {
        let problem: Arc<dyn Problem> = Arc::new(Zdt::new(ZdtVariant::Zdt2, 8));
        let family = SmsEmoa::new().unwrap();
        let mut vector = vec![0.3; family.parameter_space().dimension()];
        let offset = family.parameter_space().lookup("algorithmResult").unwrap().offset;
        vector[offset] = 0.0;

        let mut algorithm = ConfigurableAlgorithmBuilder::new(Arc::new(family), problem, 12, 150)
            .with_seed(5)
            .decode(&vector)
            .unwrap()
            .build()
            .unwrap();
        algorithm.run().unwrap();
        assert_eq!(algorithm.evaluations(), 150);
        assert_eq!(algorithm.result().len(), 12);
    }
}
