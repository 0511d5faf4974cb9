//! Assembly of runnable algorithms from decoded configurations.
//!
//! A [`ConfigurableAlgorithmBuilder`] binds a family to a problem, a
//! population size and an evaluation budget. Decoding never mutates it:
//! callers take an owned instance with
//! [`create_builder_instance`](ConfigurableAlgorithmBuilder::create_builder_instance),
//! decode into an immutable [`AlgorithmConfiguration`], and build as many
//! fresh algorithms from it as they need.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ev_space::{AlgorithmConfiguration, ParameterSpace, ParameterValue};
use ev_types::{seeded_rng, BuildError, EvResult, EvRng, Problem};
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::components::Evaluation;

/// One configurable algorithm family: its parameter space plus the rules for
/// turning a configuration into a runnable algorithm.
pub trait AlgorithmFamily: Send + Sync {
    fn name(&self) -> &str;

    fn parameter_space(&self) -> &Arc<ParameterSpace>;

    /// Records every runtime-derived value the active parameters need.
    fn inject_non_configurables(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &mut BuildContext,
    ) -> EvResult<()>;

    fn assemble(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &BuildContext,
    ) -> EvResult<Box<dyn Algorithm>>;
}

/// Problem-derived values and injected non-configurable parameters for one
/// build.
pub struct BuildContext {
    pub problem: Arc<dyn Problem>,
    pub population_size: usize,
    pub max_evaluations: usize,
    pub seed: u64,
    pub weight_vector_directory: Option<PathBuf>,
    pub evaluation_threads: usize,
    injected: HashMap<(String, String), ParameterValue>,
}

impl BuildContext {
    pub fn new(problem: Arc<dyn Problem>, population_size: usize, max_evaluations: usize) -> Self {
        Self {
            problem,
            population_size,
            max_evaluations,
            seed: 0,
            weight_vector_directory: None,
            evaluation_threads: 1,
            injected: HashMap::new(),
        }
    }

    pub fn inject(&mut self, owner: &str, name: &str, value: impl Into<ParameterValue>) {
        self.injected
            .insert((owner.to_string(), name.to_string()), value.into());
    }

    pub fn is_injected(&self, owner: &str, name: &str) -> bool {
        self.injected
            .contains_key(&(owner.to_string(), name.to_string()))
    }

    /// An injected value. Absence is an internal consistency failure.
    pub fn non_configurable(&self, owner: &str, name: &str) -> EvResult<&ParameterValue> {
        self.injected
            .get(&(owner.to_string(), name.to_string()))
            .ok_or_else(|| {
                BuildError::MissingNonConfigurable {
                    owner: owner.to_string(),
                    name: name.to_string(),
                }
                .into()
            })
    }

    pub fn non_configurable_usize(&self, owner: &str, name: &str) -> EvResult<usize> {
        match self.non_configurable(owner, name)? {
            ParameterValue::Int(v) if *v >= 0 => Ok(*v as usize),
            other => Err(BuildError::WrongValueKind {
                parameter: format!("{}.{}", owner, name),
                expected: "non-negative integer".to_string(),
                found: other.kind().to_string(),
            }
            .into()),
        }
    }

    pub fn rng(&self) -> EvRng {
        seeded_rng(self.seed)
    }

    /// Sequential evaluation unless the builder was given several threads.
    pub fn evaluation(&self, with_archive: bool) -> EvResult<Evaluation> {
        match (self.evaluation_threads > 1, with_archive) {
            (true, _) => Evaluation::parallel(self.evaluation_threads, with_archive),
            (false, true) => Ok(Evaluation::SequentialWithArchive),
            (false, false) => Ok(Evaluation::Sequential),
        }
    }
}

/// Binds an algorithm family to a problem and a budget.
#[derive(Clone)]
pub struct ConfigurableAlgorithmBuilder {
    family: Arc<dyn AlgorithmFamily>,
    problem: Arc<dyn Problem>,
    population_size: usize,
    max_evaluations: usize,
    seed: u64,
    weight_vector_directory: Option<PathBuf>,
    evaluation_threads: usize,
}

impl ConfigurableAlgorithmBuilder {
    pub fn new(
        family: Arc<dyn AlgorithmFamily>,
        problem: Arc<dyn Problem>,
        population_size: usize,
        max_evaluations: usize,
    ) -> Self {
        Self {
            family,
            problem,
            population_size,
            max_evaluations,
            seed: 0,
            weight_vector_directory: None,
            evaluation_threads: 1,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_weight_vector_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.weight_vector_directory = Some(directory.into());
        self
    }

    pub fn with_evaluation_threads(mut self, threads: usize) -> Self {
        self.evaluation_threads = threads.max(1);
        self
    }

    pub fn family(&self) -> &Arc<dyn AlgorithmFamily> {
        &self.family
    }

    pub fn parameter_space(&self) -> &ParameterSpace {
        self.family.parameter_space()
    }

    pub fn problem(&self) -> &Arc<dyn Problem> {
        &self.problem
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn weight_vector_directory(&self) -> Option<&Path> {
        self.weight_vector_directory.as_deref()
    }

    /// An owned copy for one evaluation.
    pub fn create_builder_instance(&self) -> Self {
        self.clone()
    }

    /// An owned copy bound to another problem and budget.
    pub fn create_builder_instance_for(&self, problem: Arc<dyn Problem>, max_evaluations: usize) -> Self {
        Self {
            problem,
            max_evaluations,
            ..self.clone()
        }
    }

    pub fn decode(self, vector: &[f64]) -> EvResult<DecodedBuilder> {
        let configuration = self.parameter_space().decode_vector(vector)?;
        Ok(DecodedBuilder {
            builder: self,
            configuration,
        })
    }

    pub fn parse<S: AsRef<str>>(self, tokens: &[S]) -> EvResult<DecodedBuilder> {
        let configuration = self.parameter_space().parse(tokens)?;
        Ok(DecodedBuilder {
            builder: self,
            configuration,
        })
    }

    /// Builds a fresh algorithm from `configuration`.
    pub fn build(&self, configuration: &AlgorithmConfiguration) -> EvResult<Box<dyn Algorithm>> {
        if configuration.family() != self.family.name() {
            return Err(BuildError::Inconsistent {
                message: format!(
                    "configuration decoded for {} cannot build {}",
                    configuration.family(),
                    self.family.name()
                ),
            }
            .into());
        }

        let mut context = BuildContext::new(
            Arc::clone(&self.problem),
            self.population_size,
            self.max_evaluations,
        );
        context.seed = self.seed;
        context.weight_vector_directory = self.weight_vector_directory.clone();
        context.evaluation_threads = self.evaluation_threads;

        self.family
            .inject_non_configurables(configuration, &mut context)?;
        for (owner, name) in self
            .parameter_space()
            .required_non_configurables(configuration)
        {
            context.non_configurable(&owner, &name)?;
        }

        debug!(
            family = self.family.name(),
            problem = self.problem.name(),
            population = self.population_size,
            max_evaluations = self.max_evaluations,
            seed = self.seed,
            "Building algorithm: {}",
            configuration
        );
        self.family.assemble(configuration, &context)
    }
}

/// A builder instance together with its decoded configuration.
pub struct DecodedBuilder {
    builder: ConfigurableAlgorithmBuilder,
    configuration: AlgorithmConfiguration,
}

impl DecodedBuilder {
    pub fn configuration(&self) -> &AlgorithmConfiguration {
        &self.configuration
    }

    pub fn into_configuration(self) -> AlgorithmConfiguration {
        self.configuration
    }

    pub fn build(self) -> EvResult<Box<dyn Algorithm>> {
        self.builder.build(&self.configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_space::Parameter;
    use ev_types::{EvError, Zdt, ZdtVariant};

    /// A family that forgets to inject what its parameter declares.
    struct Forgetful {
        space: Arc<ParameterSpace>,
    }

    impl Forgetful {
        fn new() -> Self {
            let space = ParameterSpace::new(
                "Forgetful",
                vec![Parameter::categorical("mutation", &["polynomial"]).requires("numberOfProblemVariables")],
            )
            .unwrap();
            Self {
                space: Arc::new(space),
            }
        }
    }

    impl AlgorithmFamily for Forgetful {
        fn name(&self) -> &str {
            "Forgetful"
        }

        fn parameter_space(&self) -> &Arc<ParameterSpace> {
            &self.space
        }

        fn inject_non_configurables(&self, _: &AlgorithmConfiguration, _: &mut BuildContext) -> EvResult<()> {
            Ok(())
        }

        fn assemble(&self, _: &AlgorithmConfiguration, _: &BuildContext) -> EvResult<Box<dyn Algorithm>> {
            Err(ev_types::internal_error!("unreachable in this test"))
        }
    }

    fn problem() -> Arc<dyn Problem> {
        Arc::new(Zdt::new(ZdtVariant::Zdt1, 5))
    }

    #[test]
    fn test_missing_injection_is_fatal() {
        let builder = ConfigurableAlgorithmBuilder::new(Arc::new(Forgetful::new()), problem(), 10, 100);
        let result = builder.create_builder_instance().decode(&[0.5]).unwrap().build();
        match result {
            Err(EvError::Build(BuildError::MissingNonConfigurable { owner, name })) => {
                assert_eq!(owner, "mutation");
                assert_eq!(name, "numberOfProblemVariables");
            }
            Err(other) => panic!("Expected a missing non-configurable error, got {}", other),
            Ok(_) => panic!("Expected a missing non-configurable error"),
        }
    }

    #[test]
    fn test_context_lookup() {
        let mut context = BuildContext::new(problem(), 10, 100);
        assert!(context.non_configurable_usize("variation", "offspringPopulationSize").is_err());
        context.inject("variation", "offspringPopulationSize", 20i64);
        assert!(context.is_injected("variation", "offspringPopulationSize"));
        assert_eq!(
            context.non_configurable_usize("variation", "offspringPopulationSize").unwrap(),
            20
        );
        context.inject("variation", "label", "x");
        assert!(context.non_configurable_usize("variation", "label").is_err());
    }

    #[test]
    fn test_instances_are_independent() {
        let builder = ConfigurableAlgorithmBuilder::new(Arc::new(Forgetful::new()), problem(), 10, 100);
        let other = builder.create_builder_instance_for(Arc::new(Zdt::new(ZdtVariant::Zdt2, 3)), 500);
        assert_eq!(other.max_evaluations(), 500);
        assert_eq!(other.problem().number_of_variables(), 3);
        assert_eq!(builder.max_evaluations(), 100);
        assert!(builder.decode(&[0.5, 0.5]).is_err());
    }
}
