use std::sync::Arc;

use ev_space::catalogue::{mopso_space, MAX_ITERATIONS, SWARM_SIZE};
use ev_space::{AlgorithmConfiguration, ParameterSpace};
use ev_types::{EvResult, EvRng, Problem, Solution};
use tracing::debug;

use crate::algorithm::{Algorithm, ResultSource};
use crate::builder::{AlgorithmFamily, BuildContext};
use crate::components::pso::{
    update_local_best, FrequencyPerturbation, GlobalBestSelection, InertiaWeight, PositionUpdate,
    VelocityInitialization, VelocityUpdate,
};
use crate::components::{Archive, ArchiveKind, Evaluation, SolutionsCreation, TerminationByEvaluations};

use super::common::{inject_mutation, mutation};
use super::unsupported;

/// Multi-objective particle swarm family.
pub struct Mopso {
    space: Arc<ParameterSpace>,
}

impl Mopso {
    pub fn new() -> EvResult<Self> {
        Ok(Self {
            space: Arc::new(mopso_space()?),
        })
    }
}

fn inertia_weight(configuration: &AlgorithmConfiguration, context: &BuildContext) -> EvResult<InertiaWeight> {
    const OWNER: &str = "inertiaWeightComputingStrategy";
    let max_iterations = || context.non_configurable_usize(OWNER, MAX_ITERATIONS);
    let swarm_size = || context.non_configurable_usize(OWNER, SWARM_SIZE);
    let min = || configuration.real("weightMin");
    let max = || configuration.real("weightMax");
    match configuration.categorical(OWNER)? {
        "constantValue" => Ok(InertiaWeight::Constant(configuration.real("weight")?)),
        "randomSelectedValue" => Ok(InertiaWeight::RandomSelected { min: min()?, max: max()? }),
        "linearIncreasingValue" => Ok(InertiaWeight::LinearIncreasing {
            min: min()?,
            max: max()?,
            max_iterations: max_iterations()?,
            swarm_size: swarm_size()?,
        }),
        "linearDecreasingValue" => Ok(InertiaWeight::LinearDecreasing {
            min: min()?,
            max: max()?,
            max_iterations: max_iterations()?,
            swarm_size: swarm_size()?,
        }),
        other => Err(unsupported(OWNER, other)),
    }
}

impl AlgorithmFamily for Mopso {
    fn name(&self) -> &str {
        "MOPSO"
    }

    fn parameter_space(&self) -> &Arc<ParameterSpace> {
        &self.space
    }

    fn inject_non_configurables(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &mut BuildContext,
    ) -> EvResult<()> {
        let swarm_size = configuration.positive("swarmSize")?;
        let max_iterations = context.max_evaluations / swarm_size;
        context.inject("inertiaWeightComputingStrategy", MAX_ITERATIONS, max_iterations as i64);
        context.inject("inertiaWeightComputingStrategy", SWARM_SIZE, swarm_size as i64);
        inject_mutation(context, max_iterations);
        Ok(())
    }

    fn assemble(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &BuildContext,
    ) -> EvResult<Box<dyn Algorithm>> {
        let swarm_size = configuration.positive("swarmSize")?;
        let leaders = Archive::new(
            ArchiveKind::from_name(configuration.categorical("leaderArchive")?)?,
            context.population_size,
        );
        let result_archive = match configuration.categorical("algorithmResult")? {
            "leaderArchive" => None,
            "unboundedArchive" => Some(Archive::unbounded()),
            other => return Err(unsupported("algorithmResult", other)),
        };

        let perturbation = match configuration.categorical("perturbation")? {
            "frequencySelectionMutationBasedPerturbation" => FrequencyPerturbation {
                mutation: mutation(configuration, context)?,
                frequency: configuration.positive("frequencyOfApplicationOfMutationOperator")?,
            },
            other => return Err(unsupported("perturbation", other)),
        };

        let velocity_update = VelocityUpdate::from_name(
            configuration.categorical("velocityUpdate")?,
            (configuration.real("c1Min")?, configuration.real("c1Max")?),
            (configuration.real("c2Min")?, configuration.real("c2Max")?),
        )?;
        let position_update = match configuration.categorical("positionUpdate")? {
            "defaultPositionUpdate" => PositionUpdate {
                lower_limit_factor: configuration.real("velocityChangeWhenLowerLimitIsReached")?,
                upper_limit_factor: configuration.real("velocityChangeWhenUpperLimitIsReached")?,
            },
            other => return Err(unsupported("positionUpdate", other)),
        };
        let global_best_selection = GlobalBestSelection::from_name(
            configuration.categorical("globalBestSelection")?,
            || configuration.positive("selectionTournamentSize"),
        )?;

        // Single-valued strategies still get checked so tokens naming
        // something else fail at build time.
        for (parameter, expected) in [
            ("localBestInitialization", "defaultLocalBestInitialization"),
            ("globalBestInitialization", "defaultGlobalBestInitialization"),
            ("globalBestUpdate", "defaultGlobalBestUpdate"),
            ("localBestUpdate", "defaultLocalBestUpdate"),
        ] {
            let value = configuration.categorical(parameter)?;
            if value != expected {
                return Err(unsupported(parameter, value));
            }
        }

        let evaluation = context.evaluation(result_archive.is_some())?;
        let inertia = inertia_weight(configuration, context)?;
        debug!(
            swarm = swarm_size,
            leaders = context.population_size,
            ?inertia,
            ?velocity_update,
            ?evaluation,
            "Assembled MOPSO"
        );

        Ok(Box::new(MopsoAlgorithm {
            problem: Arc::clone(&context.problem),
            swarm_size,
            creation: SolutionsCreation::from_name(configuration.categorical("swarmInitialization")?)?,
            velocity_initialization: VelocityInitialization::from_name(
                configuration.categorical("velocityInitialization")?,
            )?,
            inertia,
            velocity_update,
            position_update,
            perturbation,
            global_best_selection,
            evaluation,
            termination: TerminationByEvaluations::new(context.max_evaluations),
            result_source: ResultSource::from_archive(result_archive),
            rng: context.rng(),
            swarm: Vec::new(),
            velocities: Vec::new(),
            local_best: Vec::new(),
            leaders,
            evaluations: 0,
            iteration: 0,
        }))
    }
}

pub struct MopsoAlgorithm {
    problem: Arc<dyn Problem>,
    swarm_size: usize,
    creation: SolutionsCreation,
    velocity_initialization: VelocityInitialization,
    inertia: InertiaWeight,
    velocity_update: VelocityUpdate,
    position_update: PositionUpdate,
    perturbation: FrequencyPerturbation,
    global_best_selection: GlobalBestSelection,
    evaluation: Evaluation,
    termination: TerminationByEvaluations,
    result_source: ResultSource,
    rng: EvRng,
    swarm: Vec<Solution>,
    velocities: Vec<Vec<f64>>,
    local_best: Vec<Solution>,
    leaders: Archive,
    evaluations: usize,
    iteration: usize,
}

impl MopsoAlgorithm {
    fn evaluate_swarm(&mut self) -> EvResult<()> {
        let archive = self.result_source.archive_mut();
        self.evaluations += self
            .evaluation
            .evaluate(self.problem.as_ref(), &mut self.swarm, archive)?;
        for particle in &self.swarm {
            self.leaders.add(particle.clone());
        }
        Ok(())
    }

    fn move_particles(&mut self) {
        let bounds = self.problem.bounds();
        for i in 0..self.swarm.len() {
            let inertia = self.inertia.compute(self.evaluations, &mut self.rng);
            let global_best = self
                .global_best_selection
                .select(&self.leaders, &mut self.rng)
                .map(|s| s.variables.clone())
                .unwrap_or_else(|| self.local_best[i].variables.clone());
            self.velocity_update.update(
                &mut self.velocities[i],
                &self.swarm[i].variables,
                &self.local_best[i].variables,
                &global_best,
                inertia,
                bounds,
                &mut self.rng,
            );
            self.position_update
                .apply(&mut self.swarm[i].variables, &mut self.velocities[i], bounds);
        }
        self.perturbation
            .apply(&mut self.swarm, bounds, self.iteration, &mut self.rng);
    }
}

impl Algorithm for MopsoAlgorithm {
    fn name(&self) -> &str {
        "MOPSO"
    }

    fn run(&mut self) -> EvResult<()> {
        self.swarm = self
            .creation
            .create(self.problem.as_ref(), self.swarm_size, &mut self.rng);
        self.evaluate_swarm()?;
        self.velocities =
            self.velocity_initialization
                .initialize(&self.swarm, self.problem.bounds(), &mut self.rng);
        self.local_best = self.swarm.clone();

        while !self.termination.is_met(self.evaluations) {
            self.move_particles();
            self.evaluate_swarm()?;
            for (best, particle) in self.local_best.iter_mut().zip(&self.swarm) {
                update_local_best(best, particle);
            }
            self.iteration += 1;
        }

        debug!(
            problem = self.problem.name(),
            evaluations = self.evaluations,
            leaders = self.leaders.len(),
            "MOPSO run finished"
        );
        Ok(())
    }

    fn result(&self) -> Vec<Solution> {
        self.result_source.result(self.leaders.solutions())
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigurableAlgorithmBuilder;
    use ev_types::{Zdt, ZdtVariant};

    fn builder() -> ConfigurableAlgorithmBuilder {
        ConfigurableAlgorithmBuilder::new(
            Arc::new(Mopso::new().unwrap()),
            Arc::new(Zdt::new(ZdtVariant::Zdt1, 8)),
            15,
            400,
        )
        .with_seed(5)
    }

    #[test]
    fn test_leader_archive_is_bounded() {
        let dimension = Mopso::new().unwrap().parameter_space().dimension();
        let mut algorithm = builder().decode(&vec![0.3; dimension]).unwrap().build().unwrap();
        algorithm.run().unwrap();
        let result = algorithm.result();
        assert!(!result.is_empty() && result.len() <= 15);
        assert!(algorithm.evaluations() >= 400);
    }

    #[test]
    fn test_unbounded_result_and_linear_inertia() {
        let tokens = "--swarmSize 20 --leaderArchive hypervolumeArchive \
            --algorithmResult unboundedArchive --swarmInitialization random \
            --velocityInitialization SPSO2011VelocityInitialization \
            --perturbation frequencySelectionMutationBasedPerturbation \
            --mutation polynomial --mutationProbabilityFactor 1.0 \
            --mutationRepairStrategy bounds --polynomialMutationDistributionIndex 20.0 \
            --frequencyOfApplicationOfMutationOperator 3 \
            --inertiaWeightComputingStrategy linearDecreasingValue --weightMin 0.1 --weightMax 0.9 \
            --velocityUpdate constrainedVelocityUpdate --c1Min 1.5 --c1Max 2.5 --c2Min 1.5 --c2Max 2.5 \
            --localBestInitialization defaultLocalBestInitialization \
            --globalBestInitialization defaultGlobalBestInitialization \
            --globalBestSelection tournament --selectionTournamentSize 2 \
            --globalBestUpdate defaultGlobalBestUpdate --localBestUpdate defaultLocalBestUpdate \
            --positionUpdate defaultPositionUpdate \
            --velocityChangeWhenLowerLimitIsReached -1.0 --velocityChangeWhenUpperLimitIsReached -1.0";
        let tokens: Vec<&str> = tokens.split_whitespace().collect();
        let mut algorithm = builder().parse(&tokens).unwrap().build().unwrap();
        algorithm.run().unwrap();
        let result = algorithm.result();
        assert!(!result.is_empty());
        assert!(result.iter().all(|s| s.is_finite()));
        assert_eq!(algorithm.evaluations(), 400);
    }
}
