use std::sync::Arc;

use ev_space::catalogue::{moead_space, MATING_POOL_SIZE, OFFSPRING_POPULATION_SIZE, POPULATION_SIZE};
use ev_space::{AlgorithmConfiguration, ParameterSpace};
use ev_types::{BuildError, EvResult, EvRng, Problem, Solution};
use rand::seq::SliceRandom;
use tracing::debug;

use crate::algorithm::{Algorithm, ResultSource};
use crate::builder::{AlgorithmFamily, BuildContext};
use crate::components::neighborhood::{neighborhoods, weight_vectors};
use crate::components::{
    AggregationFunction, Archive, ArchiveKind, Evaluation, NeighborType, NeighborhoodSelection,
    ReferencePoints, SolutionsCreation, TerminationByEvaluations, Variation,
};

use super::common::{inject_mutation, mating_pool_size, variation};
use super::unsupported;

/// MOEA/D family.
pub struct Moead {
    space: Arc<ParameterSpace>,
}

impl Moead {
    pub fn new() -> EvResult<Self> {
        Ok(Self {
            space: Arc::new(moead_space()?),
        })
    }
}

impl AlgorithmFamily for Moead {
    fn name(&self) -> &str {
        "MOEAD"
    }

    fn parameter_space(&self) -> &Arc<ParameterSpace> {
        &self.space
    }

    fn inject_non_configurables(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &mut BuildContext,
    ) -> EvResult<()> {
        let population_size = context.population_size;
        context.inject("neighborhoodSize", POPULATION_SIZE, population_size as i64);
        let max_iterations = context.max_evaluations / population_size.max(1);
        inject_mutation(context, max_iterations);
        context.inject("variation", OFFSPRING_POPULATION_SIZE, 1i64);
        let pool = mating_pool_size(configuration, 1)?;
        context.inject("selection", MATING_POOL_SIZE, pool as i64);
        Ok(())
    }

    fn assemble(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &BuildContext,
    ) -> EvResult<Box<dyn Algorithm>> {
        let population_size = context.non_configurable_usize("neighborhoodSize", POPULATION_SIZE)?;
        let archive = match configuration.categorical("algorithmResult")? {
            "population" => None,
            "externalArchive" => Some(Archive::new(
                ArchiveKind::from_name(configuration.categorical("externalArchive")?)?,
                population_size,
            )),
            other => return Err(unsupported("algorithmResult", other)),
        };

        let creation = SolutionsCreation::from_name(configuration.categorical("createInitialSolutions")?)?;
        let variation = variation(configuration, context)?;
        let mating_pool_size = context.non_configurable_usize("selection", MATING_POOL_SIZE)?;
        let selection = NeighborhoodSelection {
            neighborhood_probability: configuration.real("neighborhoodSelectionProbability")?,
        };

        let weights = weight_vectors(
            context.problem.number_of_objectives(),
            population_size,
            context.weight_vector_directory.as_deref(),
        )?;
        let neighborhood_size = configuration.positive("neighborhoodSize")?.min(population_size);
        let neighborhoods = neighborhoods(&weights, neighborhood_size);

        let normalization = if configuration.boolean("normalizeObjectives")? {
            Some(configuration.real("epsilonParameterForNormalizing")?)
        } else {
            None
        };
        let aggregation = AggregationFunction::from_name(
            configuration.categorical("aggregationFunction")?,
            normalization,
            || configuration.real("pbiTheta"),
        )?;
        let max_replaced = configuration.positive("maximumNumberOfReplacedSolutions")?;

        let evaluation = context.evaluation(archive.is_some())?;
        debug!(
            population = population_size,
            neighborhood = neighborhood_size,
            max_replaced,
            ?aggregation,
            ?evaluation,
            "Assembled MOEA/D"
        );

        Ok(Box::new(MoeadAlgorithm {
            problem: Arc::clone(&context.problem),
            population_size,
            creation,
            variation,
            selection,
            mating_pool_size,
            aggregation,
            max_replaced,
            weights,
            neighborhoods,
            evaluation,
            termination: TerminationByEvaluations::new(context.max_evaluations),
            result_source: ResultSource::from_archive(archive),
            rng: context.rng(),
            population: Vec::new(),
            reference: ReferencePoints::new(context.problem.number_of_objectives()),
            evaluations: 0,
            iteration: 0,
        }))
    }
}

/// Decomposition loop: each sub-problem, visited in a fresh random order per
/// iteration, breeds one child that may replace up to `max_replaced`
/// solutions it improves on.
pub struct MoeadAlgorithm {
    problem: Arc<dyn Problem>,
    population_size: usize,
    creation: SolutionsCreation,
    variation: Variation,
    selection: NeighborhoodSelection,
    mating_pool_size: usize,
    aggregation: AggregationFunction,
    max_replaced: usize,
    weights: Vec<Vec<f64>>,
    neighborhoods: Vec<Vec<usize>>,
    evaluation: Evaluation,
    termination: TerminationByEvaluations,
    result_source: ResultSource,
    rng: EvRng,
    population: Vec<Solution>,
    reference: ReferencePoints,
    evaluations: usize,
    iteration: usize,
}

impl MoeadAlgorithm {
    fn evaluate(&mut self, solutions: &mut [Solution]) -> EvResult<()> {
        let archive = self.result_source.archive_mut();
        self.evaluations += self
            .evaluation
            .evaluate(self.problem.as_ref(), solutions, archive)?;
        Ok(())
    }

    fn breed(&mut self, subproblem: usize) -> EvResult<()> {
        let (parents, neighbor_type) = self.selection.select(
            self.population_size,
            &self.neighborhoods[subproblem],
            self.mating_pool_size,
            &mut self.rng,
        );
        let pool: Vec<Solution> = parents.iter().map(|&i| self.population[i].clone()).collect();
        let offspring = self.variation.variate(
            &pool,
            Some(&self.population[subproblem]),
            self.problem.bounds(),
            self.iteration,
            &mut self.rng,
        )?;
        let Some(child) = offspring.into_iter().next() else {
            return Err(BuildError::Inconsistent {
                message: "variation produced no offspring".to_string(),
            }
            .into());
        };
        let mut evaluated = [child];
        self.evaluate(&mut evaluated)?;
        let [child] = evaluated;
        self.reference.update(&child);
        self.update_population(subproblem, &child, neighbor_type);
        Ok(())
    }

    fn update_population(&mut self, subproblem: usize, child: &Solution, neighbor_type: NeighborType) {
        let mut candidates: Vec<usize> = match neighbor_type {
            NeighborType::Neighbor => self.neighborhoods[subproblem].clone(),
            NeighborType::Population => (0..self.population_size).collect(),
        };
        candidates.shuffle(&mut self.rng);

        let mut replaced = 0;
        for k in candidates {
            if replaced >= self.max_replaced {
                break;
            }
            let weights = &self.weights[k];
            let current = self
                .aggregation
                .compute(&self.population[k].objectives, weights, &self.reference);
            let candidate = self.aggregation.compute(&child.objectives, weights, &self.reference);
            if candidate < current {
                self.population[k] = child.clone();
                replaced += 1;
            }
        }
    }
}

impl Algorithm for MoeadAlgorithm {
    fn name(&self) -> &str {
        "MOEAD"
    }

    fn run(&mut self) -> EvResult<()> {
        let mut population =
            self.creation
                .create(self.problem.as_ref(), self.population_size, &mut self.rng);
        self.evaluate(&mut population)?;
        self.reference.update_all(&population);
        self.population = population;

        let mut order: Vec<usize> = (0..self.population_size).collect();
        while !self.termination.is_met(self.evaluations) {
            order.shuffle(&mut self.rng);
            for &subproblem in &order {
                if self.termination.is_met(self.evaluations) {
                    break;
                }
                self.breed(subproblem)?;
            }
            self.iteration += 1;
        }

        debug!(
            problem = self.problem.name(),
            evaluations = self.evaluations,
            iterations = self.iteration,
            "MOEA/D run finished"
        );
        Ok(())
    }

    fn result(&self) -> Vec<Solution> {
        self.result_source.result(&self.population)
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigurableAlgorithmBuilder;
    use ev_types::{Dtlz, DtlzVariant, Zdt, ZdtVariant};

    fn run(family: Moead, problem: Arc<dyn Problem>, vector: &[f64]) -> EvResult<Box<dyn Algorithm>> {
        let mut algorithm = ConfigurableAlgorithmBuilder::new(Arc::new(family), problem, 20, 300)
            .with_seed(9)
            .decode(vector)?
            .build()?;
        algorithm.run()?;
        Ok(algorithm)
    }

    #[test]
    fn test_two_objective_run() {
        let family = Moead::new().unwrap();
        let vector = vec![0.4; family.parameter_space().dimension()];
        let algorithm = run(family, Arc::new(Zdt::new(ZdtVariant::Zdt1, 6)), &vector).unwrap();
        assert_eq!(algorithm.evaluations(), 300);
        let result = algorithm.result();
        assert!(!result.is_empty() && result.len() <= 20);
        assert!(result.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_differential_evolution_variant() {
        let family = Moead::new().unwrap();
        let space = Arc::clone(family.parameter_space());
        let mut vector = vec![0.8; space.dimension()];
        vector[space.lookup("variation").unwrap().offset] = 1.0;
        let algorithm = run(family, Arc::new(Zdt::new(ZdtVariant::Zdt2, 6)), &vector).unwrap();
        assert!(algorithm.result().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_three_objectives_need_weight_files() {
        let family = Moead::new().unwrap();
        let vector = vec![0.4; family.parameter_space().dimension()];
        let problem = Arc::new(Dtlz::new(DtlzVariant::Dtlz2, 12, 3));
        assert!(run(family, problem, &vector).is_err());
    }
}
