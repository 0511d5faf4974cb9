// Generational and steady-state evolutionary loop shared by NSGA-II and SMS-EMOA

use std::sync::Arc;

use ev_types::{EvResult, EvRng, Problem, Solution};
use tracing::debug;

use crate::algorithm::{Algorithm, ResultSource};
use crate::components::{
    Evaluation, MatingSelection, RankingAndCrowding, Replacement, SolutionsCreation,
    TerminationByEvaluations, Variation,
};

pub struct EvolutionaryAlgorithm {
    pub(crate) name: String,
    pub(crate) problem: Arc<dyn Problem>,
    pub(crate) population_size: usize,
    pub(crate) creation: SolutionsCreation,
    pub(crate) variation: Variation,
    pub(crate) selection: MatingSelection,
    pub(crate) mating_pool_size: usize,
    pub(crate) replacement: Replacement,
    pub(crate) evaluation: Evaluation,
    pub(crate) termination: TerminationByEvaluations,
    pub(crate) result_source: ResultSource,
    pub(crate) rng: EvRng,
    pub(crate) population: Vec<Solution>,
    pub(crate) evaluations: usize,
    pub(crate) iteration: usize,
}

impl EvolutionaryAlgorithm {
    pub fn population(&self) -> &[Solution] {
        &self.population
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn result_source(&self) -> &ResultSource {
        &self.result_source
    }

    fn evaluate(&mut self, solutions: &mut [Solution]) -> EvResult<()> {
        let archive = self.result_source.archive_mut();
        self.evaluations += self
            .evaluation
            .evaluate(self.problem.as_ref(), solutions, archive)?;
        Ok(())
    }

    fn step(&mut self) -> EvResult<()> {
        let ranking = RankingAndCrowding::compute(&self.population);
        let pool = self
            .selection
            .select(&self.population, &ranking, self.mating_pool_size, &mut self.rng);
        let mut offspring = self.variation.variate(
            &pool,
            None,
            self.problem.bounds(),
            self.iteration,
            &mut self.rng,
        )?;
        self.evaluate(&mut offspring)?;

        let population = std::mem::take(&mut self.population);
        self.population = self
            .replacement
            .replace(population, offspring, self.population_size);
        self.iteration += 1;
        Ok(())
    }
}

impl Algorithm for EvolutionaryAlgorithm {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self) -> EvResult<()> {
        let mut population =
            self.creation
                .create(self.problem.as_ref(), self.population_size, &mut self.rng);
        self.evaluate(&mut population)?;
        self.population = population;

        while !self.termination.is_met(self.evaluations) {
            self.step()?;
        }

        debug!(
            algorithm = %self.name,
            problem = self.problem.name(),
            evaluations = self.evaluations,
            iterations = self.iteration,
            "Run finished"
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
