//! Result files of a meta-optimization run.

use std::path::{Path, PathBuf};

use ev_data::write_matrix;
use ev_space::ParameterSpace;
use ev_types::{dominates, DataError, EvResult, Solution};
use tracing::info;

use crate::trial::EvaluationRecord;

/// Writes the non-dominated part of an outer result under one description,
/// `{algorithm}.{problems}.{indicators}.{objectives}`.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    directory: PathBuf,
    description: String,
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(
        directory: P,
        algorithm: &str,
        problems: &[String],
        indicators: &[&str],
    ) -> EvResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory).map_err(|e| DataError::WritingFailed {
            message: format!("cannot create {}: {}", directory.display(), e),
        })?;
        let description = format!(
            "{}.{}.{}.{}",
            algorithm,
            problems.join("_"),
            indicators.join("."),
            indicators.len()
        );
        Ok(Self {
            directory,
            description,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn path(&self, prefix: &str, suffix: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}{}", prefix, self.description, suffix))
    }

    /// Writes the VAR, FUN, decoded configuration, evaluation and parameter
    /// space files and returns their paths.
    pub fn write(
        &self,
        space: &ParameterSpace,
        solutions: &[Solution],
        records: &[EvaluationRecord],
    ) -> EvResult<Vec<PathBuf>> {
        let front = non_dominated(solutions);
        let variables: Vec<Vec<f64>> = front.iter().map(|s| s.variables.clone()).collect();
        let objectives: Vec<Vec<f64>> = front.iter().map(|s| s.objectives.clone()).collect();

        let var = self.path("VAR", ".csv");
        write_matrix(&var, &variables, None)?;
        let fun = self.path("FUN", ".csv");
        write_matrix(&fun, &objectives, None)?;

        let mut lines = Vec::with_capacity(front.len());
        let mut rows = Vec::with_capacity(front.len());
        for solution in &front {
            let configuration = space.decode_vector(&solution.variables)?;
            lines.push(configuration.to_token_string());
            rows.push(space.numeric_row(&configuration));
        }
        let conf = self.path("VAR", ".Conf.csv");
        std::fs::write(&conf, lines.join("\n") + "\n")?;
        let double_values = self.path("VAR", ".Conf.DoubleValues.csv");
        write_matrix(&double_values, &rows, Some(&space.numeric_header()))?;

        let evaluations = self.path("evaluations", ".json");
        std::fs::write(&evaluations, serde_json::to_string_pretty(records)?)?;

        let parameters = self.path("PARAMETERS", ".yaml");
        std::fs::write(&parameters, space.to_yaml()?)?;

        info!(
            directory = %self.directory.display(),
            description = %self.description,
            solutions = front.len(),
            records = records.len(),
            "Results written"
        );
        Ok(vec![var, fun, conf, double_values, evaluations, parameters])
    }
}

/// Non-dominated members of `solutions`, first occurrence of duplicates kept.
pub fn non_dominated(solutions: &[Solution]) -> Vec<Solution> {
    let mut kept: Vec<Solution> = Vec::new();
    for solution in solutions {
        if kept
            .iter()
            .any(|k| k.objectives == solution.objectives || dominates(&k.objectives, &solution.objectives))
        {
            continue;
        }
        kept.retain(|k| !dominates(&solution.objectives, &k.objectives));
        kept.push(solution.clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_space::catalogue::nsgaii_compact_space;
    use tempfile::TempDir;

    fn solution(variables: [f64; 4], objectives: [f64; 2]) -> Solution {
        Solution {
            variables: variables.to_vec(),
            objectives: objectives.to_vec(),
        }
    }

    #[test]
    fn test_non_dominated_filter() {
        let solutions = vec![
            solution([0.1; 4], [0.0, 1.0]),
            solution([0.2; 4], [1.0, 1.0]),
            solution([0.3; 4], [1.0, 0.0]),
            solution([0.4; 4], [0.0, 1.0]),
        ];
        let front = non_dominated(&solutions);
        assert_eq!(front.len(), 2);
        assert_eq!(front[0].variables, vec![0.1; 4]);
    }

    #[test]
    fn test_writes_all_artifacts() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(
            dir.path().join("out"),
            "NSGAII",
            &["ZDT1".to_string()],
            &["EP", "NHV"],
        )
        .unwrap();
        assert_eq!(writer.description(), "NSGAII.ZDT1.EP.NHV.2");

        let space = nsgaii_compact_space().unwrap();
        let solutions = vec![
            solution([0.5; 4], [0.1, 0.9]),
            solution([0.0; 4], [0.9, 0.1]),
            solution([1.0; 4], [1.0, 1.0]),
        ];
        let mut record = EvaluationRecord::new(1, None, vec![0.5; 4]);
        record.mark_completed(vec![0.1, 0.9]);
        let paths = writer.write(&space, &solutions, &[record]).unwrap();
        assert_eq!(paths.len(), 6);
        assert!(paths.iter().all(|p| p.exists()));

        let conf = std::fs::read_to_string(&paths[2]).unwrap();
        assert_eq!(conf.lines().count(), 2);
        assert!(conf.lines().next().unwrap().contains("--offspringPopulationSize 101"));

        let double_values = std::fs::read_to_string(&paths[3]).unwrap();
        assert_eq!(double_values.lines().count(), 3);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths[4]).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);

        let reloaded = ParameterSpace::from_yaml_file(&paths[5]).unwrap();
        assert_eq!(reloaded.top_level(), space.top_level());
    }
}
