//! Meta-run configuration files.
//!
//! Line oriented `key: value` text. `#` starts a comment, blank lines are
//! ignored and values may be wrapped in double quotes. Comma separated
//! problem lists select multi-problem mode.

use std::path::{Path, PathBuf};

use ev_types::{DataError, EvResult};
use serde::{Deserialize, Serialize};

/// Everything needed to launch one meta-optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRunConfig {
    /// Outer optimizer: "NSGAII" or "AsyncNSGAII".
    pub meta_optimizer_algorithm: String,
    pub meta_optimizer_population_size: usize,
    pub meta_optimizer_max_evaluations: usize,

    /// Inner runs per candidate and target problem.
    pub independent_runs: usize,
    pub indicators_names: Vec<String>,
    pub output_directory: PathBuf,

    /// Family being configured: "NSGAII", "MOEAD", "MOPSO" or "SMSEMOA".
    pub configurable_algorithm: String,
    pub internal_population_size: usize,

    pub problem_names: Vec<String>,
    pub reference_front_file_names: Vec<PathBuf>,
    pub max_number_of_evaluations: Vec<usize>,
    /// When present, each inner run draws its budget from
    /// `[min_number_of_evaluations[i], max_number_of_evaluations[i]]`.
    #[serde(default)]
    pub min_number_of_evaluations: Option<Vec<usize>>,

    pub weight_vector_files_directory: Option<PathBuf>,
    pub cpu_cores: usize,
    pub observer_frequency: usize,
    pub seed: u64,

    /// "mean" or "median".
    pub aggregation: String,
}

impl Default for MetaRunConfig {
    fn default() -> Self {
        Self {
            meta_optimizer_algorithm: "NSGAII".to_string(),
            meta_optimizer_population_size: 50,
            meta_optimizer_max_evaluations: 2000,
            independent_runs: 1,
            indicators_names: vec!["EP".to_string(), "NHV".to_string()],
            output_directory: PathBuf::from("results"),
            configurable_algorithm: "NSGAII".to_string(),
            internal_population_size: 100,
            problem_names: Vec::new(),
            reference_front_file_names: Vec::new(),
            max_number_of_evaluations: Vec::new(),
            min_number_of_evaluations: None,
            weight_vector_files_directory: None,
            cpu_cores: 1,
            observer_frequency: 100,
            seed: 1,
            aggregation: "mean".to_string(),
        }
    }
}

const REQUIRED_KEYS: [&str; 11] = [
    "meta_optimizer_algorithm",
    "meta_optimizer_population_size",
    "meta_optimizer_max_evaluations",
    "independent_runs",
    "indicators_names",
    "output_directory",
    "configurable_algorithm",
    "internal_population_size",
    "problem_names",
    "reference_front_file_name",
    "max_number_of_evaluations",
];

impl MetaRunConfig {
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> EvResult<Self> {
        let path = file_path.as_ref();
        tracing::info!("Loading meta-run configuration from: {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|_| DataError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse configuration text. `origin` names the source in error messages.
    pub fn parse(text: &str, origin: &str) -> EvResult<Self> {
        let mut config = Self::default();
        let mut seen: Vec<&'static str> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line_num = index + 1;
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = line.split_once(':').ok_or_else(|| DataError::ParseError {
                path: origin.to_string(),
                line: line_num,
                message: format!("expected 'key: value', found '{}'", line),
            })?;
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim();
            let err = |message: String| DataError::ParseError {
                path: origin.to_string(),
                line: line_num,
                message,
            };

            match key {
                "meta_optimizer_algorithm" => config.meta_optimizer_algorithm = value.to_string(),
                "meta_optimizer_population_size" => {
                    config.meta_optimizer_population_size = parse_number(key, value).map_err(err)?
                }
                "meta_optimizer_max_evaluations" => {
                    config.meta_optimizer_max_evaluations = parse_number(key, value).map_err(err)?
                }
                "independent_runs" => config.independent_runs = parse_number(key, value).map_err(err)?,
                "indicators_names" => config.indicators_names = split_list(value),
                "output_directory" => config.output_directory = PathBuf::from(value),
                "configurable_algorithm" => config.configurable_algorithm = value.to_string(),
                "internal_population_size" => {
                    config.internal_population_size = parse_number(key, value).map_err(err)?
                }
                "problem_names" => config.problem_names = split_list(value),
                "reference_front_file_name" => {
                    config.reference_front_file_names =
                        split_list(value).into_iter().map(PathBuf::from).collect()
                }
                "max_number_of_evaluations" => {
                    config.max_number_of_evaluations = split_list(value)
                        .iter()
                        .map(|v| parse_number(key, v))
                        .collect::<Result<Vec<usize>, String>>()
                        .map_err(err)?
                }
                "min_number_of_evaluations" => {
                    config.min_number_of_evaluations = Some(
                        split_list(value)
                            .iter()
                            .map(|v| parse_number(key, v))
                            .collect::<Result<Vec<usize>, String>>()
                            .map_err(err)?,
                    )
                }
                "weight_vector_files_directory" => {
                    config.weight_vector_files_directory =
                        (!value.is_empty()).then(|| PathBuf::from(value))
                }
                "cpu_cores" => config.cpu_cores = parse_number(key, value).map_err(err)?,
                "observer_frequency" | "plotting_frequency" => {
                    config.observer_frequency = parse_number(key, value).map_err(err)?
                }
                "seed" => config.seed = parse_number(key, value).map_err(err)?,
                "aggregation" => config.aggregation = value.to_lowercase(),
                "dashboard_mode" => {
                    tracing::debug!("Ignoring dashboard_mode={}", value);
                }
                other => {
                    tracing::warn!("Ignoring unknown configuration key '{}' at line {}", other, line_num);
                }
            }

            if let Some(required) = REQUIRED_KEYS.iter().find(|k| **k == key) {
                seen.push(*required);
            }
        }

        if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !seen.contains(*k)) {
            return Err(DataError::InvalidFormat {
                message: format!("{}: missing required key '{}'", origin, missing),
            }
            .into());
        }

        config.validate()?;
        Ok(config)
    }

    /// Structural checks shared by file parsing and programmatic construction.
    pub fn validate(&self) -> EvResult<()> {
        let invalid = |message: String| -> EvResult<()> {
            Err(DataError::InvalidFormat { message }.into())
        };

        if self.problem_names.is_empty() {
            return invalid("at least one problem name is required".to_string());
        }
        if self.indicators_names.is_empty() {
            return invalid("at least one indicator is required".to_string());
        }
        let problems = self.problem_names.len();
        let fronts = self.reference_front_file_names.len();
        let budgets = self.max_number_of_evaluations.len();
        if problems == 1 && (fronts != 1 || budgets != 1) {
            return invalid(format!(
                "a single problem needs exactly one reference front and one budget, got {} and {}",
                fronts, budgets
            ));
        }
        if fronts != problems || budgets != problems {
            return invalid(format!(
                "{} problems require {} reference fronts and budgets, got {} and {}",
                problems, problems, fronts, budgets
            ));
        }
        for (name, value) in [
            ("meta_optimizer_population_size", self.meta_optimizer_population_size),
            ("meta_optimizer_max_evaluations", self.meta_optimizer_max_evaluations),
            ("independent_runs", self.independent_runs),
            ("internal_population_size", self.internal_population_size),
            ("cpu_cores", self.cpu_cores),
            ("observer_frequency", self.observer_frequency),
        ] {
            if value == 0 {
                return invalid(format!("{} must be positive", name));
            }
        }
        if let Some(zero) = self.max_number_of_evaluations.iter().position(|b| *b == 0) {
            return invalid(format!("max_number_of_evaluations[{}] must be positive", zero));
        }
        if let Some(minimums) = &self.min_number_of_evaluations {
            if minimums.len() != problems {
                return invalid(format!(
                    "{} problems require {} minimum budgets, got {}",
                    problems,
                    problems,
                    minimums.len()
                ));
            }
            for (i, (min, max)) in minimums.iter().zip(&self.max_number_of_evaluations).enumerate() {
                if *min == 0 || min > max {
                    return invalid(format!(
                        "min_number_of_evaluations[{}] must be positive and at most {}",
                        i, max
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn is_multi_problem(&self) -> bool {
        self.problem_names.len() > 1
    }

    /// Adds one target problem with its reference front and evaluation budget.
    pub fn with_problem(
        mut self,
        name: impl Into<String>,
        reference_front: impl Into<PathBuf>,
        max_evaluations: usize,
    ) -> Self {
        self.problem_names.push(name.into());
        self.reference_front_file_names.push(reference_front.into());
        self.max_number_of_evaluations.push(max_evaluations);
        self
    }

    pub fn with_meta_optimizer(mut self, name: &str, population_size: usize, max_evaluations: usize) -> Self {
        self.meta_optimizer_algorithm = name.to_string();
        self.meta_optimizer_population_size = population_size;
        self.meta_optimizer_max_evaluations = max_evaluations;
        self
    }

    pub fn with_configurable_algorithm(mut self, name: &str, population_size: usize) -> Self {
        self.configurable_algorithm = name.to_string();
        self.internal_population_size = population_size;
        self
    }

    /// Lower budget bounds, one per problem, turning fixed budgets into ranges.
    pub fn with_min_evaluations(mut self, minimums: &[usize]) -> Self {
        self.min_number_of_evaluations = Some(minimums.to_vec());
        self
    }

    pub fn with_indicators(mut self, names: &[&str]) -> Self {
        self.indicators_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_independent_runs(mut self, runs: usize) -> Self {
        self.independent_runs = runs;
        self
    }

    pub fn with_cpu_cores(mut self, cores: usize) -> Self {
        self.cpu_cores = cores;
        self
    }

    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = directory.into();
        self
    }

    pub fn with_weight_vector_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.weight_vector_files_directory = Some(directory.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_aggregation(mut self, aggregation: &str) -> Self {
        self.aggregation = aggregation.to_lowercase();
        self
    }

    pub fn with_observer_frequency(mut self, frequency: usize) -> Self {
        self.observer_frequency = frequency;
        self
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|v| v.trim().trim_matches('"').trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| format!("{}: '{}' is not a valid number ({})", key, value, e))
}
