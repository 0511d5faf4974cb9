//! irace parameter file rendering.
//!
//! One line per flattened parameter: name, switch, type, values and an
//! optional `| parent %in% c(...)` condition. A `#` line closes each
//! top-level tree.

use std::collections::HashMap;

use ev_types::{ConfigError, EvResult};

use crate::domain::Domain;
use crate::parameter::Parameter;
use crate::space::ParameterSpace;

struct Line<'a> {
    name: &'a str,
    domain: &'a Domain,
    group: usize,
    /// `None` once any occurrence of the parameter is unconditional.
    conditions: Option<Vec<String>>,
}

fn membership(parent: &str, literals: &[String]) -> String {
    let quoted: Vec<String> = literals.iter().map(|l| format!("\"{}\"", l)).collect();
    format!("{} %in% c({})", parent, quoted.join(","))
}

fn collect<'a>(
    parameter: &'a Parameter,
    condition: Option<String>,
    group: usize,
    lines: &mut Vec<Line<'a>>,
    index: &mut HashMap<&'a str, usize>,
) {
    match index.get(parameter.name.as_str()) {
        Some(&existing) => {
            let line = &mut lines[existing];
            match (&mut line.conditions, &condition) {
                (Some(conditions), Some(condition)) => {
                    if !conditions.contains(condition) {
                        conditions.push(condition.clone());
                    }
                }
                (conditions, None) => *conditions = None,
                (None, Some(_)) => {}
            }
        }
        None => {
            index.insert(parameter.name.as_str(), lines.len());
            lines.push(Line {
                name: &parameter.name,
                domain: &parameter.domain,
                group,
                conditions: condition.clone().map(|c| vec![c]),
            });
        }
    }

    // irace conditions only see the direct parent, so numeric parents pass on
    // their own condition.
    let global_condition = match &parameter.domain {
        Domain::Categorical(values) => Some(membership(&parameter.name, values)),
        Domain::CategoricalInteger(values) => {
            let literals: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            Some(membership(&parameter.name, &literals))
        }
        Domain::Boolean => Some(membership(
            &parameter.name,
            &["true".to_string(), "false".to_string()],
        )),
        _ => condition,
    };
    for global in &parameter.global_sub_parameters {
        collect(global, global_condition.clone(), group, lines, index);
    }
    for (literal, children) in &parameter.specific_sub_parameters {
        let specific = membership(&parameter.name, std::slice::from_ref(literal));
        for child in children {
            collect(child, Some(specific.clone()), group, lines, index);
        }
    }
}

fn type_and_values(name: &str, domain: &Domain) -> EvResult<(&'static str, String)> {
    let list = |items: Vec<String>| format!("({})", items.join(", "));
    Ok(match domain {
        Domain::Categorical(values) => ("c", list(values.clone())),
        Domain::CategoricalInteger(values) => {
            ("c", list(values.iter().map(|v| v.to_string()).collect()))
        }
        Domain::Boolean => ("c", "(true, false)".to_string()),
        Domain::Integer { lower, upper } => ("i", format!("({}, {})", lower, upper)),
        Domain::Real { lower, upper } => ("r", format!("({:?}, {:?})", lower, upper)),
        Domain::RealVector { .. } => {
            return Err(ConfigError::InvalidDomain {
                parameter: name.to_string(),
                message: "real vectors have no irace parameter type".to_string(),
            }
            .into())
        }
    })
}

impl ParameterSpace {
    /// The tunable tree as an irace parameter file. Fixed values are left out.
    pub fn irace_description(&self) -> EvResult<String> {
        let mut lines: Vec<Line> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (group, parameter) in self.top_level().iter().enumerate() {
            collect(parameter, None, group, &mut lines, &mut index);
        }

        let mut out = String::new();
        for (position, line) in lines.iter().enumerate() {
            let (kind, values) = type_and_values(line.name, line.domain)?;
            let condition = match &line.conditions {
                Some(conditions) => format!("| {}", conditions.join(" || ")),
                None => String::new(),
            };
            let row = format!(
                "{:<40} {:<40} {:<7} {:<30} {}",
                line.name,
                format!("\"--{} \"", line.name),
                kind,
                values,
                condition
            );
            out.push_str(row.trim_end());
            out.push('\n');

            let closes_group = lines
                .get(position + 1)
                .map_or(true, |next| next.group != line.group);
            if closes_group {
                out.push_str("#\n");
            }
        }

        tracing::debug!(space = %self.name(), parameters = lines.len(), "irace description rendered");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{mopso_space, nsgaii_compact_space, nsgaii_space};

    fn row(name: &str, kind: &str, values: &str, condition: &str) -> String {
        let switch = format!("\"--{} \"", name);
        format!("{:<40} {:<40} {:<7} {:<30} {}", name, switch, kind, values, condition)
            .trim_end()
            .to_string()
    }

    fn sample_space() -> ParameterSpace {
        ParameterSpace::new(
            "Sample",
            vec![
                Parameter::categorical("crossover", &["SBX", "BLX_ALPHA"])
                    .with_global(Parameter::real("crossoverProbability", 0.0, 1.0))
                    .with_specific("SBX", Parameter::real("sbxDistributionIndex", 5.0, 400.0)),
                Parameter::integer("populationSize", 10, 200)
                    .with_global(Parameter::boolean("normalize")),
                Parameter::categorical_integer("offspring", &[1, 2, 5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_sample_lines() {
        let text = sample_space().irace_description().unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                row("crossover", "c", "(SBX, BLX_ALPHA)", "").as_str(),
                row(
                    "crossoverProbability",
                    "r",
                    "(0.0, 1.0)",
                    "| crossover %in% c(\"SBX\",\"BLX_ALPHA\")"
                )
                .as_str(),
                row(
                    "sbxDistributionIndex",
                    "r",
                    "(5.0, 400.0)",
                    "| crossover %in% c(\"SBX\")"
                )
                .as_str(),
                "#",
                row("populationSize", "i", "(10, 200)", "").as_str(),
                row("normalize", "c", "(true, false)", "").as_str(),
                "#",
                row("offspring", "c", "(1, 2, 5)", "").as_str(),
                "#",
            ]
        );
    }

    #[test]
    fn test_nested_conditions_name_the_direct_parent() {
        let text = nsgaii_space().unwrap().irace_description().unwrap();
        let line = |name: &str| {
            text.lines()
                .find(|l| l.starts_with(&format!("{} ", name)))
                .unwrap()
                .to_string()
        };

        assert!(line("crossover").ends_with("| variation %in% c(\"crossoverAndMutationVariation\")"));
        assert!(line("crossoverProbability")
            .ends_with("| crossover %in% c(\"SBX\",\"BLX_ALPHA\",\"wholeArithmetic\")"));
        assert!(line("populationSizeWithArchive").ends_with("| algorithmResult %in% c(\"externalArchive\")"));
        assert!(line("offspringPopulationSize").contains("(1, 2, 5, 10, 20, 50, 100, 200, 400)"));
        assert_eq!(text.lines().filter(|l| *l == "#").count(), 5);
    }

    #[test]
    fn test_shared_parameter_is_listed_once_with_every_branch() {
        let space = mopso_space().unwrap();
        let text = space.irace_description().unwrap();
        let rows: Vec<&str> = text.lines().filter(|l| *l != "#").collect();
        assert_eq!(rows.len(), space.parameter_names().len());

        let weight_min: Vec<&str> = rows.iter().copied().filter(|l| l.starts_with("weightMin ")).collect();
        assert_eq!(weight_min.len(), 1);
        assert!(weight_min[0].ends_with(
            "| inertiaWeightComputingStrategy %in% c(\"randomSelectedValue\") \
             || inertiaWeightComputingStrategy %in% c(\"linearIncreasingValue\") \
             || inertiaWeightComputingStrategy %in% c(\"linearDecreasingValue\")"
        ));
    }

    #[test]
    fn test_numeric_parent_passes_its_condition_down() {
        let space = ParameterSpace::new(
            "Nested",
            vec![Parameter::categorical("archive", &["none", "bounded"]).with_specific(
                "bounded",
                Parameter::integer("archiveSize", 10, 100)
                    .with_global(Parameter::real("archiveRatio", 0.0, 1.0)),
            )],
        )
        .unwrap();
        let text = space.irace_description().unwrap();
        let ratio = text.lines().find(|l| l.starts_with("archiveRatio ")).unwrap();
        assert!(ratio.ends_with("| archive %in% c(\"bounded\")"));
    }

    #[test]
    fn test_fixed_values_are_left_out() {
        let space = nsgaii_compact_space().unwrap();
        let text = space.irace_description().unwrap();
        assert_eq!(text.lines().filter(|l| *l != "#").count(), 4);
        assert!(!text.contains("crossoverProbability"));
    }

    #[test]
    fn test_real_vector_has_no_irace_type() {
        let space = ParameterSpace::new(
            "Weights",
            vec![Parameter::real_vector("weights", 0.0, 1.0, 3)],
        )
        .unwrap();
        assert!(matches!(
            space.irace_description(),
            Err(ev_types::EvError::Config(ConfigError::InvalidDomain { .. }))
        ));
    }
}
