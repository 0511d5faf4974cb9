use std::path::Path;

use ev_data::{read_weight_vectors, uniform_two_objective_weights};
use ev_types::{ConfigError, EvResult};

/// Weight vectors for `population_size` sub-problems. Two-objective sets are
/// generated; larger ones are read from `W{m}D_{n}.dat` in `directory`.
pub fn weight_vectors(
    objectives: usize,
    population_size: usize,
    directory: Option<&Path>,
) -> EvResult<Vec<Vec<f64>>> {
    if objectives == 2 {
        return Ok(uniform_two_objective_weights(population_size));
    }
    let directory = directory.ok_or_else(|| ConfigError::InvalidValue {
        parameter: "weight_vector_files_directory".to_string(),
        value: String::new(),
        reason: format!(
            "required for decomposition with {} objectives",
            objectives
        ),
    })?;
    read_weight_vectors(directory, objectives, population_size)
}

/// For each weight vector, the indices of its `size` nearest weight vectors
/// (itself included) by Euclidean distance.
pub fn neighborhoods(weights: &[Vec<f64>], size: usize) -> Vec<Vec<usize>> {
    let size = size.min(weights.len());
    weights
        .iter()
        .map(|w| {
            let mut order: Vec<(f64, usize)> = weights
                .iter()
                .enumerate()
                .map(|(j, other)| {
                    let distance: f64 = w.iter().zip(other).map(|(a, b)| (a - b) * (a - b)).sum();
                    (distance, j)
                })
                .collect();
            order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            order.into_iter().take(size).map(|(_, j)| j).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_two_objective_neighborhoods() {
        let weights = weight_vectors(2, 10, None).unwrap();
        assert_eq!(weights.len(), 10);
        let hoods = neighborhoods(&weights, 3);
        assert_eq!(hoods[0], vec![0, 1, 2]);
        assert_eq!(hoods[5][0], 5);
        assert!(hoods[5].contains(&4) && hoods[5].contains(&6));
    }

    #[test]
    fn test_three_objectives_need_a_directory() {
        assert!(weight_vectors(3, 10, None).is_err());

        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("W3D_3.dat")).unwrap();
        writeln!(file, "1.0 0.0 0.0").unwrap();
        writeln!(file, "0.0 1.0 0.0").unwrap();
        writeln!(file, "0.0 0.0 1.0").unwrap();
        let weights = weight_vectors(3, 3, Some(dir.path())).unwrap();
        assert_eq!(weights[2], vec![0.0, 0.0, 1.0]);
        assert_eq!(neighborhoods(&weights, 10)[0].len(), 3);
    }
}
