//! Weight vectors for decomposition-based algorithms.
//!
//! Two-objective weights are generated uniformly. Higher dimensions are read
//! from precomputed files named `W{objectives}D_{population}.dat`, one
//! whitespace-separated vector per line.

use std::path::Path;

use ev_types::{DataError, EvResult};

pub fn weight_file_name(objectives: usize, population_size: usize) -> String {
    format!("W{}D_{}.dat", objectives, population_size)
}

/// Evenly spaced weights `(i/(n-1), 1 - i/(n-1))`.
pub fn uniform_two_objective_weights(population_size: usize) -> Vec<Vec<f64>> {
    if population_size == 1 {
        return vec![vec![0.5, 0.5]];
    }
    (0..population_size)
        .map(|i| {
            let w = i as f64 / (population_size - 1) as f64;
            vec![w, 1.0 - w]
        })
        .collect()
}

pub fn read_weight_vectors<P: AsRef<Path>>(
    directory: P,
    objectives: usize,
    population_size: usize,
) -> EvResult<Vec<Vec<f64>>> {
    let path = directory
        .as_ref()
        .join(weight_file_name(objectives, population_size));
    tracing::info!("Loading weight vectors from: {}", path.display());

    let contents = std::fs::read_to_string(&path).map_err(|_| DataError::FileNotFound {
        path: path.display().to_string(),
    })?;

    let mut vectors = Vec::with_capacity(population_size);
    for (line_num, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let vector = line
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|e| DataError::ParseError {
                    path: path.display().to_string(),
                    line: line_num + 1,
                    message: format!("'{}': {}", field, e),
                })
            })
            .collect::<Result<Vec<f64>, DataError>>()?;
        if vector.len() != objectives {
            return Err(DataError::ParseError {
                path: path.display().to_string(),
                line: line_num + 1,
                message: format!("expected {} weights, found {}", objectives, vector.len()),
            }
            .into());
        }
        vectors.push(vector);
    }

    if vectors.len() != population_size {
        return Err(DataError::InvalidFormat {
            message: format!(
                "{} holds {} weight vectors, expected {}",
                path.display(),
                vectors.len(),
                population_size
            ),
        }
        .into());
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_uniform_two_objective_weights() {
        let weights = uniform_two_objective_weights(5);
        assert_eq!(weights.len(), 5);
        assert_eq!(weights[0], vec![0.0, 1.0]);
        assert_eq!(weights[4], vec![1.0, 0.0]);
        assert!(weights.iter().all(|w| (w[0] + w[1] - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_read_weight_vectors() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("W3D_3.dat"),
            "1.0 0.0 0.0\n0.0  1.0 0.0\n0.0 0.0 1.0\n",
        )
        .unwrap();

        let weights = read_weight_vectors(dir.path(), 3, 3).unwrap();
        assert_eq!(weights[1], vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_weight_file_population_mismatch() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("W3D_4.dat"), "1 0 0\n0 1 0\n").unwrap();
        assert!(read_weight_vectors(dir.path(), 3, 4).is_err());
        assert!(read_weight_vectors(dir.path(), 3, 5).is_err());
    }
}
