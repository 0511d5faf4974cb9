//! Exact hypervolume by slicing along the last objective.
//!
//! Cost grows as `O(n^(m-1))`, which is fine for the archive and population
//! sizes used here.

/// Volume dominated by `points` and bounded above by `reference`.
///
/// Points that do not strictly dominate the reference point contribute
/// nothing.
pub fn hypervolume(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let inside: Vec<&[f64]> = points
        .iter()
        .filter(|p| p.len() == reference.len() && p.iter().zip(reference).all(|(v, r)| v < r))
        .map(|p| p.as_slice())
        .collect();
    slice_volume(inside, reference)
}

/// Exclusive contribution of each point: the volume lost when it is removed.
pub fn hypervolume_contributions(points: &[Vec<f64>], reference: &[f64]) -> Vec<f64> {
    let total = hypervolume(points, reference);
    (0..points.len())
        .map(|skip| {
            let rest: Vec<Vec<f64>> = points
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, p)| p.clone())
                .collect();
            (total - hypervolume(&rest, reference)).max(0.0)
        })
        .collect()
}

fn slice_volume(mut points: Vec<&[f64]>, reference: &[f64]) -> f64 {
    let dims = reference.len();
    if points.is_empty() || dims == 0 {
        return 0.0;
    }
    match dims {
        1 => points
            .iter()
            .map(|p| reference[0] - p[0])
            .fold(0.0, f64::max),
        2 => {
            points.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
            let mut area = 0.0;
            let mut ceiling = reference[1];
            for p in points {
                if p[1] < ceiling {
                    area += (reference[0] - p[0]) * (ceiling - p[1]);
                    ceiling = p[1];
                }
            }
            area
        }
        _ => {
            let last = dims - 1;
            points.sort_by(|a, b| a[last].total_cmp(&b[last]));
            let mut volume = 0.0;
            for i in 0..points.len() {
                let next = points
                    .get(i + 1)
                    .map_or(reference[last], |p| p[last]);
                let depth = next - points[i][last];
                if depth <= 0.0 {
                    continue;
                }
                let projected: Vec<&[f64]> = points[..=i].iter().map(|p| &p[..last]).collect();
                volume += slice_volume(projected, &reference[..last]) * depth;
            }
            volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_objective_staircase() {
        let points = vec![vec![0.0, 1.0], vec![0.5, 0.5], vec![1.0, 0.0]];
        let hv = hypervolume(&points, &[1.1, 1.1]);
        assert!((hv - 0.46).abs() < 1e-12);
        let single = hypervolume(&[vec![0.5, 0.5]], &[1.0, 1.0]);
        assert!((single - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_three_objective_box() {
        let hv = hypervolume(&[vec![0.0, 0.0, 0.0]], &[1.0, 2.0, 3.0]);
        assert!((hv - 6.0).abs() < 1e-12);

        let two = hypervolume(
            &[vec![0.0, 0.5, 0.5], vec![0.5, 0.0, 0.0]],
            &[1.0, 1.0, 1.0],
        );
        // Union of 1 x 0.5 x 0.5 and 0.5 x 1 x 1 overlapping in 0.5 x 0.5 x 0.5.
        assert!((two - (0.25 + 0.5 - 0.125)).abs() < 1e-12);
    }

    #[test]
    fn test_points_outside_reference_are_ignored() {
        let hv = hypervolume(&[vec![2.0, 0.0], vec![0.5, 0.5]], &[1.0, 1.0]);
        assert!((hv - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_contributions() {
        let points = vec![vec![0.0, 1.0], vec![0.5, 0.5], vec![1.0, 0.0]];
        let contributions = hypervolume_contributions(&points, &[2.0, 2.0]);
        assert!((contributions[1] - 0.25).abs() < 1e-12);
        assert!((contributions[0] - 0.5).abs() < 1e-12);
        assert!((contributions[2] - 0.5).abs() < 1e-12);
    }
}
