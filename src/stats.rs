// stats.rs
//
// Pairwise correlation between principal component score columns.

use ndarray::Array2;
use statrs::statistics::{Data, OrderStatistics, RankTieBreaker, Statistics};

/// Pearson product-moment correlation coefficient.
///
/// Returns NaN when either series is constant or the lengths differ.
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let covariance = x.iter().covariance(y.iter());
    let denominator = x.iter().std_dev() * y.iter().std_dev();
    if denominator == 0.0 {
        return f64::NAN;
    }
    covariance / denominator
}

/// Fractional ranks (1-based), ties receiving the average of their ranks.
pub(crate) fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut data = Data::new(values.to_vec());
    data.ranks(RankTieBreaker::Average)
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Spearman rank correlation: Pearson over average-tie ranks.
///
/// NaN when either series holds a missing (non-finite) value.
pub(crate) fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || !all_finite(x) || !all_finite(y) {
        return f64::NAN;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Squared Pearson coefficient and Spearman rho for one ordered column pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PairCorrelation {
    pub(crate) r_squared: f64,
    pub(crate) spearman_rho: f64,
}

impl PairCorrelation {
    pub(crate) fn between(x: &[f64], y: &[f64]) -> Self {
        let r = pearson(x, y);
        Self {
            r_squared: r * r,
            spearman_rho: spearman(x, y),
        }
    }
}

/// `k x k` Spearman matrix indexed by the same ordered column list on both
/// axes. Each unordered pair is computed once and mirrored.
pub(crate) fn spearman_matrix(columns: &[Vec<f64>]) -> Array2<f64> {
    let k = columns.len();
    // Columns with missing values have no ranking.
    let ranks: Vec<Option<Vec<f64>>> = columns
        .iter()
        .map(|c| all_finite(c).then(|| average_ranks(c)))
        .collect();
    let mut matrix = Array2::<f64>::zeros((k, k));
    for i in 0..k {
        for j in i..k {
            let rho = match (&ranks[i], &ranks[j]) {
                (Some(a), Some(b)) => pearson(a, b),
                _ => f64::NAN,
            };
            matrix[[i, j]] = rho;
            matrix[[j, i]] = rho;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pearson_of_linear_relation_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 5.0, 7.0, 9.0, 11.0];
        assert_abs_diff_eq!(pearson(&x, &y), 1.0, epsilon = 1e-12);

        let y_neg: Vec<f64> = y.iter().map(|v| -v).collect();
        assert_abs_diff_eq!(pearson(&x, &y_neg), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_of_constant_series_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn ranks_average_ties() {
        let ranks = average_ranks(&[10.0, 20.0, 10.0, 30.0]);
        assert_eq!(ranks, vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn spearman_captures_monotonic_non_linear_relation() {
        let x: Vec<f64> = (1..=8).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| v.powi(3)).collect();
        assert_abs_diff_eq!(spearman(&x, &y), 1.0, epsilon = 1e-12);
        assert!(pearson(&x, &y) < 1.0);
    }

    #[test]
    fn spearman_matches_reference_value() {
        // scipy.stats.spearmanr([1, 2, 3, 4, 5], [5, 6, 7, 8, 7]) -> 0.8207826816681233
        let rho = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 6.0, 7.0, 8.0, 7.0]);
        assert_abs_diff_eq!(rho, 0.8207826816681233, epsilon = 1e-12);
    }

    #[test]
    fn self_pair_has_unit_r_squared() {
        let x = [0.3, -1.2, 4.4, 2.0, 0.0, -0.7];
        let pair = PairCorrelation::between(&x, &x);
        assert_abs_diff_eq!(pair.r_squared, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pair.spearman_rho, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn spearman_matrix_is_symmetric_with_unit_diagonal() {
        let columns = vec![
            vec![1.0, 4.0, 2.0, 8.0, 5.0, 7.0],
            vec![2.0, 1.0, 9.0, 3.0, 3.0, 6.0],
            vec![-1.0, 0.5, 0.25, 2.0, -3.0, 1.0],
        ];
        let matrix = spearman_matrix(&columns);
        assert_eq!(matrix.dim(), (3, 3));
        for i in 0..3 {
            assert_abs_diff_eq!(matrix[[i, i]], 1.0, epsilon = 1e-12);
            for j in 0..3 {
                assert_eq!(matrix[[i, j]], matrix[[j, i]]);
                assert_abs_diff_eq!(
                    matrix[[i, j]],
                    spearman(&columns[i], &columns[j]),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn missing_values_give_nan_instead_of_ranks() {
        assert!(spearman(&[1.0, f64::NAN, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]).is_nan());

        let columns = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![4.0, f64::NAN, 2.0, 1.0],
            vec![2.0, 1.0, 4.0, 3.0],
        ];
        let matrix = spearman_matrix(&columns);
        assert!(matrix[[0, 1]].is_nan());
        assert!(matrix[[1, 2]].is_nan());
        assert!(matrix[[1, 1]].is_nan());
        assert_abs_diff_eq!(matrix[[0, 2]], 0.6, epsilon = 1e-12);
    }
}
