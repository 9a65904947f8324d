use crate::traits::CorrelationOps;
use ndarray::parallel::prelude::*;
use ndarray::prelude::*;

impl CorrelationOps for Array2<f32> {
    type Out = Array2<f64>;

    fn pearson_rows(&self) -> Self::Out {
        pearson_rows(self.mapv(f64::from))
    }

    fn spearman_rows(&self) -> Self::Out {
        pearson_rows(self.rank_rows())
    }

    fn rank_rows(&self) -> Self::Out {
        let mut ranks = Array2::<f64>::zeros(self.dim());
        ranks
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(self.axis_iter(Axis(0)).into_par_iter())
            .for_each(|(mut rank, row)| {
                let values: Vec<f64> = row.iter().map(|&x| f64::from(x)).collect();
                for (r, v) in rank.iter_mut().zip(average_ranks(&values)) {
                    *r = v;
                }
            });
        ranks
    }

    fn zero_variance_rows(&self) -> Vec<usize> {
        self.axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, row)| match row.first() {
                Some(&x0) => row.iter().all(|&x| x == x0),
                None => true,
            })
            .map(|(i, _)| i)
            .collect()
    }
}

/// Correlation matrix of the rows of `x`, consuming `x`
///
/// Each row is centred and scaled to the unit norm, so that the
/// inner products of the rows are the correlation coefficients.
/// Rows without variation end up with zero vectors, giving zero
/// correlation with everything else. The diagonal is exactly one.
fn pearson_rows(mut x: Array2<f64>) -> Array2<f64> {
    let ncol = x.ncols();

    x.axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(|mut row| {
            let mu = row.sum() / ncol.max(1) as f64;
            row.mapv_inplace(|v| v - mu);
            let norm = row.dot(&row).sqrt();
            if norm > 0. && norm.is_finite() {
                row.mapv_inplace(|v| v / norm);
            } else {
                row.fill(0.);
            }
        });

    let xxt = x.dot(&x.t());
    let mut corr = (&xxt + &xxt.t()) * 0.5;
    corr.par_mapv_inplace(|r| r.clamp(-1., 1.));
    corr.diag_mut().fill(1.);
    corr
}

/// 1-based ranks where ties take the average of their positions
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // positions i..j (0-based) share the rank
        let avg = (i + j - 1) as f64 / 2. + 1.;
        for &k in &order[i..j] {
            ranks[k] = avg;
        }
        i = j;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_average_rank() {
        let r = average_ranks(&[3., 1., 3., 2.]);
        assert_eq!(r, vec![3.5, 1., 3.5, 2.]);
    }

    #[test]
    fn constant_rows_detected() {
        let x = array![[1f32, 1., 1.], [1., 2., 3.], [0., 0., 0.]];
        assert_eq!(x.zero_variance_rows(), vec![0, 2]);
    }
}
