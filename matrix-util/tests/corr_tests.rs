use approx::assert_abs_diff_eq;
use matrix_util::traits::CorrelationOps;
use ndarray::{array, Array2};
use rand::{Rng, SeedableRng};

#[test]
fn pearson_symmetric_with_unit_diagonal() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    let xx = Array2::<f32>::from_shape_fn((8, 15), |_| rng.random_range(-1.0..1.0));
    let corr = xx.pearson_rows();

    assert_eq!(corr.dim(), (8, 8));
    for i in 0..8 {
        assert_eq!(corr[[i, i]], 1.0);
        for j in 0..8 {
            assert_abs_diff_eq!(corr[[i, j]], corr[[j, i]], epsilon = 1e-12);
            assert!((-1.0..=1.0).contains(&corr[[i, j]]));
        }
    }
}

#[test]
fn pearson_known_values() {
    let xx = array![[1f32, 2., 3., 4.], [2., 4., 6., 8.], [4., 3., 2., 1.]];
    let corr = xx.pearson_rows();
    assert_abs_diff_eq!(corr[[0, 1]], 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(corr[[0, 2]], -1.0, epsilon = 1e-9);
}

#[test]
fn spearman_uses_ranks() {
    // monotone but non-linear: Spearman is exactly one, Pearson is not
    let xx = array![[1f32, 2., 3., 4., 5.], [1., 4., 9., 16., 100.]];
    let pearson = xx.pearson_rows();
    let spearman = xx.spearman_rows();
    assert!(pearson[[0, 1]] < 0.99);
    assert_abs_diff_eq!(spearman[[0, 1]], 1.0, epsilon = 1e-9);
}

#[test]
fn spearman_with_ties() {
    let xx = array![[1f32, 2., 2., 3.], [1., 2., 3., 4.]];
    let ranks = xx.rank_rows();
    assert_eq!(ranks.row(0).to_vec(), vec![1., 2.5, 2.5, 4.]);

    // pearson of (1, 2.5, 2.5, 4) vs (1, 2, 3, 4)
    let expected = 4.5 / (4.5f64 * 5.0).sqrt();
    assert_abs_diff_eq!(xx.spearman_rows()[[0, 1]], expected, epsilon = 1e-9);
}

#[test]
fn constant_row_scores_zero() {
    let xx = array![[1f32, 1., 1.], [1., 2., 3.]];
    let corr = xx.pearson_rows();
    assert_eq!(corr[[0, 0]], 1.0);
    assert_eq!(corr[[0, 1]], 0.0);
    assert_eq!(corr[[1, 0]], 0.0);
}
