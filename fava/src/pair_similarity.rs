use crate::fava_common::*;
use crate::fit_vae::LatentEncoding;

use clap::ValueEnum;
use matrix_util::traits::{CorrelationOps, MatOps};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[clap(rename_all = "lowercase")]
pub enum CorrelationType {
    #[default]
    Pearson,
    Spearman,
}

/// One ordered pair of entities, indexing `PairTable::labels`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    pub left: usize,
    pub right: usize,
    pub score: f64,
}

/// Scored pairs with the entity labels they refer to
#[derive(Debug, Clone)]
pub struct PairTable {
    pub labels: Vec<Box<str>>,
    pub pairs: Vec<PairScore>,
}

impl PairTable {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `(left label, right label, score)` in table order
    pub fn named_pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.pairs.iter().map(|p| {
            (
                self.labels[p.left].as_ref(),
                self.labels[p.right].as_ref(),
                p.score,
            )
        })
    }

    pub fn scores(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.score).collect()
    }
}

/// Correlate entities over their concatenated latent features
/// `[z_mean, z_log_sigma, z]` and list all `E^2` ordered pairs
/// row by row, so pair `(i, j)` sits at `i * E + j`.
///
/// * `encoding` - latent states, one row per entity
/// * `labels` - entity names aligned with the rows
/// * `corr_type` - Pearson or Spearman
pub fn latent_correlation(
    encoding: &LatentEncoding,
    labels: &[Box<str>],
    corr_type: CorrelationType,
) -> anyhow::Result<PairTable> {
    let features = Mat::concatenate_columns(&[
        &encoding.z_mean,
        &encoding.z_log_sigma,
        &encoding.z,
    ])?;

    if features.nrows() != labels.len() {
        return Err(anyhow::anyhow!(
            "{} latent rows for {} labels",
            features.nrows(),
            labels.len()
        ));
    }

    let constant = features.zero_variance_rows();
    if !constant.is_empty() {
        warn!(
            "{} entities have constant latent features; their correlations are set to zero",
            constant.len()
        );
    }

    info!(
        "{:?} correlation over {} latent features",
        corr_type,
        features.ncols()
    );

    let corr = match corr_type {
        CorrelationType::Pearson => features.pearson_rows(),
        CorrelationType::Spearman => features.spearman_rows(),
    };

    let pairs = corr
        .indexed_iter()
        .map(|((left, right), &score)| PairScore { left, right, score })
        .collect();

    Ok(PairTable {
        labels: labels.to_vec(),
        pairs,
    })
}
