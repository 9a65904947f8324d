use crate::fava_common::*;
use clap::ValueEnum;
use matrix_util::traits::{IoOps, MatWithNames};
use std::collections::HashSet;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[clap(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Tsv,
    Csv,
}

impl DataType {
    pub fn delimiter(&self) -> &'static str {
        match self {
            DataType::Tsv => "\t",
            DataType::Csv => ",",
        }
    }
}

/// Entities (rows) by samples (columns) with one label per row.
/// The order of `labels` indexes every downstream array.
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    labels: Vec<Box<str>>,
    mat: Mat,
}

impl ExpressionMatrix {
    /// * `labels` - unique entity names, one per row of `mat`
    /// * `mat` - entities x samples
    pub fn new(labels: Vec<Box<str>>, mat: Mat) -> anyhow::Result<Self> {
        if labels.len() != mat.nrows() {
            return Err(anyhow::anyhow!(
                "{} labels for {} rows",
                labels.len(),
                mat.nrows()
            ));
        }

        if mat.nrows() == 0 {
            return Err(anyhow::anyhow!("no entities (rows) in the data"));
        }

        if mat.ncols() == 0 {
            return Err(anyhow::anyhow!("no samples (columns) in the data"));
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for x in labels.iter() {
            if !seen.insert(x.as_ref()) {
                return Err(anyhow::anyhow!("duplicate entity label: {}", x));
            }
        }

        Ok(Self { labels, mat })
    }

    /// Take an annotated matrix stored as samples x features, e.g.,
    /// cells by genes, and treat its features as entities.
    ///
    /// * `samples_by_features` - samples x features
    /// * `feature_labels` - one per column
    pub fn from_transposed(
        samples_by_features: &Mat,
        feature_labels: Vec<Box<str>>,
    ) -> anyhow::Result<Self> {
        Self::new(
            feature_labels,
            samples_by_features.t().as_standard_layout().to_owned(),
        )
    }

    /// Read a delimited file: the first line is a header and the
    /// first field of each line is the entity label.
    pub fn from_file(file: &str, data_type: DataType) -> anyhow::Result<Self> {
        info!("Reading {:?} data: {}", data_type, file);

        let MatWithNames { rows, cols: _, mat } =
            Mat::read_data_with_row_names(file, data_type.delimiter(), Some(0))?;

        info!("{} entities x {} samples", mat.nrows(), mat.ncols());
        Self::new(rows, mat)
    }

    pub fn labels(&self) -> &[Box<str>] {
        &self.labels
    }

    pub fn mat(&self) -> &Mat {
        &self.mat
    }

    pub fn num_entities(&self) -> usize {
        self.mat.nrows()
    }

    pub fn num_samples(&self) -> usize {
        self.mat.ncols()
    }
}
