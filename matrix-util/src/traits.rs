use crate::common_io::Delimiter;
use candle_util::candle_core::{Device, Tensor};

/// A matrix with row and column names
pub struct MatWithNames<T> {
    pub rows: Vec<Box<str>>,
    pub cols: Vec<Box<str>>,
    pub mat: T,
}

/// Reading off from `Tensor`
pub trait ConvertMatOps {
    type Mat;
    type Scalar;

    fn from_tensor(_: &Tensor) -> anyhow::Result<Self::Mat>;
    fn to_tensor(&self, dev: &Device) -> anyhow::Result<Tensor>;
}

/// Element-wise and row-wise rescaling
pub trait MatOps {
    type Mat;
    type Scalar;

    /// Whether any element is strictly negative
    fn any_negative(&self) -> bool;

    /// Whether every element is finite
    fn all_finite(&self) -> bool;

    /// `x -> log2(1 + x)`
    fn log2_1p_inplace(&mut self);

    /// `x -> (x - min) / (max - min + eps)` within each row
    fn minmax_rows_inplace(&mut self, eps: Self::Scalar);

    /// Replace NaN and infinite values with zero, returning how many
    /// were replaced
    fn finite_or_zero_inplace(&mut self) -> usize;

    /// Concatenate columns of matrices with the same number of rows
    fn concatenate_columns(mats: &[&Self::Mat]) -> anyhow::Result<Self::Mat>;
}

/// Correlation between the rows of a matrix
pub trait CorrelationOps {
    type Out;

    /// Pearson correlation of every pair of rows
    fn pearson_rows(&self) -> Self::Out;

    /// Spearman (rank) correlation of every pair of rows
    fn spearman_rows(&self) -> Self::Out;

    /// Replace each row with its average ranks (ties share the mean
    /// of their 1-based positions)
    fn rank_rows(&self) -> Self::Out;

    /// Rows whose values are all the same
    fn zero_variance_rows(&self) -> Vec<usize>;
}

/// Read matrices from files
pub trait IoOps {
    type Scalar;
    type Mat;

    /// Read a matrix whose first column holds row names
    ///
    /// * `file` - file name--either gzipped or not
    /// * `delim` - delimiter between the fields
    /// * `hdr_line` - location of a header line to skip (column names)
    fn read_data_with_row_names(
        file: &str,
        delim: impl Into<Delimiter>,
        hdr_line: Option<usize>,
    ) -> anyhow::Result<MatWithNames<Self::Mat>>;

    fn from_tsv_with_row_names(
        tsv_file: &str,
        hdr_line: Option<usize>,
    ) -> anyhow::Result<MatWithNames<Self::Mat>> {
        Self::read_data_with_row_names(tsv_file, "\t", hdr_line)
    }

    fn from_csv_with_row_names(
        csv_file: &str,
        hdr_line: Option<usize>,
    ) -> anyhow::Result<MatWithNames<Self::Mat>> {
        Self::read_data_with_row_names(csv_file, ",", hdr_line)
    }
}
