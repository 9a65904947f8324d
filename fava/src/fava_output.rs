use crate::fava_common::*;
use crate::pair_filter::round_score;
use crate::pair_similarity::PairTable;

use matrix_util::common_io::{mkdir, write_lines};

/// Write `A B score` per line, no header
///
/// * `table` - pairs in output order
/// * `file` - `.gz` is compressed; `stdout` prints to the console
/// * `precision` - decimal places to round scores to
pub fn write_pairs(
    table: &PairTable,
    file: &str,
    precision: Option<usize>,
) -> anyhow::Result<()> {
    let lines: Vec<Box<str>> = table
        .named_pairs()
        .map(|(a, b, score)| {
            let score = precision.map_or(score, |d| round_score(score, d));
            format!("{} {} {}", a, b, score).into_boxed_str()
        })
        .collect();

    if file != "stdout" && file != "stderr" {
        mkdir(file)?;
    }
    write_lines(&lines, file)?;

    info!("wrote {} pairs to {}", lines.len(), file);
    Ok(())
}
