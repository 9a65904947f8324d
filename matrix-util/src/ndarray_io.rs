use crate::common_io::{read_lines_of_words_delim, Delimiter, ReadLinesOut};
use crate::traits::{IoOps, MatWithNames};
use log::info;
use ndarray::prelude::*;
use rayon::prelude::*;
use std::fmt::Debug;
use std::str::FromStr;

impl<T> IoOps for Array2<T>
where
    T: FromStr + Send + Sync + Copy,
    <T as FromStr>::Err: Debug,
{
    type Scalar = T;
    type Mat = Self;

    fn read_data_with_row_names(
        file: &str,
        delim: impl Into<Delimiter>,
        hdr_line: Option<usize>,
    ) -> anyhow::Result<MatWithNames<Self::Mat>> {
        let hdr_line = match hdr_line {
            Some(skip) => skip as i64,
            None => -1, // no header
        };

        let ReadLinesOut { lines, header } = read_lines_of_words_delim(file, delim, hdr_line)?;

        if lines.is_empty() {
            return Err(anyhow::anyhow!("No data in file: {}", file));
        }

        let ncols = lines[0].len().saturating_sub(1);

        if ncols == 0 {
            return Err(anyhow::anyhow!(
                "No numeric columns in file: {} (wrong delimiter?)",
                file
            ));
        }

        let rows = lines
            .par_iter()
            .enumerate()
            .map(|(i, words)| -> anyhow::Result<(Box<str>, Vec<T>)> {
                let name = words[0].clone();
                if words.len() != ncols + 1 {
                    return Err(anyhow::anyhow!(
                        "{}: row {} ({}) has {} values, expected {}",
                        file,
                        i + 1,
                        name,
                        words.len() - 1,
                        ncols
                    ));
                }
                let values = words[1..]
                    .iter()
                    .map(|v| {
                        v.parse::<T>().map_err(|e| {
                            anyhow::anyhow!(
                                "{}: row {} ({}): cannot parse '{}': {:?}",
                                file,
                                i + 1,
                                name,
                                v,
                                e
                            )
                        })
                    })
                    .collect::<anyhow::Result<Vec<T>>>()?;
                Ok((name, values))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let nrows = rows.len();
        let mut row_names = Vec::with_capacity(nrows);
        let mut data = Vec::with_capacity(nrows * ncols);
        for (name, values) in rows {
            row_names.push(name);
            data.extend(values);
        }

        let cols = header.into_iter().skip(1).collect();

        info!("read {} x {} matrix from {}", nrows, ncols, file);

        Ok(MatWithNames {
            rows: row_names,
            cols,
            mat: Array2::from_shape_vec((nrows, ncols), data)?,
        })
    }
}
