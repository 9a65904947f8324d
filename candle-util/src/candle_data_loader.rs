use crate::candle_random::RandomSource;
use candle_core::{Device, Tensor};

pub struct MinibatchData {
    pub input: Tensor,
    pub samples: Vec<usize>,
}

/// `DataLoader` for minibatch learning
pub trait DataLoader {
    fn minibatch_data(
        &self,
        batch_idx: usize,
        target_device: &Device,
    ) -> anyhow::Result<MinibatchData>;

    fn num_minibatch(&self) -> usize;

    fn num_samples(&self) -> usize;

    /// Partition the shuffled samples into minibatches
    fn shuffle_minibatch(
        &mut self,
        batch_size: usize,
        rng: &mut RandomSource,
    ) -> anyhow::Result<()>;

    /// Partition the samples into minibatches, keeping their order
    fn ordered_minibatch(&mut self, batch_size: usize) -> anyhow::Result<()>;
}

///
/// A simple data loader for in-memory 2d matrix.  Each row will be
/// considered as a feature vector. The number of samples is the
/// number of rows.
///
pub struct InMemoryData {
    input_data: Tensor,
    minibatches: Minibatches,
}

impl InMemoryData {
    ///
    /// Create a data loader with the main data tensor `data` (n x d)
    ///
    pub fn new(data: &Tensor) -> anyhow::Result<Self> {
        let (nrows, _) = data.dims2()?;
        let rows = (0..nrows).collect();

        Ok(InMemoryData {
            input_data: data.clone(),
            minibatches: Minibatches {
                samples: rows,
                chunks: vec![],
            },
        })
    }
}

impl DataLoader for InMemoryData {
    fn minibatch_data(
        &self,
        batch_idx: usize,
        target_device: &Device,
    ) -> anyhow::Result<MinibatchData> {
        if let Some(samples) = self.minibatches.chunks.get(batch_idx) {
            let idx: Vec<u32> = samples.iter().map(|&i| i as u32).collect();
            let idx = Tensor::from_vec(idx, samples.len(), self.input_data.device())?;
            let input = self
                .input_data
                .index_select(&idx, 0)?
                .to_device(target_device)?;
            Ok(MinibatchData {
                input,
                samples: samples.clone(),
            })
        } else {
            Err(anyhow::anyhow!(
                "invalid index = {} vs. total # = {}",
                batch_idx,
                self.num_minibatch()
            ))
        }
    }

    fn num_minibatch(&self) -> usize {
        self.minibatches.chunks.len()
    }

    fn num_samples(&self) -> usize {
        self.minibatches.size()
    }

    fn shuffle_minibatch(
        &mut self,
        batch_size: usize,
        rng: &mut RandomSource,
    ) -> anyhow::Result<()> {
        check_batch_size(batch_size, self.num_samples())?;
        self.minibatches.shuffle_minibatch(batch_size, rng);
        Ok(())
    }

    fn ordered_minibatch(&mut self, batch_size: usize) -> anyhow::Result<()> {
        check_batch_size(batch_size, self.num_samples())?;
        self.minibatches.ordered_minibatch(batch_size);
        Ok(())
    }
}

fn check_batch_size(batch_size: usize, nsamples: usize) -> anyhow::Result<()> {
    if batch_size == 0 {
        return Err(anyhow::anyhow!("batch size must be positive"));
    }
    if batch_size > nsamples {
        return Err(anyhow::anyhow!(
            "batch size {} exceeds the number of samples {}",
            batch_size,
            nsamples
        ));
    }
    Ok(())
}

///
/// A helper `struct` for shuffling and creating minibatch indexes;
/// after `shuffle_minibatch` is called, `chunks` partition indexes.
///
pub struct Minibatches {
    samples: Vec<usize>,
    pub chunks: Vec<Vec<usize>>,
}

impl Minibatches {
    /// Every sample is visited exactly once; the last chunk may be
    /// shorter than `batch_size`.
    pub fn shuffle_minibatch(&mut self, batch_size: usize, rng: &mut RandomSource) {
        let mut samples = (0..self.size()).collect::<Vec<_>>();
        rng.shuffle(&mut samples);
        self.samples = samples;
        self.chunks = self
            .samples
            .chunks(batch_size)
            .map(|c| c.to_vec())
            .collect();
    }

    pub fn ordered_minibatch(&mut self, batch_size: usize) {
        self.samples = (0..self.size()).collect();
        self.chunks = self
            .samples
            .chunks(batch_size)
            .map(|c| c.to_vec())
            .collect();
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffled_chunks_partition_rows() -> anyhow::Result<()> {
        let x = Tensor::arange(0f32, 30f32, &Device::Cpu)?.reshape((10, 3))?;
        let mut data = InMemoryData::new(&x)?;
        let mut rng = RandomSource::new(Some(3));
        data.shuffle_minibatch(4, &mut rng)?;
        assert_eq!(data.num_minibatch(), 3);

        let mut seen = vec![];
        for b in 0..data.num_minibatch() {
            let mb = data.minibatch_data(b, &Device::Cpu)?;
            let rows = mb.input.to_vec2::<f32>()?;
            for (row, &i) in rows.iter().zip(mb.samples.iter()) {
                assert_eq!(row[0], (3 * i) as f32);
            }
            seen.extend(mb.samples);
        }
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn batch_size_checked() -> anyhow::Result<()> {
        let x = Tensor::zeros((3, 2), candle_core::DType::F32, &Device::Cpu)?;
        let mut data = InMemoryData::new(&x)?;
        assert!(data.ordered_minibatch(4).is_err());
        assert!(data.ordered_minibatch(0).is_err());
        data.ordered_minibatch(3)?;
        assert_eq!(data.num_minibatch(), 1);
        Ok(())
    }
}
