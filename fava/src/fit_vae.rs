use crate::fava_common::*;
use crate::latent_dims::LatentDims;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use candle_util::candle_data_loader::InMemoryData;
use candle_util::candle_decoder_sigmoid::SigmoidDecoder;
use candle_util::candle_encoder_gaussian::GaussianEncoder;
use candle_util::candle_inference::TrainConfig;
use candle_util::candle_loss_functions::squared_error_loss;
use candle_util::candle_random::{init_parameters, RandomSource};
use candle_util::candle_vae_inference::{LatentStates, Vae, VaeT};
use matrix_util::traits::{ConvertMatOps, MatOps};

pub const DEFAULT_LEARNING_RATE: f32 = 1e-3;
pub const DEFAULT_CLIP_NORM: f32 = 1e-3;

pub struct VaeConfig {
    pub dims: LatentDims,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub clip_norm: Option<f32>,
    pub device: Device,
    pub verbose: bool,
}

impl VaeConfig {
    pub fn new(dims: LatentDims, epochs: usize, batch_size: usize) -> Self {
        Self {
            dims,
            epochs,
            batch_size,
            learning_rate: DEFAULT_LEARNING_RATE,
            clip_norm: Some(DEFAULT_CLIP_NORM),
            device: Device::Cpu,
            verbose: false,
        }
    }
}

/// Parameters and modules after the last epoch
pub struct TrainedVae {
    pub parameters: VarMap,
    pub encoder: GaussianEncoder,
    pub decoder: SigmoidDecoder,
    pub loss_trace: Vec<f32>,
    pub device: Device,
}

/// Host-side latent states (entities x latent)
pub struct LatentEncoding {
    pub z_mean: Mat,
    pub z_log_sigma: Mat,
    pub z: Mat,
}

fn check_batch_size(batch_size: usize, nrows: usize) -> anyhow::Result<()> {
    if batch_size == 0 || batch_size > nrows {
        return Err(anyhow::anyhow!(
            "batch size {} must be between 1 and the number of entities {}",
            batch_size,
            nrows
        ));
    }
    Ok(())
}

/// Fit a Gaussian VAE that reconstructs each row of `x`
///
/// * `x` - normalized entities x samples in `[0, 1]`
/// * `config` - layer sizes and optimization settings
/// * `rng` - drives weight init, shuffling and sampling noise
pub fn train_vae(
    x: &Mat,
    config: &VaeConfig,
    rng: &mut RandomSource,
) -> anyhow::Result<TrainedVae> {
    if !x.all_finite() {
        return Err(anyhow::anyhow!("input to the autoencoder has non-finite values"));
    }
    check_batch_size(config.batch_size, x.nrows())?;

    let dev = &config.device;
    let n_features = x.ncols();
    let LatentDims { hidden, latent } = config.dims;

    info!(
        "VAE: {} -> {} -> {} latent dimensions",
        n_features, hidden, latent
    );

    let parameters = VarMap::new();
    let param_builder = VarBuilder::from_varmap(&parameters, DType::F32, dev);

    let encoder = GaussianEncoder::new(n_features, latent, &[hidden], param_builder.clone())?;
    let decoder = SigmoidDecoder::new(n_features, latent, &[hidden], param_builder)?;

    init_parameters(&parameters, rng)?;

    let mut data = InMemoryData::new(&x.to_tensor(&Device::Cpu)?)?;

    let train_config = TrainConfig {
        learning_rate: config.learning_rate,
        clip_norm: config.clip_norm,
        batch_size: config.batch_size,
        num_epochs: config.epochs,
        device: dev.clone(),
        verbose: config.verbose,
        show_progress: true,
    };

    let loss_trace = {
        let mut vae = Vae::build(&encoder, &decoder, &parameters);
        vae.train_encoder_decoder(&mut data, &squared_error_loss, rng, &train_config)?
    };

    if let Some(last) = loss_trace.last() {
        info!("final loss after {} epochs: {}", loss_trace.len(), last);
    }

    Ok(TrainedVae {
        parameters,
        encoder,
        decoder,
        loss_trace,
        device: dev.clone(),
    })
}

impl TrainedVae {
    /// Latent states of every row of `x`, in the same order
    pub fn encode(
        &self,
        x: &Mat,
        batch_size: usize,
        rng: &mut RandomSource,
    ) -> anyhow::Result<LatentEncoding> {
        check_batch_size(batch_size, x.nrows())?;

        let mut data = InMemoryData::new(&x.to_tensor(&Device::Cpu)?)?;
        let vae = Vae::build(&self.encoder, &self.decoder, &self.parameters);

        let LatentStates { mean, lnvar, z } =
            vae.encode_latent(&mut data, rng, batch_size, &self.device)?;

        Ok(LatentEncoding {
            z_mean: Mat::from_tensor(&mean)?,
            z_log_sigma: Mat::from_tensor(&lnvar)?,
            z: Mat::from_tensor(&z)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn toy(nrow: usize, ncol: usize) -> Mat {
        Array2::from_shape_fn((nrow, ncol), |(i, j)| ((i * 7 + j * 3) % 11) as f32 / 10.)
    }

    #[test]
    fn encoding_shapes_follow_rows() -> anyhow::Result<()> {
        let x = toy(9, 6);
        let dims = LatentDims { hidden: 4, latent: 2 };
        let config = VaeConfig::new(dims, 2, 4);
        let mut rng = RandomSource::new(Some(1));

        let trained = train_vae(&x, &config, &mut rng)?;
        assert_eq!(trained.loss_trace.len(), 2);
        assert!(trained.loss_trace.iter().all(|l| l.is_finite()));

        let enc = trained.encode(&x, 4, &mut rng)?;
        assert_eq!(enc.z_mean.dim(), (9, 2));
        assert_eq!(enc.z_log_sigma.dim(), (9, 2));
        assert_eq!(enc.z.dim(), (9, 2));
        Ok(())
    }

    #[test]
    fn rejects_bad_inputs() {
        let dims = LatentDims { hidden: 4, latent: 2 };
        let mut rng = RandomSource::new(Some(1));

        let x = toy(3, 5);
        assert!(train_vae(&x, &VaeConfig::new(dims, 1, 4), &mut rng).is_err());
        assert!(train_vae(&x, &VaeConfig::new(dims, 1, 0), &mut rng).is_err());

        let mut y = toy(3, 5);
        y[[1, 1]] = f32::NAN;
        assert!(train_vae(&y, &VaeConfig::new(dims, 1, 2), &mut rng).is_err());
    }
}
