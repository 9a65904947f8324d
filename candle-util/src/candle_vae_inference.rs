use crate::candle_data_loader::*;
use crate::candle_encoder_gaussian::LATENT_NOISE_SD;
use crate::candle_inference::TrainConfig;
use crate::candle_loss_functions::{gaussian_kl_loss, vae_loss};
use crate::candle_model_traits::{DecoderModuleT, EncoderModuleT};
use crate::candle_optim::ClippedAdam;
use crate::candle_random::RandomSource;

use candle_core::{Device, Result, Tensor};
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::info;

pub struct Vae<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    pub encoder: &'a Enc,
    pub decoder: &'a Dec,
    pub variable_map: &'a candle_nn::VarMap,
}

/// Latent states of all the samples, in the order of the data rows
pub struct LatentStates {
    pub mean: Tensor,
    pub lnvar: Tensor,
    pub z: Tensor,
}

pub trait VaeT<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    /// Train the VAE model
    /// * `data` - data loader should have `minibatch_data`
    /// * `loss` - reconstruction loss function (observed, recon) -> loss (n)
    /// * `rng` - random source for shuffling and sampling noise
    /// * `train_config` - training configuration
    ///
    /// Returns the average loss of each epoch
    fn train_encoder_decoder<DataL, LossFn>(
        &mut self,
        data: &mut DataL,
        loss: &LossFn,
        rng: &mut RandomSource,
        train_config: &TrainConfig,
    ) -> anyhow::Result<Vec<f32>>
    where
        DataL: DataLoader,
        LossFn: Fn(&Tensor, &Tensor) -> Result<Tensor>;

    /// Evaluate latent states without updating parameters
    /// * `data` - data loader
    /// * `rng` - random source for sampling noise
    /// * `batch_size` - number of rows per forward pass
    /// * `device` - where the model parameters live
    fn encode_latent<DataL>(
        &self,
        data: &mut DataL,
        rng: &mut RandomSource,
        batch_size: usize,
        device: &Device,
    ) -> anyhow::Result<LatentStates>
    where
        DataL: DataLoader;

    /// Build a VAE model
    /// * `encoder` - encoder module
    /// * `decoder` - decoder module
    fn build(encoder: &'a Enc, decoder: &'a Dec, variable_map: &'a candle_nn::VarMap) -> Self;
}

impl<'a, Enc, Dec> VaeT<'a, Enc, Dec> for Vae<'a, Enc, Dec>
where
    Enc: EncoderModuleT,
    Dec: DecoderModuleT,
{
    fn train_encoder_decoder<DataL, LossFn>(
        &mut self,
        data: &mut DataL,
        loss_func: &LossFn,
        rng: &mut RandomSource,
        train_config: &TrainConfig,
    ) -> anyhow::Result<Vec<f32>>
    where
        DataL: DataLoader,
        LossFn: Fn(&Tensor, &Tensor) -> Result<Tensor>,
    {
        let device = &train_config.device;
        let mut adam = ClippedAdam::new(
            self.variable_map.all_vars(),
            train_config.learning_rate.into(),
            train_config.clip_norm.map(f64::from),
        )?;

        let pb = ProgressBar::new(train_config.num_epochs as u64);

        if !train_config.show_progress || train_config.verbose {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        let n_latent = self.encoder.dim_latent();
        let mut loss_trace = vec![];

        for epoch in 0..train_config.num_epochs {
            data.shuffle_minibatch(train_config.batch_size, rng)?;

            let mut loss_tot = 0f32;

            for b in 0..data.num_minibatch() {
                let minibatch = data.minibatch_data(b, device)?;
                let x_nd = &minibatch.input;
                let eps_nk = rng.normal(minibatch.samples.len(), n_latent, LATENT_NOISE_SD, device)?;

                let latent = self.encoder.forward_t(x_nd, &eps_nk)?;
                let (_, recon_loss) = self.decoder.forward_with_loss(&latent.z, x_nd, loss_func)?;
                let kl = gaussian_kl_loss(&latent.mean, &latent.lnvar)?;
                let loss = vae_loss(&recon_loss, &kl)?;

                let loss_val = loss.to_scalar::<f32>()?;
                if !loss_val.is_finite() {
                    pb.finish_and_clear();
                    return Err(anyhow::anyhow!(
                        "non-finite loss ({}) at epoch {}, minibatch {}",
                        loss_val,
                        epoch + 1,
                        b
                    ));
                }

                adam.backward_step(&loss)?;
                loss_tot += loss_val;
            }

            loss_trace.push(loss_tot / data.num_minibatch() as f32);
            pb.inc(1);

            if train_config.verbose {
                info!(
                    "[{}] loss: {}",
                    epoch + 1,
                    loss_trace.last().ok_or(anyhow::anyhow!("loss"))?
                );
            }
        } // each epoch

        pb.finish_and_clear();
        Ok(loss_trace)
    }

    fn encode_latent<DataL>(
        &self,
        data: &mut DataL,
        rng: &mut RandomSource,
        batch_size: usize,
        device: &Device,
    ) -> anyhow::Result<LatentStates>
    where
        DataL: DataLoader,
    {
        let n_latent = self.encoder.dim_latent();

        data.ordered_minibatch(batch_size)?;

        let mut mean_vec = Vec::with_capacity(data.num_minibatch());
        let mut lnvar_vec = Vec::with_capacity(data.num_minibatch());
        let mut z_vec = Vec::with_capacity(data.num_minibatch());

        for b in 0..data.num_minibatch() {
            let minibatch = data.minibatch_data(b, device)?;
            let eps_nk = rng.normal(minibatch.samples.len(), n_latent, LATENT_NOISE_SD, device)?;
            let latent = self.encoder.forward_t(&minibatch.input, &eps_nk)?;
            mean_vec.push(latent.mean.detach().to_device(&Device::Cpu)?);
            lnvar_vec.push(latent.lnvar.detach().to_device(&Device::Cpu)?);
            z_vec.push(latent.z.detach().to_device(&Device::Cpu)?);
        }

        Ok(LatentStates {
            mean: Tensor::cat(&mean_vec, 0)?,
            lnvar: Tensor::cat(&lnvar_vec, 0)?,
            z: Tensor::cat(&z_vec, 0)?,
        })
    }

    fn build(encoder: &'a Enc, decoder: &'a Dec, variable_map: &'a candle_nn::VarMap) -> Self {
        assert_eq!(encoder.dim_obs(), decoder.dim_obs());
        assert_eq!(encoder.dim_latent(), decoder.dim_latent());

        Self {
            encoder,
            decoder,
            variable_map,
        }
    }
}
