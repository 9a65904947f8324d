use crate::candle_aux_layers::*;
use crate::candle_model_traits::*;
use candle_core::{Result, Tensor};
use candle_nn::{ops, Linear, Module, VarBuilder};

/// Decoder mapping latent states back onto `[0, 1]` intensities
pub struct SigmoidDecoder {
    n_features: usize,
    n_latent: usize,
    fc: StackLayers<Linear>,
    recon: Linear,
}

impl DecoderModuleT for SigmoidDecoder {
    fn forward(&self, z_nk: &Tensor) -> Result<Tensor> {
        let h_nl = self.fc.forward(z_nk)?;
        ops::sigmoid(&self.recon.forward(&h_nl)?)
    }

    fn forward_with_loss<LossFn>(
        &self,
        z_nk: &Tensor,
        x_nd: &Tensor,
        loss: &LossFn,
    ) -> Result<(Tensor, Tensor)>
    where
        LossFn: Fn(&Tensor, &Tensor) -> Result<Tensor>,
    {
        let recon_nd = self.forward(z_nk)?;
        let loss_n = loss(x_nd, &recon_nd)?;
        Ok((recon_nd, loss_n))
    }

    fn dim_obs(&self) -> usize {
        self.n_features
    }

    fn dim_latent(&self) -> usize {
        self.n_latent
    }
}

impl SigmoidDecoder {
    /// Will create a new decoder module with these variables:
    ///
    /// * `nn.dec.fc.{}.weight` where {} is the layer index
    /// * `nn.dec.recon.weight`
    ///
    /// # Arguments
    /// * `n_features` - the number of output features
    /// * `n_latent` - the latent dimension
    /// * `layers` - fully connected layers, each with the dim
    /// * `vs` - variable builder
    pub fn new(n_features: usize, n_latent: usize, layers: &[usize], vs: VarBuilder) -> Result<Self> {
        let fc = relu_stack(n_latent, layers, "nn.dec.fc", &vs)?;
        let prev_dim = fc.out_dim().unwrap_or(n_latent);
        let recon = candle_nn::linear(prev_dim, n_features, vs.pp("nn.dec.recon"))?;

        Ok(Self {
            n_features,
            n_latent,
            fc,
            recon,
        })
    }
}
