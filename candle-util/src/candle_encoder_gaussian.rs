use crate::candle_aux_layers::*;
use crate::candle_model_traits::*;
use candle_core::{Result, Tensor};
use candle_nn::{Linear, Module, VarBuilder};

/// Standard deviation of the noise fed to `reparameterize`
pub const LATENT_NOISE_SD: f64 = 0.1;

pub struct GaussianEncoder {
    n_features: usize,
    n_latent: usize,
    fc: StackLayers<Linear>,
    z_mean: Linear,
    z_lnvar: Linear,
}

impl EncoderModuleT for GaussianEncoder {
    fn forward_t(&self, x_nd: &Tensor, eps_nk: &Tensor) -> Result<GaussianLatent> {
        let (mean, lnvar) = self.latent_gaussian_params(x_nd)?;
        let z = reparameterize(&mean, &lnvar, eps_nk)?;
        Ok(GaussianLatent { mean, lnvar, z })
    }

    fn dim_obs(&self) -> usize {
        self.n_features
    }

    fn dim_latent(&self) -> usize {
        self.n_latent
    }
}

///
/// z = mu + exp(log_var) * eps
///
/// Unlike the usual `exp(0.5 * log_var)`, the noise is scaled by
/// `exp(log_var)` directly; `eps` is expected to be drawn from
/// `N(0, LATENT_NOISE_SD^2)` by the caller.
///
/// # Arguments
/// * `z_mean` - mean of Gaussian distribution
/// * `z_lnvar` - log variance of Gaussian distribution
/// * `eps` - noise of the same shape
pub fn reparameterize(z_mean: &Tensor, z_lnvar: &Tensor, eps: &Tensor) -> Result<Tensor> {
    z_mean + z_lnvar.exp()?.mul(eps)?
}

impl GaussianEncoder {
    ///
    /// Evaluate latent Gaussian parameters: mu and log_var
    /// z ~ (mu(x), log_var(x))
    pub fn latent_gaussian_params(&self, x_nd: &Tensor) -> Result<(Tensor, Tensor)> {
        let h_nl = self.fc.forward(x_nd)?;
        let z_mean_nk = self.z_mean.forward(&h_nl)?;
        let z_lnvar_nk = self.z_lnvar.forward(&h_nl)?;
        Ok((z_mean_nk, z_lnvar_nk))
    }

    /// Will create a new Gaussian encoder module with these variables:
    ///
    /// * `nn.enc.fc.{}.weight` where {} is the layer index
    /// * `nn.enc.z.mean.weight`
    /// * `nn.enc.z.lnvar.weight`
    ///
    /// # Arguments
    /// * `n_features` - the number of input features
    /// * `n_latent` - the latent dimension
    /// * `layers` - fully connected layers, each with the dim
    /// * `vs` - variable builder
    pub fn new(n_features: usize, n_latent: usize, layers: &[usize], vs: VarBuilder) -> Result<Self> {
        debug_assert!(!layers.is_empty());

        // (1) data -> fc
        let fc = relu_stack(n_features, layers, "nn.enc.fc", &vs)?;
        let prev_dim = fc.out_dim().unwrap_or(n_features);

        // (2) fc -> K
        let z_mean = candle_nn::linear(prev_dim, n_latent, vs.pp("nn.enc.z.mean"))?;
        let z_lnvar = candle_nn::linear(prev_dim, n_latent, vs.pp("nn.enc.z.lnvar"))?;

        Ok(Self {
            n_features,
            n_latent,
            fc,
            z_mean,
            z_lnvar,
        })
    }
}
