use candle_core::{Result, Tensor};

/// Latent Gaussian states inferred for a minibatch
///
/// * `mean` - latent mean (n x k)
/// * `lnvar` - latent log-variance (n x k)
/// * `z` - one reparameterized sample (n x k)
pub struct GaussianLatent {
    pub mean: Tensor,
    pub lnvar: Tensor,
    pub z: Tensor,
}

pub trait EncoderModuleT {
    /// An encoder that spits out latent Gaussian parameters together
    /// with a sample drawn with the given noise
    ///
    /// # Arguments
    /// * `x_nd` - input data (n x d)
    /// * `eps_nk` - sampling noise (n x k)
    fn forward_t(&self, x_nd: &Tensor, eps_nk: &Tensor) -> Result<GaussianLatent>;

    fn dim_obs(&self) -> usize;

    fn dim_latent(&self) -> usize;
}

pub trait DecoderModuleT {
    /// A decoder that spits out reconstruction
    fn forward(&self, z_nk: &Tensor) -> Result<Tensor>;

    /// A decoder that spits out reconstruction and per-sample loss
    /// * `z_nk` - latent states
    /// * `x_nd` - observed data to validate with
    /// * `loss` - fn (observed, reconstruction) -> loss (n)
    fn forward_with_loss<LossFn>(
        &self,
        z_nk: &Tensor,
        x_nd: &Tensor,
        loss: &LossFn,
    ) -> Result<(Tensor, Tensor)>
    where
        LossFn: Fn(&Tensor, &Tensor) -> Result<Tensor>;

    fn dim_obs(&self) -> usize;

    fn dim_latent(&self) -> usize;
}
