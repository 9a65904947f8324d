use candle_core::{Result, Tensor};

/// Weight on the reconstruction term of `vae_loss`
pub const RECONSTRUCTION_WEIGHT: f64 = 0.9;

/// Weight on the KL term of `vae_loss`
pub const KL_WEIGHT: f64 = 0.1;

/// KL divergence loss between the latent Gaussian and `N(0, 1)`
///
/// -0.5 * sum_k (1 + log(sigma^2) - mu^2 - sigma^2)
///
/// * `z_mean` - mean of Gaussian distribution
/// * `z_lnvar` - log variance of Gaussian distribution
///
pub fn gaussian_kl_loss(z_mean: &Tensor, z_lnvar: &Tensor) -> Result<Tensor> {
    let z_var = z_lnvar.exp()?;
    (z_var - 1. + z_mean.sqr()? - z_lnvar)?.sum(z_mean.rank() - 1)? * 0.5
}

/// Squared reconstruction error, i.e., mean squared error times the
/// number of features
///
/// loss(i) = sum_w [ x(i,w) - xhat(i,w) ]^2
///
/// * `x_nd` - data tensor (observed data)
/// * `hat_nd` - reconstruction tensor
///
pub fn squared_error_loss(x_nd: &Tensor, hat_nd: &Tensor) -> Result<Tensor> {
    x_nd.sub(hat_nd)?.sqr()?.sum(x_nd.rank() - 1)
}

/// Combine per-sample reconstruction and KL losses
///
/// mean_i [ 0.9 * recon(i) + 0.1 * kl(i) ]
///
pub fn vae_loss(recon_n: &Tensor, kl_n: &Tensor) -> Result<Tensor> {
    ((recon_n * RECONSTRUCTION_WEIGHT)? + (kl_n * KL_WEIGHT)?)?.mean_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn kl_vanishes_at_standard_normal() -> Result<()> {
        let dev = Device::Cpu;
        let mean = Tensor::zeros((3, 4), candle_core::DType::F32, &dev)?;
        let lnvar = Tensor::zeros((3, 4), candle_core::DType::F32, &dev)?;
        let kl = gaussian_kl_loss(&mean, &lnvar)?.to_vec1::<f32>()?;
        assert_eq!(kl.len(), 3);
        assert!(kl.iter().all(|&v| v.abs() < 1e-6));
        Ok(())
    }

    #[test]
    fn kl_matches_closed_form() -> Result<()> {
        let dev = Device::Cpu;
        let mean = Tensor::new(&[[1f32, -2f32]], &dev)?;
        let lnvar = Tensor::new(&[[0.5f32, -1f32]], &dev)?;
        let kl = gaussian_kl_loss(&mean, &lnvar)?.to_vec1::<f32>()?;
        let expected = -0.5
            * ((1. + 0.5 - 1. - 0.5f32.exp()) + (1. - 1. - 4. - (-1f32).exp()));
        assert!((kl[0] - expected).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn squared_error_is_mse_times_features() -> Result<()> {
        let dev = Device::Cpu;
        let x = Tensor::new(&[[0f32, 1., 0.5, 0.25]], &dev)?;
        let hat = Tensor::new(&[[0.5f32, 0.5, 0.5, 0.5]], &dev)?;
        let loss = squared_error_loss(&x, &hat)?.to_vec1::<f32>()?;
        let mse = (0.25 + 0.25 + 0. + 0.0625) / 4.;
        assert!((loss[0] - mse * 4.).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn weighted_total() -> Result<()> {
        let dev = Device::Cpu;
        let recon = Tensor::new(&[1f32, 3.], &dev)?;
        let kl = Tensor::new(&[2f32, 4.], &dev)?;
        let loss = vae_loss(&recon, &kl)?.to_scalar::<f32>()?;
        assert!((loss - (0.9 * 2. + 0.1 * 3.)).abs() < 1e-6);
        Ok(())
    }
}
