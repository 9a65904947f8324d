/// Layer sizes of the autoencoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatentDims {
    pub hidden: usize,
    pub latent: usize,
}

/// Hidden layer size by the number of input features
///
/// At the boundaries the `>=` bucket wins: 2000 -> 1000, 500 -> 50.
pub fn default_hidden_dim(original_dim: usize) -> usize {
    if original_dim >= 2000 {
        1000
    } else if original_dim > 500 {
        500
    } else {
        50
    }
}

/// Latent size by the hidden layer size: 1000 -> 100, 500 -> 50.
pub fn default_latent_dim(hidden_dim: usize) -> usize {
    if hidden_dim >= 1000 {
        100
    } else if hidden_dim >= 500 {
        50
    } else {
        5
    }
}

/// Fill in whichever of `hidden`, `latent` the user did not give
pub fn select_dims(
    original_dim: usize,
    hidden: Option<usize>,
    latent: Option<usize>,
) -> anyhow::Result<LatentDims> {
    let hidden = hidden.unwrap_or_else(|| default_hidden_dim(original_dim));
    let latent = latent.unwrap_or_else(|| default_latent_dim(hidden));

    if hidden == 0 {
        return Err(anyhow::anyhow!("hidden layer dimension must be positive"));
    }

    if latent == 0 {
        return Err(anyhow::anyhow!("latent dimension must be positive"));
    }

    Ok(LatentDims { hidden, latent })
}
