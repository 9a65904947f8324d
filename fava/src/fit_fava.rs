use crate::fava_common::*;
use crate::fava_input::ExpressionMatrix;
use crate::fit_vae::{train_vae, VaeConfig};
use crate::latent_dims::select_dims;
use crate::pair_filter::{filter_pairs, PairSelection};
use crate::pair_similarity::{latent_correlation, CorrelationType, PairTable};
use crate::routines_pre_process::normalize_expression;

use candle_core::Device;
use candle_util::candle_random::RandomSource;
use std::sync::OnceLock;

pub const DEFAULT_INTERACTION_COUNT: usize = 100_000;
pub const DEFAULT_EPOCHS: usize = 50;
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Everything `cook` needs besides the data
#[derive(Debug, Clone)]
pub struct FavaConfig {
    pub log2_normalization: bool,
    pub hidden_layer: Option<usize>,
    pub latent_dim: Option<usize>,
    pub epochs: usize,
    pub batch_size: usize,
    pub interaction_count: usize,
    pub correlation_type: CorrelationType,
    pub correlation_cutoff: Option<f64>,
    pub seed: Option<u64>,
    /// 0 means all available cores
    pub num_threads: usize,
    pub device: Device,
    pub verbose: bool,
}

impl Default for FavaConfig {
    fn default() -> Self {
        Self {
            log2_normalization: true,
            hidden_layer: None,
            latent_dim: None,
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            interaction_count: DEFAULT_INTERACTION_COUNT,
            correlation_type: CorrelationType::Pearson,
            correlation_cutoff: None,
            seed: None,
            num_threads: 1,
            device: Device::Cpu,
            verbose: false,
        }
    }
}

static THREAD_POOL: OnceLock<usize> = OnceLock::new();

/// Configure the global rayon pool once per process. Candle's CPU
/// kernels read `RAYON_NUM_THREADS`, so that is set as well.
///
/// Returns the number of threads actually in use.
pub fn init_thread_pool(num_threads: usize) -> usize {
    let requested = if num_threads == 0 {
        num_cpus::get()
    } else {
        num_threads
    };

    let actual = *THREAD_POOL.get_or_init(|| {
        std::env::set_var("RAYON_NUM_THREADS", requested.to_string());
        match rayon::ThreadPoolBuilder::new()
            .num_threads(requested)
            .build_global()
        {
            Ok(()) => requested,
            Err(e) => {
                warn!("could not configure the thread pool: {}", e);
                rayon::current_num_threads()
            }
        }
    });

    if actual != requested {
        warn!(
            "thread pool already uses {} threads; ignoring request for {}",
            actual, requested
        );
    }
    actual
}

/// Run the whole pipeline on an in-memory matrix:
/// normalize, train a VAE, encode, correlate and filter.
pub fn cook(data: &ExpressionMatrix, config: &FavaConfig) -> anyhow::Result<PairTable> {
    let nthreads = init_thread_pool(config.num_threads);
    info!("using {} thread(s)", nthreads);

    let num_entities = data.num_entities();
    if config.batch_size == 0 || config.batch_size > num_entities {
        return Err(anyhow::anyhow!(
            "batch size {} must be between 1 and the number of entities {}",
            config.batch_size,
            num_entities
        ));
    }

    // 1. normalization
    let normalized = normalize_expression(data.mat(), config.log2_normalization);

    // 2. layer sizes
    let dims = select_dims(data.num_samples(), config.hidden_layer, config.latent_dim)?;
    info!(
        "hidden layer: {}, latent dimension: {}",
        dims.hidden, dims.latent
    );

    // 3. train and encode
    let mut rng = RandomSource::new(config.seed);

    let vae_config = VaeConfig {
        device: config.device.clone(),
        verbose: config.verbose,
        ..VaeConfig::new(dims, config.epochs, config.batch_size)
    };

    let trained = train_vae(&normalized.mat, &vae_config, &mut rng)?;
    let encoding = trained.encode(&normalized.mat, config.batch_size, &mut rng)?;

    // 4. similarity between the entities
    let table = latent_correlation(&encoding, data.labels(), config.correlation_type)?;

    // 5. top pairs
    let selection = PairSelection::new(config.correlation_cutoff, config.interaction_count);
    Ok(filter_pairs(table, selection))
}
