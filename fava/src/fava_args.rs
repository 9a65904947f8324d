use fava::fava_common::*;
use fava::fava_input::{DataType, ExpressionMatrix};
use fava::fava_output::write_pairs;
use fava::fit_fava::*;
use fava::pair_similarity::CorrelationType;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Clone, Debug, PartialEq)]
#[clap(rename_all = "lowercase")]
pub enum ComputeDevice {
    Cpu,
    Cuda,
    Metal,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "FAVA",
    long_about = "Functional Associations using Variational Autoencoders\n\
		  Learn a latent representation of each row (gene/protein)\n\
		  and report the most correlated pairs of rows.\n\
		  (1) Normalize each row onto [0, 1]\n\
		  (2) Train a variational autoencoder on the rows\n\
		  (3) Correlate the rows in the latent space\n"
)]
pub struct FavaArgs {
    #[arg(
        required = true,
        help = "Input data file",
        long_help = "Input data file (rows x columns).\n\
		     The first line is a header and the first field of each\n\
		     line is the row name. `.gz` files are read through gzip."
    )]
    input_file: Box<str>,

    #[arg(
        required = true,
        help = "Output file",
        long_help = "Output file with `A B score` on each line.\n\
		     `.gz` will be compressed; `stdout` prints to the console."
    )]
    output_file: Box<str>,

    #[arg(
        long,
        short = 't',
        value_enum,
        default_value = "tsv",
        help = "Input data type",
        long_help = "Delimiter of the input file.\n\
		     Options: tsv, csv."
    )]
    data_type: DataType,

    #[arg(
        long,
        short = 'n',
        default_value_t = DEFAULT_INTERACTION_COUNT,
        help = "Number of top pairs",
        long_help = "Number of top-scoring pairs to report.\n\
		     Both directions of each pair are counted.\n\
		     Ignored if --correlation-cutoff is given."
    )]
    interaction_count: usize,

    #[arg(
        long,
        short = 'c',
        alias = "cc-cutoff",
        help = "Correlation cutoff",
        long_help = "Report every pair with score >= this cutoff.\n\
		     Takes precedence over --interaction-count."
    )]
    correlation_cutoff: Option<f64>,

    #[arg(
        long,
        short = 'd',
        help = "Hidden layer dimension",
        long_help = "Size of the hidden layer.\n\
		     Default: 1000 for >= 2000 columns, 500 for > 500, 50 otherwise."
    )]
    hidden_layer: Option<usize>,

    #[arg(
        long,
        short = 'l',
        help = "Latent dimension",
        long_help = "Size of the latent space.\n\
		     Default: 100 for hidden >= 1000, 50 for >= 500, 5 otherwise."
    )]
    latent_dim: Option<usize>,

    #[arg(
        long,
        short = 'e',
        default_value_t = DEFAULT_EPOCHS,
        help = "Number of training epochs"
    )]
    epochs: usize,

    #[arg(
        long,
        short = 'b',
        default_value_t = DEFAULT_BATCH_SIZE,
        help = "Minibatch size",
        long_help = "Minibatch size for training and encoding.\n\
		     Must not exceed the number of rows."
    )]
    batch_size: usize,

    #[arg(
        long,
        short = 'r',
        alias = "cor",
        value_enum,
        default_value = "pearson",
        help = "Correlation type",
        long_help = "Correlation between the latent features.\n\
		     Options: pearson, spearman."
    )]
    correlation_type: CorrelationType,

    #[arg(
        long,
        default_value_t = false,
        help = "Skip log2 normalization",
        long_help = "Do not apply log2(1 + x) before min-max scaling.\n\
		     log2 is skipped anyway if the data has negative values."
    )]
    skip_log2: bool,

    #[arg(long, help = "Random seed", long_help = "Random seed for a reproducible run.")]
    seed: Option<u64>,

    #[arg(
        long,
        default_value_t = 1,
        help = "Number of threads",
        long_help = "Number of threads for numerical routines.\n\
		     0 uses all available cores."
    )]
    threads: usize,

    #[arg(
        long,
        value_enum,
        default_value = "cpu",
        help = "Candle device",
        long_help = "Candle device to use for computation.\n\
		     Options: cpu, cuda, metal."
    )]
    device: ComputeDevice,

    #[arg(
        long,
        default_value_t = 0,
        help = "A device for cuda",
        long_help = "For cuda or metal, we may want to choose a different device."
    )]
    device_no: usize,

    #[arg(
        long,
        default_value_t = 5,
        help = "Decimal places of the scores"
    )]
    precision: usize,

    #[arg(
        long,
        short,
        help = "Verbosity",
        long_help = "Enable verbose output.\n\
		     Prints the loss of each epoch and other details."
    )]
    verbose: bool,
}

pub fn run_fava(args: &FavaArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let device = match args.device {
        ComputeDevice::Metal => candle_core::Device::new_metal(args.device_no)?,
        ComputeDevice::Cuda => candle_core::Device::new_cuda(args.device_no)?,
        _ => candle_core::Device::Cpu,
    };

    let data = ExpressionMatrix::from_file(&args.input_file, args.data_type)?;

    let config = FavaConfig {
        log2_normalization: !args.skip_log2,
        hidden_layer: args.hidden_layer,
        latent_dim: args.latent_dim,
        epochs: args.epochs,
        batch_size: args.batch_size,
        interaction_count: args.interaction_count,
        correlation_type: args.correlation_type,
        correlation_cutoff: args.correlation_cutoff,
        seed: args.seed,
        num_threads: args.threads,
        device,
        verbose: args.verbose,
    };

    let pairs = cook(&data, &config)?;

    write_pairs(&pairs, &args.output_file, Some(args.precision))?;

    info!("done");
    Ok(())
}
