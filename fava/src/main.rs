mod fava_args;

use clap::Parser;
use fava_args::*;

fn main() -> anyhow::Result<()> {
    let args = FavaArgs::parse();
    run_fava(&args)
}
