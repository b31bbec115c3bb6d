use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rust_mnist::export;
use rust_mnist::parsing::mnist;
use rust_mnist::parsing::prepare::{Element, Precision};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the train-*-ubyte and t10k-*-ubyte IDX files
    #[arg(short, long)]
    data_dir: PathBuf,

    /// Fraction of the training file held out (from the end) for validation
    #[arg(short, long, default_value_t = 0.1)]
    valid_split: f64,

    /// Floating point width of the prepared matrices
    #[arg(short, long, value_enum, default_value_t = Precision::F64)]
    precision: Precision,

    /// Write the prepared matrices as CSV files
    /// together with a JSON manifest into this directory
    #[arg(short, long, default_value = None)]
    export_dir: Option<PathBuf>,
}

fn run<T: Element>(args: &Args) -> Result<()> {
    let splits = mnist::load_all::<T>(&args.data_dir, args.valid_split)
        .with_context(|| format!("Unable to load MNIST from {}", args.data_dir.display()))?;

    for shape in export::shapes(&splits) {
        info!(
            "{}: inputs {}x{}, targets {}x{}",
            shape.split, shape.rows, shape.input_cols, shape.rows, shape.target_cols
        );
    }

    if let Some(export_dir) = &args.export_dir {
        export::export_splits(export_dir, &splits, args.precision, args.valid_split)
            .with_context(|| format!("Unable to export to {}", export_dir.display()))?;
        info!("wrote prepared matrices to {}", export_dir.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.precision {
        Precision::F32 => run::<f32>(&args),
        Precision::F64 => run::<f64>(&args),
    }
}
