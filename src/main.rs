use anyhow::Result;
use clap::Parser;
use cooc_embeddings::{Config, Pipeline};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Word embeddings from a cooccurrence matrix.
///
/// Log transforms and centers the matrix, keeps its leading principal directions,
/// and evaluates the resulting embeddings on similarity and analogy queries.
#[derive(Parser)]
#[command(name = "cooc_embeddings", version, about)]
struct Cli {
    /// Path to the json configuration
    config: PathBuf,
}

fn main() -> Result<()> {

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cooc_embeddings=info")),
        )
        .init();

    let cli = Cli::parse();

    info!("building parameters...");
    let params = Config::new(&cli.config)?.get_params();

    let timer = Instant::now();
    let output = Pipeline::run(&params)?;

    println!("Variance explained by the first {} components: {:.4}", output.model.spectrum.k(), output.model.spectrum.explained_variance());
    if let Some(report) = &output.analogy_report {
        println!("Analogy accuracy: {:.4} ({} / {})", report.accuracy, report.correct.len(), report.total());
    }
    println!("Artifacts written to {}, took {} seconds", params.output_dir, timer.elapsed().as_secs());

    Ok(())
}
