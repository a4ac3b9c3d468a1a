use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use cooc_embeddings::files_handling::read_input;
use cooc_embeddings::{AnalogyQuery, Model, Similarity};
use std::fs;
use std::path::{Path, PathBuf};


// checks on a fitted model, loaded from the snapshot the pipeline saves:
// the K most similar words to a given word.
// the K best completions of an analogy.

#[derive(Parser)]
#[command(name = "query", version, about = "Similarity and analogy queries over saved embeddings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Complete analogies, one `wd1 wd2 wd3 wd4` quartet per line
    Analogies {
        input: PathBuf,
        /// Model snapshot (model.bin.gz)
        model: PathBuf,
        #[arg(short, default_value = "10")]
        k: usize,
    },

    /// Most similar words, one word per line
    Similar {
        input: PathBuf,
        /// Model snapshot (model.bin.gz)
        model: PathBuf,
        #[arg(short, default_value = "10")]
        k: usize,
    },
}

fn load(model: &Path) -> Result<Similarity> {
    let model = read_input::<Model>(model).with_context(|| format!("loading model {}", model.display()))?;
    Ok(model.similarity)
}

fn main() -> Result<()> {

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cooc_embeddings=warn")),
        )
        .init();

    match Cli::parse().command {
        Commands::Analogies { input, model, k } => {
            let inputs = read_input::<Vec<AnalogyQuery>>(&input)?;
            run_analogies(&inputs, k, &load(&model)?)
        },
        Commands::Similar { input, model, k } => {
            let text = fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let inputs = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<&str>>();
            run_similarity(&inputs, k, &load(&model)?)
        },
    }
}

fn run_analogies(inputs: &[AnalogyQuery], k: usize, similarity: &Similarity) -> Result<()> {

    // a is to b as c is to ?
    // translates to b - a + c : ?
    ensure!(!inputs.is_empty(), "no analogies to complete");

    let mut hits = 0;
    for query in inputs {

        let analogies = similarity.extract_analogies(query.source(), k)?;
        let mut found_target = false;
        for (i, (analogy, score)) in analogies.iter().enumerate() {
            println!("{} : {} - {} + {} ? {} = {:.4}", i, query.wd2, query.wd1, query.wd3, analogy, score);
            if *analogy == query.wd4 {
                found_target = true;
                if i == 0 { hits += 1; }
                println!("found target '{}' analogy in place {}", query.wd4, 1 + i);
            }
        }

        if !found_target {
            println!("target '{}' was not found within the first {} analogies", query.wd4, k);
        }
        println!();
    }

    println!("top-1 accuracy: {:.4} ({} / {})", hits as f64 / inputs.len() as f64, hits, inputs.len());
    Ok(())
}

fn run_similarity(inputs: &[&str], k: usize, similarity: &Similarity) -> Result<()> {

    for token in inputs {

        println!("searching {} most similar words to {}", k, token);
        let i = similarity.vocabulary().index_of(token)?;
        let vec = similarity.lookup(token)?;
        let similarities = similarity.find_k_most_similar(vec, k, &[i])?;
        for (rank, (similar_token, score)) in similarities.iter().enumerate() {
            println!("{} : {} ? {} = {:.4}", rank, token, similar_token, score);
        }
        println!();
    }

    Ok(())
}
