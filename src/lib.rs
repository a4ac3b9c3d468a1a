
mod analogy;
mod config;
mod decompose;
mod embedding;
mod error;
mod preprocess;
mod similarity;
mod vocabulary;
pub mod files_handling;
pub mod pipeline;

pub use analogy::{AnalogyQuery, AnalogyReport, Prediction};
pub use config::{Config, JsonDecompose, JsonReport, JsonTypes, Solver};
pub use decompose::{decompose, decompose_with, Spectrum};
pub use embedding::{build_embeddings, normalize_columns, normalize_rows};
pub use error::{EmbeddingError, FilesError};
pub use pipeline::{Model, Pipeline, RunOutput};
pub use preprocess::{preprocess, CenteredMatrix};
pub use similarity::{top_k_dimensions, Similarity};
pub use vocabulary::Vocabulary;
