
// imports
use crate::analogy::{AnalogyQuery, AnalogyReport};
use crate::config::{JsonDecompose, JsonReport, JsonTypes};
use crate::decompose::{decompose_with, Spectrum};
use crate::embedding::build_embeddings;
use crate::error::EmbeddingError;
use crate::files_handling::{read_input, save_output};
use crate::preprocess::preprocess;
use crate::similarity::{top_k_dimensions, Similarity};
use crate::vocabulary::Vocabulary;

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};


/// Everything the pipeline derives from one cooccurrence matrix.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Model {
    pub spectrum: Spectrum,
    pub similarity: Similarity,
}

/// The words that dominate one principal axis.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentSummary {
    pub index: usize, // 1 based
    pub singular_value: f64,
    pub top_words: Vec<String>,
}

/// Words placed on the axis `emb(axis[0]) - emb(axis[1])`, sorted by their projection.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionSeries {
    pub axis: [String; 2],
    pub points: Vec<(String, f64)>,
}

impl Model {

    pub fn vocabulary(&self) -> &Vocabulary {
        self.similarity.vocabulary()
    }

    pub fn component_summaries(&self, top_words: usize) -> Result<Vec<ComponentSummary>, EmbeddingError> {

        let vocab = self.vocabulary();
        (0..self.spectrum.k())
            .map(|j| {
                let words = top_k_dimensions(self.spectrum.component(j), vocab, top_words)?;
                Ok(ComponentSummary {
                    index: j + 1,
                    singular_value: self.spectrum.singular_values[j],
                    top_words: words.into_iter().map(|w| w.to_owned()).collect(),
                })
            })
            .collect()
    }

    pub fn projection_series<S: AsRef<str>>(&self, words: &[S], axis: [&str; 2]) -> Result<ProjectionSeries, EmbeddingError> {

        let direction = &self.similarity.lookup(axis[0])? - &self.similarity.lookup(axis[1])?;
        let values = self.similarity.project(words, direction.view())?;

        let mut points: Vec<(String, f64)> = words
            .iter()
            .map(|w| w.as_ref().to_owned())
            .zip(values)
            .collect();
        points.sort_by(|(_, a), (_, b)| a.total_cmp(b));

        Ok(ProjectionSeries {
            axis: [axis[0].to_owned(), axis[1].to_owned()],
            points: points,
        })
    }
}

pub struct RunOutput {
    pub model: Model,
    pub analogy_report: Option<AnalogyReport>,
}

pub struct Pipeline {}

impl Pipeline {

    // the numerical core -
    // -> log1p and column centering
    // -> truncated svd
    // -> projection, column then row normalization
    pub fn fit(matrix: &Array2<f64>, vocab: Vocabulary, params: &JsonDecompose) -> Result<Model, EmbeddingError> {

        if vocab.len() != matrix.nrows() {
            return Err(EmbeddingError::shape(format!("vocabulary has {} words but the matrix has {} rows", vocab.len(), matrix.nrows())));
        }

        let timer = Instant::now();
        let mc = preprocess(matrix)?;
        info!("centered a {} x {} matrix", matrix.nrows(), matrix.ncols());

        let spectrum = decompose_with(&mc, params)?;
        let embeddings = build_embeddings(&mc, &spectrum.components)?;
        let similarity = Similarity::new(embeddings, vocab)?;

        info!("fitted {} dimensional embeddings in {} seconds", spectrum.k(), timer.elapsed().as_secs());
        Ok(Model {
            spectrum: spectrum,
            similarity: similarity,
        })
    }

    // reads the inputs named in `params`, fits, and writes every artifact to the output folder
    pub fn run(params: &JsonTypes) -> Result<RunOutput> {

        info!("{}", params);
        let output_dir = Path::new(&params.output_dir);

        let timer = Instant::now();
        let matrix = read_input::<Array2<f64>>(Path::new(&params.matrix_file))
            .with_context(|| format!("reading cooccurrence matrix {}", params.matrix_file))?;
        let vocab = read_input::<Vocabulary>(Path::new(&params.dictionary_file))
            .with_context(|| format!("reading dictionary {}", params.dictionary_file))?;
        info!("loaded {} x {} matrix and {} words in {} seconds", matrix.nrows(), matrix.ncols(), vocab.len(), timer.elapsed().as_secs());

        let model = Pipeline::fit(&matrix, vocab, &params.decompose).context("fitting embeddings")?;
        info!("first {} components explain {:.4} of the variance", model.spectrum.k(), model.spectrum.explained_variance());

        // every query runs before the first write, a failed run leaves no partial artifacts
        let analogy_report = match &params.analogy_file {
            Some(analogy_file) => {
                let queries = read_input::<Vec<AnalogyQuery>>(Path::new(analogy_file))
                    .with_context(|| format!("reading analogy task {}", analogy_file))?;
                Some(model.similarity.score_analogy_batch(&queries).context("scoring analogy task")?)
            },
            None => None
        };
        let summaries = model.component_summaries(params.report.top_words)?;
        let projections = Pipeline::probe(&model, &params.report)?;

        save_output(output_dir, "singular_values", &model.spectrum.singular_values)?;
        save_output(output_dir, "components", &model.spectrum.components)?;
        save_output(output_dir, "embeddings", &model.similarity.vectors().to_owned())?;
        save_output(output_dir, "model", &model)?;
        save_output(output_dir, "info_ev", summaries.as_slice())?;
        for (i, series) in projections.iter().enumerate() {
            save_output(output_dir, &format!("projections_{}", i + 1), series)?;
        }
        if let Some(report) = &analogy_report {
            save_output(output_dir, "pred", report)?;
        }

        Ok(RunOutput {
            model: model,
            analogy_report: analogy_report,
        })
    }

    // exploratory queries from the report section, unknown words are skipped
    fn probe(model: &Model, report: &JsonReport) -> Result<Vec<ProjectionSeries>> {

        let vocab = model.vocabulary();
        let known = |word: &str| {
            let found = vocab.contains(word);
            if !found {
                warn!("'{}' is not in the vocabulary, skipping", word);
            }
            found
        };

        for word in report.probe_words.iter().filter(|w| known(w.as_str())) {
            info!("most similar word of '{}': {}", word, model.similarity.most_similar(word)?);
        }

        for [wd1, wd2, wd3] in &report.analogy_probes {
            if known(wd1.as_str()) && known(wd2.as_str()) && known(wd3.as_str()) {
                let wd4 = model.similarity.resolve_analogy(wd1, wd2, wd3)?;
                info!("'{}' is to '{}' as '{}' is to '{}'", wd1, wd2, wd3, wd4);
            }
        }

        let [a, b] = &report.projection_axis;
        if !(known(a.as_str()) && known(b.as_str())) {
            return Ok(Vec::new());
        }
        let mut projections = Vec::with_capacity(report.projection_sets.len());
        for words in &report.projection_sets {
            let words = words.iter().filter(|w| known(w.as_str())).cloned().collect::<Vec<String>>();
            projections.push(model.projection_series(&words, [a.as_str(), b.as_str()])?);
        }

        Ok(projections)
    }
}
