
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::analogy::{AnalogyQuery, AnalogyReport, Prediction};
use crate::embedding::normalized;
use crate::error::EmbeddingError;
use crate::vocabulary::Vocabulary;


/// Query engine over unit-norm word embeddings.
///
/// Row `i` of `w` is the embedding of the `i`-th vocabulary word. Since every row has
/// unit length, a dot product between rows is their cosine similarity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Similarity {
    w: Array2<f64>,
    vocab: Vocabulary,
}

impl Similarity {

    pub fn new(w: Array2<f64>, vocab: Vocabulary) -> Result<Similarity, EmbeddingError> {

        if w.nrows() != vocab.len() {
            return Err(EmbeddingError::shape(format!("{} embeddings for a vocabulary of {} words", w.nrows(), vocab.len())));
        }

        Ok(Self {
            w: w,
            vocab: vocab
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vectors(&self) -> ArrayView2<'_, f64> {
        self.w.view()
    }

    pub fn dim(&self) -> usize {
        self.w.ncols()
    }

    fn token(&self, i: usize) -> &str {
        self.vocab.words()[i].as_str()
    }

    pub fn lookup(&self, word: &str) -> Result<ArrayView1<'_, f64>, EmbeddingError> {
        let i = self.vocab.index_of(word)?;
        Ok(self.w.row(i))
    }

    /// The nearest word to `word`, never `word` itself.
    pub fn most_similar(&self, word: &str) -> Result<&str, EmbeddingError> {
        let i = self.vocab.index_of(word)?;
        let best = self.most_similar_to(self.w.row(i), &[i])?;
        Ok(self.token(best))
    }

    /// Index of the row with the largest dot product with `query`, skipping `exclude`.
    ///
    /// Rows are scanned in index order and only a strictly larger score replaces the
    /// current best, so ties resolve to the lowest index.
    pub fn most_similar_to(&self, query: ArrayView1<f64>, exclude: &[usize]) -> Result<usize, EmbeddingError> {

        self.check_width(query.len())?;
        let scores = self.w.dot(&query);

        let mut best: Option<(usize, f64)> = None;
        for (i, score) in scores.iter().enumerate() {
            if exclude.contains(&i) {
                continue;
            }
            match best {
                Some((_, best_score)) if !(*score > best_score) => {},
                _ => best = Some((i, *score))
            }
        }

        match best {
            Some((i, _)) => Ok(i),
            None => Err(EmbeddingError::shape(format!("all {} words are excluded from the search", self.vocab.len())))
        }
    }

    /// The `k` best scoring words for `query` in descending order, ties by lowest index.
    pub fn find_k_most_similar(&self, query: ArrayView1<f64>, k: usize, exclude: &[usize]) -> Result<Vec<(&str, f64)>, EmbeddingError> {

        self.check_width(query.len())?;
        let scores = self.w.dot(&query);
        let mut indexed_scores: Vec<(usize, f64)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| !exclude.contains(i))
            .collect();

        if k > indexed_scores.len() {
            return Err(EmbeddingError::InvalidK { k: k, min: 0, max: indexed_scores.len() });
        }

        // sort is stable, equal scores stay in index order
        indexed_scores.sort_by(|(_i, s), (_j, t)| t.total_cmp(s));
        indexed_scores.truncate(k);

        Ok(indexed_scores.into_iter().map(|(i, s)| (self.token(i), s)).collect())
    }

    /// Dot product of each word's embedding with the unit vector along `direction`.
    pub fn project<S: AsRef<str>>(&self, words: &[S], direction: ArrayView1<f64>) -> Result<Vec<f64>, EmbeddingError> {

        self.check_width(direction.len())?;
        let unit = normalized(direction, "projection direction")?;

        words
            .iter()
            .map(|word| self.lookup(word.as_ref()).map(|e| e.dot(&unit)))
            .collect()
    }

    /// normalize(emb(wd2) - emb(wd1) + emb(wd3))
    pub fn analogy_vector(&self, wd1: &str, wd2: &str, wd3: &str) -> Result<Array1<f64>, EmbeddingError> {
        let analogy = &self.lookup(wd2)? - &self.lookup(wd1)? + &self.lookup(wd3)?;
        normalized(analogy.view(), format!("analogy vector {} - {} + {}", wd2, wd1, wd3).as_str())
    }

    /// Completes `wd1 : wd2 :: wd3 : ?`, never answering with one of the three inputs.
    pub fn resolve_analogy(&self, wd1: &str, wd2: &str, wd3: &str) -> Result<&str, EmbeddingError> {

        let ids = self.analogy_ids([wd1, wd2, wd3])?;
        let analogy = self.analogy_vector(wd1, wd2, wd3)?;
        let best = self.most_similar_to(analogy.view(), &ids)?;
        Ok(self.token(best))
    }

    // ranked candidates for an analogy, used to inspect near misses
    pub fn extract_analogies(&self, inputs: [&str; 3], k: usize) -> Result<Vec<(&str, f64)>, EmbeddingError> {

        let ids = self.analogy_ids(inputs)?;
        let analogy = self.analogy_vector(inputs[0], inputs[1], inputs[2])?;
        self.find_k_most_similar(analogy.view(), k, &ids)
    }

    pub fn score_analogy_batch(&self, queries: &[AnalogyQuery]) -> Result<AnalogyReport, EmbeddingError> {

        if queries.is_empty() {
            return Err(EmbeddingError::EmptyBatch);
        }

        let mut correct: Vec<Prediction> = Vec::new();
        let mut incorrect: Vec<Prediction> = Vec::new();
        for query in queries {
            let predicted = self.resolve_analogy(&query.wd1, &query.wd2, &query.wd3)?;
            debug!("{} ? {}", query, predicted);
            let prediction = Prediction { query: query.clone(), predicted: predicted.to_owned() };
            if prediction.is_correct() {
                correct.push(prediction);
            } else {
                incorrect.push(prediction);
            }
        }

        let accuracy = correct.len() as f64 / queries.len() as f64;
        info!("analogy accuracy {:.4} ({} / {})", accuracy, correct.len(), queries.len());

        Ok(AnalogyReport {
            accuracy: accuracy,
            correct: correct,
            incorrect: incorrect
        })
    }

    fn analogy_ids(&self, inputs: [&str; 3]) -> Result<[usize; 3], EmbeddingError> {
        Ok([
            self.vocab.index_of(inputs[0])?,
            self.vocab.index_of(inputs[1])?,
            self.vocab.index_of(inputs[2])?,
        ])
    }

    fn check_width(&self, len: usize) -> Result<(), EmbeddingError> {
        if len != self.w.ncols() {
            return Err(EmbeddingError::shape(format!("vector of length {} against embeddings of dimension {}", len, self.w.ncols())));
        }
        Ok(())
    }
}

/// The `k` words whose coefficients in `eigenvector` are largest in absolute value.
///
/// Ranked by magnitude with ties going to the lower index, though callers should treat
/// the result as an unordered set.
pub fn top_k_dimensions<'a>(eigenvector: ArrayView1<f64>, vocab: &'a Vocabulary, k: usize) -> Result<Vec<&'a str>, EmbeddingError> {

    if eigenvector.len() != vocab.len() {
        return Err(EmbeddingError::shape(format!("eigenvector of length {} for a vocabulary of {} words", eigenvector.len(), vocab.len())));
    }
    if k > vocab.len() {
        return Err(EmbeddingError::InvalidK { k: k, min: 0, max: vocab.len() });
    }

    let mut order = (0..eigenvector.len()).collect::<Vec<usize>>();
    order.sort_by(|&i, &j| eigenvector[j].abs().total_cmp(&eigenvector[i].abs()));

    Ok(order[..k].iter().map(|&i| vocab.words()[i].as_str()).collect())
}
