
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::error::EmbeddingError;


// ordered words, index i is row/column i of the cooccurrence matrix.
// serialized as the plain word list, the lookup map is rebuilt on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    words: Vec<String>,
    t2i: HashMap<String, usize>,
}

impl Vocabulary {

    pub fn new(words: Vec<String>) -> Vocabulary {

        // first occurrence wins if a word is repeated
        let mut t2i: HashMap<String, usize> = HashMap::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            t2i.entry(word.to_owned()).or_insert(i);
        }

        Self {
            words: words,
            t2i: t2i
        }
    }

    pub fn index_of(&self, word: &str) -> Result<usize, EmbeddingError> {
        match self.t2i.get(word) {
            Some(i) => Ok(*i),
            None => Err(EmbeddingError::word_not_found(word))
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.t2i.contains_key(word)
    }

    pub fn word(&self, i: usize) -> Option<&str> {
        self.words.get(i).map(|w| w.as_str())
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(words: Vec<String>) -> Self {
        Vocabulary::new(words)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.words
    }
}
