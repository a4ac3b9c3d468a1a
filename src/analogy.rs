
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};


/// `wd1 : wd2 :: wd3 : wd4`, the expected answer being `wd4`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalogyQuery {
    pub wd1: String,
    pub wd2: String,
    pub wd3: String,
    pub wd4: String,
}

impl AnalogyQuery {

    pub fn new(wd1: &str, wd2: &str, wd3: &str, wd4: &str) -> AnalogyQuery {
        Self {
            wd1: wd1.to_owned(),
            wd2: wd2.to_owned(),
            wd3: wd3.to_owned(),
            wd4: wd4.to_owned(),
        }
    }

    pub fn source(&self) -> [&str; 3] {
        [self.wd1.as_str(), self.wd2.as_str(), self.wd3.as_str()]
    }
}

impl FromStr for AnalogyQuery {
    type Err = String;

    // a record is exactly four whitespace separated words
    fn from_str(record: &str) -> Result<Self, Self::Err> {
        let tokens = record.split_whitespace().collect::<Vec<&str>>();
        match tokens.as_slice() {
            [wd1, wd2, wd3, wd4] => Ok(AnalogyQuery::new(wd1, wd2, wd3, wd4)),
            _ => Err(format!("expected 4 words, found {}", tokens.len()))
        }
    }
}

impl Display for AnalogyQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {} :: {} : {}", self.wd1, self.wd2, self.wd3, self.wd4)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub query: AnalogyQuery,
    pub predicted: String,
}

impl Prediction {
    pub fn is_correct(&self) -> bool {
        self.predicted == self.query.wd4
    }
}

/// Outcome of scoring a batch of analogy queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalogyReport {
    pub accuracy: f64,
    pub correct: Vec<Prediction>,
    pub incorrect: Vec<Prediction>,
}

impl AnalogyReport {
    pub fn total(&self) -> usize {
        self.correct.len() + self.incorrect.len()
    }
}
