
use serde::{Deserialize, Serialize};
use std::{fmt::Display, fs::File, io::BufReader, path::Path};
use crate::error::FilesError;


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solver {
    // randomized for large inputs, full otherwise
    #[default]
    Auto,
    Full,
    Randomized,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonDecompose {
    pub n_components: usize,
    pub solver: Solver,
    pub n_oversamples: usize,
    pub n_power_iter: Option<usize>, // None picks 7, or 4 for wide k
    pub seed: u64,
    pub max_iter: usize, // svd sweeps, 0 means no limit
}

impl Default for JsonDecompose {
    fn default() -> Self {
        Self {
            n_components: 100,
            solver: Solver::Auto,
            n_oversamples: 10,
            n_power_iter: None,
            seed: 0,
            max_iter: 0,
        }
    }
}

impl Display for JsonDecompose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "decomposition hyper parameters:
        n_components: {},
        solver: {:?},
        n_oversamples: {},
        n_power_iter: {:?},
        seed: {},
        max_iter: {}",
        self.n_components, self.solver, self.n_oversamples, self.n_power_iter, self.seed, self.max_iter
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonReport {
    pub top_words: usize,
    pub probe_words: Vec<String>,
    pub projection_axis: [String; 2],
    pub projection_sets: Vec<Vec<String>>,
    pub analogy_probes: Vec<[String; 3]>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn triple(wd1: &str, wd2: &str, wd3: &str) -> [String; 3] {
    [wd1.to_string(), wd2.to_string(), wd3.to_string()]
}

impl Default for JsonReport {
    fn default() -> Self {
        Self {
            top_words: 10,
            probe_words: owned(&["learning", "university", "california"]),
            projection_axis: ["woman".to_string(), "man".to_string()],
            projection_sets: vec![
                owned(&["boy", "girl", "brother", "sister", "king", "queen", "he", "she", "john", "mary", "wall", "tree"]),
                owned(&["math", "history", "nurse", "doctor", "pilot", "teacher", "engineer", "science", "arts", "literature", "bob", "alice"]),
            ],
            analogy_probes: vec![
                triple("man", "woman", "king"),
                triple("beijing", "china", "berlin"),
                triple("boy", "girl", "husband"),
                triple("good", "better", "fast"),
                triple("go", "going", "play"),
                triple("china", "chinese", "russia"),
                triple("dog", "dogs", "dollar"),
                triple("usa", "dollar", "europe"),
                triple("austin", "texas", "seattle"),
                triple("slow", "slowly", "sudden"),
                triple("aware", "unaware", "certain"),
                triple("saying", "said", "seeing"),
                triple("car", "cars", "cat"),
            ],
        }
    }
}

impl Display for JsonReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "report parameters:
        top_words: {},
        probe_words: {:?},
        projection_axis: {:?},
        projection_sets: {},
        analogy_probes: {}",
        self.top_words, self.probe_words, self.projection_axis, self.projection_sets.len(), self.analogy_probes.len()
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonTypes {
    pub matrix_file: String,
    pub dictionary_file: String,
    #[serde(default)]
    pub analogy_file: Option<String>,
    pub output_dir: String,
    #[serde(default)]
    pub decompose: JsonDecompose,
    #[serde(default)]
    pub report: JsonReport,
}

impl Display for JsonTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        matrix_file: {}
        dictionary_file: {}
        analogy_file: {:?}
        output_dir: {}
        Using {}
        Using {}",
        self.matrix_file, self.dictionary_file, self.analogy_file, self.output_dir, self.decompose, self.report)
    }
}

pub struct Config {
    params: JsonTypes
}

impl Config {

    pub fn get_params(&self) -> JsonTypes {
        return self.params.clone()
    }

    // parse the json configuration, missing optional fields take their defaults
    pub fn new(path: &Path) -> Result<Config, FilesError> {

        let f = File::open(path).map_err(|e| FilesError::io(path.display().to_string(), e))?;
        let params: JsonTypes = serde_json::from_reader(BufReader::new(f))?;
        Ok(Self { params: params })
    }

    pub fn from_json(json: &str) -> Result<Config, FilesError> {
        let params: JsonTypes = serde_json::from_str(json)?;
        Ok(Self { params: params })
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn minimal_config_takes_defaults() {
        let json = r#"{
            "matrix_file": "co_occur.csv",
            "dictionary_file": "dictionary.txt",
            "output_dir": "Output"
        }"#;
        let params = Config::from_json(json).unwrap().get_params();

        assert_eq!(params.analogy_file, None);
        assert_eq!(params.decompose, JsonDecompose::default());
        assert_eq!(params.decompose.n_components, 100);
        assert_eq!(params.report.top_words, 10);
        assert_eq!(params.report.projection_axis, ["woman".to_string(), "man".to_string()]);
        assert_eq!(params.report.projection_sets.len(), 2);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let json = r#"{
            "matrix_file": "m.csv.gz",
            "dictionary_file": "d.txt",
            "analogy_file": "analogy_task.txt",
            "output_dir": "out",
            "decompose": { "n_components": 50, "solver": "full" },
            "report": { "top_words": 20 }
        }"#;
        let params = Config::from_json(json).unwrap().get_params();

        assert_eq!(params.analogy_file.as_deref(), Some("analogy_task.txt"));
        assert_eq!(params.decompose.n_components, 50);
        assert_eq!(params.decompose.solver, Solver::Full);
        assert_eq!(params.decompose.n_power_iter, None);
        assert_eq!(params.report.top_words, 20);
        assert_eq!(params.report.probe_words.len(), 3);
    }

    #[test]
    fn default_analogy_probes_cover_sample_set() {
        let probes = JsonReport::default().analogy_probes;
        assert_eq!(probes.len(), 13);
        assert_eq!(probes[0], ["man".to_string(), "woman".to_string(), "king".to_string()]);
        assert!(probes.contains(&["beijing".to_string(), "china".to_string(), "berlin".to_string()]));
        assert!(probes.contains(&["usa".to_string(), "dollar".to_string(), "europe".to_string()]));
    }

    #[test]
    fn explicit_power_iterations_are_kept() {
        let json = r#"{
            "matrix_file": "m.csv", "dictionary_file": "d.txt", "output_dir": "out",
            "decompose": { "solver": "randomized", "n_power_iter": 3 }
        }"#;
        let params = Config::from_json(json).unwrap().get_params();
        assert_eq!(params.decompose.n_power_iter, Some(3));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let json = r#"{ "matrix_file": "m.csv", "output_dir": "out" }"#;
        assert!(matches!(Config::from_json(json), Err(FilesError::Json(_))));
    }

    #[test]
    fn unknown_solver_is_an_error() {
        let json = r#"{
            "matrix_file": "m.csv", "dictionary_file": "d.txt", "output_dir": "out",
            "decompose": { "solver": "lanczos" }
        }"#;
        assert!(Config::from_json(json).is_err());
    }

    #[test]
    fn display_lists_parameters() {
        let params = Config::from_json(r#"{"matrix_file": "m.csv", "dictionary_file": "d.txt", "output_dir": "out"}"#)
            .unwrap()
            .get_params();
        let shown = params.to_string();
        assert!(shown.contains("matrix_file: m.csv"));
        assert!(shown.contains("n_components: 100"));
    }
}
