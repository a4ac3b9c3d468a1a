
// reading the pipeline inputs and writing its artifacts and reports.
// every format lives behind `ReadFile` / `SaveFile` so callers only go through
// `read_input` and `save_output`.

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, write_npy};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use crate::analogy::{AnalogyQuery, AnalogyReport, Prediction};
use crate::error::{EmbeddingError, FilesError};
use crate::pipeline::{ComponentSummary, Model, ProjectionSeries};
use crate::vocabulary::Vocabulary;


pub fn read_input<R: ReadFile>(file_path: &Path) -> Result<R, FilesError> {
    R::read_file(file_path)
}

pub fn save_output<S: SaveFile + ?Sized>(output_dir: &Path, file_name: &str, item: &S) -> Result<(), FilesError> {

    fs::create_dir_all(output_dir).map_err(|e| FilesError::io(output_dir.display().to_string(), e))?;
    item.save_file(output_dir, file_name)
}

pub trait ReadFile: Sized {
    fn read_file(file_path: &Path) -> Result<Self, FilesError>;
}

pub trait SaveFile {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<(), FilesError>;
}

fn open(file_path: &Path) -> Result<File, FilesError> {
    File::open(file_path).map_err(|e| FilesError::io(file_path.display().to_string(), e))
}

fn create(file_path: &Path) -> Result<BufWriter<File>, FilesError> {
    let f = File::create(file_path).map_err(|e| FilesError::io(file_path.display().to_string(), e))?;
    Ok(BufWriter::new(f))
}

fn read_text(file_path: &Path) -> Result<String, FilesError> {
    let mut text = String::new();
    open(file_path)?
        .read_to_string(&mut text)
        .map_err(|e| FilesError::io(file_path.display().to_string(), e))?;
    Ok(text)
}

fn has_extension(file_path: &Path, ext: &str) -> bool {
    file_path.extension().map_or(false, |e| e == ext)
}

// write a text file, io errors carry the path
fn write_text<F>(file_path: &Path, body: F) -> Result<(), FilesError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut f = create(file_path)?;
    body(&mut f)
        .and_then(|_| f.flush())
        .map_err(|e| FilesError::io(file_path.display().to_string(), e))
}

// the cooccurrence matrix: headerless csv, optionally gzipped, or npy
impl ReadFile for Array2<f64> {
    fn read_file(file_path: &Path) -> Result<Self, FilesError> {

        if has_extension(file_path, "npy") {
            return Ok(read_npy(file_path)?);
        }

        let f = BufReader::new(open(file_path)?);
        let reader: Box<dyn Read> = if has_extension(file_path, "gz") {
            Box::new(GzDecoder::new(f))
        } else {
            Box::new(f)
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let path = file_path.display().to_string();
        let mut data: Vec<f64> = Vec::new();
        let mut n_cols: Option<usize> = None;
        let mut n_rows = 0;

        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map_or(n_rows + 1, |p| p.line() as usize);

            match n_cols {
                None => n_cols = Some(record.len()),
                Some(n) if n != record.len() => {
                    return Err(FilesError::parse(&path, line, format!("expected {} values, found {}", n, record.len())));
                },
                _ => {}
            }

            for field in record.iter() {
                let x = field
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| FilesError::parse(&path, line, format!("'{}': {}", field, e)))?;
                data.push(x);
            }
            n_rows += 1;
        }

        let shape = (n_rows, n_cols.unwrap_or(0));
        Array2::from_shape_vec(shape, data)
            .map_err(|e| FilesError::from(EmbeddingError::shape(e.to_string())))
    }
}

// one word per line
impl ReadFile for Vocabulary {
    fn read_file(file_path: &Path) -> Result<Self, FilesError> {
        let text = read_text(file_path)?;
        let words = text.lines().map(|line| line.trim().to_string()).collect::<Vec<String>>();
        Ok(Vocabulary::new(words))
    }
}

// one `wd1 wd2 wd3 wd4` record per line, `:` lines are section headers
impl ReadFile for Vec<AnalogyQuery> {
    fn read_file(file_path: &Path) -> Result<Self, FilesError> {

        let text = read_text(file_path)?;
        let path = file_path.display().to_string();

        let mut queries: Vec<AnalogyQuery> = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let query = line.parse::<AnalogyQuery>().map_err(|m| FilesError::parse(&path, i + 1, m))?;
            queries.push(query);
        }
        Ok(queries)
    }
}

impl ReadFile for Model {
    fn read_file(file_path: &Path) -> Result<Self, FilesError> {
        let reader = GzDecoder::new(BufReader::new(open(file_path)?));
        let model: Model = bincode::deserialize_from(reader)?;
        Ok(model)
    }
}

pub fn output_path(output_dir: &Path, file_name: &str, ext: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", file_name, ext))
}

impl SaveFile for Array2<f64> {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<(), FilesError> {
        write_npy(output_path(output_dir, file_name, "npy"), self)?;
        Ok(())
    }
}

impl SaveFile for Array1<f64> {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<(), FilesError> {
        write_npy(output_path(output_dir, file_name, "npy"), self)?;
        Ok(())
    }
}

// gzipped bincode snapshot, read back by the query tool
impl SaveFile for Model {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<(), FilesError> {

        let out = output_path(output_dir, file_name, "bin.gz");
        let mut writer = GzEncoder::new(create(&out)?, Compression::default());
        bincode::serialize_into(&mut writer, self)?;
        writer
            .finish()
            .and_then(|mut f| f.flush())
            .map_err(|e| FilesError::io(out.display().to_string(), e))
    }
}

// `{index:3} {singular value:21.16} [w1, w2, ...]` per component
impl SaveFile for [ComponentSummary] {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<(), FilesError> {

        write_text(&output_path(output_dir, file_name, "txt"), |f| {
            writeln!(f, "Information in eigenvectors (top {} absolute entries):", self.first().map_or(0, |c| c.top_words.len()))?;
            for c in self {
                writeln!(f, "{:3} {:21.16} [{}]", c.index, c.singular_value, c.top_words.join(", "))?;
            }
            Ok(())
        })
    }
}

impl SaveFile for ProjectionSeries {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<(), FilesError> {

        write_text(&output_path(output_dir, file_name, "txt"), |f| {
            writeln!(f, "# axis: {} - {}", self.axis[0], self.axis[1])?;
            for (word, value) in &self.points {
                writeln!(f, "{} {:.6}", word, value)?;
            }
            Ok(())
        })
    }
}

fn write_predictions(f: &mut BufWriter<File>, predictions: &[Prediction]) -> std::io::Result<()> {

    writeln!(f, "{:>18} {:>18} {:>18} {:>18} {:>18}", "word1", "word2", "word3", "word4", "prediction")?;
    for p in predictions {
        let q = &p.query;
        writeln!(f, "{:>18} {:>18} {:>18} {:>18} {:>18}", q.wd1, q.wd2, q.wd3, q.wd4, p.predicted)?;
    }
    Ok(())
}

// writes `correct_{file_name}.txt` and `incorrect_{file_name}.txt`
impl SaveFile for AnalogyReport {
    fn save_file(&self, output_dir: &Path, file_name: &str) -> Result<(), FilesError> {

        let correct = output_path(output_dir, &format!("correct_{}", file_name), "txt");
        write_text(&correct, |f| write_predictions(f, &self.correct))?;

        let incorrect = output_path(output_dir, &format!("incorrect_{}", file_name), "txt");
        write_text(&incorrect, |f| write_predictions(f, &self.incorrect))
    }
}


#[cfg(test)]
mod tests {

    use std::fs;
    use std::io::Write;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use ndarray::{array, Array2};
    use tempfile::tempdir;
    use super::*;

    #[test]
    fn reads_plain_csv_matrix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("co_occur.csv");
        fs::write(&path, "0,1.5,2\n1.5, 0 ,3\n2,3,0\n").unwrap();

        let m = read_input::<Array2<f64>>(&path).unwrap();
        assert_eq!(m, array![[0.0, 1.5, 2.0], [1.5, 0.0, 3.0], [2.0, 3.0, 0.0]]);
    }

    #[test]
    fn reads_gzipped_csv_matrix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("co_occur.csv.gz");
        let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"1,2\n3,4\n").unwrap();
        encoder.finish().unwrap();

        let m = read_input::<Array2<f64>>(&path).unwrap();
        assert_eq!(m, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn ragged_csv_names_the_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "1,2\n3\n").unwrap();

        match read_input::<Array2<f64>>(&path) {
            Err(FilesError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn npy_matrix_round_trip() {
        let dir = tempdir().unwrap();
        let m = array![[1.0, 2.0], [3.0, 4.5]];
        save_output(dir.path(), "m", &m).unwrap();
        let back = read_input::<Array2<f64>>(&dir.path().join("m.npy")).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn vocabulary_ignores_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dictionary.txt");
        fs::write(&path, "man\nwoman\nking\n").unwrap();

        let vocab = read_input::<Vocabulary>(&path).unwrap();
        assert_eq!(vocab.words(), &["man".to_string(), "woman".to_string(), "king".to_string()]);
    }

    #[test]
    fn analogy_file_skips_headers_and_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analogy_task.txt");
        fs::write(&path, ": family\nman woman king queen\n\nboy girl husband wife\n").unwrap();

        let queries = read_input::<Vec<AnalogyQuery>>(&path).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1], AnalogyQuery::new("boy", "girl", "husband", "wife"));
    }

    #[test]
    fn analogy_file_rejects_short_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analogy_task.txt");
        fs::write(&path, "man woman king queen\nman woman king\n").unwrap();

        match read_input::<Vec<AnalogyQuery>>(&path) {
            Err(FilesError::Parse { line, message, .. }) => {
                assert_eq!(line, 2);
                assert!(message.contains("found 3"));
            },
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_input::<Vocabulary>(Path::new("no/such/dictionary.txt")).unwrap_err();
        assert!(err.to_string().contains("no/such/dictionary.txt"));
    }

    #[test]
    fn prediction_reports_are_column_aligned() {
        let dir = tempdir().unwrap();
        let query = AnalogyQuery::new("man", "woman", "king", "queen");
        let report = AnalogyReport {
            accuracy: 0.5,
            correct: vec![Prediction { query: query.clone(), predicted: "queen".to_string() }],
            incorrect: vec![Prediction { query: query, predicted: "prince".to_string() }],
        };
        save_output(dir.path(), "pred", &report).unwrap();

        let correct = fs::read_to_string(dir.path().join("correct_pred.txt")).unwrap();
        let lines = correct.lines().collect::<Vec<&str>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 18 * 5 + 4);
        assert!(lines[1].ends_with("             queen"));

        let incorrect = fs::read_to_string(dir.path().join("incorrect_pred.txt")).unwrap();
        assert!(incorrect.lines().nth(1).unwrap().ends_with("prince"));
    }

    #[test]
    fn component_summaries_format() {
        let dir = tempdir().unwrap();
        let summaries = vec![ComponentSummary {
            index: 1,
            singular_value: 2.5,
            top_words: vec!["army".to_string(), "navy".to_string()],
        }];
        save_output(dir.path(), "info_ev", summaries.as_slice()).unwrap();

        let text = fs::read_to_string(dir.path().join("info_ev.txt")).unwrap();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(line, format!("  1 {:21.16} [army, navy]", 2.5));
    }
}
