use crate::data::example::Example;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads examples from a JSONL file, one record per line.
///
/// Blank lines are ignored and malformed records are skipped with a warning, so a
/// single bad line never aborts a whole batch.
pub fn load_examples<P: AsRef<Path>>(file_path: P) -> io::Result<Vec<Example>> {
    let file_path = file_path.as_ref();
    let file = File::open(file_path)?;
    let examples = read_examples(BufReader::new(file))?;

    log::info!(
        "Loaded {} examples from '{}'",
        examples.len(),
        file_path.display()
    );
    Ok(examples)
}

/// Same as [`load_examples`] but over any buffered reader.
pub fn read_examples<R: BufRead>(reader: R) -> io::Result<Vec<Example>> {
    let mut examples = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Example>(&line) {
            Ok(mut example) => {
                if example.id.is_empty() {
                    example.id = line_num.to_string();
                }
                if !example.is_valid_choice(example.correct_index) {
                    log::warn!(
                        "Example '{}' (line {}) has answer {} outside its {} choices",
                        example.id,
                        line_num + 1,
                        example.correct_index,
                        example.choices.len()
                    );
                }
                examples.push(example);
            }
            Err(e) => {
                log::warn!("Skipping malformed record on line {}: {}", line_num + 1, e);
            }
        }
    }

    Ok(examples)
}

/// Groups examples by subject, keeping subjects in first-appearance order.
pub fn group_by_subject(examples: Vec<Example>) -> Vec<(String, Vec<Example>)> {
    let mut groups: Vec<(String, Vec<Example>)> = Vec::new();

    for example in examples {
        let subject = example.subject().to_string();
        match groups.iter_mut().find(|(name, _)| *name == subject) {
            Some((_, members)) => members.push(example),
            None => groups.push((subject, vec![example])),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::tempdir;

    const RECORDS: &str = r#"{"id": "0", "question": "Which is a mammal?", "choices": ["cat", "trout"], "answer": 0, "metadata": {"subject": "natural science"}}

not json at all
{"id": "1", "question": "Which word is a noun?", "choices": ["run", "table"], "answer": 1, "hint": "", "metadata": {"subject": "language science"}}
{"question": "Which is hotter?", "choices": ["ice", "lava"], "answer": 1, "metadata": {"subject": "natural science"}}
{"question": "Untagged", "choices": ["a", "b"], "answer": 0}
"#;

    #[test]
    fn test_read_examples_skips_blank_and_malformed_lines() {
        let examples = read_examples(Cursor::new(RECORDS)).unwrap();

        assert_eq!(examples.len(), 4);
        assert_eq!(examples[0].id, "0");
        assert_eq!(examples[1].correct_index, 1);
        // Missing ids fall back to the zero-based line number
        assert_eq!(examples[2].id, "4");
    }

    #[test]
    fn test_group_by_subject_keeps_first_appearance_order() {
        let examples = read_examples(Cursor::new(RECORDS)).unwrap();
        let groups = group_by_subject(examples);

        let subjects: Vec<&str> = groups.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(subjects, vec!["natural science", "language science", "unknown"]);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[1].question, "Which is hotter?");
    }

    #[test]
    fn test_load_examples_from_file() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("scienceqa_mcts_data.jsonl");
        let mut file = File::create(&path)?;
        file.write_all(RECORDS.as_bytes())?;

        let examples = load_examples(&path)?;
        assert_eq!(examples.len(), 4);
        Ok(())
    }

    #[test]
    fn test_load_examples_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_examples(dir.path().join("absent.jsonl")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
