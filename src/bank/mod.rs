use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::QuizError;

static BANK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/bank");

pub const BUILTIN_BANK: &str = "javascript";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

impl Answer {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub answers: Vec<Answer>,
}

impl Question {
    /// Position of the one correct answer. Only meaningful on a validated question.
    pub fn correct_index(&self) -> Option<usize> {
        self.answers.iter().position(|a| a.correct)
    }

    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.correct)
    }

    fn validate(&self) -> Result<(), QuizError> {
        if self.answers.len() < 2 {
            return Err(QuizError::InvalidQuestion {
                id: self.id,
                reason: format!("needs at least 2 answers, has {}", self.answers.len()),
            });
        }

        self.answers
            .iter()
            .filter(|a| a.correct)
            .exactly_one()
            .map(|_| ())
            .map_err(|extra| QuizError::InvalidQuestion {
                id: self.id,
                reason: format!("needs exactly 1 correct answer, has {}", extra.count()),
            })
    }
}

/// On-disk shape of a question bank file.
#[derive(Deserialize, Debug)]
struct BankFile {
    name: String,
    questions: Vec<Question>,
}

/// Immutable, validated set of questions shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    name: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Result<Self, QuizError> {
        let mut seen = HashSet::new();
        for question in &questions {
            question.validate()?;
            if !seen.insert(question.id) {
                return Err(QuizError::DuplicateQuestionId(question.id));
            }
        }

        Ok(Self {
            name: name.into(),
            questions,
        })
    }

    /// The question bank compiled into the binary.
    pub fn builtin() -> Result<Self, QuizError> {
        Self::embedded(BUILTIN_BANK)
    }

    pub fn embedded(name: &str) -> Result<Self, QuizError> {
        let file_name = format!("{name}.json");
        let contents = BANK_DIR
            .get_file(&file_name)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| QuizError::QuestionBankNotFound(file_name.clone()))?;

        Self::from_json_str(contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, QuizError> {
        let file: BankFile = serde_json::from_str(json)?;
        Self::new(file.name, file.questions)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, QuizError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn question(id: u32, answers: Vec<Answer>) -> Question {
        Question {
            id,
            text: format!("question {id}"),
            answers,
        }
    }

    #[test]
    fn test_builtin_bank() {
        let bank = QuestionBank::builtin().unwrap();

        assert_eq!(bank.name(), "javascript");
        assert_eq!(bank.len(), 20);
        for q in bank.questions() {
            assert!(q.answers.len() >= 2);
            assert!(q.correct_answer().is_some());
        }
    }

    #[test]
    fn test_builtin_first_question() {
        let bank = QuestionBank::builtin().unwrap();
        let q = bank.get(0).unwrap();

        assert_eq!(q.text, "Are null values and undefined values the same?");
        assert_eq!(q.correct_index(), Some(1));
        assert_eq!(q.correct_answer().unwrap().text, "No");
    }

    #[test]
    fn test_unknown_embedded_bank() {
        assert_matches!(
            QuestionBank::embedded("klingon"),
            Err(QuizError::QuestionBankNotFound(_))
        );
    }

    #[test]
    fn test_correct_defaults_to_false() {
        let json = r#"{"name": "tiny", "questions": [
            {"id": 7, "text": "2 + 2?", "answers": [{"text": "4", "correct": true}, {"text": "5"}]}
        ]}"#;
        let bank = QuestionBank::from_json_str(json).unwrap();

        assert_eq!(bank.name(), "tiny");
        assert!(!bank.get(7).unwrap().answers[1].correct);
    }

    #[test]
    fn test_rejects_single_answer() {
        let q = question(1, vec![Answer::new("only", true)]);
        assert_matches!(
            QuestionBank::new("bad", vec![q]),
            Err(QuizError::InvalidQuestion { id: 1, .. })
        );
    }

    #[test]
    fn test_rejects_no_correct_answer() {
        let q = question(2, vec![Answer::new("a", false), Answer::new("b", false)]);
        assert_matches!(
            QuestionBank::new("bad", vec![q]),
            Err(QuizError::InvalidQuestion { id: 2, .. })
        );
    }

    #[test]
    fn test_rejects_two_correct_answers() {
        let q = question(3, vec![Answer::new("a", true), Answer::new("b", true)]);
        assert_matches!(
            QuestionBank::new("bad", vec![q]),
            Err(QuizError::InvalidQuestion { id: 3, .. })
        );
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let answers = vec![Answer::new("a", true), Answer::new("b", false)];
        let qs = vec![question(4, answers.clone()), question(4, answers)];
        assert_matches!(
            QuestionBank::new("dup", qs),
            Err(QuizError::DuplicateQuestionId(4))
        );
    }

    #[test]
    fn test_malformed_json() {
        assert_matches!(
            QuestionBank::from_json_str("{ not json"),
            Err(QuizError::QuestionBankFormat(_))
        );
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        std::fs::write(
            &path,
            r#"{"name": "file", "questions": [
                {"id": 1, "text": "Sky?", "answers": [{"text": "blue", "correct": true}, {"text": "green"}]}
            ]}"#,
        )
        .unwrap();

        let bank = QuestionBank::from_path(&path).unwrap();
        assert_eq!(bank.len(), 1);
        assert_matches!(
            QuestionBank::from_path(dir.path().join("missing.json")),
            Err(QuizError::QuestionBankIo(_))
        );
    }
}
