//! Question-answering records consumed by the search.
//!
//! The field names follow the JSONL layout produced by the dataset converter, so a
//! record can be deserialized straight from one line of that file. Every optional
//! field falls back to an empty value instead of failing the whole record.

use serde::{Deserialize, Serialize};

/// Descriptive metadata attached to an example
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub subject: String,
    pub grade: String,
    pub topic: String,
    pub category: String,
    pub skill: String,
    pub task: String,
}

impl Metadata {
    /// Returns `(label, value)` pairs in a fixed order, `"unknown"` for blanks.
    pub fn labelled_fields(&self) -> [(&'static str, &str); 6] {
        fn or_unknown(value: &str) -> &str {
            if value.trim().is_empty() {
                "unknown"
            } else {
                value
            }
        }

        [
            ("Subject", or_unknown(&self.subject)),
            ("Grade", or_unknown(&self.grade)),
            ("Topic", or_unknown(&self.topic)),
            ("Category", or_unknown(&self.category)),
            ("Skill", or_unknown(&self.skill)),
            ("Task", or_unknown(&self.task)),
        ]
    }
}

/// One multiple-choice question with its context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Stable identifier from the dataset
    #[serde(default)]
    pub id: String,

    pub question: String,

    #[serde(default)]
    pub choices: Vec<String>,

    /// Zero-based index of the correct entry in `choices`
    #[serde(rename = "answer")]
    pub correct_index: usize,

    #[serde(default)]
    pub hint: String,

    #[serde(default)]
    pub lecture: String,

    #[serde(default)]
    pub solution: String,

    /// Image file name, relative to the image directory
    #[serde(default)]
    pub image_path: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Reasoning accumulated by the actions applied so far
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reasoning: String,
}

impl Example {
    /// Builds a bare example with no hint, lecture, image or metadata.
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        choices: Vec<String>,
        correct_index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            choices,
            correct_index,
            hint: String::new(),
            lecture: String::new(),
            solution: String::new(),
            image_path: None,
            metadata: Metadata::default(),
            reasoning: String::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn with_lecture(mut self, lecture: impl Into<String>) -> Self {
        self.lecture = lecture.into();
        self
    }

    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// True when hint or lecture text is available for metadata reasoning
    pub fn has_context_text(&self) -> bool {
        !self.hint.trim().is_empty() || !self.lecture.trim().is_empty()
    }

    /// Image reference, if one is present and non-blank
    pub fn image(&self) -> Option<&str> {
        self.image_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }

    /// Whether `index` points into the choice list
    pub fn is_valid_choice(&self, index: usize) -> bool {
        index < self.choices.len()
    }

    /// Returns a copy carrying `step` appended to the accumulated reasoning.
    ///
    /// The receiver is left untouched; a blank step leaves the reasoning as is.
    pub fn with_appended_reasoning(&self, step: &str) -> Example {
        let mut updated = self.clone();
        let previous = self.reasoning.trim();
        let step = step.trim();

        updated.reasoning = match (previous.is_empty(), step.is_empty()) {
            (true, _) => step.to_string(),
            (false, true) => previous.to_string(),
            (false, false) => format!("{}\n{}", previous, step),
        };
        updated
    }

    /// Subject used for batch grouping
    pub fn subject(&self) -> &str {
        let subject = self.metadata.subject.trim();
        if subject.is_empty() {
            "unknown"
        } else {
            subject
        }
    }
}
