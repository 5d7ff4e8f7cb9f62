pub mod catalog;

use serde::{Deserialize, Serialize};

/// One English term with its Portuguese translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPair {
    pub english: String,
    pub portuguese: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularySection {
    pub title: String,
    pub items: Vec<TermPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
}

/// Translation exercise: Portuguese prompt, expected English answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub portuguese: String,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub vocabulary: Vec<VocabularySection>,
    #[serde(default)]
    pub phrases: Vec<TermPair>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub dialogue: Vec<DialogueLine>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Lesson {
    /// The whole dialogue as one utterance, turns joined as `"A: ..."`.
    pub fn dialogue_script(&self) -> String {
        self.dialogue
            .iter()
            .map(|line| format!("{}: {}", line.speaker, line.text))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn vocabulary_terms(&self) -> impl Iterator<Item = &TermPair> {
        self.vocabulary.iter().flat_map(|section| section.items.iter())
    }
}
