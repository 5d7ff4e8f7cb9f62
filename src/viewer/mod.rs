pub mod exercises;
pub mod render;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lessons::Lesson;
pub use exercises::{check_answer, normalize_answer, ExerciseResult, ExerciseSheet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("no lessons to show")]
    NoLessons,

    #[error("no lesson with id {0}")]
    UnknownLesson(u32),

    #[error("unknown tab '{0}' (vocabulary, phrases, grammar, dialogue, exercises or 1-5)")]
    UnknownTab(String),

    #[error("exercise {number} does not exist (this lesson has {count})")]
    NoSuchExercise { number: usize, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Vocabulary,
    Phrases,
    Grammar,
    Dialogue,
    Exercises,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Vocabulary,
        Tab::Phrases,
        Tab::Grammar,
        Tab::Dialogue,
        Tab::Exercises,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Vocabulary => "Vocabulário",
            Tab::Phrases => "Frases",
            Tab::Grammar => "Gramática",
            Tab::Dialogue => "Diálogo",
            Tab::Exercises => "Exercícios",
        }
    }
}

impl Default for Tab {
    fn default() -> Self {
        Self::Vocabulary
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tab::Vocabulary => "vocabulary",
            Tab::Phrases => "phrases",
            Tab::Grammar => "grammar",
            Tab::Dialogue => "dialogue",
            Tab::Exercises => "exercises",
        };
        f.write_str(name)
    }
}

impl FromStr for Tab {
    type Err = ViewerError;

    /// Accepts a name or a prefix of one (`vocab`, `ex`) or a 1-based position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        if let Ok(n) = needle.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| Tab::ALL.get(i).copied())
                .ok_or_else(|| ViewerError::UnknownTab(s.to_string()));
        }
        if needle.is_empty() {
            return Err(ViewerError::UnknownTab(s.to_string()));
        }
        Tab::ALL
            .into_iter()
            .find(|tab| tab.to_string().starts_with(&needle))
            .ok_or_else(|| ViewerError::UnknownTab(s.to_string()))
    }
}

/// Cursor over an ordered, read-only list of lessons plus the per-lesson UI
/// state (active tab, exercise answers).
#[derive(Debug, Clone)]
pub struct LessonViewer {
    lessons: Vec<Lesson>,
    index: usize,
    tab: Tab,
    sheet: ExerciseSheet,
}

impl LessonViewer {
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, ViewerError> {
        let first = lessons.first().ok_or(ViewerError::NoLessons)?;
        let sheet = ExerciseSheet::new(first.exercises.len());
        Ok(Self {
            lessons,
            index: 0,
            tab: Tab::default(),
            sheet,
        })
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Never zero: `new` rejects an empty list.
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Lesson {
        &self.lessons[self.index]
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.lessons.len()
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Advance one lesson. At the last lesson this is a no-op returning `false`.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.move_to(self.index + 1);
        true
    }

    /// Go back one lesson. At the first lesson this is a no-op returning `false`.
    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.move_to(self.index - 1);
        true
    }

    pub fn go_to(&mut self, id: u32) -> Result<(), ViewerError> {
        let index = self
            .lessons
            .iter()
            .position(|l| l.id == id)
            .ok_or(ViewerError::UnknownLesson(id))?;
        if index != self.index {
            self.move_to(index);
        }
        Ok(())
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn exercises(&self) -> &ExerciseSheet {
        &self.sheet
    }

    pub fn exercises_mut(&mut self) -> &mut ExerciseSheet {
        &mut self.sheet
    }

    pub fn exercise_results(&self) -> Vec<ExerciseResult> {
        self.sheet.results(&self.current().exercises)
    }

    /// English strings the active tab can play, in display order.
    pub fn audio_items(&self) -> Vec<String> {
        let lesson = self.current();
        match self.tab {
            Tab::Vocabulary => lesson.vocabulary_terms().map(|t| t.english.clone()).collect(),
            Tab::Phrases => lesson.phrases.iter().map(|p| p.english.clone()).collect(),
            Tab::Dialogue if !lesson.dialogue.is_empty() => vec![lesson.dialogue_script()],
            Tab::Dialogue | Tab::Grammar | Tab::Exercises => Vec::new(),
        }
    }

    fn move_to(&mut self, index: usize) {
        self.index = index;
        self.tab = Tab::Vocabulary;
        self.sheet = ExerciseSheet::new(self.lessons[index].exercises.len());
    }
}
