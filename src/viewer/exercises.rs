use crate::lessons::Exercise;

use super::ViewerError;

const IGNORED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';'];

/// Lower-case, drop `.,!?;` and trim.
pub fn normalize_answer(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !IGNORED_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Exact match after normalization, no partial credit.
pub fn check_answer(given: &str, expected: &str) -> bool {
    normalize_answer(given) == normalize_answer(expected)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseResult {
    pub number: usize,
    pub prompt: String,
    pub given: String,
    pub correct: bool,
    pub suggested: String,
}

/// Answers typed for the current lesson's exercises. Results stay hidden
/// until `check_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseSheet {
    answers: Vec<String>,
    show_results: bool,
}

impl ExerciseSheet {
    pub fn new(exercise_count: usize) -> Self {
        Self {
            answers: vec![String::new(); exercise_count],
            show_results: false,
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn showing_results(&self) -> bool {
        self.show_results
    }

    /// Record the answer for exercise `number` (1-based).
    pub fn answer(&mut self, number: usize, text: &str) -> Result<(), ViewerError> {
        let count = self.answers.len();
        let slot = number
            .checked_sub(1)
            .and_then(|i| self.answers.get_mut(i))
            .ok_or(ViewerError::NoSuchExercise { number, count })?;
        *slot = text.to_string();
        Ok(())
    }

    pub fn check_all(&mut self) {
        self.show_results = true;
    }

    pub fn reset(&mut self) {
        self.answers.iter_mut().for_each(String::clear);
        self.show_results = false;
    }

    pub fn results(&self, exercises: &[Exercise]) -> Vec<ExerciseResult> {
        exercises
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(i, (exercise, given))| ExerciseResult {
                number: i + 1,
                prompt: exercise.portuguese.clone(),
                given: given.clone(),
                correct: check_answer(given, &exercise.correct_answer),
                suggested: exercise.correct_answer.clone(),
            })
            .collect()
    }

    /// (correct, total)
    pub fn score(&self, exercises: &[Exercise]) -> (usize, usize) {
        let correct = self.results(exercises).iter().filter(|r| r.correct).count();
        (correct, exercises.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(prompt: &str, answer: &str) -> Exercise {
        Exercise {
            portuguese: prompt.into(),
            correct_answer: answer.into(),
        }
    }

    #[test]
    fn trailing_period_and_case_are_ignored() {
        assert!(check_answer("I am a confident person.", "I am a confident person"));
        assert!(check_answer("  what IS she like?  ", "What is she like"));
        assert_eq!(normalize_answer("Hello, World!"), "hello world");
    }

    #[test]
    fn wording_differences_fail() {
        assert!(!check_answer("I'm a confident person", "I am a confident person"));
        assert!(!check_answer("", "He is tall and thin"));
    }

    #[test]
    fn sheet_tracks_answers_and_results() {
        let exercises = vec![
            exercise("Ele é alto e magro.", "He is tall and thin"),
            exercise("Ela tem cabelo cacheado.", "She has curly hair"),
        ];
        let mut sheet = ExerciseSheet::new(exercises.len());
        assert!(!sheet.showing_results());

        sheet.answer(1, "he is tall and thin.").unwrap();
        sheet.answer(2, "She have curly hair").unwrap();
        sheet.check_all();

        let results = sheet.results(&exercises);
        assert!(sheet.showing_results());
        assert!(results[0].correct);
        assert!(!results[1].correct);
        assert_eq!(results[1].suggested, "She has curly hair");
        assert_eq!(sheet.score(&exercises), (1, 2));

        sheet.reset();
        assert!(!sheet.showing_results());
        assert!(sheet.answers().iter().all(String::is_empty));
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let mut sheet = ExerciseSheet::new(2);
        assert_eq!(
            sheet.answer(0, "x"),
            Err(ViewerError::NoSuchExercise { number: 0, count: 2 })
        );
        assert_eq!(
            sheet.answer(3, "x"),
            Err(ViewerError::NoSuchExercise { number: 3, count: 2 })
        );
    }
}
