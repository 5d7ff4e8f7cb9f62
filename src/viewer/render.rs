use std::fmt::Write as _;

use super::{LessonViewer, Tab};

const GRAMMAR_FALLBACK: &str =
    "Esta lição foca na prática direta de vocabulário e expressões situacionais.";

pub fn header(viewer: &LessonViewer) -> String {
    let lesson = viewer.current();
    let tabs = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            if *tab == viewer.tab() {
                format!("[{} {}]", i + 1, tab.label())
            } else {
                format!(" {} {} ", i + 1, tab.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "Lição {} ({}/{}): {}\n{}",
        lesson.id,
        viewer.index() + 1,
        viewer.lesson_count(),
        lesson.subtitle,
        tabs
    )
}

/// Plain-text body of the active tab. Speakable rows are numbered the same
/// way as `LessonViewer::audio_items`.
pub fn tab_body(viewer: &LessonViewer) -> String {
    let lesson = viewer.current();
    let mut out = String::new();

    match viewer.tab() {
        Tab::Vocabulary => {
            let mut n = 0;
            for section in &lesson.vocabulary {
                let _ = writeln!(out, "== {} ==", section.title);
                for item in &section.items {
                    n += 1;
                    let _ = writeln!(out, "  {:>2}. {}  ({})", n, item.english, item.portuguese);
                }
            }
        }
        Tab::Phrases => {
            for (i, phrase) in lesson.phrases.iter().enumerate() {
                let _ = writeln!(out, "  {:>2}. {}", i + 1, phrase.english);
                let _ = writeln!(out, "      {}", phrase.portuguese);
            }
        }
        Tab::Grammar => {
            let _ = writeln!(out, "Explicação Gramatical");
            let _ = writeln!(out, "{}", lesson.explanation.as_deref().unwrap_or(GRAMMAR_FALLBACK));
        }
        Tab::Dialogue => {
            let _ = writeln!(out, "Prática de Listening  (play 1 for the whole dialogue)");
            for line in &lesson.dialogue {
                let _ = writeln!(out, "  {}: {}", line.speaker, line.text);
            }
        }
        Tab::Exercises => {
            let _ = writeln!(out, "Tradução: Português para Inglês");
            let sheet = viewer.exercises();
            for result in viewer.exercise_results() {
                let _ = writeln!(out, "  {:>2}. {}", result.number, result.prompt);
                if !result.given.is_empty() {
                    let _ = writeln!(out, "      > {}", result.given);
                }
                if sheet.showing_results() {
                    if result.correct {
                        let _ = writeln!(out, "      ✓ Correto");
                    } else {
                        let _ = writeln!(out, "      ✗ Incorreto. Resposta sugerida: {}", result.suggested);
                    }
                }
            }
            if sheet.showing_results() {
                let (correct, total) = sheet.score(&lesson.exercises);
                let _ = writeln!(out, "Score: {}/{}", correct, total);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lessons::catalog;

    fn viewer() -> LessonViewer {
        LessonViewer::new(catalog::load_builtin().unwrap()).unwrap()
    }

    #[test]
    fn header_marks_active_tab() {
        let mut v = viewer();
        v.select_tab(Tab::Phrases);
        let text = header(&v);
        assert!(text.starts_with("Lição 46 (1/5): Personality & Appearance"));
        assert!(text.contains("[2 Frases]"));
    }

    #[test]
    fn grammar_falls_back_when_lesson_has_no_explanation() {
        let mut v = viewer();
        v.go_to(48).unwrap();
        v.select_tab(Tab::Grammar);
        assert!(tab_body(&v).contains(GRAMMAR_FALLBACK));
    }

    #[test]
    fn exercise_results_only_after_check() {
        let mut v = viewer();
        v.select_tab(Tab::Exercises);
        v.exercises_mut().answer(1, "I am a confident person.").unwrap();
        assert!(!tab_body(&v).contains("Correto"));

        v.exercises_mut().check_all();
        let body = tab_body(&v);
        assert!(body.contains("✓ Correto"));
        assert!(body.contains("Resposta sugerida: What is she like"));
        assert!(body.contains("Score: 1/10"));
    }
}
