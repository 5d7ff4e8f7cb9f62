use crate::state::AppState;
use crate::viewer::{render, Tab};

pub fn answer(state: &AppState, number: usize, text: &str) -> Result<String, String> {
    let mut viewer = state.viewer.lock().unwrap();
    viewer
        .exercises_mut()
        .answer(number, text)
        .map_err(|e| e.to_string())?;
    let filled = viewer.exercises().answers().iter().filter(|a| !a.trim().is_empty()).count();
    Ok(format!("Answer {} saved ({}/{} filled)", number, filled, viewer.exercises().len()))
}

/// Reveal results for every exercise of the current lesson.
pub fn check(state: &AppState) -> String {
    let mut viewer = state.viewer.lock().unwrap();
    viewer.exercises_mut().check_all();
    viewer.select_tab(Tab::Exercises);
    let lesson_id = viewer.current().id;
    let (correct, total) = viewer.exercises().score(&viewer.current().exercises);
    tracing::info!("Lesson {} checked: {}/{}", lesson_id, correct, total);
    render::tab_body(&viewer)
}

pub fn reset(state: &AppState) -> String {
    state.viewer.lock().unwrap().exercises_mut().reset();
    "Answers cleared".to_string()
}
