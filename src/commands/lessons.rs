use crate::state::AppState;
use crate::viewer::{render, Tab};

/// Header plus the active tab of the current lesson.
pub fn show(state: &AppState) -> String {
    let viewer = state.viewer.lock().unwrap();
    format!("{}\n\n{}", render::header(&viewer), render::tab_body(&viewer))
}

pub fn next_lesson(state: &AppState) -> Result<String, String> {
    let moved = state.viewer.lock().unwrap().next();
    if !moved {
        return Err("Already at the last lesson".into());
    }
    Ok(show(state))
}

pub fn previous_lesson(state: &AppState) -> Result<String, String> {
    let moved = state.viewer.lock().unwrap().previous();
    if !moved {
        return Err("Already at the first lesson".into());
    }
    Ok(show(state))
}

pub fn go_to_lesson(state: &AppState, id: u32) -> Result<String, String> {
    state
        .viewer
        .lock()
        .unwrap()
        .go_to(id)
        .map_err(|e| e.to_string())?;
    Ok(show(state))
}

pub fn select_tab(state: &AppState, name: &str) -> Result<String, String> {
    let tab: Tab = name.parse().map_err(|e: crate::viewer::ViewerError| e.to_string())?;
    state.viewer.lock().unwrap().select_tab(tab);
    Ok(show(state))
}

pub fn list_lessons(state: &AppState) -> String {
    let viewer = state.viewer.lock().unwrap();
    let current = viewer.current().id;
    viewer
        .lessons()
        .iter()
        .map(|lesson| {
            let marker = if lesson.id == current { '*' } else { ' ' };
            format!("{} {:>3}  {}", marker, lesson.id, lesson.subtitle)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
