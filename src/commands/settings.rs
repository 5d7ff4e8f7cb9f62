use crate::state::AppState;

pub fn get_settings(state: &AppState) -> Result<String, String> {
    let settings = state.settings.lock().unwrap().clone();
    serde_json::to_string_pretty(&settings).map_err(|e| e.to_string())
}

pub fn get_status(state: &AppState) -> String {
    let status = *state.status.lock().unwrap();
    let viewer = state.viewer.lock().unwrap();
    format!(
        "audio: {:?}, output context: {}, lesson {} on {}",
        status,
        if state.speech.has_output() { "open" } else { "not created" },
        viewer.current().id,
        viewer.tab()
    )
}

pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
