use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::state::{AppState, AppStatus};

/// Speak item `number` (1-based) of the active tab in the background.
pub fn play_item(state: &Arc<AppState>, number: usize) -> Result<JoinHandle<bool>, String> {
    let text = {
        let viewer = state.viewer.lock().unwrap();
        let items = viewer.audio_items();
        if items.is_empty() {
            return Err(format!("The {} tab has nothing to play", viewer.tab()));
        }
        number
            .checked_sub(1)
            .and_then(|i| items.get(i).cloned())
            .ok_or_else(|| format!("Pick an item between 1 and {}", items.len()))?
    };
    speak_text(state, text)
}

/// Speak arbitrary text in the background.
pub fn speak_text(state: &Arc<AppState>, text: String) -> Result<JoinHandle<bool>, String> {
    do_speak(state, text).map_err(|e| e.to_string())
}

pub fn stop_speaking(state: &AppState) -> Result<String, String> {
    match state.speech.stop() {
        Ok(true) => Ok("Stopped".to_string()),
        Ok(false) => Ok("Nothing is playing".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// The audio trigger: refuses to start while a request is outstanding or the
/// trigger is cooling down, then runs `speak` as a task so the shell keeps
/// accepting input.
pub fn do_speak(state: &Arc<AppState>, text: String) -> Result<JoinHandle<bool>> {
    {
        let mut status = state.status.lock().unwrap();
        if *status != AppStatus::Idle {
            anyhow::bail!("Audio is busy (current: {:?}), try again in a moment", *status);
        }
        *status = AppStatus::Synthesizing;
    }

    let cooldown = Duration::from_millis(state.settings.lock().unwrap().general.trigger_cooldown_ms);
    let state = Arc::clone(state);

    Ok(tokio::spawn(async move {
        let _idle = IdleOnDrop(Arc::clone(&state));

        let played = state.speech.speak(&text).await;
        if played {
            *state.status.lock().unwrap() = AppStatus::Playing;
        } else {
            tracing::warn!("No audio played for {:?}", text);
        }

        tokio::time::sleep(cooldown).await;
        played
    }))
}

/// Re-enables the trigger when the speak task ends, including by panic or
/// cancellation.
struct IdleOnDrop(Arc<AppState>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        let mut status = self.0.status.lock().unwrap_or_else(|e| e.into_inner());
        *status = AppStatus::Idle;
    }
}
