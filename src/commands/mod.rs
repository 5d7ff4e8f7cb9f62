pub mod exercises;
pub mod lessons;
pub mod settings;
pub mod tts;
