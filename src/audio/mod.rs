pub mod decode;
pub mod export;
pub mod playback;
pub mod processing;

pub use decode::decode_base64_pcm;
pub use playback::CpalAudioHost;
