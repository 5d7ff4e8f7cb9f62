/// Characters dropped before synthesis: markdown emphasis/heading/code marks
/// and brackets.
const STRIPPED: &[char] = &['*', '_', '#', '`', '~', '[', ']', '(', ')'];

/// Prepares lesson text for the synthesis model.
///
/// Removes markdown punctuation and brackets, drops dialogue speaker labels
/// (`A:` / `B:` at the start of a word) and collapses whitespace to single
/// spaces. Returns an empty string when nothing speakable is left.
pub fn sanitize_for_speech(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| !STRIPPED.contains(c)).collect();

    cleaned
        .split_whitespace()
        .filter_map(strip_speaker_label)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"A:"` disappears, `"A:Hello"` becomes `"Hello"`, anything else is kept.
fn strip_speaker_label(word: &str) -> Option<&str> {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => {
            let rest = chars.as_str();
            (!rest.is_empty()).then_some(rest)
        }
        _ => Some(word),
    }
}
