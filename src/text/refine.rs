//! Cleanup of extracted span text for the `refined_text` output field.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Cleanup pipeline applied to subsection spans before output.
///
/// Stages: NFC normalization, ligature folding, removal of replacement and
/// private-use characters, hyphenation repair, whitespace collapsing, and
/// removal of stray spaces before punctuation.
pub struct TextRefiner {
    hyphenation: Regex,
    space_before_punct: Regex,
    ligature_map: Vec<(&'static str, &'static str)>,
}

impl TextRefiner {
    /// Create a refiner with the standard stages.
    pub fn new() -> Self {
        Self {
            hyphenation: Regex::new(r"([[:alpha:]])-\s+([[:lower:]])").unwrap(),
            space_before_punct: Regex::new(r"\s+([.,;:!?])").unwrap(),
            ligature_map: vec![
                ("\u{FB00}", "ff"),
                ("\u{FB01}", "fi"),
                ("\u{FB02}", "fl"),
                ("\u{FB03}", "ffi"),
                ("\u{FB04}", "ffl"),
                ("\u{FB05}", "st"),
                ("\u{FB06}", "st"),
            ],
        }
    }

    /// Clean a span of text into a single readable line.
    pub fn refine(&self, text: &str) -> String {
        let mut result: String = text.nfc().collect();

        for (ligature, replacement) in &self.ligature_map {
            result = result.replace(ligature, replacement);
        }

        result = result
            .chars()
            .filter(|c| *c != '\u{FFFD}' && !is_private_use(*c))
            .collect();

        // "infor- mation" and "infor-\nmation" both become "information"
        result = self.hyphenation.replace_all(&result, "$1$2").to_string();

        result = result.split_whitespace().collect::<Vec<_>>().join(" ");

        self.space_before_punct
            .replace_all(&result, "$1")
            .trim()
            .to_string()
    }
}

impl Default for TextRefiner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Truncate to at most `max_chars` characters, marking the cut with `...`.
///
/// The cut backs off to the last word boundary when one falls within the
/// final fifth of the allowance. Text that already fits is returned as-is.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }

    let ellipsis_len = ELLIPSIS.chars().count();
    if max_chars <= ellipsis_len {
        return text.chars().take(max_chars).collect();
    }

    let budget = max_chars - ellipsis_len;
    let head: String = text.chars().take(budget).collect();

    let cut = match head.rfind(char::is_whitespace) {
        Some(pos) if head[..pos].chars().count() * 5 >= budget * 4 => &head[..pos],
        _ => head.as_str(),
    };

    format!(
        "{}{}",
        cut.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == ';'),
        ELLIPSIS
    )
}
