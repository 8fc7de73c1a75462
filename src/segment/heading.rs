//! Heading classification over a fixed feature tuple.
//!
//! A line's features are extracted once and turned into a confidence score
//! by a weighted sum; every weight and threshold is a named constant so the
//! heuristic can be tested in isolation.

use std::sync::OnceLock;

use regex::Regex;

/// Lines at least this long are never headings.
pub const MAX_HEADING_CHARS: usize = 60;

/// Lines with more words than this are never headings.
pub const MAX_HEADING_WORDS: usize = 10;

/// Lines with fewer letters than this are never headings (page numbers, bullets).
pub const MIN_HEADING_LETTERS: usize = 2;

/// Confidence at or above which a line opens a new section.
pub const HEADING_THRESHOLD: f32 = 0.4;

/// Share of uppercase letters above which a line counts as uppercase.
pub const UPPERCASE_MAJORITY: f32 = 0.5;

/// A font must exceed the page body size by more than this to count as larger.
pub const FONT_SIZE_EPSILON: f32 = 0.1;

/// Title-case lines longer than this many words do not earn the title-case signal.
pub const MAX_TITLE_CASE_WORDS: usize = 8;

/// A leading section keyword only counts on lines up to this many words.
pub const MAX_KEYWORD_LINE_WORDS: usize = 5;

const UPPERCASE_WEIGHT: f32 = 0.4;
const NUMBERING_WEIGHT: f32 = 0.4;
const KEYWORD_WEIGHT: f32 = 0.4;
const LARGER_FONT_WEIGHT: f32 = 0.5;
const TITLE_CASE_WEIGHT: f32 = 0.2;
const TERMINAL_PUNCTUATION_PENALTY: f32 = 0.3;

/// Words that commonly name sections in resumes, papers, reports, and guides.
pub const SECTION_KEYWORDS: &[&str] = &[
    "abstract",
    "achievements",
    "acknowledgements",
    "appendix",
    "awards",
    "background",
    "certifications",
    "chapter",
    "conclusion",
    "conclusions",
    "contents",
    "discussion",
    "education",
    "employment",
    "evaluation",
    "experience",
    "experiments",
    "findings",
    "introduction",
    "methodology",
    "methods",
    "objective",
    "objectives",
    "overview",
    "part",
    "projects",
    "publications",
    "recommendations",
    "references",
    "related",
    "results",
    "section",
    "skills",
    "summary",
    "tips",
];

/// Connector words allowed to stay lowercase in a title-case line.
const TITLE_CASE_CONNECTORS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "of", "on", "or", "the", "to", "vs",
    "with",
];

fn numbering_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\d+(?:\.\d+)*\.?|[IVXLivxl]+\.)\s+\S").unwrap())
}

/// Features of one candidate line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingFeatures {
    /// Character count of the trimmed line
    pub char_len: usize,
    /// Whitespace-separated word count
    pub word_count: usize,
    /// Alphabetic character count
    pub letter_count: usize,
    /// Share of letters that are uppercase
    pub uppercase_ratio: f32,
    /// Starts with a section number (`2.`, `3.1`, `IV.`) followed by a capitalized word
    pub numbered: bool,
    /// Carries a section keyword in heading position
    pub keyword: bool,
    /// Short line whose significant words are all capitalized
    pub title_case: bool,
    /// Ends like a sentence or clause (`.`, `,`, `;`)
    pub terminal_punctuation: bool,
    /// Font larger than the page's body font; `None` without layout metadata
    pub larger_font: Option<bool>,
}

impl HeadingFeatures {
    /// Extract features from a trimmed line.
    pub fn extract(line: &str, font_size: Option<f32>, body_font_size: Option<f32>) -> Self {
        let line = line.trim();
        let words: Vec<&str> = line.split_whitespace().collect();

        let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
        let uppercase = letters.iter().filter(|c| c.is_uppercase()).count();
        let uppercase_ratio = if letters.is_empty() {
            0.0
        } else {
            uppercase as f32 / letters.len() as f32
        };

        let numbered = numbering_regex().is_match(line) && starts_capitalized_after_number(&words);
        let title_case = is_title_case(&words);
        let keyword = has_heading_keyword(&words, title_case);

        let terminal_punctuation =
            line.ends_with(|c| matches!(c, '.' | ',' | ';')) && !line.ends_with("...");

        let larger_font = match (font_size, body_font_size) {
            (Some(size), Some(body)) if size > 0.0 && body > 0.0 => {
                Some(size > body + FONT_SIZE_EPSILON)
            }
            _ => None,
        };

        Self {
            char_len: line.chars().count(),
            word_count: words.len(),
            letter_count: letters.len(),
            uppercase_ratio,
            numbered,
            keyword,
            title_case,
            terminal_punctuation,
            larger_font,
        }
    }

    /// Whether the hard gates (length, word count, letters) admit this line at all.
    pub fn passes_gates(&self) -> bool {
        self.char_len > 0
            && self.char_len < MAX_HEADING_CHARS
            && self.word_count <= MAX_HEADING_WORDS
            && self.letter_count >= MIN_HEADING_LETTERS
    }

    /// Heading confidence in [0, 1].
    pub fn confidence(&self) -> f32 {
        if !self.passes_gates() {
            return 0.0;
        }

        let mut score = 0.0;
        if self.uppercase_ratio > UPPERCASE_MAJORITY {
            score += UPPERCASE_WEIGHT;
        }
        if self.numbered {
            score += NUMBERING_WEIGHT;
        }
        if self.keyword {
            score += KEYWORD_WEIGHT;
        }
        if self.title_case {
            score += TITLE_CASE_WEIGHT;
        }
        if self.larger_font == Some(true) {
            score += LARGER_FONT_WEIGHT;
        }
        if self.terminal_punctuation {
            score -= TERMINAL_PUNCTUATION_PENALTY;
        }

        score.clamp(0.0, 1.0)
    }

    /// Whether the line should open a new section.
    pub fn is_heading(&self) -> bool {
        self.confidence() >= HEADING_THRESHOLD
    }
}

/// Classify a single line without layout metadata.
pub fn is_heading(line: &str) -> bool {
    HeadingFeatures::extract(line, None, None).is_heading()
}

fn normalized_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

fn is_section_keyword(word: &str) -> bool {
    SECTION_KEYWORDS.binary_search(&normalized_word(word).as_str()).is_ok()
}

fn is_numbering_token(word: &str) -> bool {
    let digits = word.trim_end_matches('.');
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return true;
    }
    word.len() > 1
        && word.ends_with('.')
        && digits.chars().all(|c| matches!(c, 'I' | 'V' | 'X' | 'L' | 'i' | 'v' | 'x' | 'l'))
}

fn has_heading_keyword(words: &[&str], title_case: bool) -> bool {
    let first_significant = words
        .iter()
        .find(|w| w.chars().any(char::is_alphabetic) && !is_numbering_token(w));

    match first_significant {
        Some(first) if words.len() <= MAX_KEYWORD_LINE_WORDS && is_section_keyword(first) => true,
        _ => title_case && words.iter().any(|w| is_section_keyword(w)),
    }
}

fn starts_capitalized_after_number(words: &[&str]) -> bool {
    words
        .get(1)
        .and_then(|w| w.chars().find(|c| c.is_alphanumeric()))
        .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
}

fn is_title_case(words: &[&str]) -> bool {
    if words.is_empty() || words.len() > MAX_TITLE_CASE_WORDS {
        return false;
    }

    let mut capitalized = 0;
    for word in words {
        let Some(first) = word.chars().find(|c| c.is_alphabetic()) else {
            continue;
        };
        if first.is_uppercase() {
            capitalized += 1;
        } else if !TITLE_CASE_CONNECTORS.contains(&normalized_word(word).as_str()) {
            return false;
        }
    }
    capitalized > 0
}
