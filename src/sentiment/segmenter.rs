//! Sentence-aligned chunking of free-form text.
//!
//! Sentence boundaries come from Unicode Standard Annex #29, which already keeps
//! decimals ("3.5"), ellipses and periods followed by lowercase words inside one
//! sentence. UAX #29 still breaks after titles and initials that precede a
//! capitalised word ("Dr. Smith", "J. R. Tolkien"), so a second pass re-joins
//! those splits. Titles only count when written capitalised, and a run of
//! initials only joins a following name, so "No." or "Plan A." still end a
//! sentence.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Result, SentimentError};

/// Sentences per chunk when nothing else is configured.
pub const DEFAULT_SENTENCES_PER_CHUNK: usize = 3;

const DEFAULT_CHUNK: NonZeroUsize = match NonZeroUsize::new(DEFAULT_SENTENCES_PER_CHUNK) {
    Some(n) => n,
    None => panic!("DEFAULT_SENTENCES_PER_CHUNK must be non-zero"),
};

/// Titles that precede a name, matched case-sensitively without the period.
static TITLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Dr", "Mr", "Mrs", "Ms", "Mx", "Prof", "Sr", "Jr", "Mt", "Rev", "Capt", "Lt", "Sgt",
        "Gov", "Hon", "Fig", "vs",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    max_sentences_per_chunk: NonZeroUsize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            max_sentences_per_chunk: DEFAULT_CHUNK,
        }
    }
}

impl Segmenter {
    pub fn new(max_sentences_per_chunk: usize) -> Result<Self> {
        let max_sentences_per_chunk =
            NonZeroUsize::new(max_sentences_per_chunk).ok_or_else(|| {
                SentimentError::Validation {
                    message: "max_sentences_per_chunk must be at least 1".to_string(),
                }
            })?;
        Ok(Self {
            max_sentences_per_chunk,
        })
    }

    pub fn max_sentences_per_chunk(&self) -> usize {
        self.max_sentences_per_chunk.get()
    }

    pub fn segment(&self, text: &str) -> Vec<String> {
        segment(text, self.max_sentences_per_chunk)
    }
}

/// Split `text` into chunks of at most `max_sentences_per_chunk` sentences.
///
/// Member sentences are joined with a single space. Empty or whitespace-only
/// input yields no chunks.
pub fn segment(text: &str, max_sentences_per_chunk: NonZeroUsize) -> Vec<String> {
    split_sentences(text)
        .chunks(max_sentences_per_chunk.get())
        .map(|group| group.join(" "))
        .collect()
}

/// Sentence units of `text`, trimmed, in source order. Each is a slice of `text`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    // (start, end) byte ranges of non-blank sentences
    let mut spans: Vec<(usize, usize)> = Vec::new();
    // initials-only pieces ("J. ", "R. ") waiting for the name they belong to
    let mut initials: Vec<(usize, usize)> = Vec::new();
    let mut offset = 0usize;
    for raw in text.split_sentence_bounds() {
        let (start, end) = (offset, offset + raw.len());
        offset = end;
        if raw.trim().is_empty() {
            continue;
        }
        if is_initials_only(raw) {
            initials.push((start, end));
            continue;
        }
        let start = initials.first().map_or(start, |first| first.0);
        initials.clear();
        push_span(text, &mut spans, (start, end));
    }
    // a trailing run of initials had no name after it
    for piece in initials {
        push_span(text, &mut spans, piece);
    }

    spans
        .into_iter()
        .map(|(start, end)| text[start..end].trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn push_span(text: &str, spans: &mut Vec<(usize, usize)>, span: (usize, usize)) {
    match spans.last_mut() {
        Some(prev) if ends_with_title(&text[prev.0..prev.1]) => prev.1 = span.1,
        _ => spans.push(span),
    }
}

/// True when the sentence's last word is a capitalised title such as "Dr.".
fn ends_with_title(sentence: &str) -> bool {
    sentence
        .split_whitespace()
        .last()
        .map(|last| last.trim_start_matches(|c: char| !c.is_alphanumeric()))
        .and_then(|last| last.strip_suffix('.'))
        .is_some_and(|body| TITLES.contains(body))
}

/// True when every word is a single capital letter with a period ("J.", "J. R.").
/// A lone "I." is the pronoun, not an initial.
fn is_initials_only(piece: &str) -> bool {
    let mut words = piece.split_whitespace().peekable();
    words.peek().is_some()
        && words.all(|word| {
            let mut chars = word.chars();
            matches!(
                (chars.next(), chars.next(), chars.next()),
                (Some(c), Some('.'), None) if c.is_uppercase() && c != 'I'
            )
        })
}
