//! Content analysis heuristics for scene processing.
//!
//! Pure keyword-based scoring and segmentation helpers. These run without any
//! external service, which keeps the processing pipeline usable when the
//! scene detector only supplies raw boundaries.

use crate::catalog::SceneSpan;

/// Keywords that indicate instructional content.
const EDUCATIONAL_KEYWORDS: &[&str] = &[
    "explain", "demonstrate", "show", "example", "step", "process", "method", "technique",
    "principle", "concept", "theory", "formula", "equation", "definition", "meaning",
    "understand", "learn", "study", "observe", "notice", "important", "remember", "key", "main",
    "first", "second", "next", "then", "finally", "because", "therefore", "result", "conclusion",
    "summary", "review",
];

const QUESTION_INDICATORS: &[&str] = &["what", "how", "why", "when", "where", "which"];

/// Extract the transcript fragment for a time range.
///
/// Word-level timestamps are not available, so the slice is estimated from an
/// assumed speaking rate.
pub fn extract_segment(
    transcript: &str,
    start_seconds: f64,
    end_seconds: f64,
    words_per_second: f64,
) -> String {
    let words: Vec<&str> = transcript.split_whitespace().collect();
    let start_word = (start_seconds * words_per_second) as usize;
    let end_word = ((end_seconds * words_per_second) as usize).min(words.len());

    if start_word >= end_word {
        return String::new();
    }
    words[start_word..end_word].join(" ")
}

/// Score how instructional a transcript fragment is, in [0, 1].
pub fn education_score(transcript: &str) -> f64 {
    let lower = transcript.to_lowercase();
    let word_count = lower.split_whitespace().count();
    if word_count == 0 {
        return 0.0;
    }

    let edu_count = EDUCATIONAL_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count();
    let question_count = QUESTION_INDICATORS
        .iter()
        .filter(|k| lower.contains(*k))
        .count();

    let edu_score = edu_count as f64 / word_count as f64;
    let question_score = question_count as f64 / word_count as f64;

    let total = edu_score * 0.7 + question_score * 0.3;
    (total * 10.0).min(1.0)
}

/// Detect the dominant educational content type of a transcript fragment.
pub fn detect_content_type(transcript: &str) -> String {
    if transcript.trim().is_empty() {
        return "visual-content".to_string();
    }

    let lower = transcript.to_lowercase();

    let patterns: &[(&str, &[&str])] = &[
        ("definition", &["define", "definition", "means", "is defined as", "refers to"]),
        ("demonstration", &["demonstrate", "show you", "watch", "observe", "see here"]),
        ("explanation", &["explain", "because", "reason", "why", "how it works"]),
        ("example", &["example", "for instance", "such as", "like this", "consider"]),
        ("problem-solving", &["solve", "solution", "answer", "calculate", "find"]),
        ("experiment", &["experiment", "test", "try", "hypothesis", "result"]),
        ("review", &["review", "summary", "recap", "remember", "covered"]),
        ("introduction", &["today", "going to", "will learn", "introduce", "begin"]),
    ];

    let best = patterns
        .iter()
        .map(|(name, keywords)| {
            let score = keywords.iter().filter(|k| lower.contains(*k)).count();
            (*name, score)
        })
        .max_by_key(|(_, score)| *score);

    match best {
        Some((name, score)) if score > 0 => name.to_string(),
        _ => "general-content".to_string(),
    }
}

/// Merge scenes shorter than the minimum length into their predecessor.
///
/// Spans are sorted by start time first, and absorbing a span never moves
/// the predecessor's end backwards, so every merged span keeps
/// `end_seconds > start_seconds` even for overlapping input.
///
/// A short leading scene has no predecessor and is dropped only if another
/// scene follows to absorb its time range; otherwise it is kept as-is.
pub fn merge_short_spans(mut spans: Vec<SceneSpan>, min_seconds: f64) -> Vec<SceneSpan> {
    spans.sort_by(|a, b| {
        a.start_seconds
            .partial_cmp(&b.start_seconds)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut merged: Vec<SceneSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        if span.duration() < min_seconds {
            if let Some(last) = merged.last_mut() {
                last.end_seconds = last.end_seconds.max(span.end_seconds);
                continue;
            }
        }
        merged.push(span);
    }

    merged
}

/// Fixed-interval segmentation fallback for when no boundaries are supplied.
pub fn fixed_interval_spans(duration_seconds: f64, interval_seconds: f64) -> Vec<SceneSpan> {
    if duration_seconds <= 0.0 || interval_seconds <= 0.0 {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut start = 0.0;
    while start < duration_seconds {
        let end = (start + interval_seconds).min(duration_seconds);
        spans.push(SceneSpan {
            start_seconds: start,
            end_seconds: end,
        });
        start = end;
    }
    spans
}
