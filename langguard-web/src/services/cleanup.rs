//! Deterministic post-processing of translated text
//!
//! Machine translation of transcribed speech tends to come back with run-on
//! sentences, stray periods inside words and a handful of recurring
//! mistranslations. [`clean_translation`] normalizes that output. It is
//! idempotent: cleaning cleaned text changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;

/// Whole-word, case-insensitive corrections applied after sentence breaking
const CORRECTIONS: &[(&str, &str)] = &[
    ("miz", "We"),
    ("senses social science", "Social Sciences"),
    ("we has", "we have"),
    ("i", "I"),
    ("scis", "SCIS"),
    ("suss", "SUSS"),
];

struct CleanupRules {
    whitespace: Regex,
    period_runs: Regex,
    corrections: Vec<(Regex, &'static str)>,
}

impl CleanupRules {
    fn compile() -> Result<Self, regex::Error> {
        let corrections = CORRECTIONS
            .iter()
            .map(|(from, to)| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(from))).map(|re| (re, *to))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            period_runs: Regex::new(r"\.{2,}")?,
            corrections,
        })
    }
}

static RULES: Lazy<Result<CleanupRules, regex::Error>> = Lazy::new(CleanupRules::compile);

/// Normalize translated text
///
/// Steps, in order:
/// 1. collapse whitespace runs to one space and trim
/// 2. collapse runs of periods
/// 3. drop periods between two word characters (`a.b` → `ab`)
/// 4. break sentences at lower→upper case transitions (`endStart` → `end. Start`)
/// 5. apply the correction table
/// 6. trim and capitalize every `". "`-separated sentence, dropping empty ones
/// 7. end with a period
pub fn clean_translation(text: &str) -> String {
    let rules = match RULES.as_ref() {
        Ok(rules) => rules,
        Err(e) => {
            error!(error = %e, "Cleanup rules failed to compile");
            return ensure_final_period(text.trim().to_string());
        }
    };

    let text = rules.whitespace.replace_all(text, " ");
    let text = rules.period_runs.replace_all(text.trim(), ".");
    let text = remove_inner_periods(&text);
    let mut text = insert_sentence_breaks(&text);

    for (pattern, replacement) in &rules.corrections {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    let sentences: Vec<String> = text
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(capitalize_first)
        .collect();

    ensure_final_period(sentences.join(". "))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Remove `.` flanked by word characters, except inside numbers (`3.5`)
fn remove_inner_periods(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == '.' && i > 0 && i + 1 < chars.len() {
            let (prev, next) = (chars[i - 1], chars[i + 1]);
            let decimal = prev.is_ascii_digit() && next.is_ascii_digit();
            if is_word_char(prev) && is_word_char(next) && !decimal {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn insert_sentence_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if prev.is_some_and(char::is_lowercase) && c.is_uppercase() {
            out.push_str(". ");
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn capitalize_first(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ensure_final_period(mut text: String) -> String {
    if !text.ends_with('.') {
        text.push('.');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_compile() {
        assert!(RULES.as_ref().is_ok());
    }

    #[test]
    fn basic_sentence_gets_capital_and_period() {
        assert_eq!(clean_translation("hello world"), "Hello world.");
    }

    #[test]
    fn whitespace_and_period_runs_collapse() {
        assert_eq!(
            clean_translation("  this   is\n\ta test...  really "),
            "This is a test. Really."
        );
    }

    #[test]
    fn inner_periods_are_removed_but_decimals_survive() {
        assert_eq!(clean_translation("the u.s.a is big"), "The usa is big.");
        assert_eq!(clean_translation("it costs 3.50 today"), "It costs 3.50 today.");
    }

    #[test]
    fn run_on_sentences_are_split() {
        assert_eq!(
            clean_translation("we went homeThen we slept"),
            "We went home. Then we slept."
        );
    }

    #[test]
    fn correction_table_applies_whole_words_only() {
        assert_eq!(
            clean_translation("miz study senses social science at suss"),
            "We study Social Sciences at SUSS."
        );
        assert_eq!(clean_translation("so we has i think"), "So we have I think.");
        // "i" inside a word is untouched
        assert_eq!(clean_translation("this is it"), "This is it.");
        assert_eq!(clean_translation("scis students"), "SCIS students.");
    }

    #[test]
    fn empty_sentences_are_dropped() {
        assert_eq!(clean_translation("one. . two"), "One. Two.");
        assert_eq!(clean_translation(""), ".");
    }

    #[test]
    fn cleanup_is_idempotent() {
        let samples = [
            "hello world",
            "  this   is\n\ta test...  really ",
            "the u.s.a is bigAnd strong. . ok",
            "miz has i. suss?",
            "ÉcoleMaternelle ßtraße. ñandú",
            "[Translation unavailable: en -> ms] Hello world",
            "3.5 percent... of i.e. things",
            "a.B.c",
            ".",
            "",
        ];
        for sample in samples {
            let once = clean_translation(sample);
            let twice = clean_translation(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
            assert!(once.ends_with('.'), "{:?}", once);
            assert!(!once.contains("  "), "{:?}", once);
        }
    }
}
