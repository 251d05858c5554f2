/*!
 * Syllable estimation for caption grouping.
 *
 * English words are estimated by counting vowel clusters and correcting for
 * the common silent endings. Anything the English rules cannot read (accented
 * or non-Latin letters, digits) falls back to plain vowel-cluster or digit
 * counting. Every input yields at least one syllable so grouping always makes
 * progress.
 */

use once_cell::sync::Lazy;
use regex::Regex;

// @const: ASCII vowel clusters, `y` included
static ENGLISH_VOWEL_GROUPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[aeiouy]+").unwrap()
});

// @const: Vowel clusters for any Latin-script word
static LATIN_VOWEL_GROUPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[aeiouyàáâãäåæèéêëìíîïòóôõöøùúûüýÿœ]+").unwrap()
});

// @const: Vowel pairs usually spoken as two syllables (ra-di-o, li-on)
static HIATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^tsc]i[ao]|^i[ao]|eo").unwrap()
});

/// Estimates how many syllables a word takes to say
pub trait SyllableCounter: Send + Sync {
    /// Return a positive syllable count for the word
    fn estimate(&self, word: &str) -> u32;
}

/// Heuristic English syllable counter
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishSyllables;

impl EnglishSyllables {
    /// Create a new counter
    pub fn new() -> Self {
        Self
    }
}

impl SyllableCounter for EnglishSyllables {
    fn estimate(&self, word: &str) -> u32 {
        estimate(word)
    }
}

/// Estimate syllables in a word. Always returns at least 1.
pub fn estimate(word: &str) -> u32 {
    // Compounds like "mother-in-law" are the sum of their parts
    let total: u32 = word
        .split(['-', '–', '—', '/'])
        .map(estimate_part)
        .sum();
    total.max(1)
}

fn estimate_part(part: &str) -> u32 {
    let letters: String = part
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(|c| c.to_lowercase())
        .collect();

    if letters.is_empty() {
        let digits = part.chars().filter(|c| c.is_ascii_digit()).count() as u32;
        return digits;
    }

    if letters.is_ascii() {
        english_count(&letters)
    } else {
        (LATIN_VOWEL_GROUPS.find_iter(&letters).count() as u32).max(1)
    }
}

fn english_count(word: &str) -> u32 {
    let mut count = ENGLISH_VOWEL_GROUPS.find_iter(word).count() as i64;

    if count > 1 {
        if word.ends_with("le") {
            // "whale" drops the e, "table" keeps the consonant + le syllable
            let before = word.len().checked_sub(3).and_then(|i| word.as_bytes().get(i));
            if before.is_some_and(|b| is_vowel(*b)) {
                count -= 1;
            }
        } else if word.ends_with('e') && !word.ends_with("ee") && !word.ends_with("ye") {
            count -= 1;
        } else if word.ends_with("ed") && !word.ends_with("ted") && !word.ends_with("ded") {
            count -= 1;
        } else if word.ends_with("es") && !ends_with_sibilant_es(word) {
            count -= 1;
        }
    }

    count += HIATUS.find_iter(word).count() as i64;

    count.max(1) as u32
}

fn ends_with_sibilant_es(word: &str) -> bool {
    ["ses", "zes", "ces", "ges", "xes", "shes", "ches"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u' | b'y')
}
