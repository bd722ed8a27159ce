//! Plain-text statistics used by the validators.
//!
//! Drafts are treated as lightweight Markdown: lines starting with `#` are
//! headings, lines starting with `-`, `*` or `1.` are list items, and blank lines
//! separate paragraphs.

/// Words in the text, stripped of surrounding punctuation.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Number of words.
pub fn word_count(text: &str) -> usize {
    words(text).len()
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Sentences outside headings, each keeping its terminal punctuation.
///
/// # Examples
///
/// ```
/// use scriptorium_quality::text::sentences;
///
/// let found = sentences("# Title\nPrices rose 3.5% in May. Why? Demand!");
/// assert_eq!(found, vec!["Prices rose 3.5% in May.", "Why?", "Demand!"]);
/// ```
pub fn sentences(text: &str) -> Vec<String> {
    let body = text
        .lines()
        .filter(|line| !is_heading(line))
        .map(|line| line.trim().trim_start_matches(['-', '*']).trim())
        .collect::<Vec<_>>()
        .join(" ");

    let mut found = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|next| next.is_whitespace());
        if at_boundary {
            push_sentence(&mut found, &current);
            current.clear();
        }
    }
    push_sentence(&mut found, &current);
    found
}

fn push_sentence(found: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !words(trimmed).is_empty() {
        found.push(trimmed.to_string());
    }
}

/// Heuristic syllable count for one word.
///
/// # Examples
///
/// ```
/// use scriptorium_quality::text::count_syllables;
///
/// assert_eq!(count_syllables("cat"), 1);
/// assert_eq!(count_syllables("garden"), 2);
/// assert_eq!(count_syllables("make"), 1);
/// assert_eq!(count_syllables("table"), 2);
/// ```
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(|c| c.to_lowercase())
        .collect();
    if letters.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    let len = letters.len();
    let silent_e = len > 2
        && letters[len - 1] == 'e'
        && letters[len - 2] != 'l'
        && !is_vowel(letters[len - 2]);
    if silent_e && count > 1 {
        count -= 1;
    }
    count.max(1)
}

/// Flesch reading ease, or `None` for text without words.
///
/// Higher is easier: 90+ is very easy, 60-70 plain English, below 30 academic.
pub fn flesch_reading_ease(text: &str) -> Option<f64> {
    let body_words = words(text);
    if body_words.is_empty() {
        return None;
    }
    let sentence_count = sentences(text).len().max(1) as f64;
    let word_total = body_words.len() as f64;
    let syllables: usize = body_words.iter().map(|w| count_syllables(w)).sum();

    Some(206.835 - 1.015 * (word_total / sentence_count) - 84.6 * (syllables as f64 / word_total))
}

/// Heading texts, without the leading `#` markers.
pub fn headings(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| is_heading(line))
        .map(|line| line.trim_start().trim_start_matches('#').trim())
        .filter(|heading| !heading.is_empty())
        .collect()
}

/// Paragraphs of body text (headings excluded), split on blank lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_heading(trimmed) {
            if !current.is_empty() {
                found.push(current.join(" "));
                current.clear();
            }
            continue;
        }
        current.push(trimmed);
    }
    if !current.is_empty() {
        found.push(current.join(" "));
    }
    found
}

/// Number of bulleted or numbered list items.
pub fn list_items(text: &str) -> usize {
    text.lines()
        .map(str::trim_start)
        .filter(|line| {
            if line.starts_with("- ") || line.starts_with("* ") {
                return true;
            }
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            digits > 0 && matches!(line[digits..].chars().next(), Some('.') | Some(')'))
        })
        .count()
}

/// Words of five or more letters written entirely in capitals.
pub fn shouting_words(text: &str) -> usize {
    words(text)
        .into_iter()
        .filter(|word| {
            word.chars().count() >= 5
                && word.chars().all(|c| c.is_alphabetic())
                && word.chars().all(|c| c.is_uppercase())
        })
        .count()
}

/// Non-overlapping, case-insensitive occurrences of `phrase` in `text`.
pub fn count_phrase(text: &str, phrase: &str) -> usize {
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(needle.as_str()).count()
}
