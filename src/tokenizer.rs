//! Splits document bodies and queries into terms. Per spec.md §3/§4.1 this
//! is a trivial rule — any byte that isn't ASCII alphanumeric is a
//! separator — with no stemming and no stop-word removal (both explicit
//! Non-goals). Terms are lowercased so that index-time and query-time
//! tokenization agree byte-for-byte, which is what makes lexicon lookup a
//! plain string-equality probe.
///
/// Mirrors the teacher's `SearchTokenizer` in overall shape (a struct
/// exposing a `tokenize` method) but drops stop-word filtering and the
/// positional bookkeeping the teacher's version carries for phrase search.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer
    }

    /// Splits `text` into lowercase alphanumeric runs.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        let mut current = String::new();
        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() {
                current.push(ch.to_ascii_lowercase());
            } else if !current.is_empty() {
                terms.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            terms.push(current);
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_whitespace() {
        let tok = Tokenizer::new();
        assert_eq!(
            tok.tokenize("The quick-brown fox, jumps!"),
            vec!["the", "quick", "brown", "fox", "jumps"]
        );
    }

    #[test]
    fn empty_input_yields_no_terms() {
        assert!(Tokenizer::new().tokenize("   ---  ").is_empty());
    }

    #[test]
    fn numbers_are_kept_as_terms() {
        assert_eq!(Tokenizer::new().tokenize("covid19 2020"), vec!["covid19", "2020"]);
    }
}
