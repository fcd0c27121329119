//! Word tokenization used when re-splitting layout tokens.
//!
//! Splits text into runs of word characters, runs of whitespace and
//! individual symbol characters. Splitting never loses characters: the
//! concatenation of the returned tokens equals the input.

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[derive(PartialEq)]
enum CharClass {
    Word,
    Whitespace,
    Symbol,
}

fn char_class(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Whitespace
    } else if is_word_char(ch) {
        CharClass::Word
    } else {
        CharClass::Symbol
    }
}

/// Split `text` into word, whitespace and symbol tokens.
///
/// Symbol characters are emitted one per token so that punctuation attached
/// to a word (e.g. a trailing comma) becomes its own token. Returns an empty
/// vector only for empty input.
pub fn tokenize_keep_whitespace(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_class = CharClass::Symbol;
    for ch in text.chars() {
        let class = char_class(ch);
        let splits = current.is_empty() || class != current_class || class == CharClass::Symbol;
        if splits && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.push(ch);
        current_class = class;
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Like [`tokenize_keep_whitespace`], with whitespace tokens removed.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_keep_whitespace(text)
        .into_iter()
        .filter(|token| !token.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_single_word_intact() {
        assert_eq!(tokenize_keep_whitespace("token"), vec!["token"]);
    }

    #[test]
    fn splits_words_and_whitespace() {
        assert_eq!(
            tokenize_keep_whitespace("two words"),
            vec!["two", " ", "words"]
        );
    }

    #[test]
    fn splits_punctuation_into_single_tokens() {
        assert_eq!(
            tokenize_keep_whitespace("a,b.."),
            vec!["a", ",", "b", ".", "."]
        );
    }

    #[test]
    fn round_trips_input_text() {
        let text = "Smith, J.  (ed.)\tIntro";
        assert_eq!(tokenize_keep_whitespace(text).concat(), text);
    }

    #[test]
    fn tokenize_drops_whitespace() {
        assert_eq!(tokenize("two words"), vec!["two", "words"]);
    }
}
