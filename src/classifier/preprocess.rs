use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

/// NLTK's English stop word list.
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't",
    "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn",
    "mustn't", "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't",
    "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

/// Letters only, lowercased, stop words dropped, stemmed.
pub struct TextPreprocessor {
    non_alpha: Regex,
    stop_words: HashSet<&'static str>,
    stemmer: Stemmer,
}

impl std::fmt::Debug for TextPreprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPreprocessor")
            .field("stop_words", &self.stop_words.len())
            .finish()
    }
}

impl Default for TextPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPreprocessor {
    pub fn new() -> Self {
        Self {
            non_alpha: Regex::new(r"[^a-zA-Z]").unwrap(),
            stop_words: STOP_WORDS.iter().copied().collect(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn clean(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Terms as the vectorizer counts them. Single-letter stems are dropped.
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.tokens(text)
            .into_iter()
            .filter(|t| t.chars().count() >= 2)
            .collect()
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let letters = self.non_alpha.replace_all(text, " ").to_lowercase();
        letters
            .split_whitespace()
            .filter(|word| !self.stop_words.contains(word))
            .map(|word| self.stemmer.stem(word).into_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_non_letters_and_stop_words() {
        let pre = TextPreprocessor::new();
        assert_eq!(pre.clean("Meeting at 10 am tomorrow!"), "meet tomorrow");
        assert_eq!(pre.clean("You won a lottery click now"), "lotteri click");
    }

    #[test]
    fn test_empty_and_symbol_only_text() {
        let pre = TextPreprocessor::new();
        assert_eq!(pre.clean(""), "");
        assert!(pre.terms("$$$ 123 !!!").is_empty());
    }

    #[test]
    fn test_terms_drop_single_letters() {
        let pre = TextPreprocessor::new();
        assert_eq!(pre.terms("x marks prizes"), vec!["mark", "prize"]);
    }
}
