use super::preprocess::TextPreprocessor;
use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Smooth-idf TF-IDF with L2 normalisation over a sorted vocabulary.
#[derive(Debug, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    #[serde(skip)]
    preprocessor: TextPreprocessor,
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Result<Self> {
        if documents.is_empty() {
            return Err(DetectorError::Training(
                "Cannot fit a vectorizer on zero documents".to_string(),
            ));
        }

        let preprocessor = TextPreprocessor::new();
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for document in documents {
            let unique: HashSet<String> = preprocessor.terms(document.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(DetectorError::Training(
                "Empty vocabulary; documents contain only stop words".to_string(),
            ));
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self {
            vocabulary,
            idf,
            preprocessor,
        })
    }

    pub fn transform(&self, text: &str) -> Result<Vec<f64>> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(DetectorError::ModelInference(format!(
                "Vectorizer is inconsistent: {} idf weights for {} terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }

        let mut vector = vec![0.0; self.idf.len()];
        for term in self.preprocessor.terms(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                let slot = vector.get_mut(index).ok_or_else(|| {
                    DetectorError::ModelInference(format!(
                        "Term '{}' maps outside the feature space",
                        term
                    ))
                })?;
                *slot += 1.0;
            }
        }

        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    pub fn transform_all<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<Vec<f64>>> {
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.vocabulary.keys().map(|k| k.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_sorted() {
        let vectorizer = TfidfVectorizer::fit(&["zebra apple", "mango apple"]).unwrap();
        assert_eq!(vectorizer.feature_names(), vec!["appl", "mango", "zebra"]);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let vectorizer = TfidfVectorizer::fit(&["zebra apple", "mango apple"]).unwrap();
        let row = vectorizer.transform("zebra apple apple").unwrap();
        let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        let vectorizer = TfidfVectorizer::fit(&["zebra apple", "mango apple"]).unwrap();
        let row = vectorizer.transform("zebra apple").unwrap();
        // apple appears in both documents, zebra in one
        assert!(row[2] > row[0]);
        assert!((vectorizer.idf[0] - 1.0).abs() < 1e-12);
        assert!((vectorizer.idf[2] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_text_gives_zero_vector() {
        let vectorizer = TfidfVectorizer::fit(&["zebra apple"]).unwrap();
        let row = vectorizer.transform("completely different words").unwrap();
        assert!(row.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fit_errors() {
        let empty: [&str; 0] = [];
        assert!(TfidfVectorizer::fit(&empty).is_err());
        assert!(TfidfVectorizer::fit(&["the and of", "a"]).is_err());
    }

    #[test]
    fn test_corrupted_vectorizer_fails_transform() {
        let mut vectorizer = TfidfVectorizer::fit(&["zebra apple"]).unwrap();
        vectorizer.idf.pop();
        assert!(matches!(
            vectorizer.transform("zebra"),
            Err(DetectorError::ModelInference(_))
        ));
    }
}
