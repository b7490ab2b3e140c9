use ahash::HashMap;
use sprs::CsMat;
use tracing::debug;

use super::{count_vectorizer::CountVectorizer, params::VectorizerParams};

#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct TfidfVectorizer {
    count_vectorizer: CountVectorizer,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit<T: AsRef<str> + Sync>(
        texts: &[T],
        count_vectorizer_params: VectorizerParams,
    ) -> Self {
        debug!(num_texts = texts.len(), "Fitting TfidfVectorizer");
        let (count_vectorizer, tf_matrix) =
            CountVectorizer::fit_transform(texts, count_vectorizer_params);
        debug!("Calculating IDF values");

        // Calculate IDF: log((n_docs + 1) / (df + 1)) + 1
        let n_docs = texts.len() as f64;
        let num_features = count_vectorizer.num_features();

        // Count document frequency for each term
        let mut df = vec![0usize; num_features];

        for row_vec in tf_matrix.outer_iterator() {
            for (col_idx, _val) in row_vec.iter() {
                df[col_idx] += 1;
            }
        }
        // Compute IDF values
        let idf = df
            .iter()
            .map(|&doc_freq| ((n_docs + 1.0) / (doc_freq as f64 + 1.0)).ln() + 1.0)
            .collect();
        debug!("IDF calculation complete");

        Self {
            count_vectorizer,
            idf,
        }
    }

    pub fn transform<T: AsRef<str> + Sync>(&self, texts: &[T]) -> CsMat<f64> {
        debug!(
            num_texts = texts.len(),
            "Transforming texts using TfidfVectorizer"
        );
        let sublinear_tf = self.count_vectorizer.params().sublinear_tf();
        let mut tf_matrix = self.count_vectorizer.transform(texts);

        // Apply TF-IDF transformation
        for mut row_vec in tf_matrix.outer_iterator_mut() {
            // Apply sublinear tf scaling and IDF
            for (col_idx, val) in row_vec.iter_mut() {
                if sublinear_tf {
                    *val = 1.0 + val.ln();
                }
                *val *= self.idf[col_idx];
            }
            // Normalize row vector (L2 norm)
            let norm = row_vec.iter().map(|(_, &v)| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, val) in row_vec.iter_mut() {
                    *val /= norm;
                }
            }
        }
        tf_matrix
    }

    pub fn fit_transform<T: AsRef<str> + Sync>(
        texts: &[T],
        count_vectorizer_params: VectorizerParams,
    ) -> (Self, CsMat<f64>) {
        let vectorizer = Self::fit(texts, count_vectorizer_params);
        let transformed = vectorizer.transform(texts);
        (vectorizer, transformed)
    }

    pub fn num_features(&self) -> usize {
        self.count_vectorizer.num_features()
    }

    /// Get the vocabulary as a mapping of n-gram text to feature index.
    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        self.count_vectorizer.vocabulary()
    }

    /// Vocabulary terms ordered by feature index, for reverse lookup.
    pub fn terms(&self) -> Vec<String> {
        self.count_vectorizer.terms()
    }

    pub fn params(&self) -> &VectorizerParams {
        self.count_vectorizer.params()
    }
}

#[cfg(feature = "bincode")]
impl TfidfVectorizer {
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::encode_to_vec(self, bincode::config::standard())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::error::DecodeError> {
        let (vectorizer, _) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(vectorizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> [&'static str; 3] {
        [
            "the dragon burned the castle",
            "the senate passed the budget",
            "the dragon guarded the gold",
        ]
    }

    fn unigram_params() -> VectorizerParams {
        VectorizerParams::new(1..=1, 1.0, 1.0, false)
    }

    #[test]
    fn rows_are_l2_normalized() {
        let (_, matrix) = TfidfVectorizer::fit_transform(&corpus(), unigram_params());
        for row in matrix.outer_iterator() {
            let norm = row.iter().map(|(_, &v)| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rarer_terms_get_higher_idf_weight() {
        let vectorizer = TfidfVectorizer::fit(&corpus(), unigram_params());
        let matrix = vectorizer.transform(&["the castle"]);
        let row = matrix.outer_view(0).unwrap().to_dense();

        let vocab = vectorizer.vocabulary();
        // "castle" appears in one document, "the" in all three
        assert!(row[vocab["castle"]] > row[vocab["the"]]);
    }

    #[test]
    fn transform_is_deterministic() {
        let vectorizer = TfidfVectorizer::fit(&corpus(), unigram_params());
        let a = vectorizer.transform(&["the dragon and the gold"]);
        let b = vectorizer.transform(&["the dragon and the gold"]);
        assert_eq!(a.to_dense(), b.to_dense());
    }

    #[test]
    fn out_of_vocabulary_text_transforms_to_zero_row() {
        let vectorizer = TfidfVectorizer::fit(&corpus(), unigram_params());
        let matrix = vectorizer.transform(&["xylophone quartet"]);
        assert_eq!(matrix.nnz(), 0);
    }

    #[cfg(feature = "bincode")]
    #[test]
    fn bytes_round_trip_preserves_transform() {
        let vectorizer = TfidfVectorizer::fit(&corpus(), unigram_params());
        let restored = TfidfVectorizer::from_bytes(&vectorizer.to_bytes().unwrap()).unwrap();

        let text = ["the dragon guarded the castle"];
        assert_eq!(
            vectorizer.transform(&text).to_dense(),
            restored.transform(&text).to_dense()
        );
        assert_eq!(vectorizer.terms(), restored.terms());
    }
}
