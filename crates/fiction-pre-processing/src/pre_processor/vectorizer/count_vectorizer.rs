use ahash::{AHashMap, HashMap};
use sprs::CsMat;
use tracing::debug;

use super::{ngrams, params::VectorizerParams, tokenizer};

#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct CountVectorizer {
    params: VectorizerParams,
    /// Vocabulary mapping n-gram text to feature index. Indices are assigned
    /// in sorted n-gram order, so a fit over the same corpus is deterministic.
    vocab: HashMap<String, usize>,
}

impl CountVectorizer {
    pub fn fit<T: AsRef<str> + Sync>(texts: &[T], params: VectorizerParams) -> Self {
        debug!(num_texts = texts.len(), "Fitting CountVectorizer");
        let tokenized_texts = tokenizer::tokenize(texts);
        Self::fit_from_tokenized(&tokenized_texts, texts.len(), params, None)
    }

    /// Internal method to fit from pre-tokenized texts.
    /// Used by `fit_transform` to avoid double tokenization.
    ///
    /// # Arguments
    /// * `tokenized_texts` - Pre-tokenized documents
    /// * `num_texts` - Number of documents in the corpus
    /// * `params` - Vectorizer parameters
    /// * `precomputed_ngrams` - Optional pre-computed n-grams to avoid recomputation
    fn fit_from_tokenized(
        tokenized_texts: &[Vec<String>],
        num_texts: usize,
        params: VectorizerParams,
        precomputed_ngrams: Option<&[AHashMap<String, usize>]>,
    ) -> Self {
        debug!("Building vocabulary from tokenized texts");

        // Use pre-computed n-grams if available, otherwise compute them
        let vocab_df = precomputed_ngrams.map_or_else(
            || ngrams::build_vocabulary(tokenized_texts, params.ngram_range()),
            |ngram_maps| {
                // Fast path: reuse pre-computed n-grams
                debug!("Using pre-computed n-grams for vocabulary building");
                let vocab_df = dashmap::DashMap::with_hasher(ahash::RandomState::default());

                for ngram_map in ngram_maps {
                    for ngram_key in ngram_map.keys() {
                        vocab_df
                            .entry(ngram_key.clone())
                            .and_modify(|df| *df += 1)
                            .or_insert(1usize);
                    }
                }
                vocab_df
            },
        );

        let vocab_size = vocab_df.len();

        let min_df = params.resolved_min_df(num_texts);
        let max_df = params.resolved_max_df(num_texts);
        debug!(min_df, max_df, "Applying document-frequency filtering");
        let filtered_vocab = vocab_df
            .into_iter()
            .filter(|(_, df)| *df >= min_df && *df <= max_df)
            .map(|(token, _)| token)
            .collect::<Vec<_>>();
        debug!(
            original_size = vocab_size,
            filtered_size = filtered_vocab.len(),
            "Vocabulary filtered by document frequency"
        );

        let mut sorted_tokens = filtered_vocab;
        sorted_tokens.sort();
        let vocab = sorted_tokens
            .into_iter()
            .enumerate()
            .map(|(idx, token)| (token, idx))
            .collect::<HashMap<String, usize>>();

        debug!(vocab_size = vocab.len(), "CountVectorizer fitting complete");

        Self { params, vocab }
    }

    pub fn transform<T: AsRef<str> + Sync>(&self, texts: &[T]) -> CsMat<f64> {
        debug!(
            num_texts = texts.len(),
            "Transforming texts using CountVectorizer"
        );
        let tokenized_texts = tokenizer::tokenize(texts);
        self.transform_from_tokenized(&tokenized_texts, texts.len(), None)
    }

    /// Internal method to transform from pre-tokenized texts.
    /// Used by `fit_transform` to avoid double tokenization and n-gram computation.
    fn transform_from_tokenized(
        &self,
        tokenized_texts: &[Vec<String>],
        num_texts: usize,
        precomputed_ngrams: Option<&[AHashMap<String, usize>]>,
    ) -> CsMat<f64> {
        // Build CSR format directly
        let mut indptr = Vec::with_capacity(num_texts + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();

        indptr.push(0);

        let mut push_row = |ngram_counts: &AHashMap<String, usize>| {
            let mut row_entries = ngram_counts
                .iter()
                .filter_map(|(ngram_key, &count)| {
                    self.vocab
                        .get(ngram_key)
                        .map(|&col_idx| (col_idx, count as f64))
                })
                .collect::<Vec<_>>();

            row_entries.sort_by_key(|(col_idx, _)| *col_idx);
            for (col_idx, count) in row_entries {
                indices.push(col_idx);
                data.push(count);
            }
            indptr.push(indices.len());
        };

        if let Some(ngram_maps) = precomputed_ngrams {
            // Fast path: use pre-computed n-grams
            for ngram_counts in ngram_maps {
                push_row(ngram_counts);
            }
        } else {
            for tokens in tokenized_texts {
                let ngram_counts = ngrams::count_ngrams(tokens, self.params.ngram_range());
                push_row(&ngram_counts);
            }
        }

        debug!(
            non_zero_entries = data.len(),
            "Text transformation complete"
        );
        CsMat::new((num_texts, self.num_features()), indptr, indices, data)
    }

    /// Optimized `fit_transform` that computes n-grams only once.
    ///
    /// Tokenizes once, computes n-grams once, then reuses them for both
    /// vocabulary building and transformation.
    pub fn fit_transform<T: AsRef<str> + Sync>(
        texts: &[T],
        params: VectorizerParams,
    ) -> (Self, CsMat<f64>) {
        debug!(
            num_texts = texts.len(),
            "Optimized fit_transform: tokenizing and computing n-grams once"
        );

        let tokenized_texts = tokenizer::tokenize(texts);

        debug!("Computing n-grams for all documents");
        let ngram_maps: Vec<_> = tokenized_texts
            .iter()
            .map(|tokens| ngrams::count_ngrams(tokens, params.ngram_range()))
            .collect();

        debug!("Fitting vectorizer from cached n-grams");
        let vectorizer =
            Self::fit_from_tokenized(&tokenized_texts, texts.len(), params, Some(&ngram_maps[..]));

        debug!("Transforming using cached n-grams");
        let transformed =
            vectorizer.transform_from_tokenized(&tokenized_texts, texts.len(), Some(&ngram_maps[..]));

        debug!("fit_transform complete with single n-gram computation");
        (vectorizer, transformed)
    }

    pub fn num_features(&self) -> usize {
        self.vocab.len()
    }

    /// Get the vocabulary as a mapping of n-gram text to feature index.
    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocab
    }

    /// Vocabulary terms ordered by feature index, for reverse lookup.
    pub fn terms(&self) -> Vec<String> {
        let mut terms = vec![String::new(); self.vocab.len()];
        for (token, &idx) in &self.vocab {
            terms[idx] = token.clone();
        }
        terms
    }

    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }
}
