use ahash::AHashMap as HashMap;
use dashmap::DashMap;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

/// Count the word n-grams of one tokenized document.
///
/// An n-gram is stored as its words joined by a single space, so vocabulary
/// entries stay directly renderable in word clouds.
pub fn count_ngrams(tokens: &[String], ngram_range: (usize, usize)) -> HashMap<String, usize> {
    let (min_n, max_n) = ngram_range;
    let mut ngram_counter = HashMap::new();

    for n in min_n..=max_n {
        if n == 0 || n > tokens.len() {
            continue;
        }
        for window in tokens.windows(n) {
            *ngram_counter.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    ngram_counter
}

/// Build a document-frequency map over all n-grams of the corpus.
pub fn build_vocabulary(
    tokenized_texts: &[Vec<String>],
    ngram_range: (usize, usize),
) -> DashMap<String, usize, ahash::RandomState> {
    let vocab_df = DashMap::with_hasher(ahash::RandomState::default());

    tokenized_texts.par_iter().progress().for_each(|tokens| {
        let ngrams = count_ngrams(tokens, ngram_range);
        for token in ngrams.into_keys() {
            vocab_df
                .entry(token)
                .and_modify(|e| *e += 1)
                .or_insert(1usize);
        }
    });
    vocab_df
}
