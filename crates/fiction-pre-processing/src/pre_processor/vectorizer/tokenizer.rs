use std::borrow::Cow;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressIterator, ProgressStyle};
use rayon::prelude::*;
use tracing::debug;

/// Minimum number of texts to consider parallelization
const MIN_TEXTS_FOR_PARALLEL: usize = 100;

/// Minimum total character count to consider parallelization
const MIN_CHARS_FOR_PARALLEL: usize = 10_000;

/// Shortest token kept by the analyzer. Single characters carry no genre
/// signal and bloat the vocabulary.
const MIN_TOKEN_CHARS: usize = 2;

fn progress_bar_setup(len: usize, message: impl Into<Cow<'static, str>>) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    pb
}

/// Split a text into lowercase word tokens.
///
/// A token is a maximal run of alphanumeric characters; runs shorter than
/// [`MIN_TOKEN_CHARS`] are discarded. Word-level tokens keep the vocabulary
/// human-readable, which the word-cloud explanation depends on.
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            if current.chars().count() >= MIN_TOKEN_CHARS {
                words.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.chars().count() >= MIN_TOKEN_CHARS {
        words.push(current);
    }
    words
}

fn tokenize_texts_par<T: AsRef<str> + Sync>(texts: &[T]) -> Vec<Vec<String>> {
    debug!(num_texts = texts.len(), "Using parallel tokenization");
    let pb = progress_bar_setup(texts.len(), "Tokenizing texts in parallel");
    let result = texts
        .par_iter()
        .progress_with(pb.clone())
        .map(|text| split_words(text.as_ref()))
        .collect();
    pb.finish_with_message("Parallel tokenization complete");
    result
}

fn tokenize_texts<T: AsRef<str>>(texts: &[T]) -> Vec<Vec<String>> {
    debug!(num_texts = texts.len(), "Using sequential tokenization");
    let pb = progress_bar_setup(texts.len(), "Tokenizing texts");

    let result = texts
        .iter()
        .progress_with(pb.clone())
        .map(|text| split_words(text.as_ref()))
        .collect();
    pb.finish_with_message("Tokenization complete");
    result
}

/// Determine if parallel processing should be used based on workload characteristics.
///
/// Parallelization is beneficial when:
/// - There are many texts (>= 100), OR
/// - The total character count is large (>= 10,000 chars)
///
/// This heuristic balances thread spawning overhead against tokenization work.
#[inline]
fn should_use_parallel<T: AsRef<str>>(texts: &[T]) -> bool {
    let num_texts = texts.len();

    // If we have many texts, always parallelize
    if num_texts >= MIN_TEXTS_FOR_PARALLEL {
        return true;
    }

    // For fewer texts, check total workload
    // Sample first few to estimate average length if we have many
    let total_chars: usize = if num_texts > 20 {
        // Estimate based on first 20 texts to avoid iterating all
        let sample_chars: usize = texts.iter().take(20).map(|s| s.as_ref().len()).sum();
        (sample_chars * num_texts) / 20 // estimated total
    } else {
        texts.iter().map(|s| s.as_ref().len()).sum()
    };

    total_chars >= MIN_CHARS_FOR_PARALLEL
}

pub fn tokenize<T: AsRef<str> + Sync>(texts: &[T]) -> Vec<Vec<String>> {
    if should_use_parallel(texts) {
        tokenize_texts_par(texts)
    } else {
        tokenize_texts(texts)
    }
}
