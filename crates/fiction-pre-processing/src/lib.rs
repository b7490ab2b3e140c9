//! Pre-processing for the is-it-fiction genre classifier.
//!
//! Provides word-level TF-IDF vectorization with n-gram features, matching
//! the representation the pre-trained genre model was fit with.

pub mod pre_processor;
