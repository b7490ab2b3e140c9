//! Model loading and inference for the is-it-fiction genre classifier.
//!
//! The pre-trained artifact is a set of linear scoring heads over a shared
//! TF-IDF feature space: one verdict head producing the non-fiction
//! probability, plus optional fine-grained genre heads for the ranking
//! table. Because the heads expose their coefficients, token-level
//! explanations (word clouds) can be computed directly from the model.
//!
//! The model is loaded once at startup and shared read-only; all prediction
//! functions are pure with respect to the loaded artifact.

mod error;
mod model;
mod pipeline;

pub use error::ModelError;
pub use model::{GenreModel, LinearHead, MODEL_FORMAT_VERSION};
pub use pipeline::{
    genre_scores, predict, predict_batch, token_weights, Genre, Prediction, DECISION_THRESHOLD,
};
