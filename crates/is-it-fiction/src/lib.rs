//! # is-it-fiction
//!
//! A fiction vs non-fiction text classifier built with Rust.
//!
//! This crate classifies either a single long text or a batch of short
//! social-media posts using a pre-trained linear model over TF-IDF
//! features, and reports the verdict with supporting evidence: a per-genre
//! probability ranking, a word cloud of the tokens that drove the verdict,
//! and — for multi-post input — the single most representative post.
//!
//! ## Quick Start
//!
//! ```no_run
//! use is_it_fiction::{GenreModel, Reporter};
//!
//! let model = GenreModel::load("genre-model.bin".as_ref())?;
//! let reporter = Reporter::new(model);
//!
//! let report = reporter.classify_text("Once upon a time, a dragon ruled the valley.")?;
//! println!(
//!     "{} (non-fiction probability {:.2}%)",
//!     report.genre,
//!     report.probability * 100.0
//! );
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Classifying an account's posts
//!
//! ```no_run
//! use is_it_fiction::{
//!     Document, DocumentSource, GenreModel, JsonlSource, Reporter, RECENT_DOCUMENT_LIMIT,
//! };
//!
//! let model = GenreModel::load("genre-model.bin".as_ref())?;
//! let reporter = Reporter::new(model);
//!
//! let source = JsonlSource::new("archives");
//! let posts = source.recent_documents("goodcaptain", RECENT_DOCUMENT_LIMIT)?;
//! let report = reporter.classify_documents(&posts)?;
//!
//! if let Some(best) = &report.best_document {
//!     println!("most representative post: {:?}", best.id);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Rendering
//!
//! [`render`] turns a [`Report`] into self-contained HTML fragments: the
//! verdict and probability sentences, the genre table, and SVG charts
//! embedded as base64 data URIs — no filesystem involved.

pub mod cli;
mod render;
mod report;
mod source;

pub use fiction_inference::{
    Genre, GenreModel, LinearHead, ModelError, Prediction, DECISION_THRESHOLD,
    MODEL_FORMAT_VERSION,
};
pub use render::{permalink, render, RenderOptions, RenderedReport};
pub use report::{BestDocument, GenreShare, GenreTable, Report, ReportError, Reporter, WordCloud};
pub use source::{Document, DocumentSource, JsonlSource, SourceError, RECENT_DOCUMENT_LIMIT};
