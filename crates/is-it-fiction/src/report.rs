use fiction_inference::{self as inference, Genre, GenreModel, ModelError};
use thiserror::Error;
use tracing::debug;

use crate::source::{Document, SourceError};

/// Errors raised while building a classification report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The input held no usable text. Recoverable by the caller (redisplay
    /// the input form); the other variants abort the request.
    #[error("input must contain at least one non-empty document")]
    EmptyInput,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// One genre's share of the probability ranking.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GenreShare {
    pub genre: String,
    pub probability: f64,
}

/// Per-genre probability ranking, populated only for fiction verdicts.
///
/// Consumers need the ranking in two orders: ascending for the bar chart
/// and descending for the results table, so both are exposed.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct GenreTable {
    rows: Vec<GenreShare>,
}

impl GenreTable {
    fn from_scores(scores: Vec<(String, f64)>) -> Self {
        let rows = scores
            .into_iter()
            .map(|(genre, probability)| GenreShare { genre, probability })
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows sorted by ascending probability (bar chart order).
    #[must_use]
    pub fn ascending(&self) -> Vec<&GenreShare> {
        let mut rows: Vec<&GenreShare> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            a.probability
                .partial_cmp(&b.probability)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then_with(|| a.genre.cmp(&b.genre))
        });
        rows
    }

    /// Rows sorted by descending probability (results table order).
    #[must_use]
    pub fn descending(&self) -> Vec<&GenreShare> {
        let mut rows = self.ascending();
        rows.reverse();
        rows
    }
}

/// Token salience weights explaining a fiction verdict, largest first.
/// A larger weight means the token pushed the verdict harder.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct WordCloud {
    weights: Vec<(String, f64)>,
}

impl WordCloud {
    fn from_weights(weights: Vec<(String, f64)>) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(token, w)| (token.as_str(), *w))
    }

    #[must_use]
    pub fn max_weight(&self) -> f64 {
        self.weights.first().map_or(0.0, |(_, w)| *w)
    }
}

/// The document judged most representative of the predicted genre.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BestDocument {
    /// Index into the input document sequence.
    pub index: usize,
    /// The document's platform id, when it has one.
    pub id: Option<String>,
}

/// Structured classification result for one input.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    /// Probability that the input is non-fiction, in [0, 1].
    pub probability: f64,
    pub genre: Genre,
    /// Empty for non-fiction verdicts.
    pub genre_table: GenreTable,
    /// Empty for non-fiction verdicts.
    pub word_cloud: WordCloud,
    /// Present only for multi-document input.
    pub best_document: Option<BestDocument>,
}

/// Stateless classifier facade over a loaded [`GenreModel`].
///
/// Construct once at startup with the loaded artifact; every call computes
/// a fresh report from its input alone.
pub struct Reporter {
    model: GenreModel,
}

impl Reporter {
    #[must_use]
    pub fn new(model: GenreModel) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn model(&self) -> &GenreModel {
        &self.model
    }

    /// Classify a single free-form text.
    pub fn classify_text(&self, text: &str) -> Result<Report, ReportError> {
        self.classify_documents(&[Document::new(text)])
    }

    /// Classify an ordered sequence of documents as one aggregate input.
    ///
    /// The verdict, ranking and word cloud describe the aggregate; with
    /// more than one document the report also names the single document
    /// most representative of the verdict.
    pub fn classify_documents(&self, documents: &[Document]) -> Result<Report, ReportError> {
        if documents.iter().all(|d| d.text.trim().is_empty()) {
            return Err(ReportError::EmptyInput);
        }

        let aggregate = documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let prediction = inference::predict(&self.model, &aggregate);
        let genre = prediction.genre();
        debug!(
            probability = prediction.nonfiction_probability(),
            %genre,
            documents = documents.len(),
            "classified aggregate input"
        );

        // Ranking and word cloud are evidence for a fiction verdict only;
        // non-fiction verdicts carry neither.
        let (genre_table, word_cloud) = if genre.is_fiction() {
            (
                GenreTable::from_scores(inference::genre_scores(&self.model, &aggregate)),
                WordCloud::from_weights(inference::token_weights(&self.model, &aggregate)),
            )
        } else {
            (GenreTable::default(), WordCloud::default())
        };

        let best_document = if documents.len() > 1 {
            self.select_best(documents, genre)
        } else {
            None
        };

        Ok(Report {
            probability: prediction.nonfiction_probability(),
            genre,
            genre_table,
            word_cloud,
            best_document,
        })
    }

    /// Pick the document classified most confidently as the aggregate
    /// verdict's genre. Ties resolve to the earliest document, so the
    /// selection is deterministic for a fixed input order and model.
    fn select_best(&self, documents: &[Document], genre: Genre) -> Option<BestDocument> {
        let texts = documents.iter().map(|d| d.text.as_str()).collect::<Vec<_>>();
        let predictions = inference::predict_batch(&self.model, &texts);

        let mut best: Option<(usize, f64)> = None;
        for (index, prediction) in predictions.iter().enumerate() {
            let confidence = match genre {
                Genre::NonFiction => prediction.nonfiction_probability(),
                Genre::Fiction => prediction.fiction_probability(),
            };
            match best {
                Some((_, held)) if held >= confidence => {}
                _ => best = Some((index, confidence)),
            }
        }

        best.map(|(index, confidence)| {
            debug!(index, confidence, "selected best document");
            BestDocument {
                index,
                id: documents[index].id.clone(),
            }
        })
    }
}
