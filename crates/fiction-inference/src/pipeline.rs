use core::fmt;

use tracing::debug;

use crate::model::GenreModel;

/// Fixed probability cutoff for the verdict.
///
/// If P(non-fiction) >= threshold, the input is classified as non-fiction.
/// The boundary itself classifies as non-fiction. This is a design constant
/// of the classifier, not a tunable.
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Genre {
    Fiction,
    NonFiction,
}

impl Genre {
    /// Returns true if this verdict is Fiction
    #[must_use]
    pub fn is_fiction(&self) -> bool {
        matches!(self, Self::Fiction)
    }

    /// Returns true if this verdict is Non-Fiction
    #[must_use]
    pub fn is_non_fiction(&self) -> bool {
        matches!(self, Self::NonFiction)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fiction => write!(f, "Fiction"),
            Self::NonFiction => write!(f, "Non-Fiction"),
        }
    }
}

impl From<Genre> for i64 {
    fn from(genre: Genre) -> Self {
        match genre {
            Genre::Fiction => 0,
            Genre::NonFiction => 1,
        }
    }
}

/// Struct to hold prediction probabilities
/// 0: P(Fiction), 1: P(Non-Fiction)
#[derive(Debug, Clone, Copy)]
pub struct Prediction(f64, f64);

impl Prediction {
    /// Create a new Prediction instance
    /// `fiction_prob` + `nonfiction_prob` must equal 1.0
    fn new(fiction_prob: f64, nonfiction_prob: f64) -> Self {
        debug_assert!(
            (fiction_prob + nonfiction_prob - 1.0).abs() < 1e-9,
            "Probabilities must sum to 1.0"
        );
        Self(fiction_prob, nonfiction_prob)
    }

    #[must_use]
    pub fn fiction_probability(&self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn nonfiction_probability(&self) -> f64 {
        self.1
    }

    /// Apply the fixed decision rule to this prediction.
    #[inline]
    #[must_use]
    pub fn genre(&self) -> Genre {
        if self.1 >= DECISION_THRESHOLD {
            Genre::NonFiction
        } else {
            Genre::Fiction
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P(Fiction)={:.3}, P(Non-Fiction)={:.3}", self.0, self.1)
    }
}

impl From<[f64; 2]> for Prediction {
    fn from(probs: [f64; 2]) -> Self {
        Self::new(probs[0], probs[1])
    }
}

fn sigmoid(score: f64) -> f64 {
    1.0 / (1.0 + (-score).exp())
}

/// Predict probabilities for a single text.
pub fn predict(model: &GenreModel, text: &str) -> Prediction {
    let mut predictions = predict_batch(model, &[text]);
    // transform() always yields one row per input text
    predictions.remove(0)
}

/// Predict probabilities for multiple texts with one vectorizer pass.
pub fn predict_batch<T: AsRef<str> + Sync>(model: &GenreModel, texts: &[T]) -> Vec<Prediction> {
    let matrix = model.vectorizer().transform(texts);
    let predictions = matrix
        .outer_iterator()
        .map(|row| {
            let nonfiction = sigmoid(model.verdict_head().score(&row));
            Prediction::new(1.0 - nonfiction, nonfiction)
        })
        .collect::<Vec<_>>();
    debug!(num_texts = texts.len(), "predicted batch");
    predictions
}

/// Probability ranking over the model's genres for one text.
///
/// Softmax over the fine-grained genre heads; a model without genre heads
/// degenerates to the two-class ranking derived from the verdict head.
pub fn genre_scores(model: &GenreModel, text: &str) -> Vec<(String, f64)> {
    let matrix = model.vectorizer().transform(&[text]);
    let Some(row) = matrix.outer_view(0) else {
        return Vec::new();
    };

    let heads = model.genre_heads();
    if heads.is_empty() {
        let nonfiction = sigmoid(model.verdict_head().score(&row));
        return vec![
            ("non-fiction".to_string(), nonfiction),
            ("fiction".to_string(), 1.0 - nonfiction),
        ];
    }

    let scores = heads.iter().map(|h| h.score(&row)).collect::<Vec<_>>();
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps = scores.iter().map(|s| (s - max).exp()).collect::<Vec<_>>();
    let total: f64 = exps.iter().sum();

    heads
        .iter()
        .zip(exps)
        .map(|(head, e)| (head.label().to_string(), e / total))
        .collect()
}

/// Token contributions toward the fiction side of the verdict, largest
/// first.
///
/// The contribution of a vocabulary term is its verdict-head coefficient
/// (negated, since positive coefficients lean non-fiction) times the term's
/// TF-IDF value in the text. Only strictly positive contributions are kept,
/// so the result names the tokens that pushed the verdict toward fiction.
pub fn token_weights(model: &GenreModel, text: &str) -> Vec<(String, f64)> {
    let matrix = model.vectorizer().transform(&[text]);
    let Some(row) = matrix.outer_view(0) else {
        return Vec::new();
    };

    let terms = model.vectorizer().terms();
    let weights = model.verdict_head().weights();

    let mut contributions = row
        .iter()
        .filter_map(|(col_idx, &val)| {
            let contribution = -weights[col_idx] * val;
            (contribution > 0.0).then(|| (terms[col_idx].clone(), contribution))
        })
        .collect::<Vec<_>>();

    contributions.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    debug!(num_tokens = contributions.len(), "extracted token weights");
    contributions
}

#[cfg(test)]
mod tests {
    use fiction_pre_processing::pre_processor::{TfidfVectorizer, VectorizerParams};

    use super::*;
    use crate::model::LinearHead;

    /// Fit a tiny deterministic model: "dragon"/"wizard" lean fiction,
    /// "senate"/"budget" lean non-fiction, everything else neutral.
    fn fixture_model() -> GenreModel {
        let corpus = [
            "the dragon and the wizard crossed the kingdom",
            "the senate approved the budget for the kingdom",
            "a dragon met a wizard",
            "the senate debated the budget",
        ];
        let vectorizer = TfidfVectorizer::fit(&corpus, VectorizerParams::new(1..=1, 1.0, 1.0, false));

        let vocab = vectorizer.vocabulary().clone();
        let mut weights = vec![0.0; vectorizer.num_features()];
        for (term, w) in [
            ("dragon", -4.0),
            ("wizard", -3.0),
            ("senate", 4.0),
            ("budget", 3.0),
        ] {
            weights[vocab[term]] = w;
        }

        let genre_heads = {
            let mut fantasy = vec![0.0; vocab.len()];
            fantasy[vocab["dragon"]] = 5.0;
            fantasy[vocab["wizard"]] = 5.0;
            let mut politics = vec![0.0; vocab.len()];
            politics[vocab["senate"]] = 5.0;
            politics[vocab["budget"]] = 5.0;
            vec![
                LinearHead::new("fantasy", fantasy, 0.0),
                LinearHead::new("political drama", politics, 0.0),
            ]
        };

        GenreModel::new(
            "fixture",
            vectorizer,
            LinearHead::new("non-fiction", weights, 0.0),
            genre_heads,
        )
        .unwrap()
    }

    #[test]
    fn probabilities_sum_to_one() {
        let model = fixture_model();
        let prediction = predict(&model, "the dragon met the senate");
        let sum = prediction.fiction_probability() + prediction.nonfiction_probability();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fiction_text_classifies_as_fiction() {
        let model = fixture_model();
        let prediction = predict(&model, "the dragon and the wizard");
        assert!(prediction.nonfiction_probability() < DECISION_THRESHOLD);
        assert_eq!(prediction.genre(), Genre::Fiction);
    }

    #[test]
    fn nonfiction_text_classifies_as_non_fiction() {
        let model = fixture_model();
        let prediction = predict(&model, "the senate approved the budget");
        assert!(prediction.nonfiction_probability() >= DECISION_THRESHOLD);
        assert_eq!(prediction.genre(), Genre::NonFiction);
    }

    #[test]
    fn boundary_probability_is_non_fiction() {
        // Out-of-vocabulary text scores exactly the zero intercept, so the
        // sigmoid lands on 0.5 — which must classify as non-fiction.
        let model = fixture_model();
        let prediction = predict(&model, "xylophone quartet rehearsal");
        assert!((prediction.nonfiction_probability() - 0.5).abs() < 1e-12);
        assert_eq!(prediction.genre(), Genre::NonFiction);
    }

    #[test]
    fn predict_is_deterministic() {
        let model = fixture_model();
        let a = predict(&model, "the dragon debated the budget");
        let b = predict(&model, "the dragon debated the budget");
        assert_eq!(a.nonfiction_probability().to_bits(), b.nonfiction_probability().to_bits());
        assert_eq!(a.genre(), b.genre());
    }

    #[test]
    fn predict_batch_matches_single_predictions() {
        let model = fixture_model();
        let texts = ["a dragon tale", "the senate budget", "plain words"];
        let batch = predict_batch(&model, &texts);
        assert_eq!(batch.len(), 3);
        for (text, prediction) in texts.iter().zip(&batch) {
            let single = predict(&model, text);
            assert_eq!(
                single.nonfiction_probability().to_bits(),
                prediction.nonfiction_probability().to_bits()
            );
        }
    }

    #[test]
    fn genre_scores_form_a_distribution() {
        let model = fixture_model();
        let scores = genre_scores(&model, "the dragon and the wizard");
        let total: f64 = scores.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for (_, p) in &scores {
            assert!((0.0..=1.0).contains(p));
        }
    }

    #[test]
    fn genre_scores_rank_the_matching_genre_first() {
        let model = fixture_model();
        let scores = genre_scores(&model, "the dragon and the wizard");
        let (top_label, top_score) = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .unwrap();
        assert_eq!(top_label, "fantasy");
        assert!(*top_score > 0.5);
    }

    #[test]
    fn binary_model_degenerates_to_two_genres() {
        let model = fixture_model();
        let binary = GenreModel::new(
            "binary",
            model.vectorizer().clone(),
            model.verdict_head().clone(),
            Vec::new(),
        )
        .unwrap();

        let scores = genre_scores(&binary, "the senate approved the budget");
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].0, "non-fiction");
        assert_eq!(scores[1].0, "fiction");
        let total: f64 = scores.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn token_weights_surface_fiction_markers_only() {
        let model = fixture_model();
        let weights = token_weights(&model, "the dragon met the senate and a wizard");

        let tokens: Vec<&str> = weights.iter().map(|(t, _)| t.as_str()).collect();
        assert!(tokens.contains(&"dragon"));
        assert!(tokens.contains(&"wizard"));
        assert!(!tokens.contains(&"senate"));
        for (_, w) in &weights {
            assert!(*w > 0.0);
        }
    }

    #[test]
    fn token_weights_are_sorted_descending() {
        let model = fixture_model();
        let weights = token_weights(&model, "dragon dragon wizard");
        assert!(weights.windows(2).all(|pair| pair[0].1 >= pair[1].1));
    }

    #[test]
    fn out_of_vocabulary_text_has_no_token_weights() {
        let model = fixture_model();
        assert!(token_weights(&model, "xylophone quartet").is_empty());
    }
}
