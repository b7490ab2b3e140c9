//! HTML fragment rendering for classification reports.
//!
//! Produces self-contained markup: charts are built as SVG in memory and
//! embedded as base64 data URIs, so rendering never touches the
//! filesystem.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::report::{GenreTable, Report, WordCloud};

const IMAGE_WIDTH: u32 = 600;
const IMAGE_HEIGHT: u32 = 400;

/// Most tokens a rendered word cloud will show.
const MAX_CLOUD_TOKENS: usize = 40;

const MIN_FONT: f64 = 12.0;
const MAX_FONT: f64 = 48.0;

/// Options controlling report presentation.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Platform handle the documents came from. Enables the permalink and
    /// embed widget when the report names a best document with an id.
    pub handle: Option<String>,
}

impl RenderOptions {
    #[must_use]
    pub fn for_handle(handle: impl Into<String>) -> Self {
        Self {
            handle: Some(handle.into()),
        }
    }
}

/// All fragments a results page needs, in one typed structure.
///
/// Chart fragments are present only for fiction verdicts; the permalink
/// pair is present only when the report carries an identified best
/// document and a handle was supplied.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RenderedReport {
    /// "This is Fiction" / "This is Non-Fiction".
    pub verdict: String,
    /// Sentence stating both genre percentages.
    pub probability_sentence: String,
    /// Genre ranking as an HTML table, descending probability.
    pub table_html: Option<String>,
    /// `<img>` tag embedding the genre bar chart (ascending probability).
    pub bar_chart: Option<String>,
    /// `<img>` tag embedding the word cloud.
    pub word_cloud: Option<String>,
    /// Permalink to the most representative post.
    pub permalink: Option<String>,
    /// Platform blockquote widget wrapping the permalink.
    pub embed: Option<String>,
}

/// Build the permalink for a post on its source platform.
#[must_use]
pub fn permalink(handle: &str, id: &str) -> String {
    format!("https://twitter.com/{handle}/status/{id}")
}

pub fn render(report: &Report, options: &RenderOptions) -> RenderedReport {
    let verdict = format!("This is {}", report.genre);
    let probability_sentence = format!(
        "The probability of the input being non-fiction is {:.2}% \
         and the probability of it being fiction is {:.2}%",
        report.probability * 100.0,
        (1.0 - report.probability) * 100.0
    );

    let (table_html, bar_chart, word_cloud) = if report.genre.is_fiction() {
        (
            Some(genre_table_html(&report.genre_table)),
            Some(img_tag(
                &bar_chart_svg(&report.genre_table),
                "Graph of Probability of Genres",
            )),
            Some(img_tag(&word_cloud_svg(&report.word_cloud), "Word Cloud")),
        )
    } else {
        (None, None, None)
    };

    let permalink = match (
        options.handle.as_deref(),
        report
            .best_document
            .as_ref()
            .and_then(|best| best.id.as_deref()),
    ) {
        (Some(handle), Some(id)) => Some(self::permalink(handle, id)),
        _ => None,
    };
    let embed = permalink.as_deref().map(embed_widget);

    RenderedReport {
        verdict,
        probability_sentence,
        table_html,
        bar_chart,
        word_cloud,
        permalink,
        embed,
    }
}

fn embed_widget(url: &str) -> String {
    format!(
        "<blockquote class=\"twitter-tweet\" data-conversation=\"none\">\
         <p lang=\"en\" dir=\"ltr\"><a href=\"{url}\"></a></p></blockquote>\
         <script async src=\"https://platform.twitter.com/widgets.js\" charset=\"utf-8\"></script>"
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn genre_table_html(table: &GenreTable) -> String {
    let mut html = String::from(
        "<table class=\"data\">\n\
         <thead><tr><th>Genre</th><th>Probability</th></tr></thead>\n<tbody>\n",
    );
    for row in table.descending() {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{:.4}</td></tr>",
            escape_html(&row.genre),
            row.probability
        );
    }
    html.push_str("</tbody>\n</table>");
    html
}

/// Horizontal bar chart of the genre ranking, ascending order so the most
/// probable genre lands at the bottom, matching the results table read top
/// to bottom.
fn bar_chart_svg(table: &GenreTable) -> String {
    let rows = table.ascending();
    let mut svg = svg_open();

    if !rows.is_empty() {
        let label_width = 150.0;
        let chart_width = f64::from(IMAGE_WIDTH) - label_width - 20.0;
        let row_height = f64::from(IMAGE_HEIGHT) / rows.len() as f64;
        let bar_height = (row_height * 0.6).min(40.0);

        for (i, row) in rows.iter().enumerate() {
            let y = row_height * i as f64 + (row_height - bar_height) / 2.0;
            let width = (row.probability * chart_width).max(1.0);
            let text_y = y + bar_height / 2.0 + 5.0;
            let _ = writeln!(
                svg,
                "<text x=\"{:.1}\" y=\"{text_y:.1}\" font-size=\"14\" text-anchor=\"end\">{}</text>",
                label_width - 8.0,
                escape_html(&row.genre)
            );
            let _ = writeln!(
                svg,
                "<rect x=\"{label_width:.1}\" y=\"{y:.1}\" width=\"{width:.1}\" \
                 height=\"{bar_height:.1}\" fill=\"#4878a8\"/>"
            );
            let _ = writeln!(
                svg,
                "<text x=\"{:.1}\" y=\"{text_y:.1}\" font-size=\"12\">{:.1}%</text>",
                label_width + width + 6.0,
                row.probability * 100.0
            );
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Size-weighted word cloud. Tokens flow left to right in weight order;
/// font size scales linearly between [`MIN_FONT`] and [`MAX_FONT`].
fn word_cloud_svg(cloud: &WordCloud) -> String {
    let mut svg = svg_open();

    let max_weight = cloud.max_weight();
    if max_weight > 0.0 {
        let mut x = 10.0;
        let mut y = MAX_FONT + 10.0;
        for (token, weight) in cloud.iter().take(MAX_CLOUD_TOKENS) {
            let font = MIN_FONT + (MAX_FONT - MIN_FONT) * (weight / max_weight);
            // Approximate glyph advance; exact metrics don't matter for a
            // relative-salience visualization.
            let advance = font * 0.6 * token.chars().count() as f64 + 12.0;
            if x + advance > f64::from(IMAGE_WIDTH) - 10.0 {
                x = 10.0;
                y += MAX_FONT + 6.0;
                if y > f64::from(IMAGE_HEIGHT) - 10.0 {
                    break;
                }
            }
            let _ = writeln!(
                svg,
                "<text x=\"{x:.1}\" y=\"{y:.1}\" font-size=\"{font:.1}\">{}</text>",
                escape_html(token)
            );
            x += advance;
        }
    }
    svg.push_str("</svg>");
    svg
}

fn svg_open() -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{IMAGE_WIDTH}\" \
         height=\"{IMAGE_HEIGHT}\" viewBox=\"0 0 {IMAGE_WIDTH} {IMAGE_HEIGHT}\" \
         font-family=\"sans-serif\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n"
    )
}

/// Embed an SVG document as a base64 data-URI image tag.
fn img_tag(svg: &str, alt: &str) -> String {
    let encoded = BASE64.encode(svg.as_bytes());
    format!(
        "<img src=\"data:image/svg+xml;base64,{encoded}\" \
         width=\"{IMAGE_WIDTH}\" height=\"{IMAGE_HEIGHT}\" alt=\"{}\">",
        escape_html(alt)
    )
}

#[cfg(test)]
mod tests {
    use fiction_inference::{Genre, GenreModel, LinearHead};
    use fiction_pre_processing::pre_processor::{TfidfVectorizer, VectorizerParams};

    use super::*;
    use crate::report::Reporter;
    use crate::source::Document;

    fn fixture_reporter() -> Reporter {
        let corpus = [
            "the dragon began the quest",
            "the senate passed the budget",
            "the dragon met the senate",
        ];
        let vectorizer =
            TfidfVectorizer::fit(&corpus, VectorizerParams::new(1..=1, 1.0, 1.0, false));
        let vocab = vectorizer.vocabulary().clone();
        let mut verdict = vec![0.0; vectorizer.num_features()];
        verdict[vocab["dragon"]] = -4.0;
        verdict[vocab["quest"]] = -2.0;
        verdict[vocab["senate"]] = 4.0;
        verdict[vocab["budget"]] = 2.0;

        let model = GenreModel::new(
            "fixture",
            vectorizer,
            LinearHead::new("non-fiction", verdict, 0.0),
            Vec::new(),
        )
        .unwrap();
        Reporter::new(model)
    }

    #[test]
    fn permalink_has_the_platform_shape() {
        assert_eq!(
            permalink("goodcaptain", "1245871404110606337"),
            "https://twitter.com/goodcaptain/status/1245871404110606337"
        );
    }

    #[test]
    fn fiction_report_renders_all_fragments() {
        let reporter = fixture_reporter();
        let posts = vec![
            Document::with_id("42", "the dragon began the quest"),
            Document::with_id("43", "the weather held"),
        ];
        let report = reporter.classify_documents(&posts).unwrap();
        assert_eq!(report.genre, Genre::Fiction);

        let rendered = render(&report, &RenderOptions::for_handle("goodcaptain"));
        assert_eq!(rendered.verdict, "This is Fiction");
        assert!(rendered.probability_sentence.contains('%'));

        let table = rendered.table_html.unwrap();
        assert!(table.starts_with("<table class=\"data\">"));

        for img in [rendered.bar_chart.unwrap(), rendered.word_cloud.unwrap()] {
            assert!(img.starts_with("<img src=\"data:image/svg+xml;base64,"));
        }

        let permalink = rendered.permalink.unwrap();
        assert_eq!(permalink, "https://twitter.com/goodcaptain/status/42");
        assert!(rendered.embed.unwrap().contains(&permalink));
    }

    #[test]
    fn nonfiction_report_renders_no_evidence_fragments() {
        let reporter = fixture_reporter();
        let report = reporter
            .classify_text("the senate passed the budget")
            .unwrap();
        assert_eq!(report.genre, Genre::NonFiction);

        let rendered = render(&report, &RenderOptions::default());
        assert_eq!(rendered.verdict, "This is Non-Fiction");
        assert!(rendered.table_html.is_none());
        assert!(rendered.bar_chart.is_none());
        assert!(rendered.word_cloud.is_none());
        assert!(rendered.permalink.is_none());
        assert!(rendered.embed.is_none());
    }

    #[test]
    fn no_permalink_without_a_handle() {
        let reporter = fixture_reporter();
        let posts = vec![
            Document::with_id("42", "the dragon began the quest"),
            Document::with_id("43", "the weather held"),
        ];
        let report = reporter.classify_documents(&posts).unwrap();

        let rendered = render(&report, &RenderOptions::default());
        assert!(rendered.permalink.is_none());
        assert!(rendered.embed.is_none());
    }

    #[test]
    fn table_rows_are_descending() {
        let reporter = fixture_reporter();
        let report = reporter
            .classify_text("the dragon began the quest")
            .unwrap();
        let table = genre_table_html(&report.genre_table);

        // binary model: fiction outranks non-fiction on this input
        let fiction_pos = table.find("fiction").unwrap();
        let nonfiction_pos = table.find("non-fiction").unwrap();
        assert!(fiction_pos < nonfiction_pos);
    }

    #[test]
    fn svg_escapes_markup_in_tokens() {
        assert_eq!(escape_html("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
    }

    #[test]
    fn decoded_bar_chart_is_svg() {
        let reporter = fixture_reporter();
        let report = reporter
            .classify_text("the dragon began the quest")
            .unwrap();
        let img = img_tag(&bar_chart_svg(&report.genre_table), "chart");

        let prefix = "<img src=\"data:image/svg+xml;base64,";
        let rest = &img[prefix.len()..];
        let encoded = &rest[..rest.find('"').unwrap()];
        let decoded = String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap();
        assert!(decoded.starts_with("<svg"));
        assert!(decoded.contains("<rect"));
    }
}
