//! Topic search over the whole library.
//!
//! Upstream has no full-text search for Reader documents, so the complete
//! corpus is walked page by page and matched locally. Terms are literals:
//! metacharacters are escaped before compiling.

use regex::{Regex, RegexBuilder};

use crate::client::{collect_all, ReaderApi};
use crate::error::ReaderError;
use crate::models::{ApiResponse, Document, ListParams};

/// Case-insensitive literal matcher over a document's descriptive fields
#[derive(Debug, Clone)]
pub struct TopicMatcher {
    patterns: Vec<Regex>,
}

impl TopicMatcher {
    /// Compile one pattern per non-empty term; whitespace is kept as given
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self, ReaderError> {
        let patterns = terms
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !t.is_empty())
            .map(|t| {
                RegexBuilder::new(&regex::escape(t))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        ReaderError::InvalidArgument(format!("Invalid search term '{}': {}", t, e))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if patterns.is_empty() {
            return Err(ReaderError::InvalidArgument(
                "searchTerms must contain at least one non-empty term".to_string(),
            ));
        }
        Ok(Self { patterns })
    }

    /// True when any term occurs in title, summary, notes or tags
    pub fn matches(&self, doc: &Document) -> bool {
        let text = searchable_text(doc);
        self.patterns.iter().any(|p| p.is_match(&text))
    }
}

fn searchable_text(doc: &Document) -> String {
    [
        doc.title.clone().unwrap_or_default(),
        doc.summary.clone().unwrap_or_default(),
        doc.notes.clone().unwrap_or_default(),
        doc.tag_names().join(" "),
    ]
    .join(" ")
    .to_lowercase()
}

/// Fetch every document and keep those matching any of `terms`, in upstream order
pub async fn search_documents_by_topic<S: AsRef<str>>(
    api: &dyn ReaderApi,
    terms: &[S],
    max_pages: usize,
) -> Result<ApiResponse<Vec<Document>>, ReaderError> {
    let matcher = TopicMatcher::new(terms)?;

    let params = ListParams::new().with_html_content(false);
    let all = collect_all(api, params, max_pages).await?;
    let scanned = all.data.len();

    let response = all.map(|docs| {
        docs.into_iter()
            .filter(|doc| matcher.matches(doc))
            .collect::<Vec<_>>()
    });
    tracing::debug!(
        "Topic search matched {} of {} documents",
        response.data.len(),
        scanned
    );
    Ok(response)
}
