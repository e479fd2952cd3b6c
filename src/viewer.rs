/*!
 * Document Viewer
 * Page state for a single mounted PDF
 * Client-facing model: rendering happens in the browser, nothing here is served
 */
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ViewerState {
    Loading,
    #[serde(rename_all = "camelCase")]
    Ready { page: u32, page_count: u32 },
    Failed { reason: String },
}

/// Viewer for one document URL.
///
/// `Ready` and `Failed` are terminal: later load events are ignored and a
/// different document needs a new viewer.
#[derive(Debug, Clone)]
pub struct DocumentViewer {
    url: String,
    state: ViewerState,
}

impl DocumentViewer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: ViewerState::Loading,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn page(&self) -> Option<u32> {
        match self.state {
            ViewerState::Ready { page, .. } => Some(page),
            _ => None,
        }
    }

    pub fn page_count(&self) -> Option<u32> {
        match self.state {
            ViewerState::Ready { page_count, .. } => Some(page_count),
            _ => None,
        }
    }

    pub fn loaded(&mut self, page_count: u32) {
        if self.state != ViewerState::Loading {
            return;
        }
        self.state = if page_count == 0 {
            ViewerState::Failed {
                reason: "document has no pages".to_string(),
            }
        } else {
            ViewerState::Ready {
                page: 1,
                page_count,
            }
        };
    }

    pub fn failed(&mut self, reason: impl Into<String>) {
        if self.state == ViewerState::Loading {
            tracing::warn!(url = %self.url, "failed to load document");
            self.state = ViewerState::Failed {
                reason: reason.into(),
            };
        }
    }

    /// Returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        match &mut self.state {
            ViewerState::Ready { page, page_count } if *page < *page_count => {
                *page += 1;
                true
            }
            _ => false,
        }
    }

    /// Returns whether the page changed.
    pub fn previous_page(&mut self) -> bool {
        match &mut self.state {
            ViewerState::Ready { page, .. } if *page > 1 => {
                *page -= 1;
                true
            }
            _ => false,
        }
    }
}
