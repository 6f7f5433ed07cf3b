//! The page the views write into.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Page elements addressed by selector
///
/// Writes to a selector that no longer matches anything (the page was
/// replaced while fetches were in flight) are dropped and reported as
/// `false`; they never fail.
pub trait Document: Send + Sync {
    /// Replace the markup inside the element matching `selector`
    fn set_inner_html(&self, selector: &str, html: &str) -> bool;

    /// Replace the element's content with plain text
    fn set_text(&self, selector: &str, text: &str) -> bool {
        self.set_inner_html(selector, &html_escape::encode_text(text))
    }
}

/// In-memory [`Document`] holding a fixed set of elements
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Mutex<HashMap<String, String>>,
}

impl MemoryDocument {
    /// Document with empty elements for each selector
    pub fn with_elements<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements = selectors
            .into_iter()
            .map(|s| (s.into(), String::new()))
            .collect();
        Self {
            elements: Mutex::new(elements),
        }
    }

    /// Current markup of `selector`, if the element exists
    pub fn content(&self, selector: &str) -> Option<String> {
        self.elements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(selector)
            .cloned()
    }

    /// Add an empty element
    pub fn insert(&self, selector: &str) {
        self.elements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(selector.to_string(), String::new());
    }

    /// Remove an element, as when navigating away
    pub fn remove(&self, selector: &str) -> Option<String> {
        self.elements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(selector)
    }
}

impl Document for MemoryDocument {
    fn set_inner_html(&self, selector: &str, html: &str) -> bool {
        let mut elements = self.elements.lock().unwrap_or_else(PoisonError::into_inner);
        match elements.get_mut(selector) {
            Some(content) => {
                *content = html.to_string();
                true
            }
            None => {
                tracing::debug!(selector, "element missing, write dropped");
                false
            }
        }
    }
}
