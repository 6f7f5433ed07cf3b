//! Assertions over rendered pages

use article_loader::{ArticleSlot, MemoryDocument};

/// Ids of `slots`, in order
pub fn slot_ids(slots: &[ArticleSlot]) -> Vec<String> {
    slots.iter().map(|s| s.id().to_string()).collect()
}

/// Assert that each needle appears in `selector`'s markup, in the given order
pub fn assert_appears_in_order(document: &MemoryDocument, selector: &str, needles: &[&str]) {
    let html = document
        .content(selector)
        .unwrap_or_else(|| panic!("element {selector} missing"));
    let mut from = 0;
    for needle in needles {
        match html[from..].find(needle) {
            Some(offset) => from += offset + needle.len(),
            None => panic!("{needle:?} not found in order in {selector}:\n{html}"),
        }
    }
}

/// Assert that `selector` holds `message`
pub fn assert_shows(document: &MemoryDocument, selector: &str, message: &str) {
    let html = document
        .content(selector)
        .unwrap_or_else(|| panic!("element {selector} missing"));
    assert!(html.contains(message), "{selector} should show {message:?}, has:\n{html}");
}
