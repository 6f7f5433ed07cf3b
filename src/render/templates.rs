//! Markup for preview cards, placeholders and messages.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::selection::PageLink;
use crate::types::{ArticleId, ArticleRecord};

/// Card linking to one article
pub fn preview_card(record: &ArticleRecord) -> String {
    format!(
        r#"<div class="pages-item">
    <h2 class="title">{title}</h2>
    <p class="date">{date}</p>
    <p class="preview">{preview}...</p>
    <div class="read-page-container">
        <a class="item-link read-page" href="{url}">Read Page</a>
    </div>
</div>"#,
        title = encode_text(&record.title),
        date = encode_text(&record.date.to_string()),
        preview = encode_text(&record.preview_text),
        url = encode_double_quoted_attribute(&record.url),
    )
}

/// Card standing in for an article that failed to load
pub fn placeholder_card(id: &ArticleId) -> String {
    format!(
        r#"<div class="pages-item pages-item-unavailable" data-article="{id}">
    <p class="preview">This article could not be loaded.</p>
</div>"#,
        id = encode_double_quoted_attribute(id.as_str()),
    )
}

/// Centred page-level message
pub fn error_message(text: &str) -> String {
    format!(
        r#"<p style="text-align: center;">{}</p>"#,
        encode_text(text)
    )
}

/// Archive navigation entry
pub fn pagination_item(link: &PageLink) -> String {
    let class = if link.active { r#" class="active""# } else { "" };
    format!(
        r#"<li{class}><a class="page-link" href="?pagination={n}">{n}</a></li>"#,
        n = link.number
    )
}
