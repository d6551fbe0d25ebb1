//! Rendered-text approximation for parsed elements
//!
//! Fields are matched against what a reader sees, not against raw markup, so
//! block-level elements must break lines the way a browser's `innerText`
//! does. Otherwise adjacent blocks would run together.

use scraper::ElementRef;

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Returns the element's visible text: one line per block, whitespace
/// collapsed within lines, blank lines dropped, trimmed
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // Source line breaks are plain whitespace; only blocks break lines
            out.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }

            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push('\n');
            }
            push_text(child_element, out);
            if block {
                out.push('\n');
            }
        }
    }
}
