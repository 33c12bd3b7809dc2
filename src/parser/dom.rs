//! Shared DOM selection helpers. Every structural query that misses yields
//! an empty value instead of an error; the page parsers treat empty fields
//! as legitimately absent data.

use scraper::{ElementRef, Html, Selector};

/// Parse a static CSS selector. Selectors live in the parser modules as
/// literals, so a parse failure is a programming error.
pub fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Whole trimmed text of an element, descendants included.
pub fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first element matching `css`, or empty.
pub fn first_text(doc: &Html, css: &str) -> String {
    let selector = sel(css);
    doc.select(&selector).next().map(text_of).unwrap_or_default()
}

/// Attribute of the first element matching `css`, or empty.
pub fn first_attr(doc: &Html, css: &str, attr: &str) -> String {
    let selector = sel(css);
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Attribute of the given element, or empty.
pub fn attr_of(el: ElementRef, attr: &str) -> String {
    el.value()
        .attr(attr)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Scans label/value rows matching `row_css` for a child element whose text
/// contains `label` (substring match, whitespace-tolerant) and returns the
/// text of the element following it. This is the site's detail-row shape:
/// a label div followed by a sibling value div.
pub fn label_sibling_text(doc: &Html, row_css: &str, label: &str) -> String {
    let row_sel = sel(row_css);
    for row in doc.select(&row_sel) {
        let kids: Vec<ElementRef> = row.children().filter_map(ElementRef::wrap).collect();
        if let Some(pos) = kids.iter().position(|k| text_of(*k).contains(label)) {
            return kids.get(pos + 1).map(|v| text_of(*v)).unwrap_or_default();
        }
    }
    String::new()
}

/// Same label-adjacent pattern for statistics rows, where the values sit in
/// spans inside following `bbox` siblings. Returns all span texts in
/// document order (home side first).
pub fn label_adjacent_values(doc: &Html, row_css: &str, label: &str) -> Vec<String> {
    let row_sel = sel(row_css);
    let span_sel = sel("span");
    for row in doc.select(&row_sel) {
        let kids: Vec<ElementRef> = row.children().filter_map(ElementRef::wrap).collect();
        let Some(pos) = kids.iter().position(|k| text_of(*k).contains(label)) else {
            continue;
        };
        let mut values = Vec::new();
        for sib in &kids[pos + 1..] {
            if sib.value().classes().any(|c| c == "bbox") {
                values.extend(sib.select(&span_sel).map(text_of));
            }
        }
        return values;
    }
    Vec::new()
}

/// All trimmed texts of elements matching `css`.
pub fn texts(doc: &Html, css: &str) -> Vec<String> {
    let selector = sel(css);
    doc.select(&selector).map(text_of).collect()
}
