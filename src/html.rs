//! HTML to plain text for heuristic scoring

use scraper::{Html, Node};

/// Elements whose content never reaches the output
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript"];

/// Convert an HTML document to text
///
/// Every text node outside `<script>`, `<style>` and `<noscript>` is kept, in
/// document order, joined with newlines. Layout is not preserved.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let texts: Vec<&str> = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
                });
                (!hidden).then_some(&**text)
            }
            _ => None,
        })
        .collect();

    texts.join("\n")
}
