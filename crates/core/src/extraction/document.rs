use scraper::{ElementRef, Html};

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A non-blank text node in document order, with the element that holds it.
#[derive(Debug, Clone)]
pub struct TextChunk<'a> {
    /// Whitespace-collapsed text.
    pub text: String,
    pub parent: ElementRef<'a>,
}

/// Visible text nodes under `scope`, in document order.
pub fn text_chunks(scope: ElementRef<'_>) -> Vec<TextChunk<'_>> {
    scope
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            if HIDDEN_ELEMENTS.contains(&parent.value().name()) {
                return None;
            }
            let text = collapse_whitespace(text);
            (!text.is_empty()).then_some(TextChunk { text, parent })
        })
        .collect()
}

/// Position of the last chunk reading exactly `label` (case-insensitive).
/// Quote pages repeat labels in tooltips and navigation, so the last
/// occurrence is the one next to the data.
pub fn last_label(chunks: &[TextChunk<'_>], label: &str) -> Option<usize> {
    chunks
        .iter()
        .rposition(|c| c.text.eq_ignore_ascii_case(label))
}

/// All text of an element, whitespace-collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Nearest `<tr>` enclosing `element`.
pub fn enclosing_row(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "tr")
}

/// True when the document carries any visible text at all.
pub fn has_text(page: &Html) -> bool {
    !text_chunks(page.root_element()).is_empty()
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(html: &str) -> Vec<String> {
        let page = Html::parse_document(html);
        text_chunks(page.root_element())
            .into_iter()
            .map(|c| c.text)
            .collect()
    }

    #[test]
    fn skips_scripts_comments_and_blank_text() {
        let found = texts(
            "<html><!-- hi --><script>var x = '<div>no</div>';</script>\n  <p>Hello &amp;   bye</p></html>",
        );
        assert_eq!(found, vec!["Hello & bye"]);
    }

    #[test]
    fn quoted_angle_bracket_keeps_attributes() {
        let page = Html::parse_document(r#"<div data-tip="a > b" class="v">value</div>"#);
        let chunks = text_chunks(page.root_element());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "value");
        assert!(chunks[0].parent.value().classes().any(|c| c == "v"));
    }

    #[test]
    fn finds_the_enclosing_row() {
        let page = Html::parse_document(
            "<table><tr><td>Revenue</td><td>1.2T</td></tr><tr><td>Net income</td><td>3B</td></tr></table>",
        );
        let chunks = text_chunks(page.root_element());
        let idx = last_label(&chunks, "revenue").unwrap();
        let row = enclosing_row(chunks[idx].parent).unwrap();
        assert_eq!(element_text(row), "Revenue 1.2T");
    }
}
