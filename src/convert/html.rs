//! Local HTML to plain-text extraction.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never counts as document content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Extract LLM-friendly text from an HTML document or fragment.
///
/// Output is `"{title}\n\n{body}"` when the page has a non-empty `<title>`,
/// otherwise the body text alone. Whitespace runs collapse to one space.
pub fn extract_text_from_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .find(|el| !has_skipped_ancestor(el))
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        })
        .unwrap_or_default();

    let mut body = String::new();
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());
    collect_text(root, &mut body);
    let body = collapse_whitespace(&body);

    if title.is_empty() {
        body
    } else {
        format!("{}\n\n{}", title, body)
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn has_skipped_ancestor(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_body() {
        let html = r#"<html><head><title> My  Page </title></head>
            <body><h1>Hello</h1>
            <p>First   paragraph.</p>
            <p>Second
            paragraph.</p></body></html>"#;
        assert_eq!(
            extract_text_from_html(html),
            "My Page\n\nHello First paragraph. Second paragraph."
        );
    }

    #[test]
    fn test_strips_non_content_elements() {
        let html = r#"<html><head><style>body { color: red; }</style></head><body>
            <header>Site header</header>
            <nav><a href="/">Home</a></nav>
            <script>var tracking = 1;</script>
            <article>Actual content</article>
            <footer>Copyright</footer>
            </body></html>"#;
        assert_eq!(extract_text_from_html(html), "Actual content");
    }

    #[test]
    fn test_fragment_without_title() {
        assert_eq!(
            extract_text_from_html("<div>Just <b>a</b> fragment</div>"),
            "Just a fragment"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_text_from_html(""), "");
        assert_eq!(extract_text_from_html("   \n "), "");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(
            extract_text_from_html("<p>Fish &amp; chips</p>"),
            "Fish & chips"
        );
    }
}
