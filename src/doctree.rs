use anyhow::{Result, anyhow};
use scraper::{Html, Selector};

/// Capability surface of one parsed archive part. Anything that can report
/// its visible text and its chapter-heading labels can back the scanner.
pub trait PartDocument {
    fn visible_text(&self) -> &str;
    fn heading_labels(&self) -> &[String];
}

/// Parses markup once and keeps only what the scanner needs: the visible
/// text (text nodes joined by single spaces) and the candidate chapter
/// labels — the `<title>` element when present and non-empty, then every
/// `h1`/`h2`/`h3` in document order.
pub struct HtmlPartDocument {
    text: String,
    headings: Vec<String>,
}

impl HtmlPartDocument {
    pub fn parse(raw: &str) -> Result<Self> {
        let document = Html::parse_document(raw);

        let title_selector = compile_selector("title")?;
        let heading_selector = compile_selector("h1, h2, h3")?;

        let mut headings = Vec::new();

        // The title element is the chapter name in some books and the book
        // name in others; it is still worth carrying as a label.
        if let Some(element) = document.select(&title_selector).next() {
            let title = element.text().collect::<String>();
            if !title.trim().is_empty() {
                headings.push(title);
            }
        }

        for element in document.select(&heading_selector) {
            headings.push(element.text().collect::<String>());
        }

        let text = document
            .root_element()
            .text()
            .collect::<Vec<&str>>()
            .join(" ");

        Ok(Self { text, headings })
    }
}

impl PartDocument for HtmlPartDocument {
    fn visible_text(&self) -> &str {
        &self.text
    }

    fn heading_labels(&self) -> &[String] {
        &self.headings
    }
}

fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|error| anyhow!("failed to compile selector '{selector}': {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_title_and_headings_in_document_order() {
        let document = HtmlPartDocument::parse(
            "<html><head><title>Book Title</title></head>\
             <body><h1>Chapter One</h1><p>Body.</p><h2>Section A</h2><h3>Detail</h3></body></html>",
        )
        .unwrap();

        assert_eq!(
            document.heading_labels(),
            &[
                "Book Title".to_string(),
                "Chapter One".to_string(),
                "Section A".to_string(),
                "Detail".to_string(),
            ]
        );
    }

    #[test]
    fn skips_empty_title_element() {
        let document = HtmlPartDocument::parse(
            "<html><head><title>  </title></head><body><h1>Intro</h1></body></html>",
        )
        .unwrap();

        assert_eq!(document.heading_labels(), &["Intro".to_string()]);
    }

    #[test]
    fn no_headings_yields_empty_labels() {
        let document =
            HtmlPartDocument::parse("<html><body><p>Just prose.</p></body></html>").unwrap();
        assert!(document.heading_labels().is_empty());
    }

    #[test]
    fn visible_text_joins_text_nodes_with_spaces() {
        let document = HtmlPartDocument::parse(
            "<html><body><h1>Intro</h1><p>Hello <em>world</em>. More text.</p></body></html>",
        )
        .unwrap();

        let text = document.visible_text();
        assert!(text.contains("Intro"));
        assert!(text.contains("Hello"));
        assert!(text.contains("world"));
        assert!(text.contains("More text."));
    }

    #[test]
    fn malformed_markup_degrades_instead_of_failing() {
        let document = HtmlPartDocument::parse("<h1>Broken<h1><p>no closing tags").unwrap();
        assert!(document.visible_text().contains("no closing tags"));
    }
}
