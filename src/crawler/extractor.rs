//! HTML tokenization — title and anchor extraction. Pure, permissive, and
//! tolerant of malformed markup: we return whatever we could parse rather
//! than failing the page.

use scraper::{Html, Selector};
use url::Url;

use crate::crawler::normalize::normalize_url;

/// Extract every `http(s)` link reachable from `<a href="...">` on the page,
/// resolved against `base`, in document order. Fragment-only references and
/// non-http(s) schemes (`javascript:`, `mailto:`, `tel:`, `data:`, ...) are
/// dropped, as are references that fail normalization.
pub fn extract_links(body: &str, base: &str) -> Vec<String> {
    let base_url = match Url::parse(base) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(body);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.trim().is_empty() || href.starts_with('#') {
            continue;
        }

        let Ok(resolved) = base_url.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        if let Ok(normalized) = normalize_url(resolved.as_str()) {
            links.push(normalized);
        }
    }

    links
}

/// Extract the trimmed text content of the first `<title>` element, or the
/// empty string if there is none. Interior whitespace is preserved.
pub fn extract_title(body: &str) -> String {
    let document = Html::parse_document(body);
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_absolute_and_relative_links_in_document_order() {
        let body = r#"
            <html><body>
                <a href="/page1">one</a>
                <a href="http://example.com/page2">two</a>
                <a href="../parent">three</a>
                <a href="#anchor">skip</a>
                <a href="javascript:void(0)">skip</a>
                <a href="mailto:x@y">skip</a>
            </body></html>
        "#;
        let links = extract_links(body, "http://example.com/sub/page");

        assert!(links.contains(&"http://example.com/page1".to_string()));
        assert!(links.contains(&"http://example.com/page2".to_string()));
        assert!(links.iter().any(|l| l == "http://example.com/parent"));
        assert!(!links.iter().any(|l| l.contains('#')));
        assert!(!links.iter().any(|l| l.contains("javascript:")));
        assert!(!links.iter().any(|l| l.contains("mailto:")));
    }

    #[test]
    fn tolerates_malformed_html() {
        let body = "<html><body><a href=/page1>unterminated<a href='/page2'";
        let links = extract_links(body, "http://example.com/");
        assert!(!links.is_empty());
    }

    #[test]
    fn empty_body_yields_no_links_or_title() {
        assert!(extract_links("", "http://example.com/").is_empty());
        assert_eq!(extract_title(""), "");
    }

    #[test]
    fn trims_title_whitespace_preserving_interior() {
        let body = "<html><head><title>  Spaced Title  </title></head></html>";
        assert_eq!(extract_title(body), "Spaced Title");
    }

    #[test]
    fn missing_title_is_empty_string() {
        let body = "<html><body>no title here</body></html>";
        assert_eq!(extract_title(body), "");
    }
}
