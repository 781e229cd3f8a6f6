// Page generation: every page of a site as a full HTML document and as the
// JSON fragment the navigator swaps in place

pub mod color_scheme;
pub mod document;
pub mod markdown;
pub mod site;

pub use color_scheme::{PreferredColorScheme, generate_css};
pub use document::{render_content, render_document, render_menu, render_theme_selector};
pub use markdown::render_markdown;
pub use site::{GeneratedPage, GeneratedSite, RenderedPage, SiteContent};

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }
}
