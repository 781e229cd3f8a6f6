use pulldown_cmark::{Options, Parser, html};

/// Render markdown to an HTML fragment
///
/// Fenced code blocks with a language (```` ```rust ````) come out as
/// `<code class="language-rust">`, which is what triggers highlighting.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(source, options);
    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use phebe_core::CODE_MARKER;

    #[test]
    fn test_render_paragraphs_and_links() {
        let html = render_markdown("Have a look around.\n\nSee [the source](https://github.com/arendjr/phebe).");
        assert!(html.contains("<p>Have a look around.</p>"));
        assert!(html.contains(r#"<a href="https://github.com/arendjr/phebe">the source</a>"#));
    }

    #[test]
    fn test_fenced_code_carries_marker() {
        let html = render_markdown("```rust\nfn main() {}\n```\n");
        assert!(html.contains(CODE_MARKER));
        assert!(html.contains(r#"<code class="language-rust">"#));

        let plain = render_markdown("    indented code\n");
        assert!(!plain.contains(CODE_MARKER));
    }

    #[test]
    fn test_inline_html_passes_through() {
        let html = render_markdown("<p class=\"alternate-a\"><b>Ciyu Xu</b></p>\n");
        assert!(html.contains("<p class=\"alternate-a\"><b>Ciyu Xu</b></p>"));
    }
}
