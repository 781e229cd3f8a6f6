use crate::color_scheme::{PreferredColorScheme, generate_css};
use crate::html_escape;
use phebe_core::{ACTIVE_CLASS, Category, MenuItem, Site};

/// Wrap a rendered fragment in the content region
///
/// This exact markup is what the JSON representation carries, so the
/// navigator can replace the region wholesale.
pub fn render_content(title: Option<&str>, body_html: &str) -> String {
    let heading = title
        .map(|t| format!("<h1>{}</h1>", html_escape(t)))
        .unwrap_or_default();
    format!(r#"<div class="content">{}{}</div>"#, heading, body_html)
}

/// Navigation menu with the link of `active` marked
pub fn render_menu(menu: &[MenuItem], active: &Category) -> String {
    let items: String = menu
        .iter()
        .map(|item| {
            let class = if &item.category == active {
                format!("{} {}", item.category, ACTIVE_CLASS)
            } else {
                item.category.to_string()
            };
            format!(
                r#"<li><a class="{}" href="{}">{}</a></li>"#,
                class,
                html_escape(&item.href),
                html_escape(&item.title)
            )
        })
        .collect();

    format!(r#"<ul class="menu">{}</ul>"#, items)
}

/// Links switching the color scheme; both are plain query links, so the
/// navigator leaves them to the browser
pub fn render_theme_selector() -> String {
    concat!(
        r#"<div class="theme-selector">"#,
        r#"<a class="dark" href="?preferred_color_scheme=dark">Dark theme</a>"#,
        r#"<a class="light" href="?preferred_color_scheme=light">Light theme</a>"#,
        "</div>"
    )
    .to_string()
}

/// Generate the complete HTML document for one page
///
/// # Arguments
///
/// * `site` - Site configuration (title, menu, themes, highlight assets)
/// * `category` - Category of the page, used as body class and active link
/// * `content` - The content region, as produced by [`render_content`]
/// * `scheme` - Color scheme to inline CSS for
pub fn render_document(
    site: &Site,
    category: &Category,
    content: &str,
    scheme: PreferredColorScheme,
) -> String {
    let has_code = content.contains(&site.navigator.code_marker);

    let author_meta = site
        .metadata
        .author
        .as_deref()
        .map(|author| format!(r#"<meta name="author" content="{}">"#, html_escape(author)))
        .unwrap_or_default();

    // Pages with code get the highlighter up front; the navigator loads it
    // on demand for everything else
    let (highlight_css, highlight_js) = if has_code {
        (
            format!(
                r#"<link href="{}" rel="stylesheet" type="text/css">"#,
                html_escape(&site.navigator.highlight_stylesheet)
            ),
            format!(
                r#"<script src="{}"></script>"#,
                html_escape(&site.navigator.highlight_script)
            ),
        )
    } else {
        (String::new(), String::new())
    };

    format!(
        concat!(
            "<!DOCTYPE html><html><head>",
            "<title>{title}</title>",
            "{author}",
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
            r#"<link href="/main.css" rel="stylesheet" type="text/css">"#,
            "<style>{css}</style>",
            "{highlight_css}",
            r#"<script defer src="/main.js" type="module"></script>"#,
            "</head>",
            r#"<body class="{category}">{selector}{menu}{content}{highlight_js}</body>"#,
            "</html>"
        ),
        title = html_escape(&site.metadata.title),
        author = author_meta,
        css = generate_css(&site.theme, scheme),
        highlight_css = highlight_css,
        category = category,
        selector = render_theme_selector(),
        menu = render_menu(&site.menu, category),
        content = content,
        highlight_js = highlight_js,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use phebe_core::{CODE_MARKER, parse_site_toml_str};

    fn site() -> Site {
        parse_site_toml_str(
            r##"
[site]
title = "Arend van Beelen jr."
author = "Arend van Beelen jr."

[[menu]]
category = "me"
href = "/"
title = "Me"

[[menu]]
category = "people"
href = "/people"
title = "People"

[[page]]
category = "me"
href = "/"
source = "pages/index.md"

[[page]]
category = "people"
href = "/people"
source = "pages/people.md"
"##,
        )
        .unwrap()
    }

    fn category(name: &str) -> Category {
        Category::new(name).unwrap()
    }

    #[test]
    fn test_render_content_escapes_title() {
        assert_eq!(
            render_content(Some("Me & You"), "<p>hi</p>"),
            r#"<div class="content"><h1>Me &amp; You</h1><p>hi</p></div>"#
        );
        assert_eq!(
            render_content(None, "<p>hi</p>"),
            r#"<div class="content"><p>hi</p></div>"#
        );
    }

    #[test]
    fn test_menu_marks_active_category() {
        let site = site();
        let menu = render_menu(&site.menu, &category("people"));
        assert!(menu.contains(r#"<a class="me" href="/">Me</a>"#));
        assert!(menu.contains(r#"<a class="people active" href="/people">People</a>"#));
        assert_eq!(menu.matches(ACTIVE_CLASS).count(), 1);
    }

    #[test]
    fn test_document_structure() {
        let site = site();
        let content = render_content(Some("People"), "<p>x</p>");
        let html = render_document(
            &site,
            &category("people"),
            &content,
            PreferredColorScheme::Dark,
        );

        assert!(html.starts_with("<!DOCTYPE html><html><head><title>Arend van Beelen jr.</title>"));
        assert!(html.contains(r#"<meta name="author" content="Arend van Beelen jr.">"#));
        assert!(html.contains(r#"<body class="people">"#));
        assert!(html.contains(r#"<div class="theme-selector">"#));
        assert!(html.contains(&content));
        assert!(html.contains(".theme-selector .dark { display: none; }"));
        assert!(html.contains(r#"<script defer src="/main.js" type="module"></script>"#));
        assert!(!html.contains("/prism.css"));
        assert!(!html.contains("/prism.js"));
    }

    #[test]
    fn test_document_with_code_includes_highlighter() {
        let site = site();
        let content = render_content(
            None,
            &format!("<pre>{}rust\">fn main() {{}}</code></pre>", CODE_MARKER),
        );
        let html = render_document(&site, &category("me"), &content, PreferredColorScheme::Unspecified);

        assert!(html.contains(r#"<link href="/prism.css" rel="stylesheet" type="text/css">"#));
        assert!(html.ends_with(r#"<script src="/prism.js"></script></body></html>"#));
    }
}
