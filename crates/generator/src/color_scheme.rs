use phebe_core::{ColorScheme, Themes};

/// Alpha of the accent color mixed into the body text of a category
const TEXT_TINT_ALPHA: f32 = 8.0 / 255.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PreferredColorScheme {
    Dark,
    Light,
    #[default]
    Unspecified,
}

impl PreferredColorScheme {
    /// Scheme requested through `?preferred_color_scheme=...`
    pub fn from_query(query: Option<&str>) -> Self {
        match query {
            Some("preferred_color_scheme=light") => PreferredColorScheme::Light,
            Some("preferred_color_scheme=dark") => PreferredColorScheme::Dark,
            _ => PreferredColorScheme::Unspecified,
        }
    }

    /// Scheme remembered in the `color_scheme` cookie
    pub fn from_cookie_value(value: Option<&str>) -> Self {
        match value {
            Some("light") => PreferredColorScheme::Light,
            Some("dark") => PreferredColorScheme::Dark,
            _ => PreferredColorScheme::Unspecified,
        }
    }

    pub fn cookie_value(self) -> Option<&'static str> {
        match self {
            PreferredColorScheme::Dark => Some("dark"),
            PreferredColorScheme::Light => Some("light"),
            PreferredColorScheme::Unspecified => None,
        }
    }
}

/// Parse `#rgb` or `#rrggbb`
fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let code = hex.strip_prefix('#').unwrap_or(hex);
    if !code.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match code.len() {
        3 => Some([
            channel(&code[..1])? * 17,
            channel(&code[1..2])? * 17,
            channel(&code[2..3])? * 17,
        ]),
        6 => Some([
            channel(&code[..2])?,
            channel(&code[2..4])?,
            channel(&code[4..6])?,
        ]),
        _ => None,
    }
}

fn to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn from_linear(c: f32) -> u8 {
    let c = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Composite `color` at `alpha` over `base` in linear light
fn blend_over(color: [u8; 3], alpha: f32, base: [u8; 3]) -> [u8; 3] {
    std::array::from_fn(|i| {
        from_linear(to_linear(color[i]) * alpha + to_linear(base[i]) * (1.0 - alpha))
    })
}

fn hex(color: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

fn generate_color_scheme_css(scheme: &ColorScheme) -> String {
    // Colors are validated when the config is parsed
    let foreground = parse_hex(&scheme.foreground).unwrap_or([0, 0, 0]);
    let background = parse_hex(&scheme.background).unwrap_or([255, 255, 255]);

    let mut css = format!(
        "body {{ background-color: {}; color: {}; }}",
        hex(background),
        hex(foreground)
    );

    for (category, accent) in &scheme.accents {
        let Some(color) = parse_hex(accent) else {
            continue;
        };
        let text_color = blend_over(color, TEXT_TINT_ALPHA, foreground);
        css.push_str(&format!(
            " body.{name} {{ color: {text}; }} body.{name} a {{ color: {accent}; }} .menu > li a.{name} {{ color: {accent}; }}",
            name = category,
            text = hex(text_color),
            accent = hex(color),
        ));
    }

    css
}

/// Stylesheet for the requested scheme
///
/// Without a preference the light scheme is used, switching to dark through
/// a `prefers-color-scheme` media query.
pub fn generate_css(themes: &Themes, scheme: PreferredColorScheme) -> String {
    match scheme {
        PreferredColorScheme::Dark => format!(
            ".theme-selector .dark {{ display: none; }} {}",
            generate_color_scheme_css(&themes.dark)
        ),
        PreferredColorScheme::Light => format!(
            ".theme-selector .light {{ display: none; }} {}",
            generate_color_scheme_css(&themes.light)
        ),
        PreferredColorScheme::Unspecified => format!(
            ".theme-selector .light {{ display: none; }} {} @media screen and (prefers-color-scheme: dark) {{ .theme-selector .dark {{ display: none; }} .theme-selector .light {{ display: inline; }} {} }}",
            generate_color_scheme_css(&themes.light),
            generate_color_scheme_css(&themes.dark)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phebe_core::Category;

    fn themes() -> Themes {
        let mut themes = Themes::default();
        themes
            .light
            .accents
            .insert(Category::new("me").unwrap(), "#daabbc".to_string());
        themes
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex("#191919"), Some([25, 25, 25]));
        assert_eq!(parse_hex("#12"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_blend_endpoints() {
        assert_eq!(blend_over([218, 171, 188], 0.0, [17, 17, 17]), [17, 17, 17]);
        assert_eq!(blend_over([218, 171, 188], 1.0, [17, 17, 17]), [218, 171, 188]);
        let tinted = blend_over([218, 171, 188], TEXT_TINT_ALPHA, [17, 17, 17]);
        assert!(tinted[0] > 17 && tinted[0] < 218);
    }

    #[test]
    fn test_scheme_from_request() {
        assert_eq!(
            PreferredColorScheme::from_query(Some("preferred_color_scheme=dark")),
            PreferredColorScheme::Dark
        );
        assert_eq!(
            PreferredColorScheme::from_query(Some("other=1")),
            PreferredColorScheme::Unspecified
        );
        assert_eq!(
            PreferredColorScheme::from_cookie_value(Some("light")),
            PreferredColorScheme::Light
        );
        assert_eq!(PreferredColorScheme::Dark.cookie_value(), Some("dark"));
        assert_eq!(PreferredColorScheme::Unspecified.cookie_value(), None);
    }

    #[test]
    fn test_css_per_scheme() {
        let themes = themes();

        let light = generate_css(&themes, PreferredColorScheme::Light);
        assert!(light.starts_with(".theme-selector .light { display: none; }"));
        assert!(light.contains("body { background-color: #ffffff; color: #111111; }"));
        assert!(light.contains(".menu > li a.me { color: #daabbc; }"));

        let dark = generate_css(&themes, PreferredColorScheme::Dark);
        assert!(dark.contains("background-color: #191919"));
        assert!(!dark.contains("a.me"));

        let auto = generate_css(&themes, PreferredColorScheme::Unspecified);
        assert!(auto.contains("@media screen and (prefers-color-scheme: dark)"));
        assert!(auto.contains("background-color: #191919"));
        assert!(auto.contains("background-color: #ffffff"));
    }
}
