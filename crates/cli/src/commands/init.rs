use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Escape a string for safe inclusion in a TOML basic string
///
/// The scaffolded site.toml is written as a template with comments, which
/// serializing through the toml crate would not preserve.
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Title for a fresh site, derived from its directory name
fn site_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "My Site".to_string())
}

fn site_toml(title: &str) -> String {
    format!(
        r##"# Site configuration for phebe

[site]
title = "{title}"
# author = "Your Name"

# In-place navigation; every field is optional
[navigator]
no_cache = true
highlight_stylesheet = "/prism.css"
highlight_script = "/prism.js"

# Menu links, in order. The category is used as class of the link and of
# the <body> of every page in that category.
[[menu]]
category = "me"
href = "/"
title = "Me"

[[menu]]
category = "articles"
href = "/articles"
title = "Articles"

[[page]]
category = "me"
href = "/"
title = "{title}"
source = "pages/index.md"

[articles]
href = "/articles"
category = "articles"
title = "Articles"
intro = "Everything I've written so far:"

[[article]]
href = "/hello-world.html"
title = "Hello, world"
source = "articles/hello-world.md"
date = "{date}"

[theme.light]
foreground = "#111"
background = "#fff"

[theme.light.accents]
me = "#daabbc"
articles = "#2d7d9a"

[theme.dark]
foreground = "#fff"
background = "#191919"

[theme.dark.accents]
me = "#daabbc"
articles = "#7fc8e0"
"##,
        title = toml_escape_string(title),
        date = chrono::Local::now().date_naive().format("%Y-%m-%d"),
    )
}

const INDEX_MD: &str = "Welcome! Have a look around.\n";

const HELLO_WORLD_MD: &str = r#"My first article.

```rust
fn main() {
    println!("Hello, world!");
}
```
"#;

const MAIN_CSS: &str = r#"body { font-family: sans-serif; margin: 0 auto; max-width: 50em; }
.menu { display: flex; gap: 1em; list-style: none; padding: 0; }
.menu > li a { text-decoration: none; }
.menu > li a.active { font-weight: bold; }
.theme-selector { float: right; }
"#;

/// Initialize a new site directory.
///
/// Creates `site.toml`, a home page, one example article and a `static/`
/// directory with a base stylesheet. The navigator script (`main.js`) and
/// the highlighter assets are expected to be dropped into `static/`.
///
/// # Errors
///
/// Returns an error if site.toml already exists or file operations fail.
pub async fn run(path: PathBuf) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    let site_toml_path = path.join("site.toml");
    if site_toml_path.exists() {
        anyhow::bail!(
            "site.toml already exists at {}\nHint: Delete it first or use a different directory",
            site_toml_path.display()
        );
    }

    create_structure(&path)?;

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml            ← Edit this to set title, menu and pages");
    println!("  ├── pages/");
    println!("  │   └── index.md");
    println!("  ├── articles/");
    println!("  │   └── hello-world.md");
    println!("  └── static/");
    println!("      └── main.css");

    println!("\nNext steps:");
    println!("  1. Edit site.toml and the markdown sources");
    println!("  2. Add main.js (and prism.css/prism.js for highlighting) to static/");
    println!("  3. Serve: phebe serve {}", path.display());

    Ok(())
}

fn create_structure(path: &Path) -> Result<()> {
    for dir in ["pages", "articles", "static"] {
        fs::create_dir_all(path.join(dir))
            .with_context(|| format!("Failed to create {} directory", dir))?;
    }

    let title = site_title(path);
    let files = [
        (path.join("site.toml"), site_toml(&title)),
        (path.join("pages/index.md"), INDEX_MD.to_string()),
        (path.join("articles/hello-world.md"), HELLO_WORLD_MD.to_string()),
        (path.join("static/main.css"), MAIN_CSS.to_string()),
    ];
    for (file, contents) in files {
        if file.exists() {
            println!("⚠ Keeping existing {}", file.display());
            continue;
        }
        fs::write(&file, contents).with_context(|| format!("Failed to write {}", file.display()))?;
    }

    Ok(())
}
