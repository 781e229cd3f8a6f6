use super::load_site;
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use chrono::Local;
use phebe_generator::{PreferredColorScheme, SiteContent};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

const COLOR_SCHEME_COOKIE: &str = "color_scheme";

struct AppState {
    content: SiteContent,
    static_dir: PathBuf,
}

/// Serve a site locally.
///
/// Pages are negotiated on `Accept`: `application/json` gets the JSON
/// representation the navigator swaps in place, anything else the full HTML
/// document. Paths that are not pages fall through to `static/`.
///
/// # Arguments
///
/// * `path` - Path to site directory containing site.toml
/// * `port` - Port to serve on (default: 3000)
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("🌐 Starting site server...");
    println!("   Site: {}", path.display());

    let site = load_site(&path)?;
    let content = SiteContent::load(&path, site, Local::now().date_naive())
        .context("Failed to render site")?;

    println!("   ✓ Loaded: {}", content.site().metadata.title);
    println!("   ✓ Pages: {}", content.hrefs().count());

    let app = app(content, path.join("static"));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Site ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

pub(crate) fn app(content: SiteContent, static_dir: PathBuf) -> Router {
    let state = Arc::new(AppState {
        content,
        static_dir,
    });
    Router::new().fallback(handle).with_state(state)
}

async fn handle(State(state): State<Arc<AppState>>, request: Request) -> Response {
    log::info!("{} {}", request.method(), request.uri());

    if request.method() != Method::GET {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    }

    let path = request.uri().path().to_string();
    let headers = request.headers();

    if accepts_json(headers) {
        if let Some(page) = state.content.json_page(&path) {
            return with_vary(Json(page).into_response());
        }
    } else {
        let requested = PreferredColorScheme::from_query(request.uri().query());
        let scheme = match requested {
            PreferredColorScheme::Unspecified => PreferredColorScheme::from_cookie_value(
                cookie_value(headers, COLOR_SCHEME_COOKIE).as_deref(),
            ),
            scheme => scheme,
        };

        if let Some(html) = state.content.html_page(&path, scheme) {
            let mut response = with_vary(Html(html).into_response());
            if let Some(value) = requested.cookie_value()
                && let Ok(cookie) =
                    HeaderValue::from_str(&format!("{}={}; Path=/", COLOR_SCHEME_COOKIE, value))
            {
                response.headers_mut().insert(header::SET_COOKIE, cookie);
            }
            return response;
        }
    }

    serve_static(&state.static_dir, request).await
}

async fn serve_static(static_dir: &Path, request: Request) -> Response {
    match ServeDir::new(static_dir).oneshot(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(),
        Ok(response) => response.into_response(),
        Err(e) => match e {},
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn with_vary(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::VARY, HeaderValue::from_static("Accept"));
    response
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| {
            accept
                .split(',')
                .any(|media| media.split(';').next().map(str::trim) == Some("application/json"))
        })
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}
