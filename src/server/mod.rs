//! Site server with optional live reload

pub mod error;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{ArticleFrontmatter, Bundle, ProjectFrontmatter};
use crate::pages::{status_of, Pages};
use crate::routes::{Page, ROUTES};
use crate::{sitemap, Site};
use error::AppError;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct AppState {
    pages: Pages,
    static_dir: PathBuf,
    reload_tx: Option<broadcast::Sender<()>>,
}

impl AppState {
    /// Turn a rendered page (or its failure) into a response
    fn html(&self, result: Result<String>) -> Response {
        match result {
            Ok(html) => Html(self.inject(html)).into_response(),
            Err(e) => self.error_page(&e),
        }
    }

    fn error_page(&self, error: &anyhow::Error) -> Response {
        let status = status_of(error);
        if status >= 500 {
            tracing::error!("Request failed: {:#}", error);
        } else {
            tracing::debug!("Not found: {:#}", error);
        }

        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self.pages.error(status, Some(error));
        (code, Html(self.inject(body))).into_response()
    }

    fn not_found(&self) -> Response {
        let body = self.pages.error(404, None);
        (StatusCode::NOT_FOUND, Html(self.inject(body))).into_response()
    }

    fn inject(&self, html: String) -> String {
        if self.reload_tx.is_some() {
            inject_live_reload(&html)
        } else {
            html
        }
    }
}

/// Build the router for a site
///
/// Passing a reload sender enables the live reload endpoint and script.
pub fn build_router(site: Site, reload_tx: Option<broadcast::Sender<()>>) -> Result<Router> {
    let static_dir = site.static_dir.clone();
    let state = Arc::new(AppState {
        pages: Pages::new(site)?,
        static_dir,
        reload_tx,
    });

    let mut router = Router::new();
    for route in ROUTES {
        router = router.route(&route.router_path(), page_handler(route.page));
    }

    let router = router
        .route("/api/articles", get(api_articles))
        .route("/api/articles/:slug", get(api_article))
        .route("/api/projects", get(api_projects))
        .route("/api/projects/:slug", get(api_project))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let reload_tx = if watch {
        let (tx, _) = broadcast::channel::<()>(16);
        Some(tx)
    } else {
        None
    };

    let app = build_router(site.clone(), reload_tx.clone())?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if let Some(reload_tx) = reload_tx {
        let paths = vec![
            site.articles().root().to_path_buf(),
            site.projects().root().to_path_buf(),
            site.about_path(),
            site.static_dir.clone(),
        ];

        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(paths, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Handler for one page of the route table
fn page_handler(page: Page) -> MethodRouter<Arc<AppState>> {
    match page {
        Page::BlogPost | Page::Project => get(
            move |State(state): State<Arc<AppState>>, Path(slug): Path<String>| async move {
                state.html(state.pages.render(page, Some(&slug)).await)
            },
        ),
        Page::Sitemap => get(sitemap_handler),
        _ => get(move |State(state): State<Arc<AppState>>| async move {
            state.html(state.pages.render(page, None).await)
        }),
    }
}

async fn sitemap_handler(State(state): State<Arc<AppState>>) -> Response {
    match sitemap::generate(state.pages.site()).await {
        Ok(xml) => (
            [
                (header::CONTENT_TYPE, "application/xml".to_string()),
                (header::CONTENT_LENGTH, xml.len().to_string()),
            ],
            xml,
        )
            .into_response(),
        Err(e) => state.error_page(&e),
    }
}

async fn api_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let articles = state.pages.site().list_all_articles().await?;
    Ok(Json(serde_json::json!({ "articles": articles })))
}

async fn api_article(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Bundle<ArticleFrontmatter>>, AppError> {
    Ok(Json(state.pages.site().bundle_post(&slug).await?))
}

async fn api_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let projects = state.pages.site().list_all_projects().await?;
    Ok(Json(serde_json::json!({ "projects": projects })))
}

async fn api_project(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Bundle<ProjectFrontmatter>>, AppError> {
    Ok(Json(state.pages.site().bundle_project(&slug).await?))
}

/// Watch content for changes and tell connected browsers to reload
///
/// Blocks the calling thread.
fn watch_and_reload(paths: Vec<PathBuf>, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid reload storms while files are saved
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in &paths {
        if path.exists() {
            debouncer.watcher().watch(path, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // No receivers just means no browser is open
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    match &state.reload_tx {
        Some(tx) => {
            let reload_rx = tx.subscribe();
            ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
        }
        None => state.not_found(),
    }
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve static assets, or the 404 page when nothing matches
async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => state.not_found(),
        Err(e) => state.error_page(&anyhow::Error::from(e)),
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
