use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::LiveReloadLayer;

use crate::config::SiteConfig;
use crate::content::{ContentError, SiteContent};
use crate::routing::{Resolution, SiteRouter};
use crate::site_writer::{SiteWriter, WriteReport};

/// Quiet period before a burst of input changes triggers one rebuild
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Where a site is read from and written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSources {
    /// Content document; the bundled sample when absent
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    /// `wasm-pack` output of the browser crate
    pub web_pkg: Option<PathBuf>,
}

impl SiteSources {
    pub fn load_content(&self) -> Result<SiteContent, ContentError> {
        match &self.input {
            Some(path) => SiteContent::load(path),
            None => SiteContent::builtin(),
        }
    }
}

/// Result of one full generation
#[derive(Debug)]
pub struct Generated {
    pub content: SiteContent,
    pub router: SiteRouter,
    pub report: WriteReport,
}

/// Load the content and write every page
pub fn generate(sources: &SiteSources, config: &SiteConfig) -> anyhow::Result<Generated> {
    let content = sources.load_content()?;

    let mut writer = SiteWriter::new(&content, config);
    if let Some(pkg) = &sources.web_pkg {
        writer = writer.with_web_pkg(pkg);
    }
    let report = writer.write(&sources.output)?;
    let router = SiteRouter::new(&content.blog);

    Ok(Generated {
        content,
        router,
        report,
    })
}

/// Response for a request that matched no file on disk
fn missing_page(router: &RwLock<SiteRouter>, path: &str) -> Response {
    let Ok(router) = router.read() else {
        tracing::error!("route table lock poisoned");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    match router.resolve(path) {
        Resolution::Redirect(target) => {
            tracing::debug!(path, %target, "redirecting unknown path");
            Redirect::temporary(&target).into_response()
        }
        Resolution::Page(route) => {
            tracing::warn!(path, route = %route.path(), "page has not been generated");
            (StatusCode::NOT_FOUND, "page has not been generated yet").into_response()
        }
    }
}

/// Static files from `output`, with router-driven redirects for everything else
pub fn app(output: &Path, router: Arc<RwLock<SiteRouter>>) -> Router {
    let fallback = move |request: Request| {
        let router = router.clone();
        async move { missing_page(&router, request.uri().path()) }
    };

    Router::new().fallback_service(ServeDir::new(output).fallback(fallback.into_service()))
}

/// Watch the content document and send a signal whenever it changes
fn watch_input(input: &Path, tx: mpsc::Sender<()>) -> anyhow::Result<RecommendedWatcher> {
    let file_name = input.file_name().map(|name| name.to_os_string());
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else { return };
        let relevant = event
            .paths
            .iter()
            .any(|path| path.file_name().map(|name| name.to_os_string()) == file_name);
        if relevant && (event.kind.is_modify() || event.kind.is_create()) {
            // A full channel already has a rebuild pending
            let _ = tx.try_send(());
        }
    })?;

    let watch_path = input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Start the development server with live reload
pub async fn serve(sources: SiteSources, config: SiteConfig, port: u16) -> anyhow::Result<()> {
    let initial = generate(&sources, &config)?;
    tracing::info!(
        pages = initial.report.pages.len(),
        "generated site in {}",
        sources.output.display()
    );
    let router = Arc::new(RwLock::new(initial.router));

    let (tx, mut rx) = mpsc::channel::<()>(1);
    let _input_watcher = match &sources.input {
        Some(input) => {
            let watcher = watch_input(input, tx)?;
            tracing::info!("watching {} for changes", input.display());
            Some(watcher)
        }
        None => {
            tracing::info!("serving the bundled sample content; pass --input to watch a file");
            None
        }
    };

    let regen_sources = sources.clone();
    let regen_router = router.clone();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            tokio::time::sleep(DEBOUNCE).await;
            while rx.try_recv().is_ok() {}

            match generate(&regen_sources, &config) {
                Ok(generated) => {
                    let pages = generated.report.pages.len();
                    match regen_router.write() {
                        Ok(mut table) => *table = generated.router,
                        Err(_) => tracing::error!("route table lock poisoned"),
                    }
                    tracing::info!(pages, "regenerated site");
                }
                Err(err) => tracing::error!("error regenerating: {err:#}"),
            }
        }
    });

    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();
    let mut output_watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    output_watcher.watch(&sources.output, RecursiveMode::Recursive)?;

    let app = app(&sources.output, router).layer(livereload);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("development server running at http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use tempfile::TempDir;

    fn builtin_router() -> RwLock<SiteRouter> {
        RwLock::new(SiteRouter::new(&SiteContent::builtin().unwrap().blog))
    }

    #[test]
    fn missing_page_redirects_unknown_posts_to_blog() {
        let response = missing_page(&builtin_router(), "/blog/unknown-category/unknown-slug");
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/blog");
    }

    #[test]
    fn missing_page_redirects_other_paths_home() {
        let response = missing_page(&builtin_router(), "/about-me");
        assert_eq!(response.headers()[LOCATION], "/");
    }

    #[test]
    fn known_but_unwritten_page_is_not_found() {
        let response = missing_page(&builtin_router(), "/blog/python");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn generate_uses_builtin_content_without_input() {
        let out = TempDir::new().unwrap();
        let sources = SiteSources {
            input: None,
            output: out.path().to_path_buf(),
            web_pkg: None,
        };

        let generated = generate(&sources, &SiteConfig::default()).unwrap();
        assert_eq!(generated.content.profile.name, "Alex Doe");
        assert_eq!(generated.report.pages.len(), generated.router.routes().len());
        assert!(out.path().join("blog/index.html").is_file());
    }

    #[test]
    fn generate_reports_bad_input() {
        let out = TempDir::new().unwrap();
        let sources = SiteSources {
            input: Some(out.path().join("missing.yaml")),
            output: out.path().join("site"),
            web_pkg: None,
        };
        let err = generate(&sources, &SiteConfig::default()).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }
}
