use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{
        HeaderMap, HeaderValue, Method, Request, StatusCode,
        header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE},
    },
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tracing::error;

use crate::{
    application::{
        assemble::assemble,
        error::{ErrorReport, SsrError},
        render::RendererProvider,
        styles::StyleCollector,
        template::ShellSource,
    },
    domain::language::{Language, LanguageSource},
    infra::assets::{AssetStore, asset_not_found, asset_response},
};

use super::middleware::{log_responses, set_request_context};

/// Name of both the query switch and the stored-preference cookie.
const LANGUAGE_KEY: &str = "lang";
const LANGUAGE_COOKIE_MAX_AGE_SECS: u64 = 31_536_000;

/// Everything the dispatcher needs, bound to the active render mode at
/// startup. The trait objects are the mode: dev reloads, production caches.
#[derive(Clone)]
pub struct HttpState {
    pub shell: Arc<dyn ShellSource>,
    pub renderer: Arc<dyn RendererProvider>,
    pub styles: Arc<dyn StyleCollector>,
    pub assets: Arc<AssetStore>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/_health", get(health))
        .route("/assets/{*path}", get(serve_asset))
        .fallback(render_page)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn serve_asset(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    const SOURCE: &str = "infra::http::public::serve_asset";

    match state.assets.read(&path).await {
        Ok(Some(bytes)) => asset_response(&path, bytes),
        Ok(None) => {
            let mut response = asset_not_found();
            ErrorReport::from_message(SOURCE, StatusCode::NOT_FOUND, "Asset not found")
                .attach(&mut response);
            response
        }
        Err(err) => {
            error!(
                target = "vetrina::http::assets",
                path = %path,
                error = %err,
                "failed to read asset"
            );
            let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
            ErrorReport::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, &err)
                .attach(&mut response);
            response
        }
    }
}

/// The wildcard funnel: every path renders the portfolio document. Only
/// GET-shaped requests are meaningful; anything else is not found, matching
/// a single-page site with no other endpoints.
async fn render_page(State(state): State<HttpState>, request: Request<Body>) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        let mut response = StatusCode::NOT_FOUND.into_response();
        ErrorReport::from_message(
            "infra::http::public::render_page",
            StatusCode::NOT_FOUND,
            format!("no handler for {} {}", request.method(), request.uri().path()),
        )
        .attach(&mut response);
        return response;
    }

    match run_pipeline(&state, request).await {
        Ok(page) => page.into_response(),
        Err(err) => err.into_response(),
    }
}

struct RenderedPage {
    document: String,
    store_language: Option<Language>,
}

impl IntoResponse for RenderedPage {
    fn into_response(self) -> Response {
        let mut response = Html(self.document).into_response();
        if let Some(language) = self.store_language {
            let cookie = format!(
                "{LANGUAGE_KEY}={language}; Path=/; Max-Age={LANGUAGE_COOKIE_MAX_AGE_SECS}; SameSite=Lax"
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().insert(SET_COOKIE, value);
            }
        }
        response
    }
}

/// One request's pipeline: shell, renderer, language, render, styles,
/// assembly. Strictly sequential; each stage needs the previous one.
async fn run_pipeline(
    state: &HttpState,
    request: Request<Body>,
) -> Result<RenderedPage, SsrError> {
    let shell = state.shell.load().await?;
    let renderer = state.renderer.acquire().await?;

    let explicit = query_param(request.uri().query(), LANGUAGE_KEY);
    let stored = cookie_value(request.headers(), LANGUAGE_KEY);
    let accept = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let resolved =
        renderer
            .language_policy()
            .resolve(explicit.as_deref(), stored.as_deref(), accept);

    let rendered = renderer
        .render(request.uri().path(), &resolved.language)
        .await?;
    let stylesheet = state.styles.collect(&rendered.touched_styles).await?;
    let document = assemble(&shell, &rendered.html, &stylesheet);

    let store_language =
        (resolved.source == LanguageSource::Explicit).then(|| resolved.language.clone());
    Ok(RenderedPage {
        document,
        store_language,
    })
}

fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let mut kv = pair.splitn(2, '=');
        (kv.next() == Some(name)).then(|| kv.next().unwrap_or_default().to_string())
    })
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let mut kv = pair.trim().splitn(2, '=');
        (kv.next() == Some(name)).then(|| kv.next().unwrap_or_default().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_finds_the_named_pair() {
        assert_eq!(query_param(Some("lang=it"), "lang"), Some("it".into()));
        assert_eq!(
            query_param(Some("theme=dark&lang=en"), "lang"),
            Some("en".into())
        );
        assert_eq!(query_param(Some("language=it"), "lang"), None);
        assert_eq!(query_param(None, "lang"), None);
    }

    #[test]
    fn cookie_value_parses_the_header_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; lang=it"));
        assert_eq!(cookie_value(&headers, "lang"), Some("it".into()));
        assert_eq!(cookie_value(&headers, "session"), None);
        assert_eq!(cookie_value(&HeaderMap::new(), "lang"), None);
    }
}
