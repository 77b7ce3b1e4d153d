use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{render::RenderError, styles::StyleError, template::ShellError},
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Diagnostic attached to failing responses and drained by the response
/// logging middleware, so errors are logged exactly once, at the boundary,
/// with their full source chain.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// A failure anywhere in the per-request render pipeline. Always fatal to the
/// request, never to the process.
#[derive(Debug, Error)]
pub enum SsrError {
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Styles(#[from] StyleError),
}

impl IntoResponse for SsrError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let report = ErrorReport::from_error("application::error::SsrError", status, &self);
        let mut response = (status, format!("Server Error: {self}")).into_response();
        report.attach(&mut response);
        response
    }
}

/// Process-boundary error for `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Ssr(#[from] SsrError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
