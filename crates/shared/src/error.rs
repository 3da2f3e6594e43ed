use std::{
  backtrace::{Backtrace, BacktraceStatus},
  fmt::Display,
};

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

/// The error kinds the core produces (spec §7). Carried as a tag on `AppError`
/// rather than a separate error type, matching the teacher's single-`AppError` idiom;
/// the tag only ever controls the HTTP status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  InvalidArgument,
  NotFound,
  StorageError,
  ProviderError,
  ValidationError,
}

impl ErrorKind {
  const fn status_code(self) -> StatusCode {
    match self {
      Self::InvalidArgument | Self::ValidationError => StatusCode::BAD_REQUEST,
      Self::NotFound => StatusCode::NOT_FOUND,
      Self::StorageError | Self::ProviderError => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

#[derive(Debug)]
pub struct AppError {
  err: anyhow::Error,
  status_code: StatusCode,
}

impl AppError {
  /// Create with 500 status
  pub fn new<E: Into<anyhow::Error>>(err: E) -> Self {
    Self {
      err: err.into(),
      status_code: StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Create with custom status
  pub fn with_status<E: Into<anyhow::Error>>(status: StatusCode, err: E) -> Self {
    Self {
      err: err.into(),
      status_code: status,
    }
  }

  /// Create tagged with one of spec §7's error kinds.
  pub fn kind<E: Into<anyhow::Error>>(kind: ErrorKind, err: E) -> Self {
    Self {
      err: err.into(),
      status_code: kind.status_code(),
    }
  }

  pub fn invalid_argument(msg: impl Display) -> Self {
    Self::kind(ErrorKind::InvalidArgument, anyhow::anyhow!("{msg}"))
  }

  pub fn not_found(msg: impl Display) -> Self {
    Self::kind(ErrorKind::NotFound, anyhow::anyhow!("{msg}"))
  }

  pub fn storage(msg: impl Display) -> Self {
    Self::kind(ErrorKind::StorageError, anyhow::anyhow!("{msg}"))
  }

  pub fn provider(msg: impl Display) -> Self {
    Self::kind(ErrorKind::ProviderError, anyhow::anyhow!("{msg}"))
  }

  pub fn validation(msg: impl Display) -> Self {
    Self::kind(ErrorKind::ValidationError, anyhow::anyhow!("{msg}"))
  }

  #[must_use]
  pub const fn status_code(&self) -> StatusCode {
    self.status_code
  }

  /// Get backtrace from anyhow (requires `RUST_BACKTRACE=1` to capture)
  pub fn backtrace(&self) -> &Backtrace {
    self.err.backtrace()
  }
}

#[derive(Serialize)]
struct ErrorEnvelope {
  error: String,
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let bt = self.err.backtrace();
    if cfg!(debug_assertions) && bt.status() == BacktraceStatus::Captured {
      tracing::error!(error = %self.err, %bt, "request failed");
    } else {
      tracing::error!(error = %self.err, "request failed");
    }
    let envelope = ErrorEnvelope {
      error: self.err.to_string(),
    };
    (self.status_code, axum::Json(envelope)).into_response()
  }
}

impl Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}] {}", self.status_code, self.err)
  }
}

impl std::error::Error for AppError {}

impl<E> From<E> for AppError
where
  E: Into<anyhow::Error>,
{
  fn from(err: E) -> Self {
    Self::new(err)
  }
}
