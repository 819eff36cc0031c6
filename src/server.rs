//! The HTTP surface.
//!
//! One real route, `POST /upload`, plus a static file fallback that serves the upload form.
//! The handler pulls the `image` field out of the multipart body, stores the original for the
//! duration of the request, runs the pipeline and answers with the finished PNG.

use std::{io, path::Path, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use thiserror::Error;
use tower_http::services::ServeDir;

use crate::face::FaceAnalysis;
use crate::pipeline::{self, PipelineError};
use crate::storage::Storage;

/// Shared per-process state handed to the upload handler.
pub struct App {
    pub analyzer: Arc<dyn FaceAnalysis>,
    pub storage: Storage,
}

/// Builds the service router.
///
/// Unmatched paths fall through to the static asset directory, which serves the upload form.
pub fn router(app: Arc<App>, assets_dir: &Path, body_limit: usize) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .fallback_service(ServeDir::new(assets_dir))
        .with_state(app)
}

/// Everything the upload endpoint can answer with besides a processed image.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request contained no usable `image` field")]
    MissingImage,
    #[error("malformed multipart body")]
    Multipart(#[from] MultipartError),
    #[error("failed to store file")]
    Store(#[source] io::Error),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl RequestError {
    fn status_and_body(&self) -> (StatusCode, &'static str) {
        match self {
            RequestError::MissingImage | RequestError::Multipart(_) => {
                (StatusCode::BAD_REQUEST, "nenhuma imagem enviada")
            }
            RequestError::Pipeline(PipelineError::Decode(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "imagem inválida ou corrompida",
            ),
            RequestError::Store(_) | RequestError::Pipeline(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao processar a imagem",
            ),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(&self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        log::error!("upload request failed: {message}");

        self.status_and_body().into_response()
    }
}

async fn upload(
    State(app): State<Arc<App>>,
    mut multipart: Multipart,
) -> Result<Response, RequestError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            let file_name = field.file_name().map(str::to_owned);
            image = Some((file_name, field.bytes().await?));
            break;
        }
    }

    let (file_name, data) = image.ok_or(RequestError::MissingImage)?;
    if data.is_empty() {
        return Err(RequestError::MissingImage);
    }

    // Keep the original on disk while the request runs; the guard removes it again when this
    // function returns, no matter how.
    let original = app
        .storage
        .store_upload(file_name.as_deref(), &data)
        .map_err(RequestError::Store)?;
    log::debug!("stored upload at {}", original.path().display());

    let mut rng = fastrand::Rng::new();
    let png = pipeline::process(&data, &*app.analyzer, &mut rng)?;

    let output = app.storage.store_output(&png).map_err(RequestError::Store)?;
    log::info!("processed image written to {}", output.display());

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        let (status, body) = RequestError::MissingImage.status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "nenhuma imagem enviada");

        let decode = RequestError::Pipeline(PipelineError::Decode(anyhow!("bad magic")));
        assert_eq!(
            decode.status_and_body().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let analysis = RequestError::Pipeline(PipelineError::Analysis(anyhow!("boom")));
        let (status, body) = analysis.status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Erro ao processar a imagem");

        let store = RequestError::Store(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(
            store.status_and_body().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
