use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::GradingScale,
    error::ApiErrorBody,
    protocol::{CalculateRequest, CalculationResult, ConvertGradeRequest, ConvertGradeResponse},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod error;
pub mod registry;
pub mod render;
pub mod session;

pub use error::ClientError;
pub use registry::{RegistryStatus, ScaleRegistry};
pub use render::{render_result, ResultView};
pub use session::{
    BannerKind, ErrorBanner, FormSession, GradePreview, PreviewOutcome, PreviewRequest,
    PreviewResponse, SubmissionTicket, ValidationFailure,
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Calls the external grading service makes available to the form.
#[async_trait]
pub trait GradingService: Send + Sync {
    async fn list_scales(&self) -> Result<Vec<GradingScale>, ClientError>;
    async fn convert_grade(
        &self,
        request: &ConvertGradeRequest,
    ) -> Result<ConvertGradeResponse, ClientError>;
    async fn calculate(&self, request: &CalculateRequest)
        -> Result<CalculationResult, ClientError>;
}

/// Stand-in used when no client could be built; every call fails with the
/// startup reason.
pub struct MissingGradingService {
    reason: String,
}

impl MissingGradingService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GradingService for MissingGradingService {
    async fn list_scales(&self) -> Result<Vec<GradingScale>, ClientError> {
        Err(ClientError::Unavailable(self.reason.clone()))
    }

    async fn convert_grade(
        &self,
        _request: &ConvertGradeRequest,
    ) -> Result<ConvertGradeResponse, ClientError> {
        Err(ClientError::Unavailable(self.reason.clone()))
    }

    async fn calculate(
        &self,
        _request: &CalculateRequest,
    ) -> Result<CalculationResult, ClientError> {
        Err(ClientError::Unavailable(self.reason.clone()))
    }
}

pub struct GradingClient {
    http: Client,
    base_url: Url,
}

impl GradingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source,
            })
    }
}

/// Parses the service address, forcing a trailing slash so endpoint joins
/// keep any path prefix.
pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|source| ClientError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::UnsupportedScheme {
            url: trimmed.to_string(),
        });
    }
    Ok(url)
}

async fn rejection(response: Response, fallback: &str) -> ClientError {
    let status = response.status().as_u16();
    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.message().unwrap_or(fallback).to_string(),
        Err(_) => fallback.to_string(),
    };
    ClientError::Rejected { status, message }
}

#[async_trait]
impl GradingService for GradingClient {
    async fn list_scales(&self) -> Result<Vec<GradingScale>, ClientError> {
        let url = self.endpoint("universities")?;
        debug!(%url, "grading: listing scales");
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response, "Failed to load universities").await);
        }
        let scales: Vec<GradingScale> = response.json().await?;
        info!(count = scales.len(), "grading: scales loaded");
        Ok(scales)
    }

    async fn convert_grade(
        &self,
        request: &ConvertGradeRequest,
    ) -> Result<ConvertGradeResponse, ClientError> {
        let url = self.endpoint("convert-grade")?;
        let response = self.http.post(url).json(request).send().await?;
        let status = response.status();
        if status.is_client_error() {
            // The service answers 4xx for values it cannot interpret on the scale.
            warn!(
                status = status.as_u16(),
                scale = %request.university,
                "grading: grade rejected by service"
            );
            return Ok(ConvertGradeResponse { gpa: None });
        }
        if !status.is_success() {
            return Err(rejection(response, "Grade conversion failed").await);
        }
        Ok(response.json().await?)
    }

    async fn calculate(
        &self,
        request: &CalculateRequest,
    ) -> Result<CalculationResult, ClientError> {
        let url = self.endpoint("calculate")?;
        info!(
            scale = %request.university,
            courses = request.courses.len(),
            "grading: submitting calculation"
        );
        let response = self.http.post(url).json(request).send().await?;
        if !response.status().is_success() {
            let err = rejection(response, error::CALCULATION_FAILED_FALLBACK).await;
            warn!(error = %err, "grading: calculation rejected");
            return Err(err);
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
