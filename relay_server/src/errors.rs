use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use processor_tools::{ProcessorApiError, WebhookVerificationError};
use relay_engine::StatusApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    MissingFields(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Payment not found")]
    PaymentNotFound,
    #[error("Webhook rejected. {0}")]
    InvalidSignature(String),
    #[error("Invalid checkout request. {0}")]
    InvalidCheckoutRequest(String),
    #[error("The payment processor returned an error. {0}")]
    ProcessorError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::MissingFields(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCheckoutRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            Self::PaymentNotFound => StatusCode::NOT_FOUND,
            Self::ProcessorError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<StatusApiError> for ServerError {
    fn from(e: StatusApiError) -> Self {
        match e {
            StatusApiError::MissingFields => Self::MissingFields(e.to_string()),
            StatusApiError::Backend(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<ProcessorApiError> for ServerError {
    fn from(e: ProcessorApiError) -> Self {
        match e {
            ProcessorApiError::InvalidRequest(s) => Self::InvalidCheckoutRequest(s),
            ProcessorApiError::Initialization(s) => Self::InitializeError(s),
            e => Self::ProcessorError(e.to_string()),
        }
    }
}

impl From<WebhookVerificationError> for ServerError {
    fn from(e: WebhookVerificationError) -> Self {
        Self::InvalidSignature(e.to_string())
    }
}
