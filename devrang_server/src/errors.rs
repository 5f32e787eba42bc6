use actix_web::{
    error::ResponseError,
    http::{
        header::{ContentType, LOCATION},
        StatusCode,
    },
    HttpResponse,
};
use devrang_engine::{
    traits::{AuthApiError, CatalogApiError, CustomerApiError},
    OrderFlowError,
};
use log::error;
use thiserror::Error;

/// Where unapproved users are sent instead of the page they asked for.
pub const NOT_APPROVED_REDIRECT: &str = "/auth/error?error=NOT_APPROVED";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("{0} has not been approved yet")]
    NotApproved(String),
    #[error("Payment gateway error. {0}")]
    UpstreamError(String),
    #[error("Webhook processing failed")]
    WebhookProcessingFailed,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::NotApproved(_) => StatusCode::SEE_OTHER,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::WebhookProcessingFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::NotApproved(_) => {
                return HttpResponse::SeeOther().insert_header((LOCATION, NOT_APPROVED_REDIRECT)).finish();
            },
            // Gateway and database details stay in the logs
            Self::UpstreamError(_) => "Could not create a payment link. Please try again.".to_string(),
            Self::BackendError(_) => "An error occurred on the backend of the server.".to_string(),
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No session token was provided.")]
    MissingSessionToken,
    #[error("The session token is invalid. {0}")]
    InvalidSessionToken(String),
    #[error("No identity token was provided.")]
    MissingIdentityToken,
    #[error("The identity token is invalid. {0}")]
    InvalidIdentityToken(String),
    #[error("Could not issue a session token. {0}")]
    CouldNotIssueToken(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AuthApiError::ProfileNotFound(email) => Self::NoRecordFound(format!("No profile exists for {email}")),
            AuthApiError::ProfileAlreadyExists(email) => {
                Self::ValidationError(format!("A profile already exists for {email}"))
            },
            AuthApiError::NotApproved(email) => Self::NotApproved(email),
            AuthApiError::ValidationError(msg) => Self::ValidationError(msg),
        }
    }
}

impl From<CustomerApiError> for ServerError {
    fn from(e: CustomerApiError) -> Self {
        match e {
            CustomerApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            CustomerApiError::CustomerNotFound(id) => Self::NoRecordFound(format!("Customer {id} does not exist")),
            CustomerApiError::ValidationError(msg) => Self::ValidationError(msg),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            CatalogApiError::ProductNotFound(id) => Self::NoRecordFound(format!("Product {id} does not exist")),
            CatalogApiError::ValidationError(msg) => Self::ValidationError(msg),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        if e.is_validation_error() {
            return Self::ValidationError(e.to_string());
        }
        match e {
            OrderFlowError::CustomerNotFound(id) => Self::NoRecordFound(format!("Customer {id} does not exist")),
            OrderFlowError::UpstreamError(e) => {
                error!("💻️ Payment gateway call failed. {e}");
                Self::UpstreamError(e.to_string())
            },
            e => Self::BackendError(e.to_string()),
        }
    }
}
