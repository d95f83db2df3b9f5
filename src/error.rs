use thiserror::Error;

/// Domain errors raised by mini-app services.
///
/// These travel on a service's observable feed as its terminal state; they are
/// never thrown across the host. View-models turn them into a failure state and
/// hand them to an [`ErrorPresenter`](crate::error_presenter::ErrorPresenter).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Location access denied")]
    LocationAccessDenied,
    #[error("Location resolution failed: {0}")]
    LocationResolutionFailed(String),
    #[error("{0}")]
    Custom(String),
}

impl AppError {
    /// Human readable text shown to the user.
    pub fn message(&self) -> String {
        match self {
            AppError::LocationAccessDenied => {
                "The Time Zone mini-app needs access to your location.".to_string()
            }
            AppError::LocationResolutionFailed(message) => message.clone(),
            AppError::Custom(message) => message.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum HubError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid input for {controller}: {input}")]
    InvalidInput { controller: String, input: String },
    #[error("Navigation error: {0}")]
    Navigation(String),
    #[error("App error: {0}")]
    App(#[from] AppError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HubResult<T> = Result<T, HubError>;

impl HubError {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        HubError::Internal(message.into())
    }

    pub fn invalid_input<C: Into<String>, I: Into<String>>(controller: C, input: I) -> Self {
        HubError::InvalidInput {
            controller: controller.into(),
            input: input.into(),
        }
    }
}
