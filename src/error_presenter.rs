use tracing::error;

use crate::AppError;

pub type Completion = Box<dyn FnOnce() + Send + 'static>;

pub const ERROR_TITLE: &str = "Oops... something went wrong!";

/// Shows a domain error to the user. How (dialog, status line, log) is up to
/// the implementation.
pub trait ErrorPresenter: Send + Sync {
    fn present(&self, error: &AppError, message: &str, completion: Option<Completion>);

    fn present_error(&self, error: &AppError) {
        self.present(error, &error.message(), None);
    }
}

/// Writes the error to the log and acknowledges it right away.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorPresenter;

impl ErrorPresenter for LoggingErrorPresenter {
    fn present(&self, error: &AppError, message: &str, completion: Option<Completion>) {
        error!("{} {} ({:?})", ERROR_TITLE, message, error);
        if let Some(completion) = completion {
            completion();
        }
    }
}
