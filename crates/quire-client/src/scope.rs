use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{ApiError, ApiResult};

/// Cancellation handle shared by every request issued from one context.
///
/// Clones observe the same flag; cancelling is permanent.
#[derive(Debug, Clone)]
pub struct RequestScope {
    cancelled: Arc<watch::Sender<bool>>,
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScope {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            cancelled: Arc::new(cancelled),
        }
    }

    /// Abort every pending and future request in this scope
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Drive a request unless the scope is cancelled first
    pub async fn run<T, F>(&self, request: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let mut cancelled = self.cancelled.subscribe();
        if *cancelled.borrow_and_update() {
            return Err(ApiError::Cancelled);
        }
        tokio::select! {
            result = request => result,
            _ = cancelled.wait_for(|flag| *flag) => {
                tracing::debug!("Request dropped by scope cancellation");
                Err(ApiError::Cancelled)
            }
        }
    }
}
