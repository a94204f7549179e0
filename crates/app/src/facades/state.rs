//! View state

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use crate::facades::{messages::UserFacingError, notifications::Notifier};

/// What a view shows for an asynchronous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ViewState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// A [`ViewState`] published on a watch channel, settled from service
/// results.
#[derive(Debug)]
pub struct ViewStore<T> {
    state: watch::Sender<ViewState<T>>,
    notifier: Notifier,
}

impl<T: Clone> ViewStore<T> {
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            state: watch::Sender::new(ViewState::Idle),
            notifier,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn get(&self) -> ViewState<T> {
        self.state.borrow().clone()
    }

    pub fn loading(&self) {
        self.state.send_replace(ViewState::Loading);
    }

    pub fn reset(&self) {
        self.state.send_replace(ViewState::Idle);
    }

    pub fn set(&self, value: T) {
        self.state.send_replace(ViewState::Loaded(value));
    }

    /// Publish the outcome of an operation. Errors become a readable message
    /// in the state and an error notification; `success` is announced when
    /// given.
    pub fn settle<E: UserFacingError>(
        &self,
        result: Result<T, E>,
        success: Option<&str>,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                self.set(value.clone());

                if let Some(message) = success {
                    self.notifier.success(message);
                }

                Some(value)
            }
            Err(error) => {
                self.fail(&error);

                None
            }
        }
    }

    /// Publish an error.
    pub fn fail<E: UserFacingError>(&self, error: &E) {
        let message = error.user_message();

        warn!(code = error.error_code(), error = %error, "operation failed");

        self.state.send_replace(ViewState::Error(message.clone()));
        self.notifier.error(message);
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
