#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status of the latest operation started by a coalescer.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Async<T, E> {
    Uninitialized,
    Loading(Option<T>),
    Success { value: T },
    Fail { error: E, value: Option<T> },
}

impl<T, E> Async<T, E> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Async::Success { .. } | Async::Fail { .. })
    }

    pub fn should_load(&self) -> bool {
        matches!(self, Async::Uninitialized | Async::Fail { .. })
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Async::Uninitialized | Async::Loading(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Async::Loading(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Async::Success { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Async::Fail { .. })
    }

    pub fn value_ref(&self) -> Option<&T> {
        match self {
            Async::Loading(Some(value)) => Some(value),
            Async::Success { value } => Some(value),
            Async::Fail {
                value: Some(value), ..
            } => Some(value),
            _ => None,
        }
    }

    pub fn error_ref(&self) -> Option<&E> {
        match self {
            Async::Fail { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            Async::Uninitialized => None,
            Async::Loading(value) => value,
            Async::Success { value } => Some(value),
            Async::Fail { value, .. } => value,
        }
    }

    pub fn loading(value: Option<T>) -> Self {
        Async::Loading(value)
    }

    pub fn success(value: T) -> Self {
        Async::Success { value }
    }

    pub fn fail(error: E, value: Option<T>) -> Self {
        Async::Fail { error, value }
    }
}

impl<T: Clone, E> Async<T, E> {
    pub fn value_ref_clone(&self) -> Option<T> {
        self.value_ref().cloned()
    }

    /// Builds the status for a finished operation. A failure keeps the value
    /// of `previous` when `retain` is set.
    pub fn settled(outcome: Result<T, E>, previous: &Async<T, E>, retain: bool) -> Self {
        match outcome {
            Ok(value) => Async::success(value),
            Err(error) if retain => Async::fail(error, previous.value_ref_clone()),
            Err(error) => Async::fail(error, None),
        }
    }

    /// Builds the `Loading` status that follows `previous`.
    pub fn reloading(previous: &Async<T, E>, retain: bool) -> Self {
        if retain {
            Async::Loading(previous.value_ref_clone())
        } else {
            Async::Loading(None)
        }
    }
}

impl<T, E> Default for Async<T, E> {
    fn default() -> Self {
        Async::Uninitialized
    }
}

impl<T, E> From<Result<T, E>> for Async<T, E> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(value) => Async::Success { value },
            Err(error) => Async::Fail { error, value: None },
        }
    }
}

impl<T: Clone, E> From<&Async<T, E>> for Option<T> {
    fn from(value: &Async<T, E>) -> Self {
        value.value_ref_clone()
    }
}
