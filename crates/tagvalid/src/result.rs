use crate::error::ValidationError;

/// Outcome of a single-rule check.
///
/// On failure `error` points at the error stored in the context, so
/// [`key`](Self::key) and [`message`](Self::message) edit it in place.
#[derive(Debug)]
pub struct CheckResult<'v> {
    pub ok: bool,
    pub error: Option<&'v mut ValidationError>,
}

impl<'v> CheckResult<'v> {
    pub(crate) fn passed() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub(crate) fn failed(error: &'v mut ValidationError) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Replace the key of the recorded error.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        if let Some(error) = self.error.as_deref_mut() {
            error.key = key.into();
        }
        self
    }

    /// Replace the message of the recorded error.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(error) = self.error.as_deref_mut() {
            error.message = message.into();
        }
        self
    }
}
