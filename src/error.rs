//! Error taxonomy and the optional diagnostic side channel.
//!
//! Every fallible operation returns an explicit [`Result`]; the reporter
//! callback is a logging aid only and never the sole signal of failure.

use std::sync::Mutex;

use thiserror::Error;

/// Errors produced while building or running a generator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The distribution record is malformed or lacks a required evaluator
    /// or property.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),
    /// A method option was set to an unusable value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A numerical precondition of the method failed, either during setup
    /// or during a verify-mode draw.
    #[error("condition for method violated: {0}")]
    ConditionViolated(String),
    /// Operation on a generator that is not in a usable state.
    #[error("invalid generator: {0}")]
    InvalidGenerator(String),
    /// An iteration or interval budget was exhausted without convergence.
    #[error("resource limit exhausted: {0}")]
    ResourceExhausted(String),
    /// A non-finite value was produced where a finite one was required.
    #[error("non-finite value: {0}")]
    Numeric(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn distr(reason: impl Into<String>) -> Self {
        Error::InvalidDistribution(reason.into())
    }

    pub(crate) fn param(reason: impl Into<String>) -> Self {
        Error::InvalidParameter(reason.into())
    }

    pub(crate) fn condition(reason: impl Into<String>) -> Self {
        Error::ConditionViolated(reason.into())
    }

    pub(crate) fn generator(reason: impl Into<String>) -> Self {
        Error::InvalidGenerator(reason.into())
    }

    pub(crate) fn exhausted(reason: impl Into<String>) -> Self {
        Error::ResourceExhausted(reason.into())
    }

    pub(crate) fn numeric(reason: impl Into<String>) -> Self {
        Error::Numeric(reason.into())
    }
}

type Reporter = Box<dyn Fn(&Error) + Send + Sync>;

static REPORTER: Mutex<Option<Reporter>> = Mutex::new(None);

/// Install a process-wide callback that observes every reported error.
///
/// The callback is invoked in addition to the `tracing` event, right before
/// the error is returned to the caller (or, for verify-mode violations,
/// without any error being returned at all). Callers that need programmatic
/// handling must inspect the returned [`Result`] instead.
pub fn set_reporter(reporter: impl Fn(&Error) + Send + Sync + 'static) {
    *REPORTER.lock().unwrap_or_else(|e| e.into_inner()) = Some(Box::new(reporter));
}

/// Remove a previously installed reporter.
pub fn clear_reporter() {
    *REPORTER.lock().unwrap_or_else(|e| e.into_inner()) = None;
}

/// Emit an error event on the side channel and hand the error back.
pub(crate) fn report(err: Error) -> Error {
    tracing::warn!(error = %err, "variate generation error");
    if let Ok(guard) = REPORTER.lock() {
        if let Some(reporter) = guard.as_ref() {
            reporter(&err);
        }
    }
    err
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn reporter_sees_reported_errors() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        // Other tests report errors concurrently; count only our own.
        set_reporter(move |err| {
            if matches!(err, Error::Numeric(m) if m == "nan in test") {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        let err = report(Error::numeric("nan in test"));
        assert_eq!(err, Error::Numeric("nan in test".into()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        clear_reporter();
        report(Error::numeric("nan in test"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn display_carries_reason() {
        let err = Error::distr("PDF required");
        assert_eq!(err.to_string(), "invalid distribution: PDF required");
    }
}
