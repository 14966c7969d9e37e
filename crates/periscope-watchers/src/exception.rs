//! Exception watcher - explicit error reporting with the source chain

use periscope_core::events::CallSite;
use periscope_core::normalize::{self, RawException};
use periscope_core::Recorder;
use std::error::Error;

/// Records reported errors as `exception` events
#[derive(Debug, Clone)]
pub struct ExceptionWatcher {
    recorder: Recorder,
}

impl ExceptionWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self { recorder }
    }

    /// Report an error. The call site becomes the event's file/line hint and
    /// the `source()` chain is flattened into the cause list.
    #[track_caller]
    pub fn report<E: Error>(&self, error: &E) {
        let origin = CallSite::caller();
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        self.recorder.record_at(
            normalize::exception(RawException {
                class: std::any::type_name::<E>().to_string(),
                message: error.to_string(),
                file: Some(origin.file.clone()),
                line: Some(origin.line),
                chain,
            }),
            Some(origin),
        );
    }

    /// Report an ad-hoc error without an `Error` value behind it.
    #[track_caller]
    pub fn report_message(&self, class: &str, message: &str) {
        let origin = CallSite::caller();
        self.recorder.record_at(
            normalize::exception(RawException {
                class: class.to_string(),
                message: message.to_string(),
                file: Some(origin.file.clone()),
                line: Some(origin.line),
                chain: Vec::new(),
            }),
            Some(origin),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use periscope_core::channel;
    use periscope_core::events::{EventContent, Outcome};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("payment failed")]
    struct PaymentError {
        #[source]
        cause: std::io::Error,
    }

    #[tokio::test]
    async fn test_report_flattens_source_chain() {
        let (recorder, mut rx) = channel(8);
        let watcher = ExceptionWatcher::new(recorder);

        let error = PaymentError {
            cause: std::io::Error::other("gateway timeout"),
        };
        watcher.report(&error);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.content.outcome(), Outcome::Failed);
        let EventContent::Exception(c) = &event.content else {
            panic!("expected exception content");
        };
        assert_eq!(c.message, "payment failed");
        assert_eq!(c.chain, vec!["gateway timeout"]);
        assert!(c.class.contains("PaymentError"));
        assert!(c.file.as_deref().unwrap().ends_with("exception.rs"));
    }

    #[tokio::test]
    async fn test_report_message() {
        let (recorder, mut rx) = channel(8);
        let watcher = ExceptionWatcher::new(recorder);
        watcher.report_message("ValidationError", "email is required");

        let event = rx.recv().await.unwrap();
        let EventContent::Exception(c) = &event.content else {
            panic!("expected exception content");
        };
        assert_eq!(c.class, "ValidationError");
        assert!(c.chain.is_empty());
    }
}
