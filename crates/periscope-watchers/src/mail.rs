//! Mail watcher - decorates any mailer implementation

use async_trait::async_trait;
use periscope_core::events::ErrorInfo;
use periscope_core::normalize::{self, RawMail};
use periscope_core::Recorder;
use std::time::Instant;

/// An outgoing message
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub subject: String,
    pub to: Vec<String>,
    pub body: String,
}

/// The mail seam watchers decorate
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()>;
}

/// Records every send through the wrapped mailer as a `mail` event
pub struct MailWatcher<M> {
    inner: M,
    recorder: Recorder,
}

impl<M: Mailer> MailWatcher<M> {
    pub fn new(inner: M, recorder: Recorder) -> Self {
        Self { inner, recorder }
    }
}

#[async_trait]
impl<M: Mailer> Mailer for MailWatcher<M> {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        let started = Instant::now();
        let result = self.inner.send(mail).await;
        let error = result
            .as_ref()
            .err()
            .map(|e| ErrorInfo::new("mail", e.to_string()));
        self.recorder.record_at(
            normalize::mail(RawMail {
                subject: mail.subject.clone(),
                to: mail.to.clone(),
                error,
                duration: started.elapsed(),
            }),
            None,
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use periscope_core::channel;
    use periscope_core::events::{CompletionStatus, EventContent};

    struct NullMailer {
        fail: bool,
    }

    #[async_trait]
    impl Mailer for NullMailer {
        async fn send(&self, _mail: &OutgoingMail) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("relay unavailable")
            }
            Ok(())
        }
    }

    fn welcome() -> OutgoingMail {
        OutgoingMail {
            subject: "Welcome".into(),
            to: vec!["ada@example.com".into()],
            body: "hello".into(),
        }
    }

    #[tokio::test]
    async fn test_successful_send_records_completed() {
        let (recorder, mut rx) = channel(8);
        let mailer = MailWatcher::new(NullMailer { fail: false }, recorder);
        mailer.send(&welcome()).await.unwrap();

        let event = rx.recv().await.unwrap();
        let EventContent::Mail(c) = &event.content else {
            panic!("expected mail content");
        };
        assert_eq!(c.status, CompletionStatus::Completed);
        assert_eq!(c.to, vec!["ada@example.com"]);
    }

    #[tokio::test]
    async fn test_failed_send_records_failure_and_propagates() {
        let (recorder, mut rx) = channel(8);
        let mailer = MailWatcher::new(NullMailer { fail: true }, recorder);
        assert!(mailer.send(&welcome()).await.is_err());

        let event = rx.recv().await.unwrap();
        let EventContent::Mail(c) = &event.content else {
            panic!("expected mail content");
        };
        assert_eq!(c.status, CompletionStatus::Failed);
        assert!(c.error.as_ref().unwrap().message.contains("relay"));
    }
}
