//! Notification watcher - decorates any notifier implementation

use async_trait::async_trait;
use periscope_core::events::ErrorInfo;
use periscope_core::normalize::{self, RawNotification};
use periscope_core::Recorder;
use std::time::Instant;

/// The notification seam watchers decorate
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        channel: &str,
        recipient: Option<&str>,
        message: &str,
    ) -> anyhow::Result<()>;
}

/// Records every delivery through the wrapped notifier as a `notification`
/// event
pub struct NotificationWatcher<N> {
    inner: N,
    recorder: Recorder,
}

impl<N: Notifier> NotificationWatcher<N> {
    pub fn new(inner: N, recorder: Recorder) -> Self {
        Self { inner, recorder }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for NotificationWatcher<N> {
    async fn notify(
        &self,
        channel: &str,
        recipient: Option<&str>,
        message: &str,
    ) -> anyhow::Result<()> {
        let started = Instant::now();
        let result = self.inner.notify(channel, recipient, message).await;
        let error = result
            .as_ref()
            .err()
            .map(|e| ErrorInfo::new("notification", e.to_string()));
        self.recorder.record_at(
            normalize::notification(RawNotification {
                channel: channel.to_string(),
                recipient: recipient.map(str::to_string),
                error,
                duration: started.elapsed(),
            }),
            None,
        );
        result
    }
}
