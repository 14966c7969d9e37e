//! Outgoing HTTP watcher - wraps a `reqwest::Client`
//!
//! Entry points are synchronous and `#[track_caller]` so the recorded call
//! site points at application code, then return the future that performs the
//! request.

use periscope_core::events::{CallSite, ErrorInfo};
use periscope_core::normalize::{self, RawHttp};
use periscope_core::Recorder;
use reqwest::{Client, IntoUrl, Request, Response};
use std::future::Future;
use std::time::Instant;

/// Records every request sent through it as an `http` event
#[derive(Debug, Clone)]
pub struct ClientHttpWatcher {
    client: Client,
    recorder: Recorder,
}

impl ClientHttpWatcher {
    pub fn new(recorder: Recorder) -> Self {
        Self::with_client(Client::new(), recorder)
    }

    pub fn with_client(client: Client, recorder: Recorder) -> Self {
        Self { client, recorder }
    }

    /// Send a prepared request, recording its outcome. A transport failure
    /// (no response at all) records a failed event with no status.
    #[track_caller]
    pub fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> {
        self.run(request, CallSite::caller())
    }

    /// GET convenience wrapper
    #[track_caller]
    pub fn get(
        &self,
        url: impl IntoUrl,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> {
        let origin = CallSite::caller();
        let built = self.client.get(url).build();
        let this = self.clone();
        async move {
            match built {
                Ok(request) => this.run(request, origin).await,
                Err(e) => Err(e),
            }
        }
    }

    /// POST convenience wrapper with a JSON body
    #[track_caller]
    pub fn post_json<B: serde::Serialize>(
        &self,
        url: impl IntoUrl,
        body: &B,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> {
        let origin = CallSite::caller();
        let built = self.client.post(url).json(body).build();
        let this = self.clone();
        async move {
            match built {
                Ok(request) => this.run(request, origin).await,
                Err(e) => Err(e),
            }
        }
    }

    /// Generic combinator for call shapes the wrapper does not cover: time
    /// `f`, record it as an `http` event, and pass the result through. The
    /// closure extracts the status from the success value.
    #[track_caller]
    pub fn observe<T, E, F>(
        &self,
        method: impl Into<String>,
        uri: impl Into<String>,
        status_of: impl FnOnce(&T) -> Option<u16> + Send + 'static,
        f: F,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let origin = CallSite::caller();
        let recorder = self.recorder.clone();
        let method = method.into();
        let uri = uri.into();
        async move {
            let started = Instant::now();
            let result = f.await;
            let raw = RawHttp {
                method,
                uri,
                status: result.as_ref().ok().and_then(status_of),
                error: result
                    .as_ref()
                    .err()
                    .map(|e| ErrorInfo::new(std::any::type_name::<E>(), e.to_string())),
                duration: started.elapsed(),
            };
            recorder.record_at(normalize::http(raw), Some(origin));
            result
        }
    }

    fn run(
        &self,
        request: Request,
        origin: CallSite,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> {
        let method = request.method().to_string();
        let uri = request.url().to_string();
        let client = self.client.clone();
        let recorder = self.recorder.clone();
        async move {
            let started = Instant::now();
            let result = client.execute(request).await;
            let raw = RawHttp {
                method,
                uri,
                status: result.as_ref().ok().map(|r| r.status().as_u16()),
                error: result
                    .as_ref()
                    .err()
                    .map(|e| ErrorInfo::new("reqwest::Error", e.to_string())),
                duration: started.elapsed(),
            };
            recorder.record_at(normalize::http(raw), Some(origin));
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use periscope_core::channel;
    use periscope_core::events::{EntryType, EventContent, Outcome};

    #[tokio::test]
    async fn test_refused_connection_records_failed_event() {
        let (recorder, mut rx) = channel(8);
        let watcher = ClientHttpWatcher::new(recorder);

        // nothing listens on port 1
        let result = watcher.get("http://127.0.0.1:1/users").await;
        assert!(result.is_err());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.entry_type(), EntryType::Http);
        assert_eq!(event.content.outcome(), Outcome::Failed);
        let EventContent::Http(c) = &event.content else {
            panic!("expected http content");
        };
        assert_eq!(c.method, "GET");
        assert!(c.status.is_none());
        assert!(c.error.is_some());
        assert!(event.origin.is_some(), "call site captured");
    }

    #[tokio::test]
    async fn test_observe_records_extracted_status() {
        let (recorder, mut rx) = channel(8);
        let watcher = ClientHttpWatcher::new(recorder);

        let code = watcher
            .observe(
                "GET",
                "https://api.example.com/ping",
                |code: &u16| Some(*code),
                async { Ok::<_, std::io::Error>(204u16) },
            )
            .await
            .unwrap();
        assert_eq!(code, 204);

        let event = rx.recv().await.unwrap();
        let EventContent::Http(c) = &event.content else {
            panic!("expected http content");
        };
        assert_eq!(c.status, Some(204));
    }

    #[tokio::test]
    async fn test_closed_channel_does_not_alter_the_result() {
        let (recorder, rx) = channel(1);
        drop(rx);
        let watcher = ClientHttpWatcher::new(recorder);

        let value = watcher
            .observe("GET", "https://api.example.com", |_: &u8| None, async {
                Ok::<_, std::io::Error>(7u8)
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
