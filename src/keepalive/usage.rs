use std::{collections::HashMap, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use tracing::warn;

use crate::utils::clock::Clock;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Usage document returned by the remote endpoint, keyed by window name
/// ("five_hour", "seven_day", ...). Window payloads are kept loose on purpose:
/// only `resets_at` matters here and the endpoint carries plenty of other
/// fields.
#[derive(Debug, Default, Deserialize)]
pub struct UsageSnapshot {
    #[serde(flatten)]
    windows: HashMap<String, serde_json::Value>,
}

impl UsageSnapshot {
    /// Returns the recorded reset boundary for a window. A missing window, a
    /// null `resets_at` and an empty string all count as "no boundary".
    pub fn reset_boundary(&self, window: &str) -> Option<&str> {
        self.windows
            .get(window)?
            .get("resets_at")?
            .as_str()
            .filter(|v| !v.is_empty())
    }
}

/// Contract for retrieving the usage snapshot of one account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn fetch_usage(&self, org_id: &str, session_key: &str) -> Result<UsageSnapshot>;
}

pub struct UsageFetcher {
    client: reqwest::Client,
    base_url: String,
    clock: Box<dyn Clock>,
}

impl UsageFetcher {
    pub fn new(base_url: impl Into<String>, clock: Box<dyn Clock>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            clock,
        })
    }

    async fn attempt(&self, url: &str, session_key: &str) -> Result<UsageSnapshot> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "*/*")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, format!("sessionKey={session_key}"))
            .send()
            .await?;
        Ok(response.error_for_status()?.json::<UsageSnapshot>().await?)
    }
}

#[async_trait]
impl UsageSource for UsageFetcher {
    /// Fetches the usage document, retrying transient failures with
    /// exponential backoff (1s, 2s). Returns the last error once all attempts
    /// are exhausted.
    async fn fetch_usage(&self, org_id: &str, session_key: &str) -> Result<UsageSnapshot> {
        let url = format!("{}/api/organizations/{org_id}/usage", self.base_url);

        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(&url, session_key).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => {
                    warn!("Usage fetch attempt {attempt}/{MAX_ATTEMPTS} failed: {e:#}");
                    last_error = Some(e);
                }
            }
            if attempt < MAX_ATTEMPTS {
                self.clock.sleep(BACKOFF_BASE * 2u32.pow(attempt - 1)).await;
            }
        }

        Err(last_error.expect("at least one attempt was made"))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use async_trait::async_trait;
    use chrono::{DateTime, Local};
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::{UsageFetcher, UsageSnapshot, UsageSource};
    use crate::utils::{clock::Clock, logging::TEST_LOGGING};

    /// Clock whose sleeps return immediately, recording the requested
    /// durations so the backoff schedule can be asserted on.
    struct RecordingClock {
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl Clock for RecordingClock {
        fn now_local(&self) -> DateTime<Local> {
            Local::now()
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    fn fetcher_for(server: &MockServer) -> (UsageFetcher, Arc<Mutex<Vec<Duration>>>) {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let clock = RecordingClock {
            sleeps: Arc::clone(&sleeps),
        };
        let fetcher = UsageFetcher::new(server.uri(), Box::new(clock)).unwrap();
        (fetcher, sleeps)
    }

    #[tokio::test]
    async fn returns_snapshot_on_success() {
        *TEST_LOGGING;
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/organizations/org-1/usage"))
            .and(header("Cookie", "sessionKey=sk-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "five_hour": { "resets_at": "2025-01-01T00:00:00Z", "utilization": 12 },
                "seven_day": { "resets_at": null },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (fetcher, sleeps) = fetcher_for(&server);
        let snapshot = fetcher.fetch_usage("org-1", "sk-1").await.unwrap();

        assert_eq!(
            snapshot.reset_boundary("five_hour"),
            Some("2025-01-01T00:00:00Z")
        );
        assert_eq!(snapshot.reset_boundary("seven_day"), None);
        assert!(sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn gives_up_after_three_attempts_with_exponential_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let (fetcher, sleeps) = fetcher_for(&server);
        let result = fetcher.fetch_usage("org-1", "sk-1").await;

        assert!(result.is_err());
        // 1s then 2s between attempts; no sleep after the final attempt.
        assert_eq!(
            *sleeps.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        server.verify().await;
    }

    #[tokio::test]
    async fn recovers_on_a_later_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "five_hour": { "resets_at": "2025-06-01T10:00:00Z" },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (fetcher, sleeps) = fetcher_for(&server);
        let snapshot = fetcher.fetch_usage("org-1", "sk-1").await.unwrap();

        assert_eq!(
            snapshot.reset_boundary("five_hour"),
            Some("2025-06-01T10:00:00Z")
        );
        assert_eq!(*sleeps.lock().unwrap(), vec![Duration::from_secs(1)]);
    }

    #[test]
    fn empty_boundary_counts_as_missing() {
        let snapshot: UsageSnapshot =
            serde_json::from_value(json!({ "five_hour": { "resets_at": "" } })).unwrap();
        assert_eq!(snapshot.reset_boundary("five_hour"), None);
    }
}
