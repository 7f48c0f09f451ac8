use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

/// Represents an entity responsible for providing time across the application.
/// This can allow it to be used for testing
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn now_local(&self) -> DateTime<Local>;

    async fn sleep(&self, duration: Duration);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
