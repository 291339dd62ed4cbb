use futures_util::SinkExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{DrawguessError, Result};
use crate::websocket::message::{ClientMessage, ClientRole};

pub type RelayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Bounded fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    #[serde(with = "duration_secs")]
    pub retry_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_secs(5),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Runs connect attempts under a [`ReconnectPolicy`].
///
/// The failure counter lives across calls and returns to zero after every
/// successful attempt, so each drop of an established link gets the full
/// retry budget again.
#[derive(Debug)]
pub struct Reconnector {
    policy: ReconnectPolicy,
    failures: u32,
}

impl Reconnector {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            failures: 0,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Consecutive failures since the last success
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Try `connect` until it succeeds or the retry budget is spent.
    /// Sleeps `retry_delay` between attempts, never after the last one.
    pub async fn establish<F, Fut, T>(&mut self, mut connect: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        loop {
            match connect().await {
                Ok(value) => {
                    self.failures = 0;
                    return Ok(value);
                }
                Err(e) => {
                    self.failures += 1;
                    tracing::warn!(
                        "Connection attempt {}/{} failed: {}",
                        self.failures,
                        self.policy.max_retries,
                        e
                    );
                    if self.failures >= self.policy.max_retries {
                        let attempts = self.failures;
                        self.failures = 0;
                        tracing::error!("Reached maximum retries, giving up");
                        return Err(DrawguessError::RetriesExhausted {
                            attempts,
                            last_error: e.to_string(),
                        });
                    }
                    tracing::info!("Retrying in {:?}", self.policy.retry_delay);
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
            }
        }
    }
}

/// Open a relay connection and immediately register with `role`
pub async fn connect_and_register(url: &str, role: ClientRole) -> Result<RelayStream> {
    let (mut stream, _) = connect_async(url).await?;
    let register = ClientMessage::Register { role }.to_json()?;
    stream.send(Message::Text(register)).await?;
    tracing::info!("Connected to {} as {:?}", url, role);
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn refused() -> DrawguessError {
        std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into()
    }

    fn fast_policy(max_retries: u32) -> ReconnectPolicy {
        ReconnectPolicy {
            max_retries,
            retry_delay: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.retry_delay, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let mut reconnector = Reconnector::new(fast_policy(5));
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = reconnector
            .establish(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(refused()) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        match result {
            Err(DrawguessError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 5),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let mut reconnector = Reconnector::new(fast_policy(5));
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let value = reconnector
            .establish(|| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Err(refused())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(reconnector.failures(), 0);

        // A later drop gets the whole budget again
        let counter = calls.clone();
        let result: Result<()> = reconnector
            .establish(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(refused()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4 + 5);
    }

    #[tokio::test]
    async fn test_waits_between_attempts_only() {
        let mut reconnector = Reconnector::new(ReconnectPolicy {
            max_retries: 3,
            retry_delay: Duration::from_millis(50),
        });
        let start = std::time::Instant::now();
        let _: Result<()> = reconnector
            .establish(|| async { Err(refused()) })
            .await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(650));
    }

    #[tokio::test]
    async fn test_connect_refused_is_an_error() {
        let result = connect_and_register("ws://127.0.0.1:1/ws", ClientRole::Drawer).await;
        assert!(result.is_err());
    }
}
