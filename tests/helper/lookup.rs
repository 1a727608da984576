//! Scripted upstream lookup for testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use repodiff::error::FetchError;
use repodiff::package::Version;
use repodiff::remote::RemoteLookup;

/// What a scripted lookup answers for one name
#[derive(Debug, Clone)]
pub enum Reply {
    Found(&'static str),
    NotFound,
    Fail(&'static str),
    /// Never answers within any sane timeout
    Hang,
}

/// Lookup with per-name replies and delays that records its concurrency
#[derive(Default)]
pub struct ScriptedLookup {
    replies: HashMap<String, (Reply, Duration)>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    /// Delay for names without a scripted reply
    default_delay: Duration,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, name: &str, reply: Reply) -> Self {
        self.with_delayed_reply(name, reply, Duration::ZERO)
    }

    pub fn with_delayed_reply(mut self, name: &str, reply: Reply, delay: Duration) -> Self {
        self.replies.insert(name.to_string(), (reply, delay));
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the lookup is cancelled
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteLookup for ScriptedLookup {
    async fn lookup(&self, package_name: &str) -> Result<Option<Version>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let (reply, delay) = self
            .replies
            .get(package_name)
            .cloned()
            .unwrap_or((Reply::NotFound, self.default_delay));

        if matches!(reply, Reply::Hang) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        tokio::time::sleep(delay).await;

        match reply {
            Reply::Found(version) => Ok(Some(Version::parse(version).unwrap())),
            Reply::NotFound | Reply::Hang => Ok(None),
            Reply::Fail(message) => Err(FetchError::InvalidResponse(message.to_string())),
        }
    }
}
