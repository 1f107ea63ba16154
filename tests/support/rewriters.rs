#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use postwright::{Rewriter, UpstreamError};

/// Returns the tokenized text untouched.
pub struct Echo;

#[async_trait]
impl Rewriter for Echo {
    async fn rewrite(&self, _instruction: &str, text: &str) -> Result<String, UpstreamError> {
        Ok(text.to_string())
    }
}

/// Applies a fixed edit to whatever it receives.
pub struct Scripted<F>(pub F);

#[async_trait]
impl<F> Rewriter for Scripted<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    async fn rewrite(&self, _instruction: &str, text: &str) -> Result<String, UpstreamError> {
        Ok((self.0)(text))
    }
}

/// Echoes after a delay and records how many calls overlapped.
pub struct SlowEcho {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowEcho {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Highest number of rewrites that were in progress at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Rewriter for SlowEcho {
    async fn rewrite(&self, _instruction: &str, text: &str) -> Result<String, UpstreamError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(text.to_string())
    }
}

/// UTF-16 `(offset, length)` of the first occurrence of `needle`.
pub fn span(content: &str, needle: &str) -> (usize, usize) {
    let at = content
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not in {content:?}"));
    (
        content[..at].encode_utf16().count(),
        needle.encode_utf16().count(),
    )
}
