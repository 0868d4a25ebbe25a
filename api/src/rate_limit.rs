use std::fmt::Debug;
use std::hash::Hash;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use app::account;
use dashmap::{mapref::entry::Entry, DashMap};

/// A fixed-window request counter. Purely advisory throttling: the
/// counters live in process memory and reset on restart, so correctness
/// of the core never depends on this.
pub struct RateLimit<K: Eq + Hash + Copy + Debug + Send + Sync + 'static> {
    limit: usize,
    span: Duration,
    counter: Arc<DashMap<K, usize>>,
}

impl<K: Eq + Hash + Copy + Debug + Send + Sync + 'static> RateLimit<K> {
    pub fn new(limit: usize, span: Duration) -> Self {
        Self {
            limit,
            span,
            counter: Arc::new(Default::default()),
        }
    }

    /// Returns true if the caller should be rate limited, false otherwise.
    pub fn limit(&self, key: K) -> bool {
        match self.counter.entry(key) {
            Entry::Occupied(mut count) => {
                let count = count.get_mut();
                if *count >= self.limit {
                    true
                } else {
                    *count += 1;
                    self.decrement_later(key);
                    false
                }
            }
            Entry::Vacant(e) => {
                e.insert(1);
                self.decrement_later(key);
                false
            }
        }
    }

    fn decrement_later(&self, key: K) {
        let counter = Arc::clone(&self.counter);
        let span = self.span;
        tokio::spawn(async move {
            tokio::time::sleep(span).await;
            match counter.entry(key) {
                Entry::Occupied(mut e) => {
                    let v = e.get_mut();
                    *v -= 1;
                    if *v == 0 {
                        e.remove();
                    }
                }
                Entry::Vacant(_) => {
                    log::error!("entry should not be vacant, this is a bug. key {:?}", key);
                }
            }
        });
    }
}

/// The two throttling windows the API applies: one keyed by client
/// address for the unauthenticated registration/login routes, one keyed
/// by account for everything behind a token.
pub struct RateLimits {
    pub(crate) per_client: RateLimit<IpAddr>,
    pub(crate) per_account: RateLimit<account::Id>,
}

impl RateLimits {
    pub fn new(per_client: RateLimit<IpAddr>, per_account: RateLimit<account::Id>) -> Self {
        Self {
            per_client,
            per_account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn window_fills_up_and_blocks() {
        let limit = RateLimit::new(2, Duration::from_secs(60));
        let key: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(!limit.limit(key));
        assert!(!limit.limit(key));
        assert!(limit.limit(key));
    }

    #[tokio::test]
    async fn windows_are_independent_per_key() {
        let limit = RateLimit::new(1, Duration::from_secs(60));
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();
        assert!(!limit.limit(first));
        assert!(limit.limit(first));
        assert!(!limit.limit(second));
    }
}
