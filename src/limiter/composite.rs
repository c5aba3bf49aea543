//! Limiter that requires every member to admit.

use std::sync::Arc;

use crate::limiter::Limiter;

/// Chain of limiters evaluated in order.
///
/// The first denial stops the chain. Limiters before it have already consumed their
/// share, so put the cheapest or most restrictive limiter first. An empty chain admits
/// everything.
#[derive(Clone, Default)]
pub struct AllOf {
    limiters: Vec<Arc<dyn Limiter>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a limiter to the end of the chain.
    pub fn push(mut self, limiter: Arc<dyn Limiter>) -> Self {
        self.limiters.push(limiter);
        self
    }

    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

impl FromIterator<Arc<dyn Limiter>> for AllOf {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Limiter>>>(iter: I) -> Self {
        Self {
            limiters: iter.into_iter().collect(),
        }
    }
}

impl Limiter for AllOf {
    fn allow_n(&self, n: u64) -> bool {
        self.limiters.iter().all(|limiter| limiter.allow_n(n))
    }

    fn name(&self) -> &'static str {
        "all_of"
    }
}

impl std::fmt::Debug for AllOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.limiters.iter().map(|l| l.name()).collect();
        f.debug_struct("AllOf").field("limiters", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::{FixedWindowCounter, TokenBucket};
    use std::time::Duration;

    #[test]
    fn test_all_must_admit() {
        let burst = Arc::new(TokenBucket::new(2, 1, Duration::from_secs(60)));
        let window = Arc::new(FixedWindowCounter::new(10, Duration::from_secs(60)));
        let limiter = AllOf::new().push(burst.clone()).push(window.clone());

        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());
        assert_eq!(window.count(), 2);
    }

    #[test]
    fn test_short_circuits_after_denial() {
        let strict = Arc::new(FixedWindowCounter::new(1, Duration::from_secs(60)));
        let later = Arc::new(FixedWindowCounter::new(10, Duration::from_secs(60)));
        let limiter: AllOf = [strict as Arc<dyn Limiter>, later.clone() as Arc<dyn Limiter>].into_iter().collect();

        assert!(limiter.allow());
        assert!(!limiter.allow());
        assert!(!limiter.allow());
        assert_eq!(later.count(), 1);
    }

    #[test]
    fn test_earlier_limiters_consume_on_denial() {
        let first = Arc::new(FixedWindowCounter::new(10, Duration::from_secs(60)));
        let second = Arc::new(FixedWindowCounter::new(1, Duration::from_secs(60)));
        let limiter = AllOf::new().push(first.clone()).push(second);

        assert!(limiter.allow());
        assert!(!limiter.allow());
        assert_eq!(first.count(), 2);
    }

    #[test]
    fn test_empty_admits() {
        let limiter = AllOf::new();
        assert!(limiter.is_empty());
        assert!(limiter.allow_n(1_000));
        assert_eq!(format!("{limiter:?}"), "AllOf { limiters: [] }");
    }
}
