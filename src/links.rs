use rand::Rng;

use crate::{
    error::AppError,
    id::new_code,
    model::ShortLinkRecord,
    store::{LinkStore, StoreError},
    util::epoch_now,
};

/// Total conditional inserts tried before giving up on a fresh code.
pub const MAX_ATTEMPTS: u32 = 5;

/// Stores `long_url` under a freshly drawn code and returns the code.
///
/// A `Conflict` from the store means another row already owns the code, so a
/// new one is drawn. Any other store failure is returned as-is.
pub async fn create_link<R>(
    store: &dyn LinkStore,
    long_url: &str,
    rng: &mut R,
) -> Result<String, AppError>
where
    R: Rng + Send + ?Sized,
{
    let now = epoch_now();
    for attempt in 1..=MAX_ATTEMPTS {
        let record = ShortLinkRecord::new(new_code(rng), long_url.to_string(), now);
        match store.put_if_absent(&record).await {
            Ok(()) => {
                tracing::info!(code=%record.short_code, attempt, "short link created");
                return Ok(record.short_code);
            }
            Err(StoreError::Conflict(code)) => {
                tracing::warn!(%code, attempt, "short code collision, drawing another");
            }
            Err(e) => {
                tracing::error!(err=%e, attempt, "put failed, not retrying");
                return Err(e.into());
            }
        }
    }
    tracing::error!(attempts = MAX_ATTEMPTS, "no free short code found");
    Err(AppError::GenerationExhausted)
}

/// Looks up `code` and returns its target, recording the visit on the way out.
pub async fn resolve_link(store: &dyn LinkStore, code: &str) -> Result<String, AppError> {
    if code.is_empty() {
        return Err(AppError::InvalidInput("Invalid code."));
    }
    let record = store.get(code).await?.ok_or(AppError::NotFound)?;
    record_visit(store, code).await;
    tracing::info!(%code, "short link resolved");
    Ok(record.long_url)
}

/// Bumps the click counter. Failure is logged and dropped on purpose: the
/// redirect is already decided and must not change because bookkeeping failed.
async fn record_visit(store: &dyn LinkStore, code: &str) {
    if let Err(e) = store.record_visit(code, epoch_now()).await {
        tracing::warn!(%code, err=%e, "visit not recorded (ignored)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MockLinkStore};
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;
    use std::sync::Arc;

    const URL: &str = "https://example.com/page";

    /// The codes a `StdRng` seeded with `seed` will draw, in order.
    fn codes_for_seed(seed: u64, n: usize) -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| new_code(&mut rng)).collect()
    }

    async fn occupy(store: &MemoryStore, codes: &[String]) {
        for c in codes {
            store
                .put_if_absent(&ShortLinkRecord::new(c.clone(), "https://taken.io".into(), 0))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn creates_and_stores_record() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let code = create_link(&store, URL, &mut rng).await.unwrap();
        assert_eq!(code.len(), 6);

        let rec = store.get(&code).await.unwrap().unwrap();
        assert_eq!(rec.long_url, URL);
        assert_eq!(rec.clicks, 0);
        assert!(rec.created_at > 0);
    }

    #[tokio::test]
    async fn collision_retries_with_new_code() {
        let store = MemoryStore::new();
        let drawn = codes_for_seed(11, 2);
        occupy(&store, &drawn[..1]).await;

        let mut rng = StdRng::seed_from_u64(11);
        let code = create_link(&store, URL, &mut rng).await.unwrap();
        assert_eq!(code, drawn[1]);
        assert_eq!(store.get(&drawn[0]).await.unwrap().unwrap().long_url, "https://taken.io");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn racing_creators_with_same_draws_split_codes() {
        let store = Arc::new(MemoryStore::new());
        let drawn = codes_for_seed(21, 2);
        assert_ne!(drawn[0], drawn[1]);

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut rng = StdRng::seed_from_u64(21);
                    create_link(store.as_ref(), URL, &mut rng).await
                })
            })
            .collect();

        let mut got = HashSet::new();
        for t in tasks {
            got.insert(t.await.unwrap().unwrap());
        }
        let want: HashSet<String> = drawn.into_iter().collect();
        assert_eq!(got, want);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn fifth_attempt_can_still_succeed() {
        let store = MemoryStore::new();
        let drawn = codes_for_seed(12, 5);
        occupy(&store, &drawn[..4]).await;

        let mut rng = StdRng::seed_from_u64(12);
        assert_eq!(create_link(&store, URL, &mut rng).await.unwrap(), drawn[4]);
    }

    #[tokio::test]
    async fn five_collisions_exhaust() {
        let store = MemoryStore::new();
        occupy(&store, &codes_for_seed(13, 5)).await;

        let mut rng = StdRng::seed_from_u64(13);
        let err = create_link(&store, URL, &mut rng).await.unwrap_err();
        assert!(matches!(err, AppError::GenerationExhausted));
        assert_eq!(err.status(), 500);
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn other_put_errors_abort_without_retry() {
        let mut store = MockLinkStore::new();
        store
            .expect_put_if_absent()
            .times(1)
            .returning(|_| Err(StoreError::Backend("throughput exceeded".into())));

        let mut rng = StdRng::seed_from_u64(1);
        let err = create_link(&store, URL, &mut rng).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(ref m) if m.contains("throughput")));
    }

    #[tokio::test]
    async fn conflicts_are_tried_exactly_five_times() {
        let mut store = MockLinkStore::new();
        store
            .expect_put_if_absent()
            .times(MAX_ATTEMPTS as usize)
            .returning(|r| Err(StoreError::Conflict(r.short_code.clone())));

        let mut rng = StdRng::seed_from_u64(2);
        let err = create_link(&store, URL, &mut rng).await.unwrap_err();
        assert!(matches!(err, AppError::GenerationExhausted));
    }

    #[tokio::test]
    async fn resolve_returns_target_and_counts() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(4);
        let code = create_link(&store, URL, &mut rng).await.unwrap();

        assert_eq!(resolve_link(&store, &code).await.unwrap(), URL);
        let first = store.get(&code).await.unwrap().unwrap();
        assert_eq!(first.clicks, 1);
        let ts = first.last_accessed.unwrap();

        resolve_link(&store, &code).await.unwrap();
        let second = store.get(&code).await.unwrap().unwrap();
        assert_eq!(second.clicks, 2);
        assert!(second.last_accessed.unwrap() >= ts);
    }

    #[tokio::test]
    async fn empty_code_never_touches_store() {
        let store = MockLinkStore::new(); // any call would panic
        let err = resolve_link(&store, "").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn odd_looking_code_is_still_looked_up() {
        let mut store = MockLinkStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Err(StoreError::Backend("down".into())));

        let err = resolve_link(&store, "abc123").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(ref m) if m == "down"));
        assert_eq!(err.status(), 500);

        let store = MemoryStore::new();
        let err = resolve_link(&store, "abc").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let store = MemoryStore::new();
        let err = resolve_link(&store, "ZZZZZZ").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn lookup_failure_is_store_error() {
        let mut store = MockLinkStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Backend("table offline".into())));
        store.expect_record_visit().never();

        let err = resolve_link(&store, "ABC123").await.unwrap_err();
        assert_eq!(err.to_string(), "Store internal error: table offline");
    }

    #[tokio::test]
    async fn visit_failure_does_not_change_result() {
        let mut store = MockLinkStore::new();
        store.expect_get().returning(|code| {
            Ok(Some(ShortLinkRecord::new(code.to_string(), URL.into(), 1)))
        });
        store
            .expect_record_visit()
            .times(1)
            .returning(|_, _| Err(StoreError::Backend("update throttled".into())));

        assert_eq!(resolve_link(&store, "ABC123").await.unwrap(), URL);
    }
}
