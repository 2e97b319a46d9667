use std::cmp;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, error};

use super::{params, Mode, Suppression, BATCH_SIZE, LONGPOLL_TIMEOUT};
use crate::database::types::{ChangesResult, DBInfo, PostChangesParams};
use crate::database::CouchClient;
use crate::error::LoungeError;

/// Lazy sequence of change batches. Each `next` issues one `_changes` request
/// racing the stop channel, classifies failures and suppresses the transient
/// ones according to the configured tolerance.
pub(crate) struct ChangesIterator {
    client: Arc<dyn CouchClient>,
    params: PostChangesParams,
    mode: Mode,
    suppression: Suppression,
    stop: watch::Receiver<bool>,
    /// Sequence to resume the next request from
    since: String,
    pending: i64,
    /// Rows still owed to the user when a limit was supplied
    remaining: Option<i64>,
    /// Rows requested per batch, sized once when `include_docs` is set
    batch: i64,
    configured: bool,
    retry: u32,
    last_success: Instant,
    done: bool,
}

impl ChangesIterator {
    pub(crate) fn new(
        client: Arc<dyn CouchClient>,
        params: PostChangesParams,
        mode: Mode,
        suppression: Suppression,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let since = if params.since.is_empty() {
            match mode {
                // everything that happens from now on
                Mode::Listen => "now".to_string(),
                // the whole feed from its start
                Mode::Finite => "0".to_string(),
            }
        } else {
            params.since.clone()
        };
        let remaining = if params.limit > 0 {
            Some(params.limit)
        } else {
            None
        };
        let configured = !params.include_docs;
        Self {
            client,
            params,
            mode,
            suppression,
            stop,
            since,
            pending: 0,
            remaining,
            batch: BATCH_SIZE,
            configured,
            retry: 0,
            last_success: Instant::now(),
            done: false,
        }
    }

    /// One shot batch sizing for feeds that carry document bodies, aiming at
    /// roughly 5 MiB of docs per response. Falls back to the default batch
    /// size when the database is empty or the call fails transiently.
    async fn configure(&mut self) -> Result<(), LoungeError> {
        if self.configured {
            return Ok(());
        }
        self.configured = true;
        match self.client.get_database_information(&self.params.db).await {
            Ok(info) => {
                self.batch = batch_for(&info);
                debug!(
                    "sized change batches to {} rows for database {}",
                    self.batch, self.params.db
                );
            }
            Err(err) if err.is_terminal() => return Err(err),
            Err(err) => {
                debug!("could not size change batches, using the default: {}", err);
            }
        }
        Ok(())
    }

    pub(crate) async fn next(&mut self) -> Result<Option<ChangesResult>, LoungeError> {
        if self.done || *self.stop.borrow() {
            return Ok(None);
        }
        // a long poll can sit for close to a minute, give other tasks on the
        // loop a chance first
        tokio::task::yield_now().await;
        self.configure().await?;

        let limit = match self.remaining {
            Some(remaining) => cmp::min(remaining, self.batch),
            None => self.batch,
        };
        let request = params::request(&self.params, self.mode, &self.since, limit);
        let result = tokio::select! {
            _ = self.stop.changed() => return Ok(None),
            result = self.client.post_changes(&request) => result,
        };
        match result {
            Ok(batch) => {
                self.retry = 0;
                self.last_success = Instant::now();
                self.since = batch.last_seq.clone();
                self.pending = batch.pending;
                if self.mode == Mode::Finite && batch.pending == 0 {
                    self.done = true;
                }
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= batch.results.len() as i64;
                    if *remaining <= 0 {
                        self.done = true;
                    }
                }
                debug!(
                    "delivering {} changes, {} pending",
                    batch.results.len(),
                    batch.pending
                );
                Ok(Some(batch))
            }
            Err(err) if err.is_terminal() => {
                error!("changes feed for database {} stopped: {}", self.params.db, err);
                Err(err)
            }
            Err(err) => {
                let suppress = match self.suppression {
                    Suppression::Never => false,
                    Suppression::Always => true,
                    Suppression::Timer(window) => self.last_success.elapsed() < window,
                };
                if !suppress {
                    error!("changes feed for database {} stopped: {}", self.params.db, err);
                    return Err(err);
                }
                let delay = backoff_delay(self.retry);
                self.retry += 1;
                debug!("suppressed a transient error, next poll in {:?}: {}", delay, err);
                tokio::select! {
                    _ = self.stop.changed() => return Ok(None),
                    _ = tokio::time::sleep(delay) => {}
                }
                // an empty batch keeps the consumer ticking without
                // delivering spurious rows
                Ok(Some(ChangesResult {
                    results: vec![],
                    last_seq: self.since.clone(),
                    pending: self.pending,
                }))
            }
        }
    }
}

/// Rows per batch so that a response holds about 5 MiB of document bodies,
/// with 500 bytes of envelope per row
fn batch_for(info: &DBInfo) -> i64 {
    if info.doc_count <= 0 || info.sizes.external <= 0 {
        return BATCH_SIZE;
    }
    let avg_doc_size = info.sizes.external as f64 / info.doc_count as f64;
    let limit = (5.0 * 1024.0 * 1024.0 / (avg_doc_size + 500.0)).floor() as i64;
    cmp::max(1, limit)
}

/// Randomized exponential backoff, `[1, 2^retry * 100]` ms capped at the long
/// poll timeout
fn backoff_delay(retry: u32) -> Duration {
    let cap = cmp::min(
        2u64.saturating_pow(retry).saturating_mul(100),
        LONGPOLL_TIMEOUT,
    );
    Duration::from_millis(rand::thread_rng().gen_range(0..cap) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::types::{Cluster, Props, Sizes};
    use crate::testing::{empty_batch, some_batch, unauthorized, unavailable, FakeCouch};

    fn info(doc_count: i64, external: i64) -> DBInfo {
        DBInfo {
            db_name: "my_db".to_string(),
            purge_seq: "0".to_string(),
            update_seq: "100-abc".to_string(),
            sizes: Sizes {
                file: 0,
                external,
                active: 0,
            },
            props: Props { partitioned: None },
            doc_del_count: 0,
            doc_count,
            disk_format_version: 8,
            compact_running: false,
            cluster: Cluster {
                q: 2,
                n: 1,
                w: 1,
                r: 1,
            },
            instance_start_time: "0".to_string(),
        }
    }

    fn iterator(
        fake: &Arc<FakeCouch>,
        params: PostChangesParams,
        mode: Mode,
        suppression: Suppression,
    ) -> (ChangesIterator, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let it = ChangesIterator::new(Arc::new(Arc::clone(fake)), params, mode, suppression, rx);
        (it, tx)
    }

    #[test]
    fn one_huge_doc_still_gets_a_batch_of_one() {
        assert_eq!(batch_for(&info(1, 5 * 1024 * 1024 - 1)), 1);
    }

    #[test]
    fn average_doc_size_drives_the_batch_size() {
        assert_eq!(batch_for(&info(500_000, 523 * 500_000)), 5125);
    }

    #[test]
    fn empty_databases_use_the_default_batch_size() {
        assert_eq!(batch_for(&info(0, 0)), BATCH_SIZE);
        assert_eq!(batch_for(&info(10, 0)), BATCH_SIZE);
    }

    #[test]
    fn backoff_grows_and_caps_at_the_long_poll_timeout() {
        for _ in 0..20 {
            let first = backoff_delay(0).as_millis() as u64;
            assert!((1..=100).contains(&first));
            let tenth = backoff_delay(10).as_millis() as u64;
            assert!((1..=LONGPOLL_TIMEOUT).contains(&tenth));
            let huge = backoff_delay(63).as_millis() as u64;
            assert!((1..=LONGPOLL_TIMEOUT).contains(&huge));
        }
    }

    #[tokio::test]
    async fn finite_feeds_end_at_pending_zero() {
        let fake = FakeCouch::shared();
        fake.push_changes(Ok(some_batch("1-a", 3, 3)));
        fake.push_changes(Ok(some_batch("2-a", 3, 0)));
        let (mut it, _stop) = iterator(
            &fake,
            PostChangesParams::new("my_db"),
            Mode::Finite,
            Suppression::Always,
        );
        assert_eq!(it.next().await.unwrap().unwrap().results.len(), 3);
        assert_eq!(it.next().await.unwrap().unwrap().results.len(), 3);
        assert!(it.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn a_user_limit_caps_each_request_and_stops_the_feed() {
        let fake = FakeCouch::shared();
        fake.push_changes(Ok(some_batch("1-a", 3, 100)));
        fake.push_changes(Ok(some_batch("2-a", 2, 100)));
        let params = PostChangesParams::new("my_db").limit(5);
        let (mut it, _stop) = iterator(&fake, params, Mode::Listen, Suppression::Always);
        assert!(it.next().await.unwrap().is_some());
        assert!(it.next().await.unwrap().is_some());
        // limit exhausted, the feed is done even though the mode is LISTEN
        assert!(it.next().await.unwrap().is_none());

        let seen = fake.changes_seen.lock().unwrap();
        assert_eq!(seen[0].query.limit, 5);
        // three rows were delivered, only two are still owed
        assert_eq!(seen[1].query.limit, 2);
    }

    #[tokio::test]
    async fn include_docs_sizes_batches_once() {
        let fake = FakeCouch::shared();
        fake.push_info(Ok(info(500_000, 523 * 500_000)));
        fake.push_changes(Ok(some_batch("1-a", 1, 1)));
        fake.push_changes(Ok(some_batch("2-a", 1, 0)));
        let params = PostChangesParams::new("my_db").include_docs(true);
        let (mut it, _stop) = iterator(&fake, params, Mode::Finite, Suppression::Always);
        assert!(it.next().await.unwrap().is_some());
        assert!(it.next().await.unwrap().is_some());

        let seen = fake.changes_seen.lock().unwrap();
        assert_eq!(seen[0].query.limit, 5125);
        assert_eq!(seen[1].query.limit, 5125);
        // the information call happened exactly once
        assert_eq!(*fake.info_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn transient_errors_yield_empty_batches_and_reset_on_success() {
        let fake = FakeCouch::shared();
        fake.push_changes(Err(unavailable()));
        fake.push_changes(Ok(some_batch("1-a", 2, 0)));
        let (mut it, _stop) = iterator(
            &fake,
            PostChangesParams::new("my_db"),
            Mode::Finite,
            Suppression::Always,
        );

        let suppressed = it.next().await.unwrap().unwrap();
        assert!(suppressed.results.is_empty());
        assert_eq!(suppressed.pending, 0);
        assert_eq!(it.retry, 1);

        let delivered = it.next().await.unwrap().unwrap();
        assert_eq!(delivered.results.len(), 2);
        assert_eq!(it.retry, 0);
    }

    #[tokio::test]
    async fn suppressed_batches_resume_from_the_last_sequence() {
        let fake = FakeCouch::shared();
        fake.push_changes(Ok(some_batch("7-a", 1, 5)));
        fake.push_changes(Err(unavailable()));
        let (mut it, _stop) = iterator(
            &fake,
            PostChangesParams::new("my_db"),
            Mode::Listen,
            Suppression::Always,
        );
        assert!(it.next().await.unwrap().is_some());
        let suppressed = it.next().await.unwrap().unwrap();
        assert_eq!(suppressed.last_seq, "7-a");
        assert_eq!(suppressed.pending, 5);
    }

    #[tokio::test]
    async fn never_tolerance_propagates_the_first_transient_error() {
        let fake = FakeCouch::shared();
        fake.push_changes(Err(unavailable()));
        let (mut it, _stop) = iterator(
            &fake,
            PostChangesParams::new("my_db"),
            Mode::Finite,
            Suppression::Never,
        );
        assert!(it.next().await.is_err());
    }

    #[tokio::test]
    async fn timer_tolerance_propagates_once_the_window_is_over() {
        let fake = FakeCouch::shared();
        for _ in 0..100 {
            fake.push_changes(Err(unavailable()));
        }
        let (mut it, _stop) = iterator(
            &fake,
            PostChangesParams::new("my_db"),
            Mode::Listen,
            Suppression::Timer(Duration::from_millis(20)),
        );
        // suppression may absorb a few errors while inside the window, once
        // the window is over the error must surface
        loop {
            match it.next().await {
                Ok(Some(batch)) => assert!(batch.results.is_empty()),
                Ok(None) => panic!("the feed ended instead of failing"),
                Err(_) => break,
            }
        }
    }

    #[tokio::test]
    async fn terminal_statuses_are_never_suppressed() {
        let fake = FakeCouch::shared();
        fake.push_changes(Err(unauthorized()));
        let (mut it, _stop) = iterator(
            &fake,
            PostChangesParams::new("my_db"),
            Mode::Listen,
            Suppression::Always,
        );
        let err = it.next().await.unwrap_err();
        assert!(err.to_string().contains("unauthorized"));
    }

    #[tokio::test]
    async fn stopping_ends_the_sequence_without_an_error() {
        let fake = FakeCouch::shared();
        fake.set_changes_fallback(|| Ok(empty_batch("9-a", 5)));
        let (mut it, stop) = iterator(
            &fake,
            PostChangesParams::new("my_db"),
            Mode::Listen,
            Suppression::Always,
        );
        assert!(it.next().await.unwrap().is_some());
        stop.send(true).unwrap();
        assert!(it.next().await.unwrap().is_none());
        // stop is sticky
        assert!(it.next().await.unwrap().is_none());
    }
}
