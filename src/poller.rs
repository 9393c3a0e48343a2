// hccli - CLI for the Honeycomb API
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Waiting for a submitted query result to complete.
//!
//! Each iteration checks, in order: cancellation, the deadline, then the
//! state of the last snapshot. The deadline is checked at the top of the
//! loop before sleeping, so a poll that started before the deadline is
//! allowed to finish. Worst case the wait ends one interval plus one
//! request after the deadline.

use crate::api::query_results::QueryResult;
use crate::error::{ApiError, ApiResult};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Where snapshots of a query result come from.
pub(crate) trait ResultSource {
    async fn fetch(&self, result_id: &str) -> ApiResult<QueryResult>;
}

#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    interval: Duration,
    pub timeout: Duration,
}

impl PollOptions {
    /// Intervals below one second are raised to one second.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            timeout,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT)
    }
}

/// Polls `source` until `submitted` completes.
///
/// A result that is already complete is returned without any request.
pub(crate) async fn wait_for_result<S: ResultSource>(
    source: &S,
    submitted: QueryResult,
    options: PollOptions,
    cancel: &CancellationToken,
) -> ApiResult<QueryResult> {
    if submitted.complete {
        return Ok(submitted);
    }

    let result_id = submitted.id;
    // An unrepresentable deadline means no deadline.
    let deadline = Instant::now().checked_add(options.timeout);
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled { result_id });
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(ApiError::TimedOut {
                result_id,
                waited_secs: options.timeout.as_secs(),
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled { result_id }),
            _ = sleep(options.interval()) => {}
        }

        attempt += 1;
        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ApiError::Cancelled { result_id: result_id.clone() });
            }
            fetched = source.fetch(&result_id) => fetched?,
        };
        debug!(%result_id, attempt, complete = snapshot.complete, "polled query result");

        if snapshot.complete {
            return Ok(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports complete on the `complete_on`-th fetch (1-based), never if 0.
    struct Scripted {
        complete_on: usize,
        fetches: AtomicUsize,
    }

    impl Scripted {
        fn new(complete_on: usize) -> Self {
            Self {
                complete_on,
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl ResultSource for Scripted {
        async fn fetch(&self, result_id: &str) -> ApiResult<QueryResult> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(QueryResult {
                id: result_id.to_string(),
                complete: self.complete_on != 0 && n >= self.complete_on,
                ..QueryResult::default()
            })
        }
    }

    fn assert_near(elapsed: Duration, expected: Duration) {
        let slack = Duration::from_millis(50);
        assert!(
            elapsed >= expected && elapsed <= expected + slack,
            "elapsed {elapsed:?}, expected about {expected:?}"
        );
    }

    fn pending(id: &str) -> QueryResult {
        QueryResult {
            id: id.to_string(),
            ..QueryResult::default()
        }
    }

    #[test]
    fn interval_is_clamped_to_one_second() {
        for requested in [Duration::ZERO, Duration::from_millis(1), Duration::from_millis(999)] {
            let options = PollOptions::new(requested, Duration::from_secs(10));
            assert_eq!(options.interval(), Duration::from_secs(1));
        }
        let options = PollOptions::new(Duration::from_secs(3), Duration::from_secs(10));
        assert_eq!(options.interval(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn sub_second_interval_polls_once_per_second() {
        let source = Scripted::new(3);
        let started = Instant::now();
        let options = PollOptions::new(Duration::from_millis(10), Duration::from_secs(30));

        wait_for_result(&source, pending("r"), options, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(source.fetches(), 3);
        assert_near(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn huge_timeout_does_not_overflow() {
        let source = Scripted::new(2);
        let options = PollOptions::new(Duration::from_secs(1), Duration::from_secs(u64::MAX));

        let result = wait_for_result(&source, pending("r-long"), options, &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.complete);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn already_complete_makes_no_requests() {
        let source = Scripted::new(1);
        let done = QueryResult {
            id: "r".into(),
            complete: true,
            ..QueryResult::default()
        };

        let result = wait_for_result(&source, done, PollOptions::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.complete);
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn completes_on_second_poll_after_four_seconds() {
        let source = Scripted::new(2);
        let started = Instant::now();
        let options = PollOptions::new(Duration::from_secs(2), Duration::from_secs(5));

        let result = wait_for_result(&source, pending("r-2"), options, &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.complete);
        assert_eq!(result.id, "r-2");
        assert_eq!(source.fetches(), 2);
        assert_near(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn never_completing_times_out_within_deadline_plus_interval() {
        let source = Scripted::new(0);
        let started = Instant::now();
        let options = PollOptions::new(Duration::from_secs(1), Duration::from_secs(3));

        let err = wait_for_result(&source, pending("r-slow"), options, &CancellationToken::new())
            .await
            .unwrap_err();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3), "{elapsed:?}");
        assert!(elapsed <= Duration::from_secs(4) + Duration::from_millis(50), "{elapsed:?}");
        match err {
            ApiError::TimedOut {
                result_id,
                waited_secs,
            } => {
                assert_eq!(result_id, "r-slow");
                assert_eq!(waited_secs, 3);
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_not_aligned_to_interval_still_bounded() {
        let source = Scripted::new(0);
        let started = Instant::now();
        let options = PollOptions::new(Duration::from_secs(2), Duration::from_secs(5));

        let err = wait_for_result(&source, pending("r"), options, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::TimedOut { .. }));
        assert!(started.elapsed() <= Duration::from_secs(5 + 2));
        assert_eq!(source.fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_sleep() {
        let source = Scripted::new(0);
        let cancel = CancellationToken::new();
        let started = Instant::now();
        let options = PollOptions::new(Duration::from_secs(10), Duration::from_secs(60));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(1500)).await;
            trigger.cancel();
        });

        let err = wait_for_result(&source, pending("r-c"), options, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Cancelled { ref result_id } if result_id == "r-c"));
        assert_near(started.elapsed(), Duration::from_millis(1500));
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_wins_over_expired_deadline() {
        let source = Scripted::new(0);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let options = PollOptions::new(Duration::from_secs(1), Duration::ZERO);

        let err = wait_for_result(&source, pending("r"), options, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Cancelled { .. }));
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_is_propagated() {
        struct Failing;
        impl ResultSource for Failing {
            async fn fetch(&self, _result_id: &str) -> ApiResult<QueryResult> {
                Err(ApiError::Api {
                    status: 500,
                    body: "boom".into(),
                })
            }
        }

        let err = wait_for_result(
            &Failing,
            pending("r"),
            PollOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
