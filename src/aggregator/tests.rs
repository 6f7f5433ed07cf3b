//! Tests for ordered fan-out aggregation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, oneshot};

use super::*;
use crate::error::FetchError;
use crate::types::ArticleId;

fn requests(names: &[&str]) -> Vec<ResourceRequest> {
    ResourceRequest::from_ids(names.iter().map(|n| ArticleId::parse(n).unwrap()))
}

fn failure(id: &str) -> FetchError {
    FetchError::Status {
        status: 404,
        path: format!("/articles/{id}/{id}.json"),
    }
}

fn titles(outcomes: &[FetchOutcome<String>]) -> Vec<String> {
    outcomes
        .iter()
        .map(|o| match o {
            FetchOutcome::Success(title) => title.clone(),
            FetchOutcome::Failure(_) => "<failed>".to_string(),
        })
        .collect()
}

/// Every permutation of `0..n`, in lexicographic order
fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, n: usize, out: &mut Vec<Vec<usize>>) {
        if prefix.len() == n {
            out.push(prefix.clone());
            return;
        }
        for i in 0..n {
            if !prefix.contains(&i) {
                prefix.push(i);
                extend(prefix, n, out);
                prefix.pop();
            }
        }
    }
    let mut out = Vec::new();
    extend(&mut Vec::new(), n, &mut out);
    out
}

// -----------------------------------------------------------------------
// AggregationState
// -----------------------------------------------------------------------

#[test]
fn state_completes_only_when_every_slot_settles() {
    let mut state = AggregationState::<&str>::new(3);

    assert_eq!(
        state.settle(2, FetchOutcome::Success("c")),
        Settlement::Pending { remaining: 2 }
    );
    assert!(state.finish().is_none(), "must not finish early");
    assert_eq!(
        state.settle(0, FetchOutcome::Success("a")),
        Settlement::Pending { remaining: 1 }
    );
    assert!(state.finish().is_none(), "must not finish early");
    assert_eq!(
        state.settle(1, FetchOutcome::Success("b")),
        Settlement::Complete
    );

    let outcomes = state.finish().unwrap().unwrap();
    assert_eq!(
        outcomes,
        vec![
            FetchOutcome::Success("a"),
            FetchOutcome::Success("b"),
            FetchOutcome::Success("c"),
        ]
    );
}

#[test]
fn settled_count_tracks_filled_slots() {
    let mut state = AggregationState::<u8>::new(4);
    for (step, position) in [3, 1, 0, 2].into_iter().enumerate() {
        assert_eq!(state.settled_count(), state.filled_slots());
        state.settle(position, FetchOutcome::Success(position as u8));
        assert_eq!(state.settled_count(), step + 1);
        assert_eq!(state.settled_count(), state.filled_slots());
    }
    assert!(state.is_settled());
}

#[test]
fn second_settlement_of_a_slot_is_ignored() {
    let mut state = AggregationState::<&str>::new(2);
    state.settle(0, FetchOutcome::Success("first"));

    assert_eq!(
        state.settle(0, FetchOutcome::Success("second")),
        Settlement::Ignored(IgnoredSettlement::AlreadySettled)
    );
    assert_eq!(state.settled_count(), 1);

    state.settle(1, FetchOutcome::Success("other"));
    let outcomes = state.finish().unwrap().unwrap();
    assert_eq!(outcomes[0], FetchOutcome::Success("first"));
}

#[test]
fn unknown_position_is_ignored() {
    let mut state = AggregationState::<()>::new(1);
    assert_eq!(
        state.settle(5, FetchOutcome::Success(())),
        Settlement::Ignored(IgnoredSettlement::UnknownPosition)
    );
    assert_eq!(state.settled_count(), 0);
}

#[test]
fn finish_yields_terminal_result_once() {
    let mut state = AggregationState::<()>::new(1);
    state.settle(0, FetchOutcome::Success(()));

    assert!(state.finish().is_some());
    assert!(state.finish().is_none());
    assert!(state.is_finished());
    assert_eq!(
        state.settle(0, FetchOutcome::Success(())),
        Settlement::Ignored(IgnoredSettlement::AlreadyFinished)
    );
}

#[test]
fn empty_state_finishes_with_empty_list() {
    let mut state = AggregationState::<()>::new(0);
    assert!(state.is_empty());
    assert!(state.is_settled());
    assert_eq!(state.finish().unwrap().unwrap(), vec![]);
}

#[test]
fn all_failures_finish_as_error() {
    let mut state = AggregationState::<()>::new(2);
    state.settle(1, FetchOutcome::Failure(failure("b")));
    state.settle(0, FetchOutcome::Failure(failure("a")));

    match state.finish().unwrap() {
        Err(Error::AllFetchesFailed { count, first_error }) => {
            assert_eq!(count, 2);
            assert!(first_error.contains("/articles/a/a.json"), "{first_error}");
        }
        other => panic!("expected AllFetchesFailed, got {other:?}"),
    }
}

#[test]
fn every_completion_order_yields_identical_output() {
    let outcomes: Vec<FetchOutcome<String>> = vec![
        FetchOutcome::Success("zero".to_string()),
        FetchOutcome::Failure(failure("one")),
        FetchOutcome::Success("two".to_string()),
        FetchOutcome::Success("three".to_string()),
    ];

    let mut first: Option<String> = None;
    for order in permutations(outcomes.len()) {
        let mut state = AggregationState::new(outcomes.len());
        for &position in &order {
            state.settle(position, outcomes[position].clone());
        }
        let result = state.finish().unwrap().unwrap();
        assert_eq!(result, outcomes, "order {order:?}");

        let rendered = format!("{result:?}");
        match &first {
            None => first = Some(rendered),
            Some(expected) => assert_eq!(&rendered, expected, "order {order:?}"),
        }
    }
}

#[test]
fn permutation_helper_covers_all_orders() {
    assert_eq!(permutations(3).len(), 6);
    assert_eq!(permutations(4).len(), 24);
}

// -----------------------------------------------------------------------
// FanOutAggregator
// -----------------------------------------------------------------------

#[tokio::test]
async fn reverse_arrival_still_yields_request_order() {
    let reqs = requests(&["a", "b", "c", "d", "e"]);
    let total = reqs.len() as u64;
    let (tx, mut rx) = broadcast::channel(64);
    let aggregator = FanOutAggregator::with_events(tx);

    let outcomes = aggregator
        .aggregate(reqs, |request| async move {
            // Later positions finish first
            let delay = (total - request.position as u64) * 20;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            FetchOutcome::Success(request.id.to_string())
        })
        .await
        .unwrap();

    assert_eq!(titles(&outcomes), vec!["a", "b", "c", "d", "e"]);

    let mut settle_order = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::FetchSettled { position, .. } = event {
            settle_order.push(position);
        }
    }
    assert_eq!(settle_order, vec![4, 3, 2, 1, 0], "arrival was reversed");
}

#[tokio::test]
async fn scripted_arrival_order_does_not_leak_into_output() {
    let reqs = requests(&["w", "x", "y", "z"]);
    let mut senders = Vec::new();
    let mut receivers = HashMap::new();
    for request in &reqs {
        let (tx, rx) = oneshot::channel::<FetchOutcome<String>>();
        senders.push(tx);
        receivers.insert(request.position, rx);
    }
    let receivers = Arc::new(Mutex::new(receivers));

    let task = tokio::spawn({
        let receivers = Arc::clone(&receivers);
        async move {
            FanOutAggregator::new()
                .aggregate(reqs, move |request| {
                    let receivers = Arc::clone(&receivers);
                    async move {
                        let rx = receivers.lock().await.remove(&request.position).unwrap();
                        rx.await
                            .unwrap_or_else(|_| FetchOutcome::Failure(failure("dropped")))
                    }
                })
                .await
        }
    });

    // Resolve 2, 0, 3, 1
    let mut senders: Vec<Option<_>> = senders.into_iter().map(Some).collect();
    for position in [2usize, 0, 3, 1] {
        let title = ["w", "x", "y", "z"][position].to_uppercase();
        senders[position]
            .take()
            .unwrap()
            .send(FetchOutcome::Success(title))
            .unwrap();
        tokio::task::yield_now().await;
    }

    let outcomes = task.await.unwrap().unwrap();
    assert_eq!(titles(&outcomes), vec!["W", "X", "Y", "Z"]);
}

#[tokio::test]
async fn partial_failure_keeps_failed_slots_in_place() {
    let outcomes = FanOutAggregator::new()
        .aggregate(requests(&["a", "b", "c", "d"]), |request| async move {
            if request.position % 2 == 1 {
                FetchOutcome::Failure(failure(request.id.as_str()))
            } else {
                FetchOutcome::Success(request.id.to_string())
            }
        })
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 4);
    assert_eq!(titles(&outcomes), vec!["a", "<failed>", "c", "<failed>"]);
    assert_eq!(
        outcomes[1].failure().unwrap().path(),
        "/articles/b/b.json"
    );
}

#[tokio::test]
async fn total_failure_invokes_error_callback_once() {
    let completed = AtomicUsize::new(0);
    let errored = AtomicUsize::new(0);

    FanOutAggregator::new()
        .run(
            requests(&["a", "b", "c"]),
            |request| async move { FetchOutcome::<String>::Failure(failure(request.id.as_str())) },
            |_| {
                completed.fetch_add(1, Ordering::SeqCst);
            },
            |e| {
                assert!(matches!(e, Error::AllFetchesFailed { count: 3, .. }));
                errored.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;

    assert_eq!(completed.load(Ordering::SeqCst), 0);
    assert_eq!(errored.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn success_invokes_complete_callback_once() {
    let completed = AtomicUsize::new(0);
    let errored = AtomicUsize::new(0);

    FanOutAggregator::new()
        .run(
            requests(&["a", "b"]),
            |request| async move { FetchOutcome::Success(request.position) },
            |outcomes| {
                assert_eq!(
                    outcomes,
                    vec![FetchOutcome::Success(0), FetchOutcome::Success(1)]
                );
                completed.fetch_add(1, Ordering::SeqCst);
            },
            |_| {
                errored.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;

    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(errored.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_request_list_completes_without_fetching() {
    let calls = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);

    FanOutAggregator::new()
        .run(
            Vec::new(),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { FetchOutcome::<()>::Success(()) }
            },
            |outcomes| {
                assert!(outcomes.is_empty());
                completed.fetch_add(1, Ordering::SeqCst);
            },
            |e| panic!("empty aggregate must not fail: {e}"),
        )
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[test]
fn ready_fetches_settle_without_a_timer() {
    // Immediately-ready futures need nothing beyond a plain executor
    let outcomes = tokio_test::block_on(FanOutAggregator::new().aggregate(
        requests(&["a", "b", "c"]),
        |request| async move { FetchOutcome::<String>::Success(request.id.to_string()) },
    ))
    .unwrap();

    assert_eq!(titles(&outcomes), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn non_dense_positions_are_rejected_before_dispatch() {
    let calls = AtomicUsize::new(0);
    let mut reqs = requests(&["a", "b"]);
    reqs[1].position = 0;

    let result = FanOutAggregator::new()
        .aggregate(reqs, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { FetchOutcome::<()>::Success(()) }
        })
        .await;

    assert!(matches!(result, Err(Error::Other(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn every_fetch_is_dispatched_before_any_settles() {
    let started = Arc::new(AtomicUsize::new(0));
    let seen_at_settle = Arc::new(Mutex::new(Vec::new()));

    FanOutAggregator::new()
        .aggregate(requests(&["a", "b", "c"]), |_| {
            let started = Arc::clone(&started);
            let seen_at_settle = Arc::clone(&seen_at_settle);
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                seen_at_settle
                    .lock()
                    .await
                    .push(started.load(Ordering::SeqCst));
                FetchOutcome::Success(())
            }
        })
        .await
        .unwrap();

    // All three had started before the first one finished sleeping
    assert_eq!(*seen_at_settle.lock().await, vec![3, 3, 3]);
}

#[tokio::test]
async fn concurrent_aggregates_do_not_share_slots() {
    let aggregator = FanOutAggregator::new();

    let fetch = |request: ResourceRequest| async move {
        tokio::time::sleep(Duration::from_millis(5 * (3 - request.position as u64))).await;
        FetchOutcome::Success(request.id.to_string())
    };

    let (left, right) = tokio::join!(
        aggregator.aggregate(requests(&["a", "b", "c"]), fetch),
        aggregator.aggregate(requests(&["x", "y"]), fetch),
    );

    assert_eq!(titles(&left.unwrap()), vec!["a", "b", "c"]);
    assert_eq!(titles(&right.unwrap()), vec!["x", "y"]);
}

#[tokio::test]
async fn events_end_with_terminal_event() {
    let (tx, mut rx) = broadcast::channel(16);
    FanOutAggregator::with_events(tx)
        .aggregate(requests(&["a", "b"]), |request| async move {
            if request.position == 0 {
                FetchOutcome::Failure(failure("a"))
            } else {
                FetchOutcome::Success(())
            }
        })
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    let started = events
        .iter()
        .filter(|e| matches!(e, Event::FetchStarted { .. }))
        .count();
    assert_eq!(started, 2);
    assert_eq!(
        events.last(),
        Some(&Event::AggregateComplete {
            total: 2,
            failed: 1
        })
    );
}
