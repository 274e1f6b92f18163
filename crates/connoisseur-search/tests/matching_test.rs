//! End-to-end matching behaviour against a shared engine.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use connoisseur_core::{FeatureVector, LoadOptions, RawTrack, RowId};
use connoisseur_search::{SearchError, VibeEngine};

fn fv(values: [f64; 7]) -> FeatureVector {
    FeatureVector::new(values).unwrap()
}

/// A deterministic catalog of `n` popular tracks spread over feature space.
fn spread_tracks(n: usize) -> Vec<RawTrack> {
    (0..n)
        .map(|i| {
            let f = |mult: usize| ((i * mult) % 101) as f64 / 100.0;
            RawTrack::new(
                format!("Track {}", i),
                format!("Artist {}", i % 7),
                60 + (i % 40) as u32,
                fv([f(3), f(7), f(11), f(13), f(17), f(19), 60.0 + f(23) * 120.0]),
            )
        })
        .collect()
}

fn engine(n: usize) -> VibeEngine {
    VibeEngine::load(&spread_tracks(n), &LoadOptions::default()).unwrap()
}

#[test]
fn test_two_row_scenario() {
    let tracks = vec![
        RawTrack::new("Row 0", "A", 51, fv([1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 120.0])),
        RawTrack::new("Row 1", "B", 51, fv([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 60.0])),
    ];
    let engine = VibeEngine::load(&tracks, &LoadOptions::default()).unwrap();
    let params = engine.catalog().params();
    assert_eq!(params.mean, [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 90.0]);

    let query = fv([1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 120.0]);
    let first = engine.find_nearest(&query, 1).unwrap();
    assert_eq!(first[0].row_id(), RowId::new(0));
    assert_eq!(first[0].distance, 0.0);

    let second = engine.find_nearest(&query, 1).unwrap();
    assert_eq!(second[0].row_id(), RowId::new(1));
}

#[test]
fn test_returned_rows_never_repeat() {
    let engine = engine(40);
    let queries = [
        fv([0.8, 0.7, 0.1, 0.2, 0.0, 0.9, 128.0]),
        fv([0.2, 0.1, 0.05, 0.9, 0.8, 0.2, 70.0]),
        fv([0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 100.0]),
    ];

    let mut seen = HashSet::new();
    let mut calls = 0;
    loop {
        let query = &queries[calls % queries.len()];
        match engine.find_nearest(query, 3) {
            Ok(matches) => {
                for m in matches {
                    assert!(seen.insert(m.row_id()), "row {} returned twice", m.row_id());
                }
            }
            Err(SearchError::NoCandidates { .. }) => break,
            Err(other) => panic!("unexpected error: {}", other),
        }
        calls += 1;
    }

    assert_eq!(seen.len(), 40);
    assert_eq!(calls, 14);
}

#[test]
fn test_large_k_on_small_pool_returns_remainder() {
    let engine = engine(5);
    engine.find_nearest(&fv([0.5; 7]), 2).unwrap();

    let rest = engine.find_nearest(&fv([0.5; 7]), 10).unwrap();
    assert_eq!(rest.len(), 3);
    for pair in rest.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }

    let err = engine.find_nearest(&fv([0.5; 7]), 1).unwrap_err();
    assert!(err.is_exhausted());
}

#[test]
fn test_concurrent_calls_on_last_candidate() {
    let engine = Arc::new(engine(3));
    let query = fv([0.5; 7]);
    engine.find_nearest(&query, 2).unwrap();
    assert_eq!(engine.remaining(), 1);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine
                    .find_nearest(&query, 1)
                    .map(|matches| matches[0].row_id())
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    let successes = outcomes.iter().filter(|o| o.is_ok()).count();
    let exhausted = outcomes
        .iter()
        .filter(|o| matches!(o, Err(e) if e.is_exhausted()))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(exhausted, 1);
    assert_eq!(engine.remaining(), 0);
}

#[test]
fn test_many_threads_partition_the_catalog() {
    let engine = Arc::new(engine(64));
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|w| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let x = w as f64 / workers as f64;
                let query = fv([x, 1.0 - x, 0.1, x, 0.2, 0.5, 80.0 + 10.0 * w as f64]);
                barrier.wait();
                let mut mine = Vec::new();
                while let Ok(matches) = engine.find_nearest(&query, 2) {
                    mine.extend(matches.iter().map(|m| m.row_id()));
                }
                mine
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.join().expect("worker panicked"));
    }

    let unique: HashSet<_> = all.iter().copied().collect();
    assert_eq!(all.len(), 64);
    assert_eq!(unique.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_via_spawn_blocking() {
    let engine = Arc::new(engine(20));

    let mut tasks = Vec::new();
    for i in 0..30 {
        let engine = Arc::clone(&engine);
        tasks.push(tokio::task::spawn_blocking(move || {
            let v = (i % 10) as f64 / 10.0;
            let query = fv([v, v, 0.1, 1.0 - v, 0.0, v, 90.0 + i as f64]);
            engine
                .find_nearest(&query, 1)
                .map(|matches| matches[0].row_id())
        }));
    }

    let mut returned = HashSet::new();
    let mut exhausted = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(row_id) => assert!(returned.insert(row_id)),
            Err(err) if err.is_exhausted() => exhausted += 1,
            Err(err) => panic!("unexpected error: {}", err),
        }
    }

    assert_eq!(returned.len(), 20);
    assert_eq!(exhausted, 10);
}
