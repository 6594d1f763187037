use super::*;
use crate::config::Config;

#[derive(Default)]
struct Ticks {
    fast: u32,
    slow: u32,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn repeat_runs_until_stopped() {
    let actor = Actor::start(Ticks::default(), Config::new()).unwrap();
    let repeat = actor
        .repeat(Duration::from_millis(10), |t: &mut Ticks| t.fast += 1)
        .unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;
    repeat.stop();
    assert!(repeat.is_stopped());

    let before = actor.query(|t| t.fast).await.unwrap();
    assert!(before >= 5, "only {before} ticks");

    tokio::time::sleep(Duration::from_millis(60)).await;
    let after = actor.query(|t| t.fast).await.unwrap();
    assert_eq!(before, after);

    actor.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn multiple_repeats_tick_independently() {
    let actor = Actor::start(Ticks::default(), Config::new()).unwrap();
    let _fast = actor
        .repeat(Duration::from_millis(10), |t: &mut Ticks| t.fast += 1)
        .unwrap();
    let _slow = actor
        .repeat(Duration::from_millis(40), |t: &mut Ticks| t.slow += 1)
        .unwrap();

    tokio::time::sleep(Duration::from_millis(170)).await;

    let (fast, slow) = actor.query(|t| (t.fast, t.slow)).await.unwrap();
    assert!(fast > slow, "fast {fast} slow {slow}");
    assert!(slow >= 2, "slow only ticked {slow} times");

    actor.shutdown().await;
}

#[tokio::test]
async fn dropping_the_handle_stops_ticking() {
    let actor = Actor::start(Ticks::default(), Config::new()).unwrap();
    let repeat = actor
        .repeat(Duration::from_millis(5), |t: &mut Ticks| t.fast += 1)
        .unwrap();
    drop(repeat);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(actor.query(|t| t.fast).await.unwrap(), 0);

    actor.shutdown().await;
}

#[tokio::test]
async fn cancelling_the_parent_token_stops_ticking() {
    let actor = Actor::start(Ticks::default(), Config::new()).unwrap();
    let token = CancellationToken::new();
    let repeat = actor
        .repeat_cancellable(&token, Duration::from_millis(5), |t: &mut Ticks| {
            t.fast += 1
        })
        .unwrap();

    token.cancel();
    assert!(repeat.is_stopped());

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(actor.query(|t| t.fast).await.unwrap(), 0);

    actor.shutdown().await;
}

#[tokio::test]
async fn repeat_on_stopped_actor_fails() {
    let actor = Actor::start(Ticks::default(), Config::new()).unwrap();
    actor.shutdown().await;

    let err = actor
        .repeat(Duration::from_millis(5), |t: &mut Ticks| t.fast += 1)
        .unwrap_err();
    assert!(err.is_shutdown());
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let actor = Actor::start(Ticks::default(), Config::new()).unwrap();
    let err = actor
        .repeat(Duration::ZERO, |t: &mut Ticks| t.fast += 1)
        .unwrap_err();
    assert!(matches!(err, ActorError::Config(_)));
    actor.shutdown().await;
}

#[tokio::test]
async fn stopping_the_actor_ends_the_ticker() {
    let actor = Actor::start(Ticks::default(), Config::new()).unwrap();
    let repeat = actor
        .repeat(Duration::from_millis(5), |t: &mut Ticks| t.fast += 1)
        .unwrap();

    assert!(actor.shutdown().await.is_none());
    assert!(actor.is_done());
    // the ticker notices on its own; the handle merely outlives it
    assert!(!repeat.is_stopped());
}

#[test]
fn repeat_outside_a_runtime_is_a_config_error() {
    let actor = Actor::start(Ticks::default(), Config::new()).unwrap();
    let err = actor
        .repeat(Duration::from_millis(5), |t: &mut Ticks| t.fast += 1)
        .unwrap_err();
    assert!(matches!(err, ActorError::Config(ref m) if m.contains("tokio runtime")));
    actor.stop();
}

#[tokio::test]
async fn repeat_timeout_ends_when_a_tick_cannot_be_queued() {
    let actor = Actor::start(Ticks::default(), Config::new().with_queue_capacity(1)).unwrap();

    // hold the loop and fill the queue
    let (release, gate) = std::sync::mpsc::channel::<()>();
    let (started_tx, started) = tokio::sync::oneshot::channel();
    actor
        .execute_async(move |_| {
            let _ = started_tx.send(());
            let _ = gate.recv();
        })
        .await
        .unwrap();
    started.await.unwrap();
    actor.execute_async(|t| t.slow += 1).await.unwrap();

    let _repeat = actor
        .repeat_timeout(
            Duration::from_millis(5),
            Duration::from_millis(10),
            |t: &mut Ticks| t.fast += 1,
        )
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    release.send(()).unwrap();

    // a live ticker would have fired several times by now
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (fast, slow) = actor.query(|t| (t.fast, t.slow)).await.unwrap();
    assert_eq!(slow, 1);
    assert_eq!(fast, 0);
    actor.shutdown().await;
}
