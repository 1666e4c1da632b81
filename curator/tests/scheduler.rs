//! Scheduler driving a real orchestrator

use std::time::Duration;

use curator::{MockSleeper, Scheduler, SchedulerState, StateStore, StopReason};
use shared::PostId;

mod common;
use common::{OrchestratorBuilder, TestFixtures, TestHelpers};

fn counting_sleeper(expected_waits: usize) -> MockSleeper {
    let mut sleeper = MockSleeper::new();
    sleeper
        .expect_sleep()
        .withf(|d| *d == Duration::from_secs(60))
        .times(expected_waits)
        .returning(|_| ());
    sleeper
}

/// Bounded run acts once, idles afterwards and releases resources
#[tokio::test]
async fn test_bounded_run_publishes_once_then_cleans_up() {
    let (orchestrator, dir) = OrchestratorBuilder::new()
        .with_feed_entries(vec![TestFixtures::headline()])
        .with_latest_post(Some(TestFixtures::post("123")))
        .with_publisher(|publisher| {
            publisher
                .expect_post()
                .times(1)
                .returning(|_, _| Ok(PostId::from("555")));
            publisher.expect_mirror().times(1).returning(|_, _| Ok(()));
        })
        .with_sessions(|sessions| {
            sessions
                .expect_open_session()
                .times(1)
                .returning(|| Ok(TestFixtures::session()));
            sessions.expect_close_session().times(1).returning(|_| Ok(()));
        })
        .build()
        .await;

    let mut scheduler =
        Scheduler::new(orchestrator, counting_sleeper(2), Duration::from_secs(60)).with_max_cycles(Some(3));
    let report = scheduler.run().await;

    assert_eq!(report.cycles, 3);
    assert_eq!(report.reason, StopReason::CycleLimit);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(TestHelpers::record_count(&dir, "news.jsonl"), 1);
    assert_eq!(TestHelpers::record_count(&dir, "mirrors.jsonl"), 1);

    let runner = scheduler.runner();
    let orchestrator = runner.lock().await;
    assert_eq!(orchestrator.cycles_run(), 3);
    assert!(!orchestrator.has_session());
    assert!(orchestrator.store().latest_news().await.is_err());
}

/// Stop requested before the first cycle still closes the store
#[tokio::test]
async fn test_stop_before_first_cycle() {
    let (orchestrator, _dir) = OrchestratorBuilder::new()
        .with_feed(|feed| {
            feed.expect_fetch_latest().times(0);
        })
        .build()
        .await;

    let mut scheduler = Scheduler::new(orchestrator, counting_sleeper(0), Duration::from_secs(60));
    scheduler.get_shutdown_sender().send(()).await.unwrap();

    let report = scheduler.run().await;

    assert_eq!(report.cycles, 0);
    assert_eq!(report.reason, StopReason::Signal);
    let runner = scheduler.runner();
    let orchestrator = runner.lock().await;
    assert!(orchestrator.store().latest_mirror().await.is_err());
}
