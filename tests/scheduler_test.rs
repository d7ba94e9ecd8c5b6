mod utils;

use std::sync::Arc;
use std::time::Duration;

use utils::{aggregate, registration, seeded_backend};
use vax_checkin::config::DEFAULT_REFRESH_INTERVAL;
use vax_checkin::{CheckInCoordinator, RefreshScheduler};

#[tokio::test(start_paused = true)]
async fn test_refreshes_on_start_and_every_interval() {
    let backend = seeded_backend();
    let coordinator = Arc::new(CheckInCoordinator::new(backend.clone()));

    let scheduler = RefreshScheduler::start(Arc::clone(&coordinator), DEFAULT_REFRESH_INTERVAL);
    assert!(scheduler.is_running());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.calls().registrations, 1);
    assert_eq!(coordinator.cache().len(), 2);

    tokio::time::sleep(DEFAULT_REFRESH_INTERVAL).await;
    assert_eq!(backend.calls().registrations, 2);

    tokio::time::sleep(DEFAULT_REFRESH_INTERVAL * 2).await;
    assert_eq!(backend.calls().registrations, 4);
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_refreshing() {
    let backend = seeded_backend();
    let coordinator = Arc::new(CheckInCoordinator::new(backend.clone()));

    let mut scheduler = RefreshScheduler::start(Arc::clone(&coordinator), Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(1)).await;
    scheduler.stop();
    tokio::task::yield_now().await;
    assert!(!scheduler.is_running());

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(backend.calls().registrations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_ends_refreshing() {
    let backend = seeded_backend();
    let coordinator = Arc::new(CheckInCoordinator::new(backend.clone()));

    {
        let _scheduler = RefreshScheduler::start(Arc::clone(&coordinator), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(backend.calls().registrations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_refresh_updates_opened_dashboard() {
    let backend = seeded_backend();
    backend.set_dashboard(aggregate(2, 0));
    let coordinator = Arc::new(CheckInCoordinator::new(backend.clone()));
    coordinator.open_dashboard().await.unwrap();

    backend.set_dashboard(aggregate(2, 2));
    let _scheduler = RefreshScheduler::start(Arc::clone(&coordinator), Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(backend.calls().dashboard, 2);
    assert_eq!(coordinator.dashboard(), Some(aggregate(2, 2)));
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_cache_and_schedule() {
    let backend = seeded_backend();
    let coordinator = Arc::new(CheckInCoordinator::new(backend.clone()));

    let _scheduler = RefreshScheduler::start(Arc::clone(&coordinator), Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(coordinator.cache().len(), 2);

    backend.fail_registrations("Service invoked too many times");
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(backend.calls().registrations, 2);
    assert_eq!(coordinator.cache().len(), 2);

    backend.set_registrations(vec![registration("789", "C")]);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(coordinator.cache().len(), 1);
    assert!(coordinator.cache().find("789").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_refreshes_are_serialized() {
    let backend = seeded_backend();
    backend.delay_registrations(Duration::from_millis(250));
    let coordinator = CheckInCoordinator::new(backend.clone());

    let (first, second) = tokio::join!(coordinator.refresh_all(), coordinator.refresh_all());
    assert_eq!(first.unwrap(), 2);
    assert_eq!(second.unwrap(), 2);

    let calls = backend.calls();
    assert_eq!(calls.registrations, 2);
    assert_eq!(calls.max_concurrent_registrations, 1);
}
