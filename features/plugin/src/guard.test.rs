use super::*;

#[test]
fn test_second_acquire_is_rejected() {
    let in_flight: InFlight<String> = InFlight::new();
    let guard = in_flight.try_acquire("mp".to_string()).unwrap();
    assert_eq!(guard.key(), "mp");
    assert!(in_flight.is_in_flight(&"mp".to_string()));
    assert!(in_flight.try_acquire("mp".to_string()).is_none());
    // Other keys are independent.
    assert!(in_flight.try_acquire("other".to_string()).is_some());
}

#[test]
fn test_drop_releases_key() {
    let in_flight: InFlight<(String, u8)> = InFlight::new();
    {
        let _guard = in_flight.try_acquire(("a".to_string(), 1)).unwrap();
    }
    assert!(!in_flight.is_in_flight(&("a".to_string(), 1)));
    assert!(in_flight.try_acquire(("a".to_string(), 1)).is_some());
}

#[tokio::test]
async fn test_cancelled_future_releases_key() {
    let in_flight: std::sync::Arc<InFlight<&'static str>> = std::sync::Arc::new(InFlight::new());
    let worker = {
        let in_flight = std::sync::Arc::clone(&in_flight);
        tokio::spawn(async move {
            let _guard = in_flight.try_acquire("bulk").unwrap();
            std::future::pending::<()>().await;
        })
    };
    while !in_flight.is_in_flight(&"bulk") {
        tokio::task::yield_now().await;
    }
    worker.abort();
    let _ = worker.await;
    assert!(!in_flight.is_in_flight(&"bulk"));
}
