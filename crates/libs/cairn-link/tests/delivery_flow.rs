//! Tracker and classifier working together on one lossy exchange.

use std::time::{Duration, Instant};

use cairn_link::{classify, classify_silent_loss, PendingTable, RetrySchedule, SentRequest};
use cairn_proto::{PortNum, RoutingError};

fn request(packet_id: u32, attempt: u32) -> SentRequest {
    SentRequest { packet_id, expect_port: PortNum::Admin, timeout: Duration::from_secs(5), attempt }
}

#[test]
fn transient_silence_consumes_the_whole_retry_budget() {
    let schedule = RetrySchedule::default();
    let mut table = PendingTable::new();
    let mut now = Instant::now();
    let mut attempt = 1;

    loop {
        table.send(request(7, attempt), now).expect("id is free again after expiry");
        now += Duration::from_secs(6);
        let expired = table.tick(now);
        assert_eq!(expired.len(), 1, "exactly the one ticket expires");

        let verdict = classify_silent_loss(false);
        assert!(verdict.is_retryable(), "plain silence is worth retrying");
        if !schedule.attempts_left(attempt) {
            break;
        }
        now += schedule.delay_before(attempt + 1).expect("budget left");
        attempt += 1;
    }

    assert_eq!(attempt, schedule.max_attempts);
    assert!(table.is_empty());
}

#[test]
fn exhausted_hop_budget_plus_deadline_reads_as_no_route() {
    let mut table = PendingTable::new();
    let now = Instant::now();
    table.send(request(9, 1), now).expect("fresh id");

    // The last sighting of the packet had hop_limit 0 and the deadline
    // has now elapsed: classified like a missing route, no retry.
    let expired = table.tick(now + Duration::from_secs(6));
    assert_eq!(expired.len(), 1);
    let verdict = classify_silent_loss(true);
    assert_eq!(verdict, classify(RoutingError::NoRoute).expect("no-route is a failure"));
    assert!(!verdict.is_retryable());
}

#[test]
fn authorization_rejection_stops_the_retry_loop_immediately() {
    let schedule = RetrySchedule::default();
    let verdict = classify(RoutingError::AdminBadSessionKey).expect("failure");
    assert!(!verdict.is_retryable());
    // Even with budget remaining, the disposition overrides it.
    assert!(schedule.attempts_left(1));
    assert_eq!(verdict.reason.to_string(), "not authorized — reconnect");
}
