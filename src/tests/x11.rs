use std::time::{Duration, Instant};

use crate::x11::poll_timeout;

#[test]
fn poll_timeout_without_deadline() {
    assert_eq!(poll_timeout(None, Instant::now()), Some(-1));
}

#[test]
fn poll_timeout_deadline_reached() {
    let now = Instant::now();
    assert_eq!(poll_timeout(Some(now), now), None);
    assert_eq!(poll_timeout(Some(now), now + Duration::from_millis(5)), None);
}

#[test]
fn poll_timeout_whole_milliseconds() {
    let now = Instant::now();
    assert_eq!(
        poll_timeout(Some(now + Duration::from_millis(250)), now),
        Some(250)
    );
}

#[test]
fn poll_timeout_rounds_up() {
    let now = Instant::now();
    assert_eq!(
        poll_timeout(Some(now + Duration::from_micros(1)), now),
        Some(1)
    );
    assert_eq!(
        poll_timeout(Some(now + Duration::from_micros(2500)), now),
        Some(3)
    );
}

#[test]
fn poll_timeout_saturates() {
    let now = Instant::now();
    let deadline = now + Duration::from_secs(60 * 60 * 24 * 365);
    assert_eq!(poll_timeout(Some(deadline), now), Some(i32::MAX));
}

#[test]
fn setup_error_message() {
    use crate::SetupError;

    assert_eq!(
        SetupError::NoScreen(3).to_string(),
        "The X server has no screen number 3"
    );
}
