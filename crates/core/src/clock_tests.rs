// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_micros() > 1_577_836_800_000_000);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new(1_000);
    clock.advance(Duration::from_millis(2));
    assert_eq!(clock.now_micros(), 3_000);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::default();
    let clock2 = clock1.clone();
    clock2.set(42);
    assert_eq!(clock1.now_micros(), 42);
}
