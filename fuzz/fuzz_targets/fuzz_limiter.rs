#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shield_preflight::limiter::{AdmissionGate, IntervalLimiter, LruIntervalLimiter};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Fuzz the admission gates with arbitrary destination sequences.
///
/// With an interval far longer than the run, each destination must be
/// admitted exactly once by the unbounded limiter.
#[derive(Arbitrary, Debug)]
struct LimiterInput {
    destinations: Vec<[u8; 4]>,
    lru_capacity: u8,
}

fuzz_target!(|input: LimiterInput| {
    if input.destinations.len() > 1024 {
        return;
    }

    let limiter = IntervalLimiter::new(Duration::from_secs(3600));
    let lru = LruIntervalLimiter::new(Duration::from_secs(3600), input.lru_capacity as usize);
    let mut seen = HashSet::new();

    for octets in &input.destinations {
        let dst = IpAddr::V4(Ipv4Addr::from(*octets));
        assert_eq!(limiter.admit(dst), seen.insert(dst));
        let _ = lru.admit(dst);
        assert!(lru.tracked() <= lru.capacity());
    }

    assert_eq!(limiter.tracked(), seen.len());
});
