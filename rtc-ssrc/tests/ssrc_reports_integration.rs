//! Integration tests for the SSRC registry and report reconciliation.
//!
//! These tests verify that:
//! - Sender and receiver reports from a peer yield round-trip times
//! - Crypto contexts of both directions stay independent per SSRC
//! - Many packet-handler threads can share one registry
//! - A destroyed registry rejects further use

use rtc_ssrc::{
    ReceiverReport, SenderReport, SsrcDirection, SsrcRegistry, SsrcRegistryBuilder, VoipMetrics,
    on_receiver_report, on_sender_report, on_voip_metrics,
};
use shared::error::Error;
use shared::time::SystemInstant;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn init_log() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init()
        .ok();
}

/// Sender report carrying the NTP time of `at` on `clock`.
fn sender_report_at(clock: &SystemInstant, ssrc: u32, at: Instant, packets: u32) -> SenderReport {
    SenderReport::new(ssrc, clock.ntp(at), packets * 160, packets, packets * 172)
}

/// Receiver report echoing `sr`, sent `delay` after the reporter received it.
fn receiver_report_for(sr: &SenderReport, reported_on: u32, delay: Duration) -> ReceiverReport {
    ReceiverReport {
        from: sr.ssrc,
        ssrc: reported_on,
        fraction_lost: 0,
        packets_lost: 0,
        high_seq_received: 1000,
        jitter: 40,
        lsr: sr.ntp_middle_bits(),
        dlsr: (delay.as_secs_f64() * 65536.0) as u32,
    }
}

fn assert_close(actual: Duration, expected: Duration) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    // DLSR resolution is 1/65536 s
    assert!(
        diff < Duration::from_micros(100),
        "expected {expected:?}, got {actual:?}"
    );
}

// =============================================================================
// Report Reconciliation
// =============================================================================

#[test]
fn test_round_trip_time_from_report_exchange() {
    init_log();

    let registry = SsrcRegistryBuilder::new().with_call_id("rtt").build();
    let clock = SystemInstant::now();
    let peer = 0x5eed_0001;
    let ours = 0x5eed_0002;

    let t0 = clock.instant();
    let sr = sender_report_at(&clock, peer, t0, 10);
    on_sender_report(&registry, &sr, t0).unwrap();

    // the network takes 40ms each way, the peer holds the SR for 1.5s
    let hold = Duration::from_millis(1500);
    let t1 = t0 + Duration::from_millis(80) + hold;
    let rr = receiver_report_for(&sr, ours, hold);
    let rtt = on_receiver_report(&registry, &rr, t1).unwrap().unwrap();
    assert_close(rtt, Duration::from_millis(80));

    let stats = registry.find(ours).unwrap().unwrap().latest_stats().unwrap();
    assert_eq!(stats.rtt, Some(rtt));
    assert_eq!(stats.jitter, 40);
    assert_eq!(stats.high_seq_received, 1000);
}

#[test]
fn test_receiver_report_matches_older_retained_sender_report() {
    init_log();

    let registry = SsrcRegistry::new();
    let clock = SystemInstant::now();
    let peer = 0xaaaa_0001;
    let base = clock.instant();

    let mut reports = Vec::new();
    for i in 0..4u32 {
        let at = base + Duration::from_secs(5 * i as u64);
        let sr = sender_report_at(&clock, peer, at, i * 250);
        on_sender_report(&registry, &sr, at).unwrap();
        reports.push((at, sr));
    }

    // echo the second SR, not the latest one
    let (at, sr) = reports[1];
    let rr = receiver_report_for(&sr, 0xbbbb_0001, Duration::from_secs(2));
    let now = at + Duration::from_millis(2100);
    let rtt = on_receiver_report(&registry, &rr, now).unwrap().unwrap();
    assert_close(rtt, Duration::from_millis(100));
}

#[test]
fn test_receiver_report_without_sender_report_is_unavailable() {
    init_log();

    let registry = SsrcRegistry::new();
    let clock = SystemInstant::now();
    let now = clock.instant();

    // an SR the relay never saw
    let sr = sender_report_at(&clock, 0xcccc_0001, now, 1);
    let rr = receiver_report_for(&sr, 0xcccc_0002, Duration::from_millis(10));
    assert_eq!(on_receiver_report(&registry, &rr, now).unwrap(), None);

    let entry = registry.find(0xcccc_0002).unwrap().unwrap();
    assert_eq!(entry.receiver_reports().len(), 1);
    assert_eq!(entry.latest_stats().unwrap().rtt, None);
}

#[test]
fn test_sender_report_history_ages_out() {
    init_log();

    let capacity = 3;
    let registry = SsrcRegistryBuilder::new()
        .with_sender_report_capacity(capacity)
        .build();
    let clock = SystemInstant::now();
    let peer = 0xdddd_0001;
    let base = clock.instant();

    let mut reports = Vec::new();
    for i in 0..(capacity as u64 + 2) {
        let at = base + Duration::from_secs(i);
        let sr = sender_report_at(&clock, peer, at, i as u32);
        on_sender_report(&registry, &sr, at).unwrap();
        reports.push(sr);
    }

    let entry = registry.find(peer).unwrap().unwrap();
    let kept: Vec<u32> = entry
        .sender_reports()
        .iter()
        .map(|r| r.ntp_middle_bits())
        .collect();
    let expected: Vec<u32> = reports[2..].iter().map(|r| r.ntp_middle_bits()).collect();
    assert_eq!(kept, expected);

    let now = base + Duration::from_secs(10);
    for evicted in &reports[..2] {
        assert!(entry.find_matching_sender_report(evicted.ntp_middle_bits()).is_none());
        let rr = receiver_report_for(evicted, 0xdddd_0002, Duration::ZERO);
        assert_eq!(on_receiver_report(&registry, &rr, now).unwrap(), None);
    }
}

#[test]
fn test_voip_metrics_recorded() {
    init_log();

    let registry = SsrcRegistry::new();
    let metrics = VoipMetrics {
        ssrc: 0xeeee_0001,
        loss_rate: 12,
        burst_den: 3,
        gap_dur: 2000,
        r_factor: 80,
        mos_lq: 39,
        jb_max: 120,
        ..Default::default()
    };
    on_voip_metrics(&registry, &metrics, Instant::now()).unwrap();

    let stored = registry.find(0xeeee_0001).unwrap().unwrap();
    assert_eq!(stored.voip_metrics().unwrap().metrics(), &metrics);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_handlers_share_entries() {
    init_log();

    const THREADS: usize = 8;
    const SSRCS: usize = 64;

    let ssrcs: Vec<u32> = {
        let mut seen = HashSet::new();
        while seen.len() < SSRCS {
            seen.insert(rand::random::<u32>());
        }
        seen.into_iter().collect()
    };

    let registry = Arc::new(SsrcRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let ssrcs = ssrcs.clone();
            thread::spawn(move || {
                barrier.wait();
                let direction = if t % 2 == 0 {
                    SsrcDirection::Input
                } else {
                    SsrcDirection::Output
                };
                for ssrc in ssrcs {
                    let ctx = registry.get_context(ssrc, direction).unwrap();
                    ctx.with(|ctx| ctx.srtp_index += 1);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(registry.len().unwrap(), SSRCS);
    for ssrc in ssrcs {
        let entry = registry.find(ssrc).unwrap().unwrap();
        let input = entry.with_context(SsrcDirection::Input, |ctx| ctx.srtp_index);
        let output = entry.with_context(SsrcDirection::Output, |ctx| ctx.srtp_index);
        assert_eq!(input, (THREADS / 2) as u64);
        assert_eq!(output, (THREADS / 2) as u64);
    }
}

#[test]
fn test_concurrent_reports_for_many_streams() {
    init_log();

    const PEERS: u32 = 16;

    let registry = Arc::new(SsrcRegistry::new());
    let clock = SystemInstant::now();
    let base = clock.instant();

    let handles: Vec<_> = (0..PEERS)
        .map(|peer| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let sr = sender_report_at(&clock, peer, base, 1);
                on_sender_report(&registry, &sr, base).unwrap();

                let rr = receiver_report_for(&sr, peer + 1000, Duration::from_millis(500));
                let now = base + Duration::from_millis(520);
                on_receiver_report(&registry, &rr, now).unwrap()
            })
        })
        .collect();

    for h in handles {
        let rtt = h.join().unwrap().unwrap();
        assert_close(rtt, Duration::from_millis(20));
    }
    assert_eq!(registry.len().unwrap(), 2 * PEERS as usize);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_destroyed_registry_rejects_reports() {
    init_log();

    let registry = SsrcRegistry::new();
    let ctx = registry.get_context(1, SsrcDirection::Output).unwrap();
    ctx.set_srtp_index(77);

    registry.destroy().unwrap();

    let now = Instant::now();
    let sr = SenderReport::new(1, 0, 0, 0, 0);
    assert_eq!(
        on_sender_report(&registry, &sr, now),
        Err(Error::ErrSsrcRegistryDestroyed)
    );
    assert_eq!(
        registry.get_context(1, SsrcDirection::Output).err(),
        Some(Error::ErrSsrcRegistryDestroyed)
    );

    // an outstanding handle still owns its entry
    assert_eq!(ctx.srtp_index(), 77);
}
