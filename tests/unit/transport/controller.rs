use super::*;
use crate::foundation::clock::ManualClock;
use crate::foundation::error::PlaybackSinkError;
use crate::player::event::PlayerEvent;
use crate::transport::session::{MemorySink, MemorySinkProbe};
use std::sync::mpsc;

const EPS: f64 = 1e-9;

struct Rig {
    clock: ManualClock,
    probe: MemorySinkProbe,
    rx: mpsc::Receiver<PlayerEvent>,
    t: TransportController,
}

fn rig(duration_secs: usize) -> Rig {
    let clock = ManualClock::new(100.0);
    let sink = MemorySink::new();
    let probe = sink.probe();
    let (tx, rx) = EventSender::channel();
    let mut t =
        TransportController::new(Arc::new(clock.clone()), Box::new(sink), tx, 1.0, 1e-3).unwrap();
    let pcm = PcmBuffer::from_planar(10, vec![vec![0.0; duration_secs * 10]]).unwrap();
    t.load(Arc::new(pcm));
    Rig {
        clock,
        probe,
        rx,
        t,
    }
}

#[test]
fn rejects_invalid_rates() {
    let mut r = rig(10);
    assert!(r.t.set_rate(0.0).is_err());
    assert!(r.t.set_rate(-1.0).is_err());
    assert!(r.t.set_rate(f64::NAN).is_err());
    assert_eq!(r.t.rate(), 1.0);
}

#[test]
fn play_without_buffer_is_no_buffer() {
    let clock = ManualClock::new(0.0);
    let (tx, _rx) = EventSender::channel();
    let mut t =
        TransportController::new(Arc::new(clock), Box::new(MemorySink::new()), tx, 1.0, 1e-3)
            .unwrap();
    assert!(matches!(t.play(), Err(WaveplayError::NoBuffer)));
    assert!(matches!(t.seek(1.0), Err(WaveplayError::NoBuffer)));
    assert!(!t.is_playing());
}

#[test]
fn play_then_pause_freezes_elapsed_position() {
    let mut r = rig(10);
    r.t.play().unwrap();
    assert_eq!(r.t.status(), TransportStatus::Playing);
    r.clock.advance(4.0);
    assert!((r.t.current_position() - 4.0).abs() < EPS);
    r.t.pause();
    assert_eq!(r.t.status(), TransportStatus::Stopped);
    r.clock.advance(3.0);
    assert!((r.t.current_position() - 4.0).abs() < EPS);
    assert_eq!(r.probe.live(), 0);
}

#[test]
fn pause_twice_is_idempotent() {
    let mut r = rig(10);
    r.t.play().unwrap();
    r.clock.advance(2.5);
    r.t.pause();
    let after_first = (r.t.state(), r.t.stats());
    r.clock.advance(1.0);
    r.t.pause();
    assert_eq!((r.t.state(), r.t.stats()), after_first);
}

#[test]
fn play_while_playing_keeps_single_session() {
    let mut r = rig(10);
    r.t.play().unwrap();
    r.t.play().unwrap();
    assert_eq!(r.t.stats(), SessionStats { started: 1, stopped: 0 });
    assert_eq!(r.probe.started(), 1);
}

#[test]
fn position_is_clamped_to_duration() {
    let mut r = rig(10);
    r.t.play().unwrap();
    r.clock.advance(25.0);
    assert_eq!(r.t.current_position(), 10.0);
    r.t.pause();
    assert_eq!(r.t.current_position(), 10.0);
}

#[test]
fn play_at_end_wraps_to_start() {
    let mut r = rig(10);
    r.t.seek(10.0).unwrap();
    r.t.play().unwrap();
    assert_eq!(r.probe.sessions()[0].offset_secs, 0.0);

    let mut r = rig(10);
    r.t.seek(10.0 - 1e-4).unwrap();
    r.t.play().unwrap();
    assert_eq!(r.probe.sessions()[0].offset_secs, 0.0);

    let mut r = rig(10);
    r.t.seek(9.0).unwrap();
    r.t.play().unwrap();
    assert_eq!(r.probe.sessions()[0].offset_secs, 9.0);
}

#[test]
fn set_rate_while_playing_swaps_session_seamlessly() {
    let mut r = rig(10);
    r.t.play().unwrap();
    r.clock.advance(2.0);
    r.t.set_rate(2.0).unwrap();
    assert!(r.t.is_playing());
    assert_eq!(r.t.stats(), SessionStats { started: 2, stopped: 1 });
    let sessions = r.probe.sessions();
    assert!((sessions[1].offset_secs - 2.0).abs() < EPS);
    assert_eq!(sessions[1].rate, 2.0);
    assert!(sessions[0].stopped);

    r.clock.advance(1.0);
    assert!((r.t.current_position() - 4.0).abs() < EPS);
    assert_eq!(r.probe.max_live(), 1);
}

#[test]
fn set_rate_while_stopped_only_stores_rate() {
    let mut r = rig(10);
    r.t.set_rate(0.5).unwrap();
    assert_eq!(r.t.stats().started, 0);
    r.t.play().unwrap();
    r.clock.advance(2.0);
    assert!((r.t.current_position() - 1.0).abs() < EPS);
}

#[test]
fn seek_clamps_and_restarts_when_playing() {
    let mut r = rig(10);
    r.t.seek(-3.0).unwrap();
    assert_eq!(r.t.current_position(), 0.0);
    r.t.seek(42.0).unwrap();
    assert_eq!(r.t.current_position(), 10.0);
    r.t.seek(f64::NAN).unwrap();
    assert_eq!(r.t.current_position(), 0.0);

    r.t.play().unwrap();
    r.t.seek(6.0).unwrap();
    assert!(r.t.is_playing());
    assert_eq!(r.t.stats(), SessionStats { started: 2, stopped: 1 });
    assert_eq!(r.probe.live(), 1);
}

#[test]
fn natural_end_rewinds_to_zero() {
    let mut r = rig(10);
    r.t.play().unwrap();
    r.clock.advance(10.0);
    let id = r.probe.finish_live().unwrap();
    match r.rx.try_recv().unwrap() {
        PlayerEvent::SessionEnded(ended) => assert_eq!(ended, id),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(r.t.on_natural_end(id));
    assert_eq!(r.t.status(), TransportStatus::Stopped);
    assert_eq!(r.t.current_position(), 0.0);
}

#[test]
fn stale_end_notification_is_ignored() {
    let mut r = rig(10);
    r.t.play().unwrap();
    let first = r.t.live_session().unwrap();
    r.t.set_rate(1.5).unwrap();
    assert!(!r.t.on_natural_end(first));
    assert!(r.t.is_playing());
}

#[test]
fn suspended_sink_leaves_transport_stopped() {
    let mut r = rig(10);
    r.t.seek(3.0).unwrap();
    r.probe.set_suspended(true);
    assert!(matches!(
        r.t.play(),
        Err(WaveplayError::Sink(PlaybackSinkError::Suspended(_)))
    ));
    assert!(!r.t.is_playing());
    assert_eq!(r.t.current_position(), 3.0);

    r.probe.set_suspended(false);
    r.t.play().unwrap();
    assert!(r.t.is_playing());
}

#[test]
fn load_replaces_buffer_and_stops() {
    let mut r = rig(10);
    r.t.play().unwrap();
    r.clock.advance(3.0);
    r.t.load(Arc::new(PcmBuffer::from_planar(10, vec![vec![0.0; 20]]).unwrap()));
    assert!(!r.t.is_playing());
    assert_eq!(r.t.duration(), 2.0);
    assert_eq!(r.t.current_position(), 0.0);
    r.t.unload();
    assert!(!r.t.has_buffer());
    assert_eq!(r.t.duration(), 0.0);
}

#[test]
fn rapid_rate_and_seek_sequences_hold_invariants() {
    let mut r = rig(10);
    r.t.play().unwrap();
    for i in 0..200u32 {
        let rate = 0.25 + f64::from(i % 7) * 0.5;
        r.t.set_rate(rate).unwrap();
        r.clock.advance(0.05);
        r.t.seek(f64::from(i % 13) - 1.0).unwrap();
        let pos = r.t.current_position();
        assert!((0.0..=r.t.duration()).contains(&pos));
        assert!(r.t.stats().live() <= 1);
    }
    assert_eq!(r.probe.max_live(), 1);
    r.t.teardown();
    assert_eq!(r.probe.live(), 0);
    assert!(r.probe.is_shut_down());
}

#[test]
fn position_advances_at_rate_until_clamped() {
    const STEP: f64 = 0.01;
    for rate in [0.25, 0.5, 1.0, 1.5, 4.0] {
        let mut r = rig(2);
        r.t.set_rate(rate).unwrap();
        r.t.play().unwrap();

        let steps = (2.0 / (STEP * rate)).ceil() as usize + 10;
        let mut prev = r.t.current_position();
        assert_eq!(prev, 0.0);
        for _ in 0..steps {
            r.clock.advance(STEP);
            let pos = r.t.current_position();
            assert!(pos >= prev, "rate {rate}: position went back from {prev} to {pos}");
            if prev + STEP * rate < 2.0 - EPS {
                assert!(
                    ((pos - prev) - STEP * rate).abs() < EPS,
                    "rate {rate}: step advanced {} instead of {}",
                    pos - prev,
                    STEP * rate
                );
            } else {
                assert!(pos <= 2.0 && 2.0 - pos < EPS, "rate {rate}: expected clamp, got {pos}");
            }
            prev = pos;
        }
        assert_eq!(prev, 2.0);
        assert!(r.t.is_playing());
    }
}
