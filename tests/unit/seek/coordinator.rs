use super::*;
use crate::decode::pcm::PcmBuffer;
use crate::foundation::clock::ManualClock;
use crate::player::event::EventSender;
use crate::transport::session::MemorySink;
use std::sync::Arc;

const SPAN: SurfaceSpan = SurfaceSpan {
    left: 100.0,
    width: 200.0,
};

fn transport(clock: &ManualClock, sink: MemorySink) -> TransportController {
    let (tx, _rx) = EventSender::channel();
    let mut t =
        TransportController::new(Arc::new(clock.clone()), Box::new(sink), tx, 1.0, 1e-3).unwrap();
    t.load(Arc::new(
        PcmBuffer::from_planar(10, vec![vec![0.0; 100]]).unwrap(),
    ));
    t
}

#[test]
fn progress_is_clamped_to_the_surface() {
    assert_eq!(SPAN.progress_at(100.0), 0.0);
    assert_eq!(SPAN.progress_at(200.0), 0.5);
    assert_eq!(SPAN.progress_at(300.0), 1.0);
    assert_eq!(SPAN.progress_at(50.0), 0.0);
    assert_eq!(SPAN.progress_at(900.0), 1.0);
    let degenerate = SurfaceSpan {
        left: 0.0,
        width: 0.0,
    };
    assert_eq!(degenerate.progress_at(10.0), 0.0);
}

#[test]
fn drag_while_stopped_only_moves_offset() {
    let clock = ManualClock::new(0.0);
    let sink = MemorySink::new();
    let probe = sink.probe();
    let mut t = transport(&clock, sink);
    let mut seek = SeekCoordinator::new();

    let out = seek.handle(PointerEvent::press(150.0), SPAN, &mut t).unwrap();
    assert_eq!(out, SeekOutcome::DragStarted { target_secs: 2.5 });
    assert!(seek.is_dragging());
    let out = seek.handle(PointerEvent::moved(200.0), SPAN, &mut t).unwrap();
    assert_eq!(out, SeekOutcome::Dragged { target_secs: 5.0 });
    assert_eq!(seek.drag_target(), Some(5.0));
    let out = seek.handle(PointerEvent::release(260.0), SPAN, &mut t).unwrap();
    assert_eq!(out, SeekOutcome::DragEnded);

    assert!(!seek.is_dragging());
    assert_eq!(t.current_position(), 5.0);
    assert_eq!(probe.started(), 0);
}

#[test]
fn move_without_press_is_ignored() {
    let clock = ManualClock::new(0.0);
    let mut t = transport(&clock, MemorySink::new());
    let mut seek = SeekCoordinator::new();
    assert_eq!(
        seek.handle(PointerEvent::moved(250.0), SPAN, &mut t).unwrap(),
        SeekOutcome::Ignored
    );
    assert_eq!(
        seek.handle(PointerEvent::release(250.0), SPAN, &mut t).unwrap(),
        SeekOutcome::Ignored
    );
    assert_eq!(t.current_position(), 0.0);
}

#[test]
fn drag_while_playing_restarts_one_session_per_move() {
    let clock = ManualClock::new(0.0);
    let sink = MemorySink::new();
    let probe = sink.probe();
    let mut t = transport(&clock, sink);
    t.play().unwrap();
    let mut seek = SeekCoordinator::new();

    seek.handle(PointerEvent::press(120.0), SPAN, &mut t).unwrap();
    for x in [140.0, 180.0, 220.0, 260.0] {
        seek.handle(PointerEvent::moved(x), SPAN, &mut t).unwrap();
        assert_eq!(probe.live(), 1);
    }
    seek.handle(PointerEvent::release(260.0), SPAN, &mut t).unwrap();

    assert!(t.is_playing());
    // initial play + press + 4 moves
    assert_eq!(probe.started(), 6);
    assert_eq!(probe.max_live(), 1);
    assert!((t.current_position() - 8.0).abs() < 1e-9);
}

#[test]
fn press_without_buffer_is_ignored() {
    let clock = ManualClock::new(0.0);
    let (tx, _rx) = EventSender::channel();
    let mut t =
        TransportController::new(Arc::new(clock), Box::new(MemorySink::new()), tx, 1.0, 1e-3)
            .unwrap();
    let mut seek = SeekCoordinator::new();
    assert_eq!(
        seek.handle(PointerEvent::press(150.0), SPAN, &mut t).unwrap(),
        SeekOutcome::Ignored
    );
    assert!(!seek.is_dragging());
}
