use crate::foundation::core::clamp_unit;
use crate::foundation::error::WaveplayResult;
use crate::transport::controller::TransportController;

/// Pointer gesture phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Press,
    Move,
    Release,
}

/// Pointer input in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub client_x: f64,
}

impl PointerEvent {
    pub fn press(client_x: f64) -> Self {
        Self {
            phase: PointerPhase::Press,
            client_x,
        }
    }

    pub fn moved(client_x: f64) -> Self {
        Self {
            phase: PointerPhase::Move,
            client_x,
        }
    }

    pub fn release(client_x: f64) -> Self {
        Self {
            phase: PointerPhase::Release,
            client_x,
        }
    }
}

/// Horizontal placement of the rendering surface in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSpan {
    pub left: f64,
    pub width: f64,
}

impl SurfaceSpan {
    /// Fraction of the surface width at `client_x`, clamped to `[0, 1]`.
    pub fn progress_at(self, client_x: f64) -> f64 {
        if !(self.width > 0.0) {
            return 0.0;
        }
        clamp_unit((client_x - self.left) / self.width)
    }
}

/// What a pointer event did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeekOutcome {
    /// Drag began; seek applied to `target_secs`.
    DragStarted { target_secs: f64 },
    /// Drag continued; seek applied to `target_secs`.
    Dragged { target_secs: f64 },
    /// Drag ended; no further state change.
    DragEnded,
    /// Event did not apply (move/release without a drag, or nothing loaded).
    Ignored,
}

#[derive(Clone, Copy, Debug)]
struct DragState {
    last_target: f64,
}

/// Translates press/move/release gestures into transport seeks.
#[derive(Debug, Default)]
pub struct SeekCoordinator {
    drag: Option<DragState>,
}

impl SeekCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Target of the most recent press/move in the active drag.
    pub fn drag_target(&self) -> Option<f64> {
        self.drag.map(|d| d.last_target)
    }

    /// Apply one pointer event.
    ///
    /// Press starts a drag and seeks immediately; moves during a drag re-seek (restarting the
    /// session when playing); release only ends the drag.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        span: SurfaceSpan,
        transport: &mut TransportController,
    ) -> WaveplayResult<SeekOutcome> {
        match event.phase {
            PointerPhase::Press => {
                if !transport.has_buffer() {
                    return Ok(SeekOutcome::Ignored);
                }
                let target_secs = self.apply(event.client_x, span, transport)?;
                Ok(SeekOutcome::DragStarted { target_secs })
            }
            PointerPhase::Move => {
                if self.drag.is_none() {
                    return Ok(SeekOutcome::Ignored);
                }
                let target_secs = self.apply(event.client_x, span, transport)?;
                Ok(SeekOutcome::Dragged { target_secs })
            }
            PointerPhase::Release => match self.drag.take() {
                Some(_) => Ok(SeekOutcome::DragEnded),
                None => Ok(SeekOutcome::Ignored),
            },
        }
    }

    /// Abandon any active drag without seeking.
    pub fn cancel(&mut self) {
        self.drag = None;
    }

    fn apply(
        &mut self,
        client_x: f64,
        span: SurfaceSpan,
        transport: &mut TransportController,
    ) -> WaveplayResult<f64> {
        let target = span.progress_at(client_x) * transport.duration();
        // The drag stays active even if the seek fails, so release still ends it.
        self.drag = Some(DragState {
            last_target: target,
        });
        transport.seek(target)?;
        Ok(target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/seek/coordinator.rs"]
mod tests;
