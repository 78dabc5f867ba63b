use std::sync::{Arc, Mutex, MutexGuard};

use crate::foundation::core::{Line, Point, Rect, Rgba8, SurfaceSize};
use crate::player::event::{EventSender, PlayerEvent};
use crate::seek::coordinator::PointerEvent;
use crate::waveform::raster::WaveformImage;

/// Identity of one pointer subscription on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Forwards pointer input from a surface into the player's event queue.
#[derive(Debug, Clone)]
pub struct PointerSender {
    events: EventSender,
}

impl PointerSender {
    pub(crate) fn new(events: EventSender) -> Self {
        Self { events }
    }

    pub fn send(&self, event: PointerEvent) {
        self.events.send(PlayerEvent::Pointer(event));
    }
}

/// 2D drawing surface collaborator.
pub trait Surface {
    /// Pixel dimensions. May change between frames (resize).
    fn size(&self) -> SurfaceSize;

    /// Client-space x coordinate of the surface's left edge.
    fn client_left(&self) -> f64 {
        0.0
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    fn stroke_line(&mut self, line: Line, width: f64, color: Rgba8);

    /// Composite `image` with its top-left corner at `origin`.
    fn blit(&mut self, image: &WaveformImage, origin: Point);

    /// Register for press/move/release events.
    fn subscribe_pointer(&mut self, sender: PointerSender) -> SubscriptionId;

    fn unsubscribe_pointer(&mut self, id: SubscriptionId);
}

#[derive(Debug)]
struct PixmapState {
    pixels: image::RgbaImage,
    client_left: f64,
    next_subscription: u64,
    subscribers: Vec<(SubscriptionId, PointerSender)>,
    draw_calls: u64,
}

/// In-memory RGBA surface backed by an `image` buffer.
///
/// Clones share the same pixels and subscriptions, so a host (or test) can keep a handle after
/// moving one into the player.
#[derive(Debug, Clone)]
pub struct PixmapSurface {
    state: Arc<Mutex<PixmapState>>,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(PixmapState {
                pixels: image::RgbaImage::new(width, height),
                client_left: 0.0,
                next_subscription: 0,
                subscribers: Vec::new(),
                draw_calls: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PixmapState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resize, clearing all pixels.
    pub fn resize(&self, width: u32, height: u32) {
        self.lock().pixels = image::RgbaImage::new(width, height);
    }

    pub fn set_client_left(&self, left: f64) {
        self.lock().client_left = left;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.lock()
            .pixels
            .get_pixel_checked(x, y)
            .map(|p| Rgba8::new(p[0], p[1], p[2], p[3]))
    }

    /// Copy of the current pixels.
    pub fn snapshot(&self) -> image::RgbaImage {
        self.lock().pixels.clone()
    }

    /// Number of primitives drawn so far.
    pub fn draw_calls(&self) -> u64 {
        self.lock().draw_calls
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Deliver a pointer event to every subscriber, as a windowing host would.
    pub fn dispatch_pointer(&self, event: PointerEvent) {
        for (_, sender) in &self.lock().subscribers {
            sender.send(event);
        }
    }
}

impl Surface for PixmapSurface {
    fn size(&self) -> SurfaceSize {
        let st = self.lock();
        SurfaceSize {
            width: st.pixels.width(),
            height: st.pixels.height(),
        }
    }

    fn client_left(&self) -> f64 {
        self.lock().client_left
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        let mut st = self.lock();
        st.draw_calls += 1;
        let (w, h) = (st.pixels.width(), st.pixels.height());
        let Some((x0, y0, x1, y1)) = pixel_bounds(rect, w, h) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                blend_px(&mut st.pixels, x, y, color);
            }
        }
    }

    fn stroke_line(&mut self, line: Line, width: f64, color: Rgba8) {
        let mut st = self.lock();
        st.draw_calls += 1;
        let (w, h) = (st.pixels.width(), st.pixels.height());
        let half = (width.max(1.0)) / 2.0;
        let d = line.p1 - line.p0;
        let steps = d.x.abs().max(d.y.abs()).ceil().max(1.0) as u32;
        // Stamp a square brush along the line; each pixel is blended at most once.
        let mut covered = std::collections::HashSet::new();
        for i in 0..=steps {
            let t = f64::from(i) / f64::from(steps);
            let c = line.p0 + d * t;
            let brush = Rect::new(c.x - half, c.y - half, c.x + half, c.y + half);
            let Some((x0, y0, x1, y1)) = pixel_bounds(brush, w, h) else {
                continue;
            };
            for y in y0..y1 {
                for x in x0..x1 {
                    if covered.insert((x, y)) {
                        blend_px(&mut st.pixels, x, y, color);
                    }
                }
            }
        }
    }

    fn blit(&mut self, image: &WaveformImage, origin: Point) {
        let mut st = self.lock();
        st.draw_calls += 1;
        let ox = origin.x.round() as i64;
        let oy = origin.y.round() as i64;
        let (w, h) = (i64::from(st.pixels.width()), i64::from(st.pixels.height()));
        for sy in 0..image.height() {
            let dy = oy + i64::from(sy);
            if dy < 0 || dy >= h {
                continue;
            }
            for sx in 0..image.width() {
                let dx = ox + i64::from(sx);
                if dx < 0 || dx >= w {
                    continue;
                }
                if let Some(src) = image.pixel(sx, sy) {
                    blend_px(&mut st.pixels, dx as u32, dy as u32, src);
                }
            }
        }
    }

    fn subscribe_pointer(&mut self, sender: PointerSender) -> SubscriptionId {
        let mut st = self.lock();
        st.next_subscription += 1;
        let id = SubscriptionId(st.next_subscription);
        st.subscribers.push((id, sender));
        id
    }

    fn unsubscribe_pointer(&mut self, id: SubscriptionId) {
        self.lock().subscribers.retain(|(sid, _)| *sid != id);
    }
}

/// Integer pixel span `[x0, x1) x [y0, y1)` covered by `rect`, or `None` if empty.
fn pixel_bounds(rect: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let r = rect.abs();
    let x0 = r.x0.round().clamp(0.0, f64::from(width)) as u32;
    let x1 = r.x1.round().clamp(0.0, f64::from(width)) as u32;
    let y0 = r.y0.round().clamp(0.0, f64::from(height)) as u32;
    let y1 = r.y1.round().clamp(0.0, f64::from(height)) as u32;
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

fn blend_px(pixels: &mut image::RgbaImage, x: u32, y: u32, color: Rgba8) {
    let dst = pixels.get_pixel(x, y);
    let dst = Rgba8::new(dst[0], dst[1], dst[2], dst[3]);
    pixels.put_pixel(x, y, image::Rgba(color.over(dst).to_array()));
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
