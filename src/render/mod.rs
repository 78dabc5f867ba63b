//! Drawing surfaces, frame composition and the redraw loop.

pub mod compose;
pub mod frame_loop;
pub mod surface;
