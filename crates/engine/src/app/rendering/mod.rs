mod font;
mod framebuffer;
mod presenter;

use thiserror::Error;

pub use font::{text_width, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use framebuffer::{FrameBuffer, Pattern, DISPLAY_HEIGHT, DISPLAY_PAGES, DISPLAY_WIDTH};
pub use presenter::{frame_channel, run_presenter, PresenterConfig, PresenterError, WindowTransport};

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display transport disconnected")]
    Disconnected,
}

/// The display transport collaborator. `flush` is the only operation that
/// touches the physical (or windowed) transport; everything else works on
/// the in-memory framebuffer.
pub trait DisplayTransport: Send {
    fn flush(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError>;
}

/// Transport that discards frames, for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullTransport;

impl DisplayTransport for NullTransport {
    fn flush(&mut self, _frame: &FrameBuffer) -> Result<(), DisplayError> {
        Ok(())
    }
}
