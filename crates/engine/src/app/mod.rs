mod geometry;
mod input;
mod metrics;
mod persistence;
mod raycast;
mod rendering;
mod tasks;

pub use geometry::{normalize_angle, Pose, Vec2};
pub use input::{
    bounded_sample_queue, drain_latest, InputSample, InputSource, PlayerInput, SharedSampleCell,
    AXIS_CENTER, AXIS_MAX,
};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle, MetricsReporter};
pub use persistence::{HighScoreStore, PersistenceError};
pub use raycast::{
    cast_ray, render_sprites, render_walls, ColumnHit, DepthBuffer, RayHit, Side, SpriteView,
    WorldMap, MAX_RENDER_DISTANCE, SPRITE_SIZE,
};
pub use rendering::{
    frame_channel, run_presenter, text_width, DisplayError, DisplayTransport, FrameBuffer,
    NullTransport, Pattern, PresenterConfig, PresenterError, WindowTransport, DISPLAY_HEIGHT,
    DISPLAY_PAGES, DISPLAY_WIDTH, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH,
};
pub use tasks::{spawn_periodic, SharedWorld, ShutdownFlag, TaskControl, TaskKind, Ticker};
