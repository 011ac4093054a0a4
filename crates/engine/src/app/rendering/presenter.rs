use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::app::input::{InputSample, SharedSampleCell, AXIS_CENTER, AXIS_MAX};
use crate::app::tasks::ShutdownFlag;

use super::framebuffer::{FrameBuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use super::{DisplayError, DisplayTransport};

/// Queued frames between the render task and the window loop. Two is
/// enough: the render task drops frames when the presenter lags.
const FRAME_CHANNEL_CAPACITY: usize = 2;

const PIXEL_ON_COLOR: [u8; 4] = [0xE8, 0xF4, 0xFF, 0xFF];
const PIXEL_OFF_COLOR: [u8; 4] = [0x04, 0x06, 0x0A, 0xFF];

#[derive(Debug, Clone)]
pub struct PresenterConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            window_title: "Monoray".to_string(),
            // 6x the native 128x64 panel.
            window_width: 768,
            window_height: 384,
        }
    }
}

#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize render surface: {0}")]
    CreateSurface(#[source] pixels::Error),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Render-task end of the frame hand-off. Flushing clones the 1 KiB
/// framebuffer into the channel; a full channel drops the frame (the
/// presenter is behind), a closed one reports the transport gone.
pub struct WindowTransport {
    sender: Sender<FrameBuffer>,
}

impl DisplayTransport for WindowTransport {
    fn flush(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        match self.sender.try_send(frame.clone()) {
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(DisplayError::Disconnected),
        }
    }
}

/// Builds the transport pair: the render task keeps the `WindowTransport`,
/// the presenter consumes the receiver.
pub fn frame_channel() -> (WindowTransport, Receiver<FrameBuffer>) {
    let (sender, receiver) = bounded(FRAME_CHANNEL_CAPACITY);
    (WindowTransport { sender }, receiver)
}

/// Keyboard stand-in for the analog stick: arrows (or WASD) drive the two
/// axes at their rails, space fires. The presenter stores the derived
/// sample into the shared cell after every key event.
#[derive(Debug, Default)]
struct KeyboardJoystick {
    left_down: bool,
    right_down: bool,
    up_down: bool,
    down_down: bool,
    fire_down: bool,
    quit_requested: bool,
}

impl KeyboardJoystick {
    fn handle_key_event(&mut self, key_event: &KeyEvent) {
        let is_down = key_event.state == ElementState::Pressed;
        match key_event.physical_key {
            PhysicalKey::Code(KeyCode::ArrowLeft) | PhysicalKey::Code(KeyCode::KeyA) => {
                self.left_down = is_down;
            }
            PhysicalKey::Code(KeyCode::ArrowRight) | PhysicalKey::Code(KeyCode::KeyD) => {
                self.right_down = is_down;
            }
            PhysicalKey::Code(KeyCode::ArrowUp) | PhysicalKey::Code(KeyCode::KeyW) => {
                self.up_down = is_down;
            }
            PhysicalKey::Code(KeyCode::ArrowDown) | PhysicalKey::Code(KeyCode::KeyS) => {
                self.down_down = is_down;
            }
            PhysicalKey::Code(KeyCode::Space) | PhysicalKey::Code(KeyCode::Enter) => {
                self.fire_down = is_down;
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                if is_down {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn to_sample(&self) -> InputSample {
        InputSample {
            axis_x: rail_axis(self.left_down, self.right_down),
            axis_y: rail_axis(self.down_down, self.up_down),
            button_down: self.fire_down,
        }
    }
}

fn rail_axis(negative_down: bool, positive_down: bool) -> u16 {
    match (negative_down, positive_down) {
        (true, false) => 0,
        (false, true) => AXIS_MAX,
        _ => AXIS_CENTER,
    }
}

fn rasterize(frame: &FrameBuffer, rgba: &mut [u8]) {
    for y in 0..DISPLAY_HEIGHT {
        for x in 0..DISPLAY_WIDTH {
            let offset = (y * DISPLAY_WIDTH + x) * 4;
            let color = if frame.pixel(x as i32, y as i32) {
                PIXEL_ON_COLOR
            } else {
                PIXEL_OFF_COLOR
            };
            rgba[offset..offset + 4].copy_from_slice(&color);
        }
    }
}

/// Runs the window loop on the calling thread until the window closes,
/// escape is pressed, or the tasks request shutdown. Frames arrive from
/// the render task; key events feed the shared input cell.
pub fn run_presenter(
    config: PresenterConfig,
    frames: Receiver<FrameBuffer>,
    samples: SharedSampleCell,
    shutdown: ShutdownFlag,
) -> Result<(), PresenterError> {
    let event_loop = EventLoop::new().map_err(PresenterError::CreateEventLoop)?;
    let window: &'static Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(PresenterError::CreateWindow)?,
    ));

    let size = window.inner_size();
    let surface = SurfaceTexture::new(size.width, size.height, window);
    let mut pixels = Pixels::new(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32, surface)
        .map_err(PresenterError::CreateSurface)?;

    event_loop.set_control_flow(ControlFlow::Poll);
    info!(
        width = DISPLAY_WIDTH,
        height = DISPLAY_HEIGHT,
        window_width = config.window_width,
        window_height = config.window_height,
        "presenter_started"
    );

    let mut joystick = KeyboardJoystick::default();
    let mut latest_frame: Option<FrameBuffer> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    shutdown.request();
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if new_size.width > 0 && new_size.height > 0 {
                        if let Err(error) = pixels.resize_surface(new_size.width, new_size.height)
                        {
                            warn!(error = %error, "surface_resize_failed");
                            shutdown.request();
                            window_target.exit();
                        }
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    joystick.handle_key_event(&event);
                    samples.store(joystick.to_sample());
                    if joystick.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        shutdown.request();
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    while let Ok(frame) = frames.try_recv() {
                        latest_frame = Some(frame);
                    }
                    if let Some(frame) = latest_frame.as_ref() {
                        rasterize(frame, pixels.frame_mut());
                        if let Err(error) = pixels.render() {
                            warn!(error = %error, "presenter_draw_failed");
                            shutdown.request();
                            window_target.exit();
                        }
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if shutdown.is_requested() {
                    window_target.exit();
                } else {
                    window.request_redraw();
                }
            }
            Event::LoopExiting => {
                shutdown.request();
                info!("presenter_stopped");
            }
            _ => {}
        })
        .map_err(PresenterError::EventLoopRun)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rail_axis_maps_held_directions_to_extremes() {
        assert_eq!(rail_axis(true, false), 0);
        assert_eq!(rail_axis(false, true), AXIS_MAX);
        assert_eq!(rail_axis(false, false), AXIS_CENTER);
        assert_eq!(rail_axis(true, true), AXIS_CENTER);
    }

    #[test]
    fn joystick_sample_reflects_held_keys() {
        let joystick = KeyboardJoystick {
            left_down: true,
            fire_down: true,
            ..KeyboardJoystick::default()
        };
        let sample = joystick.to_sample();
        assert_eq!(sample.axis_x, 0);
        assert_eq!(sample.axis_y, AXIS_CENTER);
        assert!(sample.button_down);
    }

    #[test]
    fn rasterize_writes_one_rgba_pixel_per_panel_pixel() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(1, 0, true);
        let mut rgba = vec![0u8; DISPLAY_WIDTH * DISPLAY_HEIGHT * 4];
        rasterize(&frame, &mut rgba);

        assert_eq!(&rgba[0..4], &PIXEL_OFF_COLOR);
        assert_eq!(&rgba[4..8], &PIXEL_ON_COLOR);
    }

    #[test]
    fn window_transport_drops_frames_when_the_channel_is_full() {
        let (mut transport, receiver) = frame_channel();
        let frame = FrameBuffer::new();
        for _ in 0..5 {
            transport.flush(&frame).expect("flush with live receiver");
        }
        assert_eq!(receiver.len(), FRAME_CHANNEL_CAPACITY);
    }

    #[test]
    fn window_transport_reports_a_closed_presenter() {
        let (mut transport, receiver) = frame_channel();
        drop(receiver);
        assert!(transport.flush(&FrameBuffer::new()).is_err());
    }
}
