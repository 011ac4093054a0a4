use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender};

/// Full-scale raw axis count, matching a 12-bit converter.
pub const AXIS_MAX: u16 = 4095;
/// Raw count for a centered stick.
pub const AXIS_CENTER: u16 = 2048;

/// One raw joystick reading: axis counts plus the fire button level.
/// Sent over the input queue as a plain structured record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSample {
    pub axis_x: u16,
    pub axis_y: u16,
    pub button_down: bool,
}

impl Default for InputSample {
    fn default() -> Self {
        Self::centered()
    }
}

impl InputSample {
    pub const fn centered() -> Self {
        Self {
            axis_x: AXIS_CENTER,
            axis_y: AXIS_CENTER,
            button_down: false,
        }
    }
}

/// Normalized game input derived from one sample: axes in [-1, 1] with the
/// dead-zone snapped to exactly zero, plus the fire flag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub x: f32,
    pub y: f32,
    pub firing: bool,
}

impl PlayerInput {
    pub fn decode(sample: InputSample, dead_zone: f32) -> Self {
        Self {
            x: normalize_axis(sample.axis_x, dead_zone),
            y: normalize_axis(sample.axis_y, dead_zone),
            firing: sample.button_down,
        }
    }
}

fn normalize_axis(raw: u16, dead_zone: f32) -> f32 {
    let value = f32::from(raw.min(AXIS_MAX)) / f32::from(AXIS_CENTER) - 1.0;
    let value = value.clamp(-1.0, 1.0);
    if value.abs() < dead_zone {
        0.0
    } else {
        value
    }
}

/// The input hardware collaborator: hands out the most recent sample
/// without blocking, DMA style.
pub trait InputSource: Send {
    fn latest_sample(&self) -> InputSample;
}

/// Latest-sample cell shared between the presenter (writer) and the input
/// task (reader). Overwrites in place; readers never see a torn sample.
#[derive(Clone, Default)]
pub struct SharedSampleCell {
    inner: Arc<Mutex<InputSample>>,
}

impl SharedSampleCell {
    pub fn store(&self, sample: InputSample) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = sample;
    }
}

impl InputSource for SharedSampleCell {
    fn latest_sample(&self) -> InputSample {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The bounded queue between the input task and the logic task.
pub fn bounded_sample_queue(capacity: usize) -> (Sender<InputSample>, Receiver<InputSample>) {
    bounded(capacity)
}

/// Drains every queued sample and keeps only the newest, so a slow logic
/// tick coalesces the backlog instead of replaying it.
pub fn drain_latest(receiver: &Receiver<InputSample>) -> Option<InputSample> {
    receiver.try_iter().last()
}
