use std::io;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use monoray_engine::{
    bounded_sample_queue, drain_latest, render_sprites, render_walls, spawn_periodic, DepthBuffer,
    DisplayTransport, FrameBuffer, HighScoreStore, InputSample, InputSource, MetricsHandle,
    MetricsReporter, PlayerInput, SharedWorld, ShutdownFlag, SpriteView, TaskControl, TaskKind,
    DISPLAY_WIDTH, MAX_RENDER_DISTANCE,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::gameplay::{self, SceneState, Tuning, WorldState};

/// 100 Hz joystick sampling.
const INPUT_PERIOD: Duration = Duration::from_millis(10);
/// 50 Hz simulation; keep LOGIC_TICKS_PER_SECOND in step with this.
const LOGIC_PERIOD: Duration = Duration::from_millis(20);
const LOGIC_TICKS_PER_SECOND: u32 = 50;
/// ~30 Hz rendering, independent of the logic rate.
const RENDER_PERIOD: Duration = Duration::from_millis(33);

const LOGIC_LOCK_BUDGET: Duration = Duration::from_millis(10);
const RENDER_LOCK_BUDGET: Duration = Duration::from_millis(16);
const INPUT_QUEUE_CAPACITY: usize = 16;
const METRICS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Latched input with "hold last known" semantics: when no new sample
/// arrived this tick, the previous decoded input repeats.
struct HeldInput {
    current: PlayerInput,
    dead_zone: f32,
}

impl HeldInput {
    fn new(dead_zone: f32) -> Self {
        Self {
            current: PlayerInput::default(),
            dead_zone,
        }
    }

    fn latch(&mut self, sample: Option<InputSample>) -> PlayerInput {
        if let Some(sample) = sample {
            self.current = PlayerInput::decode(sample, self.dead_zone);
        }
        self.current
    }
}

/// Spawns the three periodic tasks around the shared world. The caller
/// keeps the handles and joins them after the presenter loop exits.
pub(crate) fn spawn_game_tasks(
    world: SharedWorld<WorldState>,
    tuning: Tuning,
    store: HighScoreStore,
    source: impl InputSource + 'static,
    mut transport: impl DisplayTransport + 'static,
    metrics: MetricsHandle,
    shutdown: ShutdownFlag,
) -> io::Result<Vec<JoinHandle<()>>> {
    let (sample_sender, sample_receiver) = bounded_sample_queue(INPUT_QUEUE_CAPACITY);

    let input_task = spawn_periodic(TaskKind::Input, INPUT_PERIOD, shutdown.clone(), move || {
        // Best effort: when the queue is full the logic task is behind and
        // will coalesce whatever is queued anyway.
        let _ = sample_sender.try_send(source.latest_sample());
        TaskControl::Continue
    })?;

    let logic_world = world.clone();
    let logic_metrics = metrics.clone();
    let logic_tuning = tuning.clone();
    let mut held = HeldInput::new(tuning.dead_zone);
    let mut rng = SmallRng::from_entropy();
    let logic_task = spawn_periodic(TaskKind::Logic, LOGIC_PERIOD, shutdown.clone(), move || {
        let input = held.latch(drain_latest(&sample_receiver));
        let locked = logic_world.try_with_for(LOGIC_LOCK_BUDGET, |state| {
            let mut ctx = gameplay::StepContext {
                tuning: &logic_tuning,
                store: &store,
                rng: &mut rng,
            };
            gameplay::step(state, input, &mut ctx);
        });
        match locked {
            Some(()) => logic_metrics.record_tick(),
            None => debug!("logic_tick_skipped"),
        }
        TaskControl::Continue
    })?;

    let mut frame = FrameBuffer::new();
    let mut reporter = MetricsReporter::new(metrics.clone(), METRICS_LOG_INTERVAL);
    let render_task = spawn_periodic(TaskKind::Render, RENDER_PERIOD, shutdown, move || {
        let drawn = world.try_with_for(RENDER_LOCK_BUDGET, |state| render_frame(state, &mut frame));
        match drawn {
            Some(()) => {
                // The flush happens outside the world lock.
                if transport.flush(&frame).is_err() {
                    info!("display_disconnected");
                    return TaskControl::Shutdown;
                }
                metrics.record_frame();
            }
            None => debug!("render_tick_skipped"),
        }
        if let Some(snapshot) = reporter.maybe_publish(Instant::now()) {
            debug!(fps = snapshot.fps, tps = snapshot.tps, "loop_metrics");
        }
        TaskControl::Continue
    })?;

    Ok(vec![input_task, logic_task, render_task])
}

/// Draws one frame from a single consistent world snapshot. Runs entirely
/// under the world lock.
fn render_frame(world: &WorldState, frame: &mut FrameBuffer) {
    frame.clear();
    match world.scene {
        SceneState::Menu => gameplay::draw_menu(frame, world),
        SceneState::Playing => {
            draw_world_view(world, frame);
            gameplay::draw_playing_hud(frame, world);
        }
        SceneState::LevelTransition => {
            draw_world_view(world, frame);
            let ticks = world.transition_ticks_left;
            let seconds_left = (ticks + LOGIC_TICKS_PER_SECOND - 1) / LOGIC_TICKS_PER_SECOND;
            gameplay::draw_transition(frame, seconds_left);
        }
        SceneState::GameOver => gameplay::draw_game_over(frame, world),
        SceneState::Victory => gameplay::draw_victory(frame, world),
    }
}

fn draw_world_view(world: &WorldState, frame: &mut FrameBuffer) {
    let mut depth: DepthBuffer = [MAX_RENDER_DISTANCE; DISPLAY_WIDTH];
    render_walls(world.level(), &world.player.pose, frame, &mut depth);

    let sprites: Vec<SpriteView> = world
        .enemies
        .iter()
        .filter(|enemy| enemy.active)
        .map(|enemy| SpriteView {
            position: enemy.position,
            distance: enemy.distance,
        })
        .collect();
    render_sprites(&sprites, &world.player.pose, frame, &depth);
}
