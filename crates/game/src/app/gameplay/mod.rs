mod hud;
mod levels;
mod logic;
mod types;

pub(crate) use hud::{draw_game_over, draw_menu, draw_playing_hud, draw_transition, draw_victory};
pub(crate) use logic::{step, StepContext};
pub(crate) use types::{GameMode, SceneState, Tuning, WorldState};
