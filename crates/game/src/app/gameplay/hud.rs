use std::f32::consts::PI;

use monoray_engine::{
    normalize_angle, text_width, FrameBuffer, Pattern, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};

use super::types::{GameMode, WorldState};

const TITLE: &str = "MONORAY";
const CENTER_X: i32 = DISPLAY_WIDTH as i32 / 2;
const CENTER_Y: i32 = DISPLAY_HEIGHT as i32 / 2;

fn draw_centered(frame: &mut FrameBuffer, y: i32, text: &str) {
    let x = (DISPLAY_WIDTH as i32 - text_width(text, 1)) / 2;
    frame.draw_string(x, y, text);
}

pub(crate) fn draw_menu(frame: &mut FrameBuffer, world: &WorldState) {
    frame.draw_title(6, TITLE);

    let (classic_cursor, arcade_cursor) = match world.menu_cursor {
        GameMode::Classic => ('>', ' '),
        GameMode::Arcade => (' ', '>'),
    };
    frame.draw_string(34, 30, &format!("{classic_cursor} CLASSIC"));
    frame.draw_string(34, 41, &format!("{arcade_cursor} ARCADE"));

    frame.draw_string(10, 55, &format!("HI-SCORE: {}", world.high_score));
}

pub(crate) fn draw_playing_hud(frame: &mut FrameBuffer, world: &WorldState) {
    frame.draw_string(2, 56, &format!("HP {}", world.player.health.max(0)));

    let score_text = world.score.to_string();
    frame.draw_string(
        DISPLAY_WIDTH as i32 - text_width(&score_text, 1) - 2,
        2,
        &score_text,
    );

    draw_crosshair(frame);
    if world.was_firing {
        draw_muzzle_flash(frame);
    }
    if world.hit_marker_ticks > 0 {
        frame.draw_char(CENTER_X - 2, CENTER_Y - 10, 'X');
    }
    draw_exit_compass(frame, world);
}

fn draw_crosshair(frame: &mut FrameBuffer) {
    frame.draw_vline(CENTER_X, CENTER_Y - 2, CENTER_Y + 2, Pattern::Solid);
    frame.draw_hline(CENTER_X - 2, CENTER_X + 2, CENTER_Y, Pattern::Solid);
}

fn draw_muzzle_flash(frame: &mut FrameBuffer) {
    for column in CENTER_X - 2..=CENTER_X + 2 {
        frame.draw_vline(column, CENTER_Y + 4, CENTER_Y + 8, Pattern::Checker);
    }
}

/// A tick along the top edge pointing at the exit: centered when the exit
/// is dead ahead, pinned to an edge when it is behind.
fn draw_exit_compass(frame: &mut FrameBuffer, world: &WorldState) {
    let Some(exit) = world.level().exit_position() else {
        return;
    };
    let to_exit = exit - world.player.pose.position;
    let diff = normalize_angle(to_exit.angle() - world.player.pose.facing_angle());
    let x = CENTER_X + ((diff / PI) * CENTER_X as f32) as i32;
    frame.draw_vline(x.clamp(0, DISPLAY_WIDTH as i32 - 1), 0, 2, Pattern::Solid);
}

pub(crate) fn draw_transition(frame: &mut FrameBuffer, seconds_left: u32) {
    draw_centered(frame, 20, "LEVEL CLEAR");
    draw_centered(frame, 32, &format!("NEXT IN {seconds_left}"));
}

pub(crate) fn draw_game_over(frame: &mut FrameBuffer, world: &WorldState) {
    frame.draw_title(8, "GAME OVER");
    draw_centered(frame, 30, &format!("SCORE {}", world.score));
    draw_centered(frame, 40, &format!("HI-SCORE {}", world.high_score));
    draw_centered(frame, 54, "FIRE TO RETRY");
}

pub(crate) fn draw_victory(frame: &mut FrameBuffer, world: &WorldState) {
    frame.draw_title(8, "VICTORY!");
    draw_centered(frame, 30, &format!("SCORE {}", world.score));
    draw_centered(frame, 40, &format!("HI-SCORE {}", world.high_score));
    draw_centered(frame, 54, "FIRE FOR MENU");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::types::Tuning;

    fn lit_count(frame: &FrameBuffer) -> usize {
        let mut lit = 0;
        for x in 0..DISPLAY_WIDTH as i32 {
            for y in 0..DISPLAY_HEIGHT as i32 {
                if frame.pixel(x, y) {
                    lit += 1;
                }
            }
        }
        lit
    }

    fn any_lit_in_rows(frame: &FrameBuffer, y0: i32, y1: i32) -> bool {
        for y in y0..=y1 {
            for x in 0..DISPLAY_WIDTH as i32 {
                if frame.pixel(x, y) {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn menu_draws_title_options_and_high_score() {
        let tuning = Tuning::default();
        let world = WorldState::new(777, &tuning);
        let mut frame = FrameBuffer::new();
        draw_menu(&mut frame, &world);

        assert!(any_lit_in_rows(&frame, 6, 20), "title row empty");
        assert!(any_lit_in_rows(&frame, 30, 48), "option rows empty");
        assert!(any_lit_in_rows(&frame, 55, 62), "high score row empty");
    }

    #[test]
    fn playing_hud_shows_more_when_a_hit_marker_is_active() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(0, &tuning);
        world.start_run(GameMode::Classic, &tuning);

        let mut plain = FrameBuffer::new();
        draw_playing_hud(&mut plain, &world);

        world.hit_marker_ticks = 3;
        let mut marked = FrameBuffer::new();
        draw_playing_hud(&mut marked, &world);

        assert!(lit_count(&marked) > lit_count(&plain));
    }

    #[test]
    fn compass_sits_centered_when_facing_the_exit() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(0, &tuning);
        world.start_run(GameMode::Classic, &tuning);

        // Face the exit directly.
        let exit = world.level().exit_position().expect("exit");
        let to_exit = exit - world.player.pose.position;
        let angle = to_exit.angle();
        world.player.pose =
            monoray_engine::Pose::from_angle(world.player.pose.position, angle, tuning.fov_scale);

        let mut frame = FrameBuffer::new();
        draw_exit_compass(&mut frame, &world);
        assert!(frame.pixel(CENTER_X, 0));
    }

    #[test]
    fn end_screens_render_scores() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(4321, &tuning);
        world.score = 1200;

        let mut game_over = FrameBuffer::new();
        draw_game_over(&mut game_over, &world);
        assert!(lit_count(&game_over) > 0);

        let mut victory = FrameBuffer::new();
        draw_victory(&mut victory, &world);
        assert!(lit_count(&victory) > 0);
    }

    #[test]
    fn transition_screen_shows_countdown() {
        let mut frame = FrameBuffer::new();
        draw_transition(&mut frame, 5);
        assert!(any_lit_in_rows(&frame, 20, 40));
    }
}
