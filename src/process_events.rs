use raylib::prelude::*;

use tile_raycaster::core::player::InputState;

/// Samples keyboard and mouse for one tick.
/// W/S move, A/D strafe, arrows turn, mouse x turns, left click fires.
pub fn process_events(window: &RaylibHandle) -> InputState {
    InputState {
        forward: window.is_key_down(KeyboardKey::KEY_W),
        backward: window.is_key_down(KeyboardKey::KEY_S),
        left: window.is_key_down(KeyboardKey::KEY_A),
        right: window.is_key_down(KeyboardKey::KEY_D),
        turn_left: window.is_key_down(KeyboardKey::KEY_LEFT),
        turn_right: window.is_key_down(KeyboardKey::KEY_RIGHT),
        mouse_dx: window.get_mouse_delta().x,
        fire: window.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT),
    }
}
