//! Vim-style controls: `h`/`l` left/right, `k`/`j` up/down the page, space to
//! jump. Arrow keys are accepted too.

use crate::input::queue::InputEvent;

pub const KEY_SPACE: u32 = 32;
pub const KEY_ARROW_LEFT: u32 = 37;
pub const KEY_ARROW_UP: u32 = 38;
pub const KEY_ARROW_RIGHT: u32 = 39;
pub const KEY_ARROW_DOWN: u32 = 40;
pub const KEY_H: u32 = 72;
pub const KEY_J: u32 = 74;
pub const KEY_K: u32 = 75;
pub const KEY_L: u32 = 76;

/// The five logical controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    Jump,
}

impl Control {
    pub fn from_key_code(key_code: u32) -> Option<Self> {
        match key_code {
            KEY_H | KEY_ARROW_LEFT => Some(Control::Left),
            KEY_L | KEY_ARROW_RIGHT => Some(Control::Right),
            KEY_K | KEY_ARROW_UP => Some(Control::Up),
            KEY_J | KEY_ARROW_DOWN => Some(Control::Down),
            KEY_SPACE => Some(Control::Jump),
            _ => None,
        }
    }
}

/// What the player wants this frame. `jump` is already edge-filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
}

impl MoveIntent {
    /// Any control is active this step.
    pub fn is_active(&self) -> bool {
        self.left || self.right || self.up || self.down || self.jump
    }
}

/// Held-key bookkeeping with an edge-triggered jump request.
///
/// Auto-repeated key-down events for a key that is already held are ignored,
/// so holding space produces exactly one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump_held: bool,
    jump_requested: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, control: Control) {
        match control {
            Control::Left => self.left = true,
            Control::Right => self.right = true,
            Control::Up => self.up = true,
            Control::Down => self.down = true,
            Control::Jump => {
                if !self.jump_held {
                    self.jump_requested = true;
                }
                self.jump_held = true;
            }
        }
    }

    pub fn release(&mut self, control: Control) {
        match control {
            Control::Left => self.left = false,
            Control::Right => self.right = false,
            Control::Up => self.up = false,
            Control::Down => self.down = false,
            Control::Jump => self.jump_held = false,
        }
    }

    /// Feed a raw input event. Returns `true` if it mapped to a control.
    pub fn apply(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyDown { key_code } => match Control::from_key_code(key_code) {
                Some(control) => {
                    self.press(control);
                    true
                }
                None => false,
            },
            InputEvent::KeyUp { key_code } => match Control::from_key_code(key_code) {
                Some(control) => {
                    self.release(control);
                    true
                }
                None => false,
            },
            InputEvent::FocusLost => {
                self.clear();
                true
            }
        }
    }

    pub fn jump_requested(&self) -> bool {
        self.jump_requested
    }

    /// Snapshot the controls for one step and consume the jump request.
    pub fn take_intent(&mut self) -> MoveIntent {
        let intent = MoveIntent {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
            jump: self.jump_requested,
        };
        self.jump_requested = false;
        intent
    }

    /// Release everything (focus loss, teardown).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
