//! Keyboard and mouse state for the viewer window.
//!
//! Key state lives in a fixed table indexed by [`ViewKey`]; held keys are
//! applied once per frame by [`InputState::apply_held_keys`]. Mouse clicks and
//! scroll act immediately on the [`ViewState`].

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::view::ViewState;

/// Pixels per scroll line for touchpads that report pixel deltas.
const PIXELS_PER_LINE: f64 = 40.0;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKey {
    Left,
    Right,
    Up,
    Down,
    MoreIterations,
    FewerIterations,
    Close,
}

impl ViewKey {
    pub const ALL: [ViewKey; 7] = [
        ViewKey::Left,
        ViewKey::Right,
        ViewKey::Up,
        ViewKey::Down,
        ViewKey::MoreIterations,
        ViewKey::FewerIterations,
        ViewKey::Close,
    ];
    pub const COUNT: usize = Self::ALL.len();

    /// Maps a physical key to a viewer key. Arrows alias WASD.
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(ViewKey::Left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(ViewKey::Right),
            KeyCode::KeyW | KeyCode::ArrowUp => Some(ViewKey::Up),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(ViewKey::Down),
            KeyCode::Minus => Some(ViewKey::MoreIterations),
            KeyCode::Equal => Some(ViewKey::FewerIterations),
            KeyCode::Escape => Some(ViewKey::Close),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
struct KeyboardState {
    pressed: [bool; ViewKey::COUNT],
}

impl KeyboardState {
    /// Returns true when the pressed flag changed.
    fn set(&mut self, key: ViewKey, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        let slot = &mut self.pressed[key.index()];
        let changed = *slot != pressed;
        *slot = pressed;
        changed
    }

    fn is_pressed(&self, key: ViewKey) -> bool {
        self.pressed[key.index()]
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    keyboard: KeyboardState,
    cursor: Option<PhysicalPosition<f64>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> bool {
        match event.physical_key {
            PhysicalKey::Code(code) => self.handle_key(code, event.state),
            PhysicalKey::Unidentified(_) => false,
        }
    }

    /// Records a key transition. Returns true when a tracked key changed state.
    pub fn handle_key(&mut self, code: KeyCode, state: ElementState) -> bool {
        match ViewKey::from_key_code(code) {
            Some(key) => self.keyboard.set(key, state),
            None => false,
        }
    }

    pub fn is_pressed(&self, key: ViewKey) -> bool {
        self.keyboard.is_pressed(key)
    }

    pub fn close_requested(&self) -> bool {
        self.keyboard.is_pressed(ViewKey::Close)
    }

    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(position);
    }

    /// Left press recenters toward the last known cursor position.
    pub fn handle_left_button(
        &mut self,
        state: ElementState,
        window: [f64; 2],
        view: &mut ViewState,
    ) {
        if state != ElementState::Pressed {
            return;
        }
        if let Some(cursor) = self.cursor {
            view.recenter([cursor.x, cursor.y], window);
        }
    }

    pub fn handle_scroll(&mut self, delta: MouseScrollDelta, view: &mut ViewState) {
        view.scroll(scroll_lines(delta));
    }

    /// Applies every held movement and iteration key to the view.
    pub fn apply_held_keys(&self, view: &mut ViewState) {
        let axis = |negative: ViewKey, positive: ViewKey| {
            f64::from(u8::from(self.is_pressed(positive))) - f64::from(u8::from(self.is_pressed(negative)))
        };
        let dx = axis(ViewKey::Left, ViewKey::Right);
        let dy = axis(ViewKey::Down, ViewKey::Up);
        if dx != 0.0 || dy != 0.0 {
            view.pan(dx, dy);
        }

        if self.is_pressed(ViewKey::MoreIterations) {
            view.adjust_iterations(1);
        }
        if self.is_pressed(ViewKey::FewerIterations) {
            view.adjust_iterations(-1);
        }
    }
}

fn scroll_lines(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => f64::from(y),
        MouseScrollDelta::PixelDelta(position) => position.y / PIXELS_PER_LINE,
    }
}
