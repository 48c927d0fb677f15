//! Keyboard and pointer handling for the orbit camera.
//!
//! Every handler returns an [`InputResponse`] telling the host whether the
//! camera changed and whether an application command (save, quit) was asked
//! for. Nothing here touches the render session directly.

use glam::{DVec2, Vec3};

use super::camera::{clamp_polar, OrbitCamera};
use crate::util::{flatten_to_ground, vertical_only};

/// Orbit-center step for arrow keys.
pub const KEY_STEP: f32 = 0.5;
/// Azimuth step for the comma/period keys (radians).
pub const AZIMUTH_STEP: f32 = 0.1;
/// Pan speed for middle/secondary drags, per pixel.
pub const PAN_SPEED: f32 = 0.01;

/// Physical keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Comma,
    Period,
    R,
    S,
    Escape,
    /// Any other key, by platform code
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Press,
    Release,
}

/// Raw event from the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: Key, action: KeyAction },
    Button { button: MouseButton, action: ButtonAction },
    CursorMoved { x: f64, y: f64 },
}

/// Camera action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAction {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    AzimuthDecrease,
    AzimuthIncrease,
    Recenter,
}

/// Application-level request raised by input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    SaveImage,
    SaveAndQuit,
}

/// Result of handling one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[must_use]
pub struct InputResponse {
    /// Spherical state or orbit center was modified
    pub camera_changed: bool,
    pub command: Option<AppCommand>,
}

impl InputResponse {
    const CHANGED: Self = Self { camera_changed: true, command: None };

    fn command(command: AppCommand) -> Self {
        Self { camera_changed: false, command: Some(command) }
    }
}

/// Predicate asked before latching mouse buttons, so clicks on GUI widgets do
/// not start camera drags.
pub trait InputCapture {
    fn wants_pointer_input(&self) -> bool;
}

/// Capture predicate that never claims input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl InputCapture for NoCapture {
    fn wants_pointer_input(&self) -> bool {
        false
    }
}

impl<F: Fn() -> bool> InputCapture for F {
    fn wants_pointer_input(&self) -> bool {
        self()
    }
}

/// Held mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask {
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
}

impl ButtonMask {
    fn set(&mut self, button: MouseButton, held: bool) {
        match button {
            MouseButton::Primary => self.primary = held,
            MouseButton::Secondary => self.secondary = held,
            MouseButton::Middle => self.middle = held,
        }
    }

    pub fn any(&self) -> bool {
        self.primary || self.secondary || self.middle
    }
}

/// Default key map.
pub fn camera_action(key: Key) -> Option<CameraAction> {
    match key {
        Key::ArrowUp => Some(CameraAction::Forward),
        Key::ArrowDown => Some(CameraAction::Backward),
        Key::ArrowLeft => Some(CameraAction::StrafeLeft),
        Key::ArrowRight => Some(CameraAction::StrafeRight),
        Key::Comma => Some(CameraAction::AzimuthDecrease),
        Key::Period => Some(CameraAction::AzimuthIncrease),
        Key::R => Some(CameraAction::Recenter),
        _ => None,
    }
}

/// Pointer drag state and key handling for one input session.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    last: DVec2,
    buttons: ButtonMask,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buttons(&self) -> ButtonMask {
        self.buttons
    }

    /// Last recorded pointer position.
    pub fn last_position(&self) -> DVec2 {
        self.last
    }

    /// Dispatch a raw event to the matching handler.
    pub fn handle(
        &mut self,
        camera: &mut OrbitCamera,
        event: InputEvent,
        capture: &dyn InputCapture,
    ) -> InputResponse {
        match event {
            InputEvent::Key { key, action } => self.handle_key(camera, key, action),
            InputEvent::Button { button, action } => {
                self.handle_button(button, action, capture);
                InputResponse::default()
            }
            InputEvent::CursorMoved { x, y } => self.handle_cursor(camera, x, y),
        }
    }

    pub fn handle_key(&mut self, camera: &mut OrbitCamera, key: Key, action: KeyAction) -> InputResponse {
        if action == KeyAction::Press {
            match key {
                Key::Escape => return InputResponse::command(AppCommand::SaveAndQuit),
                Key::S => return InputResponse::command(AppCommand::SaveImage),
                _ => {}
            }
        }

        let Some(camera_action) = camera_action(key) else {
            return InputResponse::default();
        };

        match (camera_action, action) {
            (_, KeyAction::Release) => InputResponse::default(),
            // Recenter ignores auto-repeat
            (CameraAction::Recenter, KeyAction::Repeat) => InputResponse::default(),
            (a, _) => {
                apply_camera_action(camera, a);
                InputResponse::CHANGED
            }
        }
    }

    /// Latch or release one button. Skipped while the GUI owns the pointer.
    pub fn handle_button(&mut self, button: MouseButton, action: ButtonAction, capture: &dyn InputCapture) {
        if capture.wants_pointer_input() {
            return;
        }
        self.buttons.set(button, action == ButtonAction::Press);
    }

    pub fn handle_cursor(&mut self, camera: &mut OrbitCamera, x: f64, y: f64) -> InputResponse {
        let pos = DVec2::new(x, y);
        // Same coordinates as last time: focus re-entry, not a drag
        if pos == self.last {
            return InputResponse::default();
        }
        let delta = (pos - self.last).as_vec2();
        self.last = pos;

        if self.buttons.primary {
            let res = camera.resolution().as_vec2();
            let state = camera.state_mut();
            state.phi -= delta.x / res.x;
            state.theta = clamp_polar(state.theta - delta.y / res.y);
            InputResponse::CHANGED
        } else if self.buttons.middle {
            let forward = flatten_to_ground(camera.frame().view);
            camera.state_mut().look_at += delta.y * PAN_SPEED * forward;
            InputResponse::CHANGED
        } else if self.buttons.secondary {
            let frame = camera.frame();
            let right = flatten_to_ground(frame.right);
            let up = vertical_only(frame.up);
            let offset: Vec3 = -delta.x * PAN_SPEED * right + delta.y * PAN_SPEED * up;
            camera.state_mut().look_at += offset;
            InputResponse::CHANGED
        } else {
            InputResponse::default()
        }
    }
}

fn apply_camera_action(camera: &mut OrbitCamera, action: CameraAction) {
    let frame = *camera.frame();
    let home = camera.home();
    let state = camera.state_mut();
    match action {
        CameraAction::Forward => state.look_at += frame.view * KEY_STEP,
        CameraAction::Backward => state.look_at -= frame.view * KEY_STEP,
        CameraAction::StrafeLeft => state.look_at -= frame.right * KEY_STEP,
        CameraAction::StrafeRight => state.look_at += frame.right * KEY_STEP,
        CameraAction::AzimuthDecrease => state.phi -= AZIMUTH_STEP,
        CameraAction::AzimuthIncrease => state.phi += AZIMUTH_STEP,
        CameraAction::Recenter => state.look_at = home,
    }
}
