//! Keyboard and wheel stand-ins for the rotation dials and scale slider.
//!
//! `Controls` holds widget positions, not transform state. Every change
//! produces the absolute [`Event`] a real widget would have emitted, and the
//! viewer never reads the widgets back.

use std::ops::RangeInclusive;

use log::debug;
use minifb::Key;

use crate::viewer::Event;

pub const DIAL_STEP: i32 = 5;
/// Dials wrap, so 359 + 1 lands on 0.
pub const DIAL_RANGE: RangeInclusive<i32> = 0..=359;
pub const SLIDER_STEP: i32 = 5;
pub const SLIDER_RANGE: RangeInclusive<i32> = 1..=200;
/// Slider position for a scale factor of 1.0
pub const SLIDER_DEFAULT: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// What a key press asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Send(Event),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    dials: [i32; 3],
    slider: i32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            dials: [0; 3],
            slider: SLIDER_DEFAULT,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slider(&self) -> i32 {
        self.slider
    }

    pub fn scale(&self) -> f32 {
        self.slider as f32 / 100.0
    }

    pub fn turn_dial(&mut self, axis: Axis, delta: i32) -> Event {
        let span = DIAL_RANGE.end() - DIAL_RANGE.start() + 1;
        let dial = &mut self.dials[axis as usize];
        *dial = (*dial + delta).rem_euclid(span);
        self.rotation_event()
    }

    pub fn move_slider(&mut self, delta: i32) -> Event {
        self.slider = (self.slider + delta).clamp(*SLIDER_RANGE.start(), *SLIDER_RANGE.end());
        Event::SetScale(self.scale())
    }

    pub fn reset_rotation(&mut self) -> Event {
        self.dials = [0; 3];
        Event::ResetRotation
    }

    pub fn reset_scale(&mut self) -> Event {
        self.slider = SLIDER_DEFAULT;
        Event::ResetScale
    }

    /// Map a key press to a command. `shift` reverses dial direction.
    pub fn key_pressed(&mut self, key: Key, shift: bool) -> Option<Command> {
        let dial_step = if shift { -DIAL_STEP } else { DIAL_STEP };
        let event = match key {
            Key::X => self.turn_dial(Axis::X, dial_step),
            Key::Y => self.turn_dial(Axis::Y, dial_step),
            Key::Z => self.turn_dial(Axis::Z, dial_step),
            Key::Equal | Key::NumPadPlus => self.move_slider(SLIDER_STEP),
            Key::Minus | Key::NumPadMinus => self.move_slider(-SLIDER_STEP),
            Key::R => self.reset_rotation(),
            Key::T => self.reset_scale(),
            Key::P => Event::Capture,
            Key::Escape | Key::Q => return Some(Command::Quit),
            _ => return None,
        };
        debug!("controls: dials {:?} slider {}", self.dials, self.slider);
        Some(Command::Send(event))
    }

    /// One slider step per wheel notch, in the wheel's direction.
    pub fn wheel(&mut self, delta: f32) -> Option<Event> {
        if delta > 0.0 {
            Some(self.move_slider(SLIDER_STEP))
        } else if delta < 0.0 {
            Some(self.move_slider(-SLIDER_STEP))
        } else {
            None
        }
    }

    fn rotation_event(&self) -> Event {
        let [x, y, z] = self.dials;
        Event::SetRotation { x, y, z }
    }
}
