//! Long-press recognition over raw touch samples.

use crate::config::GestureConfig;
use crate::menu::MenuEvent;
use orbit::geom::Point;
use orbit::touch::{TouchPhase, TouchSample};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PressState {
    Possible,
    Pending { origin: Point, since: Duration },
    Recognized,
    /// Finger still down after the press failed; waits for the lift.
    Failed,
}

/// Turns a single finger's samples into menu events: a press is recognised
/// once the finger has rested for `minimum_press` without drifting further
/// than `allowable_movement`.
#[derive(Debug)]
pub struct PressRecognizer {
    minimum_press: Duration,
    allowable_movement: f64,
    state: PressState,
}

impl PressRecognizer {
    pub fn new(minimum_press: Duration, allowable_movement: f64) -> Self {
        Self {
            minimum_press,
            allowable_movement,
            state: PressState::Possible,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(config.minimum_press(), config.allowable_movement)
    }

    pub fn is_recognized(&self) -> bool {
        self.state == PressState::Recognized
    }

    pub fn touch(&mut self, now: Duration, sample: TouchSample) -> Vec<MenuEvent> {
        let mut events = self.tick(now).into_iter().collect::<Vec<_>>();
        let location = sample.location;

        self.state = match (self.state, sample.phase) {
            (PressState::Possible, TouchPhase::Down) => PressState::Pending {
                origin: location,
                since: now,
            },
            (PressState::Pending { origin, since }, TouchPhase::Move) => {
                if origin.distance_to(location) > self.allowable_movement {
                    log::debug!("press cancelled, finger moved");
                    PressState::Failed
                } else {
                    PressState::Pending { origin, since }
                }
            }
            (PressState::Pending { .. }, TouchPhase::Up) => PressState::Possible,
            (PressState::Recognized, TouchPhase::Move) => {
                events.push(MenuEvent::DragChanged(location));
                PressState::Recognized
            }
            (PressState::Recognized, TouchPhase::Up) => {
                events.push(MenuEvent::ReleaseEnded(location));
                PressState::Possible
            }
            (PressState::Failed, TouchPhase::Up) => PressState::Possible,
            (state, phase) => {
                log::debug!("touch {} ignored in {:?}", phase, state);
                state
            }
        };

        events
    }

    /// Recognises a press whose minimum duration has elapsed.
    pub fn tick(&mut self, now: Duration) -> Option<MenuEvent> {
        match self.state {
            PressState::Pending { since, .. }
                if now.saturating_sub(since) >= self.minimum_press =>
            {
                self.state = PressState::Recognized;
                Some(MenuEvent::PressBegan)
            }
            _ => None,
        }
    }
}
