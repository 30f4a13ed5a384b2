//! Line protocol spoken between the `orbit` client and the menu host.
//!
//! One sample per line: `down X Y`, `move X Y` or `up X Y`.

use crate::geom::Point;
use derive_more::Display;
use std::str::FromStr;
use thiserror::Error;

pub const SOCKET_PATH: &str = "/tmp/explosion.sock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TouchPhase {
    #[display("down")]
    Down,
    #[display("move")]
    Move,
    #[display("up")]
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    pub phase: TouchPhase,
    pub location: Point,
}

impl TouchSample {
    pub fn new(phase: TouchPhase, location: Point) -> Self {
        Self { phase, location }
    }
}

impl std::fmt::Display for TouchSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.phase, self.location.x, self.location.y)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseTouchError {
    #[error("unknown touch phase '{0}'")]
    UnknownPhase(String),
    #[error("missing coordinate")]
    MissingCoordinate,
    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),
    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),
}

impl FromStr for TouchSample {
    type Err = ParseTouchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();

        let phase = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("down") => TouchPhase::Down,
            Some("move") => TouchPhase::Move,
            Some("up") => TouchPhase::Up,
            Some(other) => return Err(ParseTouchError::UnknownPhase(other.to_string())),
            None => return Err(ParseTouchError::UnknownPhase(String::new())),
        };

        let mut coordinate = || -> Result<f64, ParseTouchError> {
            let raw = parts.next().ok_or(ParseTouchError::MissingCoordinate)?;
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParseTouchError::InvalidCoordinate(raw.to_string()))
        };
        let x = coordinate()?;
        let y = coordinate()?;

        if let Some(extra) = parts.next() {
            return Err(ParseTouchError::TrailingInput(extra.to_string()));
        }

        Ok(Self::new(phase, Point::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_samples() {
        let cases = vec![
            ("down 10 20", TouchPhase::Down, Point::new(10.0, 20.0)),
            ("MOVE 1.5 -3", TouchPhase::Move, Point::new(1.5, -3.0)),
            ("  up   0 0  ", TouchPhase::Up, Point::new(0.0, 0.0)),
        ];

        for (line, phase, location) in cases {
            let sample: TouchSample = line.parse().unwrap();
            assert_eq!(sample, TouchSample::new(phase, location));
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "tap 1 2".parse::<TouchSample>(),
            Err(ParseTouchError::UnknownPhase("tap".to_string()))
        );
        assert_eq!(
            "down 1".parse::<TouchSample>(),
            Err(ParseTouchError::MissingCoordinate)
        );
        assert_eq!(
            "down x 1".parse::<TouchSample>(),
            Err(ParseTouchError::InvalidCoordinate("x".to_string()))
        );
        assert_eq!(
            "down 1 NaN".parse::<TouchSample>(),
            Err(ParseTouchError::InvalidCoordinate("NaN".to_string()))
        );
        assert_eq!(
            "up 1 2 3".parse::<TouchSample>(),
            Err(ParseTouchError::TrailingInput("3".to_string()))
        );
    }

    #[test]
    fn test_display_matches_wire_format() {
        let sample = TouchSample::new(TouchPhase::Move, Point::new(12.5, 7.0));
        assert_eq!(sample.to_string(), "move 12.5 7");
        assert_eq!(sample.to_string().parse::<TouchSample>().unwrap(), sample);
    }
}
