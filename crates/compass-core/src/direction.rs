//! Direction classification for joystick readings
//!
//! Maps a percentage pair onto one of eight compass directions or a neutral
//! Center state. Each axis is split into three bands by fixed thresholds; the
//! band pair is matched against an ordered rule table where the first match
//! wins. Diagonal rules sit ahead of single-axis rules, so a reading that is
//! extreme on both axes always resolves to a diagonal.

use crate::config::Locale;

/// Readings strictly above this percentage are in the high band
pub const HIGH_THRESHOLD: u8 = 70;
/// Readings strictly below this percentage are in the low band
pub const LOW_THRESHOLD: u8 = 30;

/// Angle reported when the stick rests inside the dead zone on both axes
pub const CENTER_ANGLE: i16 = -1;

/// Compass direction of the joystick, or Center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
    Center,
}

impl Direction {
    /// All nine directions, Center last
    pub const ALL: [Direction; 9] = [
        Self::North,
        Self::Northeast,
        Self::East,
        Self::Southeast,
        Self::South,
        Self::Southwest,
        Self::West,
        Self::Northwest,
        Self::Center,
    ];

    /// Compass angle in degrees, or [`CENTER_ANGLE`] for Center
    pub const fn angle(self) -> i16 {
        match self {
            Self::North => 0,
            Self::Northeast => 45,
            Self::East => 90,
            Self::Southeast => 135,
            Self::South => 180,
            Self::Southwest => 225,
            Self::West => 270,
            Self::Northwest => 315,
            Self::Center => CENTER_ANGLE,
        }
    }

    /// Inverse of [`Direction::angle`]. Any angle outside the eight compass
    /// points, including the sentinel, maps to Center.
    pub const fn from_angle(angle: i16) -> Self {
        match angle {
            0 => Self::North,
            45 => Self::Northeast,
            90 => Self::East,
            135 => Self::Southeast,
            180 => Self::South,
            225 => Self::Southwest,
            270 => Self::West,
            315 => Self::Northwest,
            _ => Self::Center,
        }
    }

    /// Needle rotation for the page. Center draws the needle pointing North.
    pub const fn rotation_degrees(self) -> u16 {
        match self {
            Self::Center => 0,
            other => other.angle() as u16,
        }
    }

    /// English display name
    pub const fn name(self) -> &'static str {
        self.label(Locale::English)
    }

    /// Display name in the given locale
    pub const fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::English => match self {
                Self::North => "North",
                Self::Northeast => "Northeast",
                Self::East => "East",
                Self::Southeast => "Southeast",
                Self::South => "South",
                Self::Southwest => "Southwest",
                Self::West => "West",
                Self::Northwest => "Northwest",
                Self::Center => "Center",
            },
            Locale::PortugueseBrazil => match self {
                Self::North => "Norte",
                Self::Northeast => "Nordeste",
                Self::East => "Leste",
                Self::Southeast => "Sudeste",
                Self::South => "Sul",
                Self::Southwest => "Sudoeste",
                Self::West => "Oeste",
                Self::Northwest => "Noroeste",
                Self::Center => "Centro",
            },
        }
    }
}

/// Classified joystick state: the angle and the direction it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionResult {
    pub angle: i16,
    pub direction: Direction,
}

impl DirectionResult {
    pub const fn from_angle(angle: i16) -> Self {
        Self {
            angle,
            direction: Direction::from_angle(angle),
        }
    }

    pub const fn name(&self) -> &'static str {
        self.direction.name()
    }

    pub const fn rotation_degrees(&self) -> u16 {
        self.direction.rotation_degrees()
    }
}

/// Name for an arbitrary angle value. Total: unknown angles read "Center".
pub const fn direction_name(angle: i16) -> &'static str {
    Direction::from_angle(angle).name()
}

/// Position of one axis relative to the dead zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Low,
    Mid,
    High,
}

impl Band {
    const fn of(pct: u8) -> Self {
        if pct > HIGH_THRESHOLD {
            Self::High
        } else if pct < LOW_THRESHOLD {
            Self::Low
        } else {
            Self::Mid
        }
    }
}

/// Band requirement for one axis of a rule. `None` matches any band.
type Want = Option<Band>;

// Order matters: corners first, then X, then Y.
const RULES: [(Want, Want, Direction); 8] = [
    (Some(Band::High), Some(Band::High), Direction::Northeast),
    (Some(Band::Low), Some(Band::High), Direction::Northwest),
    (Some(Band::High), Some(Band::Low), Direction::Southeast),
    (Some(Band::Low), Some(Band::Low), Direction::Southwest),
    (Some(Band::High), None, Direction::East),
    (Some(Band::Low), None, Direction::West),
    (None, Some(Band::High), Direction::North),
    (None, Some(Band::Low), Direction::South),
];

fn matches(want: Want, band: Band) -> bool {
    want.is_none_or(|w| w == band)
}

/// Classify a percentage pair into a direction.
pub fn classify(pct_x: u8, pct_y: u8) -> DirectionResult {
    let (x, y) = (Band::of(pct_x), Band::of(pct_y));

    let direction = RULES
        .iter()
        .find(|(want_x, want_y, _)| matches(*want_x, x) && matches(*want_y, y))
        .map_or(Direction::Center, |(_, _, direction)| *direction);

    DirectionResult::from_angle(direction.angle())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ANGLES: [i16; 9] = [0, 45, 90, 135, 180, 225, 270, 315, -1];

    #[test]
    fn test_threshold_table() {
        let cases = [
            ((80, 80), 45, "Northeast"),
            ((10, 80), 315, "Northwest"),
            ((80, 10), 135, "Southeast"),
            ((10, 10), 225, "Southwest"),
            ((80, 50), 90, "East"),
            ((10, 50), 270, "West"),
            ((50, 80), 0, "North"),
            ((50, 10), 180, "South"),
            ((50, 50), -1, "Center"),
        ];

        for ((x, y), angle, name) in cases {
            let result = classify(x, y);
            assert_eq!(result.angle, angle, "angle for ({x}, {y})");
            assert_eq!(result.name(), name, "name for ({x}, {y})");
        }
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(classify(70, 70).direction, Direction::Center);
        assert_eq!(classify(30, 30).direction, Direction::Center);
        assert_eq!(classify(70, 50).direction, Direction::Center);
        assert_eq!(classify(30, 50).direction, Direction::Center);
        assert_eq!(classify(50, 70).direction, Direction::Center);
        assert_eq!(classify(50, 30).direction, Direction::Center);

        assert_eq!(classify(71, 50).direction, Direction::East);
        assert_eq!(classify(29, 50).direction, Direction::West);
        assert_eq!(classify(71, 71).direction, Direction::Northeast);
    }

    #[test]
    fn test_corners_beat_single_axis() {
        for x in [0, 29, 71, 100] {
            for y in [0, 29, 71, 100] {
                let angle = classify(x, y).angle;
                assert!(
                    [45, 135, 225, 315].contains(&angle),
                    "({x}, {y}) should be diagonal, got {angle}"
                );
            }
        }
    }

    #[test]
    fn test_total_and_deterministic() {
        for x in 0..=100u8 {
            for y in 0..=100u8 {
                let first = classify(x, y);
                assert!(VALID_ANGLES.contains(&first.angle));
                assert_eq!(first, classify(x, y));
                assert_eq!(first.direction, Direction::from_angle(first.angle));
            }
        }
    }

    #[test]
    fn test_center_only_inside_dead_zone() {
        for x in 0..=100u8 {
            for y in 0..=100u8 {
                let in_dead_zone = (30..=70).contains(&x) && (30..=70).contains(&y);
                assert_eq!(classify(x, y).direction == Direction::Center, in_dead_zone);
            }
        }
    }

    #[test]
    fn test_names_total() {
        for angle in VALID_ANGLES {
            assert!(!direction_name(angle).is_empty());
        }
        for direction in Direction::ALL {
            assert!(!direction.label(Locale::English).is_empty());
            assert!(!direction.label(Locale::PortugueseBrazil).is_empty());
        }
    }

    #[test]
    fn test_unknown_angle_names_center() {
        assert_eq!(direction_name(-1), "Center");
        assert_eq!(direction_name(10), "Center");
        assert_eq!(direction_name(360), "Center");
        assert_eq!(direction_name(i16::MIN), "Center");
    }

    #[test]
    fn test_angle_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_angle(direction.angle()), direction);
        }
    }

    #[test]
    fn test_rotation_degrees() {
        assert_eq!(DirectionResult::from_angle(-1).rotation_degrees(), 0);
        assert_eq!(DirectionResult::from_angle(90).rotation_degrees(), 90);
        assert_eq!(DirectionResult::from_angle(315).rotation_degrees(), 315);
    }

    #[test]
    fn test_portuguese_labels() {
        assert_eq!(Direction::Northeast.label(Locale::PortugueseBrazil), "Nordeste");
        assert_eq!(Direction::Center.label(Locale::PortugueseBrazil), "Centro");
    }
}
