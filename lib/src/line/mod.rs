// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod config;
pub use self::config::Config;

mod event;
pub use self::event::{EdgeEvent, EdgeKind, InfoChangeEvent, InfoChangeKind};

mod info;
pub use self::info::Info;

mod settings;
pub use self::settings::{SettingKind, SettingValue, Settings};

use linedev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// An identifier for a line on a particular chip.
///
/// Valid offsets are in the range 0..`num_lines` as reported in the
/// chip [`Info`](super::chip::Info).
pub type Offset = u32;

/// The direction of a line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// The direction is left as previously configured.
    AsIs,

    /// The line is an input.
    #[default]
    Input,

    /// The line is an output.
    Output,
}

impl From<v2::LineFlags> for Direction {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::OUTPUT) {
            return Direction::Output;
        }
        if flags.contains(v2::LineFlags::INPUT) {
            return Direction::Input;
        }
        Direction::AsIs
    }
}

/// The bias settings for a line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Bias {
    /// The bias is left as previously configured.
    #[default]
    AsIs,

    /// The bias is not known.
    ///
    /// Only reported for lines, never requested.
    Unknown,

    /// The line has bias disabled and will float unless externally driven.
    Disabled,

    /// The line has pull-up enabled.
    PullUp,

    /// The line has pull-down enabled.
    PullDown,
}

impl From<v2::LineFlags> for Bias {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::BIAS_PULL_UP) {
            return Bias::PullUp;
        }
        if flags.contains(v2::LineFlags::BIAS_PULL_DOWN) {
            return Bias::PullDown;
        }
        if flags.contains(v2::LineFlags::BIAS_DISABLED) {
            return Bias::Disabled;
        }
        Bias::Unknown
    }
}

/// The drive policy settings for an output line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Drive {
    /// The line is driven when both active and inactive.
    ///
    /// This is the default if drive is not specified.
    #[default]
    PushPull,

    /// The line is driven when low and set high impedance when high.
    OpenDrain,

    /// The line is driven when high and set high impedance when low.
    OpenSource,
}

impl From<v2::LineFlags> for Drive {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::OPEN_DRAIN) {
            return Drive::OpenDrain;
        }
        if flags.contains(v2::LineFlags::OPEN_SOURCE) {
            return Drive::OpenSource;
        }
        Drive::PushPull
    }
}

/// The edge detection options for an input line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeDetection {
    /// No edge detection.
    #[default]
    None,

    /// Edge detection on rising edges only.
    ///
    /// A rising edge is a transition from an inactive state to an active state.
    Rising,

    /// Edge detection on falling edges only.
    ///
    /// A falling edge is a transition from an active state to an inactive state.
    Falling,

    /// Edge detection on both rising and falling edges.
    Both,
}

impl From<v2::LineFlags> for EdgeDetection {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::EDGE_RISING | v2::LineFlags::EDGE_FALLING) {
            return EdgeDetection::Both;
        }
        if flags.contains(v2::LineFlags::EDGE_RISING) {
            return EdgeDetection::Rising;
        }
        if flags.contains(v2::LineFlags::EDGE_FALLING) {
            return EdgeDetection::Falling;
        }
        EdgeDetection::None
    }
}

/// The available clock sources for [`EdgeEvent`] timestamps.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventClock {
    /// **CLOCK_MONOTONIC** is the source for edge event timestamps.
    ///
    /// This is the default.
    #[default]
    Monotonic,

    /// **CLOCK_REALTIME** is the source for edge event timestamps.
    Realtime,
}

impl From<v2::LineFlags> for EventClock {
    fn from(flags: v2::LineFlags) -> Self {
        if flags.contains(v2::LineFlags::EVENT_CLOCK_REALTIME) {
            return EventClock::Realtime;
        }
        EventClock::Monotonic
    }
}

/// The logical level of a line.
///
/// The mapping between logical and physical levels depends on the
/// active-low setting as follows:
///
/// |             | Physical Low | Physical High |
/// |-------------|--------------|---------------|
/// | **Active-High** | Inactive | Active |
/// | **Active-Low**  | Active | Inactive |
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// The line is inactive.
    #[default]
    Inactive,

    /// The line is active.
    Active,
}

impl Value {
    /// The value opposite the current value.
    pub fn not(&self) -> Value {
        match self {
            Value::Active => Value::Inactive,
            Value::Inactive => Value::Active,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Value::Active => "active",
            Value::Inactive => "inactive",
        };
        write!(f, "{}", s)
    }
}

impl From<Value> for bool {
    fn from(v: Value) -> bool {
        match v {
            Value::Inactive => false,
            Value::Active => true,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        match b {
            false => Value::Inactive,
            true => Value::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod direction {
        use super::*;

        #[test]
        fn default() {
            assert_eq!(Direction::default(), Direction::Input);
        }

        #[test]
        fn from_line_flags() {
            assert_eq!(Direction::from(v2::LineFlags::OUTPUT), Direction::Output);
            assert_eq!(Direction::from(v2::LineFlags::INPUT), Direction::Input);
            assert_eq!(Direction::from(v2::LineFlags::USED), Direction::AsIs);
        }
    }

    mod bias {
        use super::*;

        #[test]
        fn default() {
            assert_eq!(Bias::default(), Bias::AsIs);
        }

        #[test]
        fn from_line_flags() {
            assert_eq!(Bias::from(v2::LineFlags::INPUT), Bias::Unknown);
            assert_eq!(Bias::from(v2::LineFlags::BIAS_PULL_DOWN), Bias::PullDown);
            assert_eq!(Bias::from(v2::LineFlags::BIAS_PULL_UP), Bias::PullUp);
            assert_eq!(Bias::from(v2::LineFlags::BIAS_DISABLED), Bias::Disabled);
        }
    }

    mod drive {
        use super::*;

        #[test]
        fn default() {
            assert_eq!(Drive::default(), Drive::PushPull);
        }

        #[test]
        fn from_line_flags() {
            assert_eq!(Drive::from(v2::LineFlags::OUTPUT), Drive::PushPull);
            assert_eq!(
                Drive::from(v2::LineFlags::OUTPUT | v2::LineFlags::OPEN_DRAIN),
                Drive::OpenDrain
            );
            assert_eq!(
                Drive::from(v2::LineFlags::OUTPUT | v2::LineFlags::OPEN_SOURCE),
                Drive::OpenSource
            );
        }
    }

    mod edge_detection {
        use super::*;

        #[test]
        fn default() {
            assert_eq!(EdgeDetection::default(), EdgeDetection::None);
        }

        #[test]
        fn from_line_flags() {
            assert_eq!(EdgeDetection::from(v2::LineFlags::INPUT), EdgeDetection::None);
            assert_eq!(
                EdgeDetection::from(v2::LineFlags::EDGE_RISING),
                EdgeDetection::Rising
            );
            assert_eq!(
                EdgeDetection::from(v2::LineFlags::EDGE_FALLING),
                EdgeDetection::Falling
            );
            assert_eq!(
                EdgeDetection::from(v2::LineFlags::EDGE_RISING | v2::LineFlags::EDGE_FALLING),
                EdgeDetection::Both
            );
        }
    }

    mod event_clock {
        use super::*;

        #[test]
        fn default() {
            assert_eq!(EventClock::default(), EventClock::Monotonic);
        }

        #[test]
        fn from_line_flags() {
            assert_eq!(EventClock::from(v2::LineFlags::INPUT), EventClock::Monotonic);
            assert_eq!(
                EventClock::from(v2::LineFlags::EVENT_CLOCK_REALTIME),
                EventClock::Realtime
            );
        }
    }

    mod value {
        use super::*;

        #[test]
        fn default() {
            assert_eq!(Value::default(), Value::Inactive);
        }

        #[test]
        fn not() {
            assert_eq!(Value::Active.not(), Value::Inactive);
            assert_eq!(Value::Inactive.not(), Value::Active);
        }

        #[test]
        fn from_bool() {
            assert_eq!(Value::from(true), Value::Active);
            assert_eq!(Value::from(false), Value::Inactive);
        }

        #[test]
        fn into_bool() {
            assert!(bool::from(Value::Active));
            assert!(!bool::from(Value::Inactive));
        }
    }
}
