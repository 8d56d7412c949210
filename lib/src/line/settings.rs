// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Bias, Direction, Drive, EdgeDetection, EventClock, Value};
use linedev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// The complete set of attributes for a line.
///
/// A plain value type - two settings are equal iff all their attributes
/// are equal, which is the basis for grouping lines when a configuration
/// is packed into a uAPI request.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Settings {
    /// The direction of the line.
    pub direction: Direction,

    /// The edge detection for the line.
    ///
    /// Edge detection implies the line is an input.
    pub edge_detection: EdgeDetection,

    /// The bias applied to the line.
    pub bias: Bias,

    /// The drive applied to the line.
    ///
    /// Only relevant for output lines.
    pub drive: Drive,

    /// The active-low setting of the line.
    pub active_low: bool,

    /// The debounce period applied to the line.
    ///
    /// Zero means no debounce. Periods are applied with microsecond
    /// resolution.
    ///
    /// Only relevant for input lines with edge detection.
    pub debounce_period: Duration,

    /// The source clock for edge event timestamps.
    ///
    /// Only relevant for input lines with edge detection.
    pub event_clock: EventClock,

    /// The value the line is set to.
    ///
    /// Only relevant for output lines.
    pub output_value: Value,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            direction: Direction::Input,
            edge_detection: EdgeDetection::None,
            bias: Bias::AsIs,
            drive: Drive::PushPull,
            active_low: false,
            debounce_period: Duration::ZERO,
            event_clock: EventClock::Monotonic,
            output_value: Value::Inactive,
        }
    }
}

impl Settings {
    /// Return the value of one attribute.
    pub fn get(&self, kind: SettingKind) -> SettingValue {
        match kind {
            SettingKind::Direction => SettingValue::Direction(self.direction),
            SettingKind::EdgeDetection => SettingValue::EdgeDetection(self.edge_detection),
            SettingKind::Bias => SettingValue::Bias(self.bias),
            SettingKind::Drive => SettingValue::Drive(self.drive),
            SettingKind::ActiveLow => SettingValue::ActiveLow(self.active_low),
            SettingKind::DebouncePeriod => SettingValue::DebouncePeriod(self.debounce_period),
            SettingKind::EventClock => SettingValue::EventClock(self.event_clock),
            SettingKind::OutputValue => SettingValue::OutputValue(self.output_value),
        }
    }

    /// Set one attribute.
    pub fn set(&mut self, value: SettingValue) -> &mut Self {
        match value {
            SettingValue::Direction(v) => self.direction = v,
            SettingValue::EdgeDetection(v) => self.edge_detection = v,
            SettingValue::Bias(v) => self.bias = v,
            SettingValue::Drive(v) => self.drive = v,
            SettingValue::ActiveLow(v) => self.active_low = v,
            SettingValue::DebouncePeriod(v) => self.debounce_period = v,
            SettingValue::EventClock(v) => self.event_clock = v,
            SettingValue::OutputValue(v) => self.output_value = v,
        }
        self
    }

    /// The debounce period in microseconds, as carried by the uAPI.
    ///
    /// Sub-microsecond components are dropped.
    pub(crate) fn debounce_period_us(&self) -> u32 {
        self.debounce_period.as_micros() as u32
    }
}

// The flags for a line with these settings.
//
// Debounce period and output value are carried by dedicated attributes,
// not flags.
impl From<&Settings> for v2::LineFlags {
    fn from(s: &Settings) -> Self {
        let mut flags = v2::LineFlags::default();
        if s.active_low {
            flags.insert(v2::LineFlags::ACTIVE_LOW);
        }
        match s.bias {
            Bias::AsIs | Bias::Unknown => {}
            Bias::Disabled => flags.insert(v2::LineFlags::BIAS_DISABLED),
            Bias::PullUp => flags.insert(v2::LineFlags::BIAS_PULL_UP),
            Bias::PullDown => flags.insert(v2::LineFlags::BIAS_PULL_DOWN),
        }
        if s.edge_detection != EdgeDetection::None {
            // edge detection requires the line to be an input
            flags.insert(v2::LineFlags::INPUT);
            match s.edge_detection {
                EdgeDetection::None => {}
                EdgeDetection::Rising => flags.insert(v2::LineFlags::EDGE_RISING),
                EdgeDetection::Falling => flags.insert(v2::LineFlags::EDGE_FALLING),
                EdgeDetection::Both => {
                    flags.insert(v2::LineFlags::EDGE_RISING | v2::LineFlags::EDGE_FALLING)
                }
            }
            if s.event_clock == EventClock::Realtime {
                flags.insert(v2::LineFlags::EVENT_CLOCK_REALTIME);
            }
            return flags;
        }
        match s.direction {
            Direction::AsIs => {}
            Direction::Input => flags.insert(v2::LineFlags::INPUT),
            Direction::Output => {
                flags.insert(v2::LineFlags::OUTPUT);
                match s.drive {
                    Drive::PushPull => {}
                    Drive::OpenDrain => flags.insert(v2::LineFlags::OPEN_DRAIN),
                    Drive::OpenSource => flags.insert(v2::LineFlags::OPEN_SOURCE),
                }
            }
        }
        flags
    }
}

/// The kinds of attribute contained in a [`Settings`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SettingKind {
    Direction,
    EdgeDetection,
    Bias,
    Drive,
    ActiveLow,
    DebouncePeriod,
    EventClock,
    OutputValue,
}

impl SettingKind {
    /// All attribute kinds, in a fixed order.
    pub const ALL: [SettingKind; 8] = [
        SettingKind::Direction,
        SettingKind::EdgeDetection,
        SettingKind::Bias,
        SettingKind::Drive,
        SettingKind::ActiveLow,
        SettingKind::DebouncePeriod,
        SettingKind::EventClock,
        SettingKind::OutputValue,
    ];
}

/// The value of one attribute of a [`Settings`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SettingValue {
    Direction(Direction),
    EdgeDetection(EdgeDetection),
    Bias(Bias),
    Drive(Drive),
    ActiveLow(bool),
    DebouncePeriod(Duration),
    EventClock(EventClock),
    OutputValue(Value),
}

impl SettingValue {
    /// The kind of attribute this value sets.
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Direction(_) => SettingKind::Direction,
            SettingValue::EdgeDetection(_) => SettingKind::EdgeDetection,
            SettingValue::Bias(_) => SettingKind::Bias,
            SettingValue::Drive(_) => SettingKind::Drive,
            SettingValue::ActiveLow(_) => SettingKind::ActiveLow,
            SettingValue::DebouncePeriod(_) => SettingKind::DebouncePeriod,
            SettingValue::EventClock(_) => SettingKind::EventClock,
            SettingValue::OutputValue(_) => SettingKind::OutputValue,
        }
    }
}
