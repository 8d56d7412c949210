// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Bias, Direction, Drive, EdgeDetection, EventClock, Offset};
use linedev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// The publicly available information for a line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Info {
    /// The line offset on the GPIO chip.
    pub offset: Offset,

    /// The name of this GPIO line, such as the output pin of the line on
    /// the chip, a rail or a pin header name on a board, as specified by the
    /// GPIO chip.
    ///
    /// May be empty.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub name: String,

    /// A functional name for the consumer of this GPIO line as set
    /// by whatever is using it.
    ///
    /// May be empty if not set by the user or the line is unused.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub consumer: String,

    /// When true the line is used and not available for request.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "is_false"))]
    pub used: bool,

    /// When true the line active state corresponds to a physical low.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "is_false"))]
    pub active_low: bool,

    /// The direction of the line.
    pub direction: Direction,

    /// The bias state of the line.
    ///
    /// [`Bias::Unknown`] if the kernel does not report a bias for the line.
    pub bias: Bias,

    /// The drive applied to the line.
    ///
    /// Only relevant for output lines.
    pub drive: Drive,

    /// The edge detection state for the line.
    ///
    /// Only relevant for input lines.
    pub edge_detection: EdgeDetection,

    /// The source clock for edge event timestamps.
    ///
    /// Only relevant for input lines with edge detection.
    pub event_clock: EventClock,

    /// The debounce period.
    ///
    /// A zero value means no debounce.
    ///
    /// Only relevant for input lines with edge detection.
    pub debounce_period: Duration,
}

#[cfg(feature = "serde")]
fn is_false(b: &bool) -> bool {
    !b
}

impl From<&v2::LineInfo> for Info {
    fn from(li: &v2::LineInfo) -> Self {
        let mut debounce_period = Duration::ZERO;
        // num_attrs is validated by the uapi read, the clamp is for
        // locally constructed infos
        for idx in 0..(li.num_attrs as usize).min(v2::NUM_ATTRS_MAX) {
            // change to a match if more attr types are added...
            if let Some(v2::LineAttributeValue::DebouncePeriod(db)) = li.attr(idx).to_value() {
                debounce_period = db;
            }
        }
        Info {
            offset: li.offset,
            name: String::from(&li.name),
            consumer: String::from(&li.consumer),
            used: li.flags.contains(v2::LineFlags::USED),
            active_low: li.flags.contains(v2::LineFlags::ACTIVE_LOW),
            direction: Direction::from(li.flags),
            bias: Bias::from(li.flags),
            drive: Drive::from(li.flags),
            edge_detection: EdgeDetection::from(li.flags),
            event_clock: EventClock::from(li.flags),
            debounce_period,
        }
    }
}
