// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Info, Offset};
use linedev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// The details of an edge detected on an input line.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeEvent {
    /// The best estimate of time of event occurrence, in nanoseconds.
    ///
    /// The interpretation of this field depends on the line
    /// [`EventClock`](super::EventClock) configuration, and so is left raw here.
    ///
    /// **CLOCK_REALTIME** is a Unix UTC timestamp that can be converted to
    /// [`SystemTime`](std::time::SystemTime) or equivalent.
    ///
    /// **CLOCK_MONOTONIC** is intended for comparing times between events and
    /// should be converted to [`Duration`](std::time::Duration).
    pub timestamp_ns: u64,

    /// The event trigger identifier.
    pub kind: EdgeKind,

    /// The offset of the line that triggered the event.
    pub offset: Offset,

    /// The sequence number for this event in the sequence of events for all
    /// the lines in this line request.
    pub seqno: u32,

    /// The sequence number for this event in the sequence of events on this
    /// particular line.
    #[cfg_attr(feature = "serde", serde(rename = "lineSeqno"))]
    pub line_seqno: u32,
}

impl From<&v2::LineEdgeEvent> for EdgeEvent {
    fn from(le: &v2::LineEdgeEvent) -> Self {
        EdgeEvent {
            timestamp_ns: le.timestamp_ns,
            kind: le.kind.into(),
            offset: le.offset,
            seqno: le.seqno,
            line_seqno: le.line_seqno,
        }
    }
}

/// The cause of an [`EdgeEvent`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeKind {
    /// Indicates the line transitioned from inactive to active.
    Rising,

    /// Indicates the line transitioned from active to inactive.
    Falling,
}

impl From<v2::EdgeEventKind> for EdgeKind {
    fn from(kind: v2::EdgeEventKind) -> Self {
        match kind {
            v2::EdgeEventKind::Rising => EdgeKind::Rising,
            v2::EdgeEventKind::Falling => EdgeKind::Falling,
        }
    }
}

/// The details of a change to the [`Info`] for a line.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InfoChangeEvent {
    /// The updated line info.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub info: Info,

    /// The best estimate of time of event occurrence, in nanoseconds.
    ///
    /// **CLOCK_MONOTONIC** is the source for info change timestamps.
    pub timestamp_ns: u64,

    /// The trigger for the change.
    pub kind: InfoChangeKind,
}

impl From<&v2::LineInfoChangeEvent> for InfoChangeEvent {
    fn from(ice: &v2::LineInfoChangeEvent) -> Self {
        InfoChangeEvent {
            info: Info::from(&ice.info),
            timestamp_ns: ice.timestamp_ns,
            kind: ice.kind.into(),
        }
    }
}

/// The cause of an [`InfoChangeEvent`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InfoChangeKind {
    /// Line has been requested.
    Requested,

    /// Line has been released.
    Released,

    /// Line has been reconfigured.
    Reconfigured,
}

impl From<v2::InfoChangeKind> for InfoChangeKind {
    fn from(kind: v2::InfoChangeKind) -> Self {
        match kind {
            v2::InfoChangeKind::Requested => InfoChangeKind::Requested,
            v2::InfoChangeKind::Released => InfoChangeKind::Released,
            v2::InfoChangeKind::Reconfigured => InfoChangeKind::Reconfigured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Drive;

    mod edge_event {
        use super::*;

        #[test]
        fn from_line_edge_event() {
            let v2event = v2::LineEdgeEvent {
                timestamp_ns: 1234,
                kind: v2::EdgeEventKind::Rising,
                offset: 23,
                seqno: 2,
                line_seqno: 1,
                padding: Default::default(),
            };
            let ee = EdgeEvent::from(&v2event);
            assert_eq!(ee.timestamp_ns, 1234);
            assert_eq!(ee.kind, EdgeKind::Rising);
            assert_eq!(ee.offset, 23);
            assert_eq!(ee.seqno, 2);
            assert_eq!(ee.line_seqno, 1);
        }

        #[test]
        fn kind_from_edge_event_kind() {
            assert_eq!(EdgeKind::from(v2::EdgeEventKind::Rising), EdgeKind::Rising);
            assert_eq!(
                EdgeKind::from(v2::EdgeEventKind::Falling),
                EdgeKind::Falling
            );
        }
    }

    mod info_change_event {
        use super::*;

        #[test]
        fn from_line_info_change_event() {
            let v2event = v2::LineInfoChangeEvent {
                timestamp_ns: 1234,
                kind: v2::InfoChangeKind::Reconfigured,
                info: v2::LineInfo {
                    offset: 32,
                    flags: v2::LineFlags::OUTPUT | v2::LineFlags::OPEN_DRAIN,
                    name: Default::default(),
                    consumer: Default::default(),
                    num_attrs: 0,
                    attrs: Default::default(),
                    padding: Default::default(),
                },
                padding: Default::default(),
            };
            let ee = InfoChangeEvent::from(&v2event);
            assert_eq!(ee.timestamp_ns, 1234);
            assert_eq!(ee.kind, InfoChangeKind::Reconfigured);
            assert_eq!(ee.info.offset, 32);
            assert_eq!(ee.info.drive, Drive::OpenDrain);
        }

        #[test]
        fn kind_from_info_change_kind() {
            assert_eq!(
                InfoChangeKind::from(v2::InfoChangeKind::Requested),
                InfoChangeKind::Requested
            );
            assert_eq!(
                InfoChangeKind::from(v2::InfoChangeKind::Released),
                InfoChangeKind::Released
            );
            assert_eq!(
                InfoChangeKind::from(v2::InfoChangeKind::Reconfigured),
                InfoChangeKind::Reconfigured
            );
        }
    }
}
