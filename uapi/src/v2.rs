// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct layouts and ioctl wrappers for GPIO uAPI v2.

use bitflags::bitflags;
use std::fmt;
use std::fs::File;
use std::os::unix::prelude::{AsRawFd, FromRawFd};
use std::time::Duration;

pub use super::common::*;
use super::common::iorw;

#[repr(u8)]
enum Ioctl {
    GetLineInfo = 5,
    WatchLineInfo = 6,
    GetLine = 7,
    SetLineConfig = 0xD,
    GetLineValues = 0xE,
    SetLineValues = 0xF,
}

bitflags! {
    /// The configuration flags for a line.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct LineFlags: u64 {
        /// The line is in use and not available for request.
        const USED = 1;

        /// The line active state corresponds to a physical low.
        const ACTIVE_LOW = 2;

        /// The line is an input.
        const INPUT = 4;

        /// The line is an output.
        const OUTPUT = 8;

        /// The line detects rising (*inactive* to *active*) edges.
        const EDGE_RISING = 16;

        /// The line detects falling (*active* to *inactive*) edges.
        const EDGE_FALLING = 32;

        /// The line is an open drain output.
        const OPEN_DRAIN = 64;

        /// The line is an open source output.
        const OPEN_SOURCE = 128;

        /// The line has pull-up bias enabled.
        const BIAS_PULL_UP = 256;

        /// The line has pull-down bias enabled.
        const BIAS_PULL_DOWN = 512;

        /// The line has bias disabled.
        const BIAS_DISABLED = 1024;

        /// Edge event timestamps are taken from **CLOCK_REALTIME**.
        const EVENT_CLOCK_REALTIME = 2048;

        /// Edge event timestamps are taken from a hardware timestamp engine.
        const EVENT_CLOCK_HTE = 4096;
    }
}

/// Values of requested lines, as a pair of bitmaps.
///
/// Bit numbers correspond to the index into [`LineRequest.offsets`],
/// so the first requested line is bit 0.
///
/// [`LineRequest.offsets`]: struct@LineRequest
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LineValues {
    /// The level of each line, 1 for *active* and 0 for *inactive*.
    pub bits: u64,

    /// The lines the operation applies to, 1 to access and 0 to ignore.
    pub mask: u64,
}

impl LineValues {
    /// Return the value of the indexed line, or `None` if it is masked out.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<bool> {
        debug_assert!(idx < NUM_LINES_MAX);
        let bit = 0x01 << idx;
        if self.mask & bit == 0 {
            return None;
        }
        Some(self.bits & bit != 0)
    }

    /// Set the value of the indexed line and mark it for access.
    #[inline]
    pub fn set(&mut self, idx: usize, active: bool) {
        debug_assert!(idx < NUM_LINES_MAX);
        let bit = 0x01 << idx;
        self.mask |= bit;
        if active {
            self.bits |= bit;
        } else {
            self.bits &= !bit;
        }
    }
}

/// Read the values of requested lines.
///
/// Only the lines set in the `lv` mask are read.
///
/// * `lf` - The request file returned by [`get_line`].
/// * `lv` - The line values to be populated.
#[inline]
pub fn get_line_values(lf: &File, lv: &mut LineValues) -> Result<()> {
    // SAFETY: the kernel only writes the bits bitmap.
    match unsafe { libc::ioctl(lf.as_raw_fd(), iorw!(Ioctl::GetLineValues, LineValues), lv) } {
        0 => Ok(()),
        _ => Err(Error::from_errno()),
    }
}

/// Set the values of requested output lines.
///
/// Setting an input line is an error.
///
/// * `lf` - The request file returned by [`get_line`].
/// * `lv` - The line values to be applied.
#[inline]
pub fn set_line_values(lf: &File, lv: &LineValues) -> Result<()> {
    // SAFETY: lv is not modified.
    match unsafe { libc::ioctl(lf.as_raw_fd(), iorw!(Ioctl::SetLineValues, LineValues), lv) } {
        0 => Ok(()),
        _ => Err(Error::from_errno()),
    }
}

/// Identifies which field of the [`LineAttributeValueUnion`] is in use.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineAttributeKind {
    /// The attribute is *inactive* - no fields are in use.
    #[default]
    Unused = 0,

    /// The flags field is in use.
    Flags = 1,

    /// The values field is in use.
    Values = 2,

    /// The debounce_period_us field is in use.
    Debounce = 3,
}

impl TryFrom<u32> for LineAttributeKind {
    type Error = String;

    fn try_from(v: u32) -> std::result::Result<Self, Self::Error> {
        use LineAttributeKind::*;
        Ok(match v {
            x if x == Unused as u32 => Unused,
            x if x == Flags as u32 => Flags,
            x if x == Values as u32 => Values,
            x if x == Debounce as u32 => Debounce,
            x => return Err(format!("invalid value: {x}")),
        })
    }
}

impl LineAttributeKind {
    /// Confirm that the value read from the kernel is valid in Rust.
    fn validate(&self) -> std::result::Result<(), String> {
        LineAttributeKind::try_from(*self as u32).map(|_| ())
    }
}

/// The kind-tagged value of a line attribute.
#[repr(C)]
#[derive(Clone, Copy)]
pub union LineAttributeValueUnion {
    /// The line configuration flags.
    pub flags: LineFlags,

    /// Output values, bit numbers corresponding to the index into
    /// [`LineRequest.offsets`].
    ///
    /// [`LineRequest.offsets`]: struct@LineRequest
    pub values: u64,

    /// The debounce period, in microseconds.
    pub debounce_period_us: u32,
}

impl Default for LineAttributeValueUnion {
    fn default() -> Self {
        LineAttributeValueUnion {
            flags: Default::default(),
        }
    }
}

/// A configurable attribute of a line.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct LineAttribute {
    /// The field of `value` in use.
    pub kind: LineAttributeKind,

    /// Reserved for future use and must be zero filled.
    #[doc(hidden)]
    pub padding: Padding<1>,

    /// The attribute value.
    pub value: LineAttributeValueUnion,
}

impl LineAttribute {
    /// Set the attribute to a debounce period.
    pub fn set_debounce_period_us(&mut self, debounce_period_us: u32) {
        self.kind = LineAttributeKind::Debounce;
        self.value.debounce_period_us = debounce_period_us;
    }

    /// Set the attribute to flags.
    pub fn set_flags(&mut self, flags: LineFlags) {
        self.kind = LineAttributeKind::Flags;
        self.value.flags = flags;
    }

    /// Set the attribute to output values.
    pub fn set_values(&mut self, values: u64) {
        self.kind = LineAttributeKind::Values;
        self.value.values = values;
    }

    /// Convert the unsafe kind/union pair into a safe enum.
    pub fn to_value(&self) -> Option<LineAttributeValue> {
        // SAFETY: kind is checked before the union is accessed.
        unsafe {
            Some(match self.kind {
                LineAttributeKind::Unused => return None,
                LineAttributeKind::Flags => LineAttributeValue::Flags(self.value.flags),
                LineAttributeKind::Values => LineAttributeValue::Values(self.value.values),
                LineAttributeKind::Debounce => LineAttributeValue::DebouncePeriod(
                    Duration::from_micros(self.value.debounce_period_us as u64),
                ),
            })
        }
    }
}

impl fmt::Debug for LineAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SAFETY: kind is checked before the union is accessed.
        unsafe {
            match self.kind {
                LineAttributeKind::Unused => write!(f, "unused"),
                LineAttributeKind::Flags => write!(f, "flags: {:?}", self.value.flags),
                LineAttributeKind::Values => write!(f, "values: {:08x}", self.value.values),
                LineAttributeKind::Debounce => {
                    write!(f, "debounce_period_us: {}", self.value.debounce_period_us)
                }
            }
        }
    }
}

impl PartialEq for LineAttribute {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        // SAFETY: kind is checked before the union is accessed.
        unsafe {
            match self.kind {
                LineAttributeKind::Unused => true,
                LineAttributeKind::Flags => self.value.flags == other.value.flags,
                LineAttributeKind::Values => self.value.values == other.value.values,
                LineAttributeKind::Debounce => {
                    self.value.debounce_period_us == other.value.debounce_period_us
                }
            }
        }
    }
}
impl Eq for LineAttribute {}

/// The attribute value contained within a [`LineAttribute`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineAttributeValue {
    /// The debounce period.
    DebouncePeriod(Duration),

    /// The configuration flags.
    Flags(LineFlags),

    /// The output values.
    Values(u64),
}

/// A configuration attribute associated with one or more of the requested lines.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LineConfigAttribute {
    /// The configurable attribute.
    pub attr: LineAttribute,

    /// The lines the attribute applies to, with bit numbers corresponding
    /// to the index into [`LineRequest.offsets`].
    ///
    /// [`LineRequest.offsets`]: struct@LineRequest
    pub mask: u64,
}

/// The maximum number of attributes in a line configuration or line info.
pub const NUM_ATTRS_MAX: usize = 10;

/// The attribute slots of a [`LineConfig`].
///
/// [`LineConfig.num_attrs`] specifies the number of slots in use.
/// Where an attribute is associated with a line multiple times, the
/// lowest indexed slot has precedence.
///
/// [`LineConfig.num_attrs`]: struct@LineConfig
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineConfigAttributes(pub [LineConfigAttribute; NUM_ATTRS_MAX]);

/// Configuration for a set of requested lines.
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineConfig {
    /// The flags for all requested lines, unless overridden for particular
    /// lines by `attrs`.
    pub flags: LineFlags,

    /// The number of attributes active in `attrs`.
    pub num_attrs: u32,

    /// Reserved for future use and must be zero filled.
    #[doc(hidden)]
    pub padding: Padding<5>,

    /// The attribute slots associated with the requested lines.
    pub attrs: LineConfigAttributes,
}

impl LineConfig {
    /// The nth attribute slot.
    #[inline]
    pub fn attr(&self, idx: usize) -> &LineConfigAttribute {
        &self.attrs.0[idx]
    }

    /// Append a debounce attribute.
    pub fn add_debounce(&mut self, period_us: u32, mask: u64) {
        let lca = &mut self.attrs.0[self.num_attrs as usize];
        lca.mask = mask;
        lca.attr.set_debounce_period_us(period_us);
        self.num_attrs += 1;
    }

    /// Append a flags attribute.
    pub fn add_flags(&mut self, flags: LineFlags, mask: u64) {
        let lca = &mut self.attrs.0[self.num_attrs as usize];
        lca.mask = mask;
        lca.attr.set_flags(flags);
        self.num_attrs += 1;
    }

    /// Append an output values attribute.
    pub fn add_values(&mut self, bits: u64, mask: u64) {
        let lca = &mut self.attrs.0[self.num_attrs as usize];
        lca.mask = mask;
        lca.attr.set_values(bits);
        self.num_attrs += 1;
    }
}

/// Update the configuration of an existing line request.
///
/// * `lf` - The request file returned by [`get_line`].
/// * `lc` - The configuration to be applied.
#[inline]
pub fn set_line_config(lf: &File, lc: LineConfig) -> Result<()> {
    // SAFETY: lc is consumed.
    match unsafe { libc::ioctl(lf.as_raw_fd(), iorw!(Ioctl::SetLineConfig, LineConfig), &lc) } {
        0 => Ok(()),
        _ => Err(Error::from_errno()),
    }
}

/// A request for a set of lines, as passed to the kernel.
#[repr(C)]
#[derive(Clone, Debug, Default)]
pub struct LineRequest {
    /// The requested lines, identified by offset on the associated chip.
    pub offsets: Offsets,

    /// The requested consumer label for the lines.
    pub consumer: Name,

    /// The requested configuration for the lines.
    pub config: LineConfig,

    /// The number of valid elements in `offsets`.
    pub num_lines: u32,

    /// A suggested minimum number of edge events the kernel should buffer.
    ///
    /// Only relevant if edge detection is enabled in the configuration.
    /// The kernel may allocate a larger buffer or cap the size.
    /// Zero selects the kernel default of `num_lines` * 16.
    pub event_buffer_size: u32,

    /// Reserved for future use and must be zero filled.
    #[doc(hidden)]
    pub padding: Padding<5>,

    /// Populated by the kernel with the fd of the request.
    #[doc(hidden)]
    pub fd: i32,
}

/// Request a set of lines for exclusive use.
///
/// * `cf` - The open gpiochip device file.
/// * `lr` - The line request.
#[inline]
pub fn get_line(cf: &File, mut lr: LineRequest) -> Result<File> {
    // SAFETY: lr is consumed and the returned file owns the returned fd.
    unsafe {
        match libc::ioctl(cf.as_raw_fd(), iorw!(Ioctl::GetLine, LineRequest), &mut lr) {
            0 => Ok(File::from_raw_fd(lr.fd)),
            _ => Err(Error::from_errno()),
        }
    }
}

/// The attribute slots of a [`LineInfo`].
///
/// [`LineInfo.num_attrs`] specifies the number of slots in use.
///
/// [`LineInfo.num_attrs`]: struct@LineInfo
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LineAttributes([LineAttribute; NUM_ATTRS_MAX]);

/// The publicly available information for a line.
///
/// Does not include the line value.
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineInfo {
    /// The name of this line as specified by the GPIO chip.
    ///
    /// May be empty.
    pub name: Name,

    /// A functional name for the consumer of the line, as set by whatever
    /// is using it.
    ///
    /// Empty if the line is unused.
    pub consumer: Name,

    /// The offset of the line on the chip.
    pub offset: Offset,

    /// The number of attributes active in `attrs`.
    pub num_attrs: u32,

    /// The configuration flags for the line.
    pub flags: LineFlags,

    /// Additional configuration attributes associated with the line.
    pub attrs: LineAttributes,

    /// Reserved for future use.
    #[doc(hidden)]
    pub padding: Padding<4>,
}

impl LineInfo {
    /// The nth attribute slot.
    #[inline]
    pub fn attr(&self, idx: usize) -> &LineAttribute {
        &self.attrs.0[idx]
    }

    /// The nth attribute slot, mutably.
    #[inline]
    pub fn attr_mut(&mut self, idx: usize) -> &mut LineAttribute {
        &mut self.attrs.0[idx]
    }

    /// Check that a LineInfo read from the kernel is valid in Rust.
    fn validate(&self) -> ValidationResult {
        if self.num_attrs > NUM_ATTRS_MAX as u32 {
            return Err(ValidationError::new(
                "num_attrs",
                format!("out of range: {}", self.num_attrs),
            ));
        }
        for i in 0..NUM_ATTRS_MAX {
            if let Err(e) = self.attrs.0[i].kind.validate() {
                return Err(ValidationError::new(format!("attrs[{i}].kind"), e));
            }
        }
        Ok(())
    }
}

/// Get the publicly available information for a line.
///
/// * `cf` - The open gpiochip device file.
/// * `offset` - The offset of the line.
#[inline]
pub fn get_line_info(cf: &File, offset: Offset) -> Result<LineInfo> {
    let mut li = LineInfo {
        offset,
        ..Default::default()
    };
    // SAFETY: the returned struct is validated before being returned.
    match unsafe { libc::ioctl(cf.as_raw_fd(), iorw!(Ioctl::GetLineInfo, LineInfo), &mut li) } {
        0 => li.validate().map(|_| li).map_err(Error::from),
        _ => Err(Error::from_errno()),
    }
}

/// Add a watch on changes to the [`LineInfo`] for a line.
///
/// Returns the current state of that information.
///
/// * `cf` - The open gpiochip device file.
/// * `offset` - The offset of the line to watch.
#[inline]
pub fn watch_line_info(cf: &File, offset: Offset) -> Result<LineInfo> {
    let mut li = LineInfo {
        offset,
        ..Default::default()
    };
    // SAFETY: the returned struct is validated before being returned.
    match unsafe {
        libc::ioctl(
            cf.as_raw_fd(),
            iorw!(Ioctl::WatchLineInfo, LineInfo),
            &mut li,
        )
    } {
        0 => li.validate().map(|_| li).map_err(Error::from),
        _ => Err(Error::from_errno()),
    }
}

/// The trigger identifier for a [`LineInfoChangeEvent`].
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InfoChangeKind {
    /// The line has been requested.
    Requested = 1,

    /// The line has been released.
    Released = 2,

    /// The line has been reconfigured.
    Reconfigured = 3,
}

impl TryFrom<u32> for InfoChangeKind {
    type Error = String;

    fn try_from(v: u32) -> std::result::Result<Self, Self::Error> {
        use InfoChangeKind::*;
        match v {
            x if x == Requested as u32 => Ok(Requested),
            x if x == Released as u32 => Ok(Released),
            x if x == Reconfigured as u32 => Ok(Reconfigured),
            x => Err(format!("invalid value: {x}")),
        }
    }
}

impl InfoChangeKind {
    /// Confirm that the value read from the kernel is valid in Rust.
    fn validate(&self) -> std::result::Result<(), String> {
        InfoChangeKind::try_from(*self as u32).map(|_| ())
    }
}

/// An event indicating a change to the info for a line.
#[repr(C)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineInfoChangeEvent {
    /// The new line info.
    pub info: LineInfo,

    /// The best estimate of the time of the change, in nanoseconds.
    pub timestamp_ns: u64,

    /// The trigger for the change.
    pub kind: InfoChangeKind,

    /// Reserved for future use.
    #[doc(hidden)]
    pub padding: Padding<5>,
}

impl LineInfoChangeEvent {
    /// Read an info change event from a buffer.
    ///
    /// The buffer is assumed to have been populated by a read of the chip
    /// file, so the content is validated before being returned.
    pub fn from_slice(d: &[u64]) -> Result<&LineInfoChangeEvent> {
        debug_assert!(std::mem::size_of::<LineInfoChangeEvent>() % 8 == 0);
        let len = d.len() * 8;
        if len < std::mem::size_of::<LineInfoChangeEvent>() {
            return Err(Error::from(UnderReadError::new(
                "LineInfoChangeEvent",
                std::mem::size_of::<LineInfoChangeEvent>(),
                len,
            )));
        }
        // SAFETY: the returned struct is validated before being returned.
        let ice = unsafe { &*(d as *const [u64] as *const LineInfoChangeEvent) };
        ice.validate().map(|_| ice).map_err(Error::from)
    }

    /// Check that a LineInfoChangeEvent read from the kernel is valid in Rust.
    fn validate(&self) -> ValidationResult {
        self.kind
            .validate()
            .map_err(|e| ValidationError::new("kind", e))
    }

    /// The number of u64 words required to store a LineInfoChangeEvent.
    pub fn u64_size() -> usize {
        std::mem::size_of::<LineInfoChangeEvent>() / 8
    }
}

/// The trigger identifier for a [`LineEdgeEvent`].
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EdgeEventKind {
    /// The line transitioned from *inactive* to *active*.
    Rising = 1,

    /// The line transitioned from *active* to *inactive*.
    Falling = 2,
}

impl TryFrom<u32> for EdgeEventKind {
    type Error = String;

    fn try_from(v: u32) -> std::result::Result<Self, Self::Error> {
        use EdgeEventKind::*;
        match v {
            x if x == Rising as u32 => Ok(Rising),
            x if x == Falling as u32 => Ok(Falling),
            x => Err(format!("invalid value: {x}")),
        }
    }
}

impl EdgeEventKind {
    /// Confirm that the value read from the kernel is valid in Rust.
    fn validate(&self) -> std::result::Result<(), String> {
        EdgeEventKind::try_from(*self as u32).map(|_| ())
    }
}

/// An edge event on a requested line.
#[repr(C)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineEdgeEvent {
    /// The best estimate of the time of the edge, in nanoseconds.
    ///
    /// By default the timestamp is read from **CLOCK_MONOTONIC**.
    /// If [`LineFlags::EVENT_CLOCK_REALTIME`] is set for the line then the
    /// timestamp is read from **CLOCK_REALTIME**.
    pub timestamp_ns: u64,

    /// The edge that triggered the event.
    pub kind: EdgeEventKind,

    /// The offset of the line that triggered the event.
    pub offset: Offset,

    /// The sequence number for this event in the sequence of events for
    /// all lines in the request.
    pub seqno: u32,

    /// The sequence number for this event in the sequence of events on
    /// this particular line.
    pub line_seqno: u32,

    /// Reserved for future use.
    #[doc(hidden)]
    pub padding: Padding<6>,
}

impl LineEdgeEvent {
    /// Read an edge event from a buffer.
    ///
    /// The buffer is assumed to have been populated by a read of the request
    /// file, so the content is validated before being returned.
    #[inline]
    pub fn from_slice(d: &[u64]) -> Result<&LineEdgeEvent> {
        debug_assert!(std::mem::size_of::<LineEdgeEvent>() % 8 == 0);
        let len = d.len() * 8;
        if len < std::mem::size_of::<LineEdgeEvent>() {
            return Err(Error::from(UnderReadError::new(
                "LineEdgeEvent",
                std::mem::size_of::<LineEdgeEvent>(),
                len,
            )));
        }
        // SAFETY: the returned struct is validated before being returned.
        let le = unsafe { &*(d as *const [u64] as *const LineEdgeEvent) };
        le.validate().map(|_| le).map_err(Error::from)
    }

    /// Check that a LineEdgeEvent read from the kernel is valid in Rust.
    fn validate(&self) -> ValidationResult {
        self.kind
            .validate()
            .map_err(|e| ValidationError::new("kind", e))
    }

    /// The number of u64 words required to store a LineEdgeEvent.
    pub fn u64_size() -> usize {
        std::mem::size_of::<LineEdgeEvent>() / 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    mod sizes {
        use super::*;

        #[test]
        fn line_attribute() {
            assert_eq!(size_of::<LineAttribute>(), 16usize);
            assert_eq!(size_of::<LineAttributeValueUnion>(), 8usize);
        }

        #[test]
        fn line_config_attribute() {
            assert_eq!(size_of::<LineConfigAttribute>(), 24usize);
        }

        #[test]
        fn line_config() {
            assert_eq!(size_of::<LineConfig>(), 272usize);
        }

        #[test]
        fn line_request() {
            assert_eq!(size_of::<LineRequest>(), 592usize);
        }

        #[test]
        fn line_values() {
            assert_eq!(size_of::<LineValues>(), 16usize);
        }

        #[test]
        fn line_info() {
            assert_eq!(size_of::<LineInfo>(), 256usize);
        }

        #[test]
        fn line_info_change_event() {
            assert_eq!(size_of::<LineInfoChangeEvent>(), 288usize);
        }

        #[test]
        fn line_edge_event() {
            assert_eq!(size_of::<LineEdgeEvent>(), 48usize);
        }
    }

    mod line_values {
        use super::LineValues;

        #[test]
        fn get() {
            let mut a = LineValues::default();
            for idx in [0, 2] {
                let bit = 0x1 << idx;
                assert_eq!(a.bits & bit, 0, "idx: {idx}");
                assert!(a.get(idx).is_none(), "idx: {idx}");

                a.mask |= bit;
                assert!(!a.get(idx).unwrap(), "idx: {idx}");

                a.bits |= bit;
                assert!(a.get(idx).unwrap(), "idx: {idx}");
            }
        }

        #[test]
        fn set() {
            let mut a = LineValues::default();
            a.set(0, false);
            assert_eq!(a.mask, 0x01);
            assert_eq!(a.bits, 0);

            a.set(0, true);
            assert_eq!(a.mask, 0x01);
            assert_eq!(a.bits, 0x01);

            a.set(4, true);
            assert_eq!(a.mask, 0x11);
            assert_eq!(a.bits, 0x11);

            a.set(4, false);
            assert_eq!(a.mask, 0x11);
            assert_eq!(a.bits, 0x01);
        }
    }

    mod line_config {
        use super::*;

        #[test]
        fn add_attrs() {
            let mut lc = LineConfig::default();
            lc.add_flags(LineFlags::INPUT | LineFlags::EDGE_RISING, 0b0110);
            lc.add_values(0b1000, 0b1001);
            lc.add_debounce(1234, 0b0001);
            assert_eq!(lc.num_attrs, 3);

            assert_eq!(lc.attr(0).mask, 0b0110);
            assert_eq!(
                lc.attr(0).attr.to_value(),
                Some(LineAttributeValue::Flags(
                    LineFlags::INPUT | LineFlags::EDGE_RISING
                ))
            );

            assert_eq!(lc.attr(1).mask, 0b1001);
            assert_eq!(
                lc.attr(1).attr.to_value(),
                Some(LineAttributeValue::Values(0b1000))
            );

            assert_eq!(lc.attr(2).mask, 0b0001);
            assert_eq!(
                lc.attr(2).attr.to_value(),
                Some(LineAttributeValue::DebouncePeriod(Duration::from_micros(
                    1234
                )))
            );
        }
    }

    mod line_attribute_kind {
        use super::LineAttributeKind;

        #[test]
        fn validate() {
            assert!(LineAttributeKind::Flags.validate().is_ok());
            assert!(LineAttributeKind::Unused.validate().is_ok());
            unsafe {
                let a = *(&4 as *const i32 as *const LineAttributeKind);
                assert_eq!(a.validate().unwrap_err(), "invalid value: 4");
                let a = *(&3 as *const i32 as *const LineAttributeKind);
                assert!(a.validate().is_ok());
            }
        }
    }

    mod line_info {
        use super::{LineAttributeKind, LineInfo, NUM_ATTRS_MAX};

        #[test]
        fn validate() {
            let mut a = LineInfo::default();
            assert!(a.validate().is_ok());

            a.num_attrs = NUM_ATTRS_MAX as u32;
            assert!(a.validate().is_ok());

            a.num_attrs += 1;
            let e = a.validate().unwrap_err();
            assert_eq!(e.field, "num_attrs");
            assert_eq!(e.msg, "out of range: 11");

            a.num_attrs = NUM_ATTRS_MAX as u32;
            for idx in [0, 3, 9] {
                unsafe {
                    a.attrs.0[idx].kind = *(&4 as *const i32 as *const LineAttributeKind);
                }
                let e = a.validate().unwrap_err();
                assert_eq!(e.field, format!("attrs[{idx}].kind"));
                assert_eq!(e.msg, "invalid value: 4");
                a.attrs.0[idx].kind = LineAttributeKind::Unused;
            }
        }
    }

    mod line_info_change_event {
        use super::{InfoChangeKind, LineInfoChangeEvent};

        #[test]
        fn validate() {
            let mut a = LineInfoChangeEvent {
                info: Default::default(),
                timestamp_ns: 1234,
                kind: InfoChangeKind::Released,
                padding: Default::default(),
            };
            assert!(a.validate().is_ok());

            unsafe {
                a.kind = *(&0 as *const i32 as *const InfoChangeKind);
                let e = a.validate().unwrap_err();
                assert_eq!(e.field, "kind");
                assert_eq!(e.msg, "invalid value: 0");

                a.kind = *(&4 as *const i32 as *const InfoChangeKind);
                assert!(a.validate().is_err());

                a.kind = *(&3 as *const i32 as *const InfoChangeKind);
                assert!(a.validate().is_ok());
            }
        }

        #[test]
        fn from_slice_under_read() {
            let d = [0u64; 10];
            let e = LineInfoChangeEvent::from_slice(&d).unwrap_err();
            assert_eq!(
                format!("{e}"),
                "Read 80 bytes for LineInfoChangeEvent, expected 288"
            );
        }
    }

    mod line_edge_event {
        use super::{EdgeEventKind, LineEdgeEvent};

        #[test]
        fn validate() {
            let mut a = LineEdgeEvent {
                timestamp_ns: 1234,
                kind: EdgeEventKind::Rising,
                offset: 0,
                seqno: 0,
                line_seqno: 0,
                padding: Default::default(),
            };
            assert!(a.validate().is_ok());

            unsafe {
                a.kind = *(&0 as *const i32 as *const EdgeEventKind);
                let e = a.validate().unwrap_err();
                assert_eq!(e.field, "kind");
                assert_eq!(e.msg, "invalid value: 0");

                a.kind = *(&3 as *const i32 as *const EdgeEventKind);
                assert!(a.validate().is_err());

                a.kind = *(&2 as *const i32 as *const EdgeEventKind);
                assert!(a.validate().is_ok());
            }
        }

        #[test]
        fn from_slice() {
            let mut d = [0u64; 6];
            d[0] = 1234;
            d[1] = 1 | (3 << 32); // rising on offset 3
            d[2] = 7 | (5 << 32); // seqno 7, line_seqno 5
            let le = LineEdgeEvent::from_slice(&d).unwrap();
            assert_eq!(le.timestamp_ns, 1234);
            assert_eq!(le.kind, EdgeEventKind::Rising);
            assert_eq!(le.offset, 3);
            assert_eq!(le.seqno, 7);
            assert_eq!(le.line_seqno, 5);

            let e = LineEdgeEvent::from_slice(&d[..5]).unwrap_err();
            assert_eq!(format!("{e}"), "Read 40 bytes for LineEdgeEvent, expected 48");
        }
    }
}
