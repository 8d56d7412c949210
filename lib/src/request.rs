// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod config;
pub use self::config::Config;

mod edge_event_buffer;
pub use self::edge_event_buffer::{EdgeEventBuffer, DEFAULT_CAPACITY, MAX_CAPACITY};

use crate::line::{self, EdgeEvent, Offset, Value};
use crate::{Error, Result, UapiCall};
use linedev_uapi as uapi;
use linedev_uapi::v2;
use std::fs::File;
use std::mem;
use std::os::unix::prelude::AsRawFd;
use std::time::Duration;

/// An active request of a set of lines.
///
/// Requests are created by [`Chip::request_lines`](crate::chip::Chip::request_lines)
/// and hold the requested lines until released or dropped.
///
/// # Output Lifetime
///
/// The value of an output line is only guaranteed for the lifetime of the
/// request. If the request is dropped then the output value becomes
/// indeterminate - it may remain unchanged or it may reset to a default value,
/// depending on the kernel driver for the hardware.
///
/// So keep the request alive to be sure of the output value.
///
/// # Reading Output Values
///
/// Note that reading back output values using [`value`] or [`values`] is
/// dependent on driver and hardware support and so cannot be guaranteed to
/// work, though frequently it does. Test with your particular hardware to
/// be sure.
///
/// [`value`]: #method.value
/// [`values`]: #method.values
#[derive(Debug)]
pub struct Request {
    /// The request file, until the request is released.
    f: Option<File>,

    /// The offsets of the requested lines, in requested order.
    offsets: Vec<Offset>,
}

impl Request {
    pub(crate) fn new(f: File, offsets: Vec<Offset>) -> Request {
        Request {
            f: Some(f),
            offsets,
        }
    }

    /// The offsets of the requested lines, in requested order.
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// The number of lines in the request.
    pub fn num_lines(&self) -> usize {
        self.offsets.len()
    }

    /// The file descriptor of the underlying request file.
    ///
    /// May be used to poll for edge events from other event loops.
    pub fn fd(&self) -> Result<i32> {
        Ok(self.file()?.as_raw_fd())
    }

    /// Get the value for one line in the request.
    pub fn value(&self, offset: Offset) -> Result<Value> {
        let f = self.file()?;
        let idx = self.index_of(offset)?;
        let mut vals = v2::LineValues {
            mask: 0x01 << idx,
            ..Default::default()
        };
        v2::get_line_values(f, &mut vals).map_err(|e| Error::Uapi(UapiCall::GetLineValues, e))?;
        Ok(vals.get(idx).unwrap_or(false).into())
    }

    /// Get the values of all lines in the request, in requested order.
    ///
    /// All values are read from the kernel in one operation.
    pub fn values(&self) -> Result<Vec<Value>> {
        let f = self.file()?;
        let mut vals = v2::LineValues::default();
        for idx in 0..self.offsets.len() {
            vals.mask |= 0x01 << idx;
        }
        v2::get_line_values(f, &mut vals).map_err(|e| Error::Uapi(UapiCall::GetLineValues, e))?;
        Ok((0..self.offsets.len())
            .map(|idx| vals.get(idx).unwrap_or(false).into())
            .collect())
    }

    /// Get the values for a subset of the requested lines.
    ///
    /// The values are returned in the order of the given offsets.
    /// All values are read from the kernel in one operation.
    pub fn values_subset(&self, offsets: &[Offset]) -> Result<Vec<Value>> {
        let f = self.file()?;
        let mut idxs = Vec::with_capacity(offsets.len());
        let mut vals = v2::LineValues::default();
        for offset in offsets {
            let idx = self.index_of(*offset)?;
            idxs.push(idx);
            vals.mask |= 0x01 << idx;
        }
        v2::get_line_values(f, &mut vals).map_err(|e| Error::Uapi(UapiCall::GetLineValues, e))?;
        Ok(idxs
            .into_iter()
            .map(|idx| vals.get(idx).unwrap_or(false).into())
            .collect())
    }

    /// Set the value for one line in the request.
    ///
    /// Setting an input line is an error.
    pub fn set_value(&self, offset: Offset, value: Value) -> Result<()> {
        let f = self.file()?;
        let idx = self.index_of(offset)?;
        let mut vals = v2::LineValues::default();
        vals.set(idx, value.into());
        v2::set_line_values(f, &vals).map_err(|e| Error::Uapi(UapiCall::SetLineValues, e))
    }

    /// Set the values of all lines in the request.
    ///
    /// The values are applied in requested order, and must cover every line
    /// in the request. All values are written to the kernel in one operation.
    pub fn set_values(&self, values: &[Value]) -> Result<()> {
        let f = self.file()?;
        if values.len() != self.offsets.len() {
            return Err(Error::InvalidArgument(format!(
                "requires a value for each of the {} requested lines",
                self.offsets.len()
            )));
        }
        let mut vals = v2::LineValues::default();
        for (idx, value) in values.iter().enumerate() {
            vals.set(idx, (*value).into());
        }
        v2::set_line_values(f, &vals).map_err(|e| Error::Uapi(UapiCall::SetLineValues, e))
    }

    /// Set the values for a subset of the requested lines.
    ///
    /// The offsets and values are paired by index, and must be of equal
    /// length. All values are written to the kernel in one operation.
    pub fn set_values_subset(&self, offsets: &[Offset], values: &[Value]) -> Result<()> {
        let f = self.file()?;
        if values.len() != offsets.len() {
            return Err(Error::InvalidArgument(
                "requires one value for each offset".to_string(),
            ));
        }
        let mut vals = v2::LineValues::default();
        for (offset, value) in offsets.iter().zip(values.iter()) {
            vals.set(self.index_of(*offset)?, (*value).into());
        }
        v2::set_line_values(f, &vals).map_err(|e| Error::Uapi(UapiCall::SetLineValues, e))
    }

    /// Apply an updated line configuration to the request.
    ///
    /// The configuration is applied to the requested lines as a whole.
    /// If the kernel rejects it the lines retain their previous
    /// configuration, but no rollback of partially applied state is
    /// attempted beyond what the kernel itself guarantees.
    pub fn reconfigure(&self, cfg: &line::Config) -> Result<()> {
        let f = self.file()?;
        let lc = cfg.to_uapi(&self.offsets)?;
        v2::set_line_config(f, lc).map_err(|e| Error::Uapi(UapiCall::SetLineConfig, e))
    }

    /// Returns true when the request has edge events available to read.
    pub fn has_edge_event(&self) -> Result<bool> {
        uapi::has_event(self.file()?).map_err(|e| Error::Uapi(UapiCall::HasEvent, e))
    }

    /// Wait for an edge event to be available.
    ///
    /// A `None` timeout blocks until an event is available.
    /// Returns false if the timeout expires with no event available.
    pub fn wait_edge_event(&self, timeout: Option<Duration>) -> Result<bool> {
        uapi::wait_event(self.file()?, timeout).map_err(|e| Error::Uapi(UapiCall::WaitEvent, e))
    }

    /// Read a single edge event from the request.
    ///
    /// Will block until an edge event is available.
    ///
    /// Reading a burst of events with [`read_edge_events`] may be more
    /// performant.
    ///
    /// [`read_edge_events`]: #method.read_edge_events
    pub fn read_edge_event(&self) -> Result<EdgeEvent> {
        let f = self.file()?;
        let mut buf = [0u64; mem::size_of::<v2::LineEdgeEvent>() / 8];
        let n = uapi::read_event(f, &mut buf).map_err(|e| Error::Uapi(UapiCall::ReadEvent, e))?;
        let le = v2::LineEdgeEvent::from_slice(&buf[..n])
            .map_err(|e| Error::Uapi(UapiCall::EdgeEventFromBuf, e))?;
        Ok(EdgeEvent::from(le))
    }

    /// Read a burst of edge events from the request into a buffer.
    ///
    /// Will block until at least one edge event is available.
    ///
    /// At most `max_events` events are read, further limited by the buffer
    /// capacity. Events from any previous read are replaced.
    /// Returns the number of events read.
    pub fn read_edge_events(&self, buf: &mut EdgeEventBuffer, max_events: usize) -> Result<usize> {
        let f = self.file()?;
        let n = max_events.clamp(1, buf.capacity());
        let words =
            uapi::read_event(f, buf.raw_mut(n)).map_err(|e| Error::Uapi(UapiCall::ReadEvent, e))?;
        buf.decode_raw(words)
    }

    /// Release the requested lines, returning them to the kernel.
    ///
    /// Subsequent operations on the request fail with
    /// [`Error::RequestClosed`]. Dropping the request has the same effect
    /// on the lines without the explicit error.
    pub fn release(&mut self) -> Result<()> {
        match self.f.take() {
            Some(f) => {
                drop(f);
                Ok(())
            }
            None => Err(Error::RequestClosed),
        }
    }

    fn file(&self) -> Result<&File> {
        self.f.as_ref().ok_or(Error::RequestClosed)
    }

    fn index_of(&self, offset: Offset) -> Result<usize> {
        self.offsets
            .iter()
            .position(|o| *o == offset)
            .ok_or(Error::NotRequested(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // a request backed by a file that accepts no ioctls
    fn dud_request() -> Request {
        Request::new(File::open("/dev/null").unwrap(), vec![1, 5, 7])
    }

    #[test]
    fn offsets() {
        let req = dud_request();
        assert_eq!(req.offsets(), &[1, 5, 7]);
        assert_eq!(req.num_lines(), 3);
    }

    #[test]
    fn fd() {
        let req = dud_request();
        assert!(req.fd().unwrap() >= 0);
    }

    #[test]
    fn value_not_requested() {
        let req = dud_request();
        assert_eq!(req.value(3).unwrap_err(), Error::NotRequested(3));
    }

    #[test]
    fn value_uapi_failure() {
        let req = dud_request();
        // /dev/null does not support the ioctl
        assert!(matches!(
            req.value(5),
            Err(Error::Uapi(UapiCall::GetLineValues, _))
        ));
    }

    #[test]
    fn values_subset_not_requested() {
        let req = dud_request();
        assert_eq!(
            req.values_subset(&[1, 4]).unwrap_err(),
            Error::NotRequested(4)
        );
    }

    #[test]
    fn set_value_not_requested() {
        let req = dud_request();
        assert_eq!(
            req.set_value(0, Value::Active).unwrap_err(),
            Error::NotRequested(0)
        );
    }

    #[test]
    fn set_values_requires_all_lines() {
        let req = dud_request();
        assert_eq!(
            req.set_values(&[Value::Active, Value::Inactive]).unwrap_err(),
            Error::InvalidArgument("requires a value for each of the 3 requested lines".to_string())
        );
    }

    #[test]
    fn set_values_subset_length_mismatch() {
        let req = dud_request();
        assert_eq!(
            req.set_values_subset(&[1, 5], &[Value::Active]).unwrap_err(),
            Error::InvalidArgument("requires one value for each offset".to_string())
        );
    }

    #[test]
    fn reconfigure_too_many_distinct() {
        let offsets: Vec<Offset> = (0..11).collect();
        let req = Request::new(File::open("/dev/null").unwrap(), offsets.clone());
        let mut cfg = line::Config::new();
        for offset in &offsets {
            cfg.set_override(
                *offset,
                line::SettingValue::DebouncePeriod(Duration::from_micros(1 + *offset as u64)),
            );
        }
        assert_eq!(
            req.reconfigure(&cfg).unwrap_err(),
            Error::TooManyDistinctConfigurations {
                required: 11,
                max: 10
            }
        );
    }

    #[test]
    fn release() {
        let mut req = dud_request();
        assert!(req.release().is_ok());
        assert_eq!(req.value(5).unwrap_err(), Error::RequestClosed);
        assert_eq!(req.fd().unwrap_err(), Error::RequestClosed);
        assert_eq!(req.has_edge_event().unwrap_err(), Error::RequestClosed);
        assert_eq!(req.release().unwrap_err(), Error::RequestClosed);
    }

    #[test]
    fn read_edge_events_released() {
        let mut req = dud_request();
        req.release().unwrap();
        let mut buf = EdgeEventBuffer::default();
        assert_eq!(
            req.read_edge_events(&mut buf, 10).unwrap_err(),
            Error::RequestClosed
        );
    }
}
