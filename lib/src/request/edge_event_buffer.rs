// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::EdgeEvent;
use crate::{Error, Result, UapiCall};
use linedev_uapi::v2;

/// The default capacity of an [`EdgeEventBuffer`], in events.
pub const DEFAULT_CAPACITY: usize = 64;

/// The maximum capacity of an [`EdgeEventBuffer`], in events.
pub const MAX_CAPACITY: usize = 1024;

/// A user space buffer for reading edge events in bulk from a [`Request`].
///
/// One read from the kernel can fill the buffer with up to its capacity in
/// events, which are then available through [`events`] or [`iter`].
/// Each read replaces the previously held events wholesale.
///
/// The buffer is not tied to a particular request and may be reused across
/// requests.
///
/// [`Request`]: crate::Request
/// [`events`]: EdgeEventBuffer::events
/// [`iter`]: EdgeEventBuffer::iter
#[derive(Clone, Debug)]
pub struct EdgeEventBuffer {
    // raw event words as read from the kernel
    raw: Vec<u64>,

    events: Vec<EdgeEvent>,
}

impl EdgeEventBuffer {
    /// Create a buffer with capacity for the given number of events.
    ///
    /// The capacity is clamped to the range [1, [`MAX_CAPACITY`]].
    pub fn new(capacity: usize) -> EdgeEventBuffer {
        let capacity = capacity.clamp(1, MAX_CAPACITY);
        EdgeEventBuffer {
            raw: vec![0; capacity * v2::LineEdgeEvent::u64_size()],
            events: Vec::with_capacity(capacity),
        }
    }

    /// The maximum number of events a single read can return.
    pub fn capacity(&self) -> usize {
        self.raw.len() / v2::LineEdgeEvent::u64_size()
    }

    /// The number of events from the most recent read.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the buffer holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The indexed event from the most recent read.
    pub fn get(&self, idx: usize) -> Option<&EdgeEvent> {
        self.events.get(idx)
    }

    /// The events from the most recent read, in kernel order.
    pub fn events(&self) -> &[EdgeEvent] {
        &self.events
    }

    /// Iterate over the events from the most recent read.
    pub fn iter(&self) -> std::slice::Iter<'_, EdgeEvent> {
        self.events.iter()
    }

    /// The raw space for a read of up to `n_events` events.
    pub(super) fn raw_mut(&mut self, n_events: usize) -> &mut [u64] {
        &mut self.raw[..n_events * v2::LineEdgeEvent::u64_size()]
    }

    /// Decode the first `n_words` raw words into events, replacing any
    /// previously held events.
    pub(super) fn decode_raw(&mut self, n_words: usize) -> Result<usize> {
        self.events.clear();
        for chunk in self.raw[..n_words].chunks_exact(v2::LineEdgeEvent::u64_size()) {
            let le = v2::LineEdgeEvent::from_slice(chunk)
                .map_err(|e| Error::Uapi(UapiCall::EdgeEventFromBuf, e))?;
            self.events.push(EdgeEvent::from(le));
        }
        Ok(self.events.len())
    }
}

impl Default for EdgeEventBuffer {
    fn default() -> Self {
        EdgeEventBuffer::new(DEFAULT_CAPACITY)
    }
}

impl<'a> IntoIterator for &'a EdgeEventBuffer {
    type Item = &'a EdgeEvent;
    type IntoIter = std::slice::Iter<'a, EdgeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::EdgeKind;

    fn raw_event(offset: u32, kind: u64, seqno: u64, line_seqno: u64) -> [u64; 6] {
        let mut d = [0u64; 6];
        d[0] = 1234;
        d[1] = kind | ((offset as u64) << 32);
        d[2] = seqno | (line_seqno << 32);
        d
    }

    fn fill(buf: &mut EdgeEventBuffer, events: &[[u64; 6]]) -> Result<usize> {
        let raw = buf.raw_mut(events.len());
        for (idx, e) in events.iter().enumerate() {
            raw[idx * 6..(idx + 1) * 6].copy_from_slice(e);
        }
        buf.decode_raw(events.len() * 6)
    }

    #[test]
    fn new_clamps_capacity() {
        assert_eq!(EdgeEventBuffer::new(0).capacity(), 1);
        assert_eq!(EdgeEventBuffer::new(42).capacity(), 42);
        assert_eq!(EdgeEventBuffer::new(100000).capacity(), MAX_CAPACITY);
    }

    #[test]
    fn default_capacity() {
        assert_eq!(EdgeEventBuffer::default().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn decode_raw() {
        let mut buf = EdgeEventBuffer::new(4);
        assert!(buf.is_empty());

        let n = fill(&mut buf, &[raw_event(3, 1, 1, 1), raw_event(5, 2, 2, 1)]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(buf.len(), 2);
        assert!(!buf.is_empty());

        let ee = buf.get(0).unwrap();
        assert_eq!(ee.offset, 3);
        assert_eq!(ee.kind, EdgeKind::Rising);
        assert_eq!(ee.seqno, 1);
        assert_eq!(ee.line_seqno, 1);

        let ee = buf.get(1).unwrap();
        assert_eq!(ee.offset, 5);
        assert_eq!(ee.kind, EdgeKind::Falling);
        assert_eq!(ee.seqno, 2);

        assert!(buf.get(2).is_none());
    }

    #[test]
    fn decode_raw_replaces_events() {
        let mut buf = EdgeEventBuffer::new(4);
        fill(&mut buf, &[raw_event(3, 1, 1, 1), raw_event(5, 2, 2, 1)]).unwrap();
        assert_eq!(buf.len(), 2);

        fill(&mut buf, &[raw_event(7, 1, 3, 1)]).unwrap();
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.get(0).unwrap().offset, 7);
    }

    #[test]
    fn decode_raw_invalid_kind() {
        let mut buf = EdgeEventBuffer::new(4);
        let e = fill(&mut buf, &[raw_event(3, 42, 1, 1)]).unwrap_err();
        assert_eq!(
            format!("{}", e),
            "uAPI LineEdgeEvent::from_slice returned: Kernel returned invalid kind: invalid value: 42"
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn iter() {
        let mut buf = EdgeEventBuffer::new(4);
        fill(
            &mut buf,
            &[raw_event(3, 1, 1, 1), raw_event(5, 2, 2, 1), raw_event(3, 2, 3, 2)],
        )
        .unwrap();
        let offsets: Vec<u32> = buf.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, &[3, 5, 3]);
        let kinds: Vec<EdgeKind> = (&buf).into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, &[EdgeKind::Rising, EdgeKind::Falling, EdgeKind::Falling]);
    }
}
