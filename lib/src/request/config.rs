// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::Offset;
use linedev_uapi::{v2, NAME_LEN_MAX, NUM_LINES_MAX};

/// The request-level configuration for a set of lines.
///
/// Identifies the lines to reserve and the request attributes that are not
/// per-line, such as the consumer label. How the lines behave is described
/// separately by a [`line::Config`](crate::line::Config).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    consumer: String,
    offsets: Vec<Offset>,
    event_buffer_size: u32,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Set the consumer label for the request.
    ///
    /// The label is reported as the consumer in the [`Info`](crate::line::Info)
    /// of the requested lines. Labels longer than the uAPI name field allows
    /// are truncated at a character boundary.
    pub fn set_consumer(&mut self, consumer: &str) -> &mut Self {
        // one byte reserved for the null terminator
        let mut n = consumer.len().min(NAME_LEN_MAX - 1);
        while !consumer.is_char_boundary(n) {
            n -= 1;
        }
        self.consumer = consumer[..n].to_string();
        self
    }

    /// The consumer label for the request.
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    /// Set the lines to be requested.
    ///
    /// Duplicate offsets are dropped, retaining the first occurrence, and
    /// offsets beyond the uAPI limit on lines per request are discarded.
    pub fn set_offsets(&mut self, offsets: &[Offset]) -> &mut Self {
        self.offsets.clear();
        for offset in offsets {
            if self.offsets.len() == NUM_LINES_MAX {
                break;
            }
            if !self.offsets.contains(offset) {
                self.offsets.push(*offset);
            }
        }
        self
    }

    /// The lines to be requested, in requested order.
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// The number of lines to be requested.
    pub fn num_lines(&self) -> usize {
        self.offsets.len()
    }

    /// Suggest a minimum number of edge events the kernel should buffer.
    ///
    /// Only relevant if edge detection is enabled on the requested lines.
    /// The kernel may allocate a larger buffer or cap the size. Zero selects
    /// the kernel default.
    pub fn set_event_buffer_size(&mut self, size: u32) -> &mut Self {
        self.event_buffer_size = size;
        self
    }

    /// The suggested edge event buffer size.
    pub fn event_buffer_size(&self) -> u32 {
        self.event_buffer_size
    }

    /// Build the uAPI request, leaving the line config for the caller.
    pub(crate) fn to_uapi(&self) -> v2::LineRequest {
        v2::LineRequest {
            offsets: v2::Offsets::from_slice(&self.offsets),
            consumer: self.consumer.as_str().into(),
            num_lines: self.offsets.len() as u32,
            event_buffer_size: self.event_buffer_size,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_consumer() {
        let mut cfg = Config::new();
        assert_eq!(cfg.consumer(), "");
        cfg.set_consumer("myapp");
        assert_eq!(cfg.consumer(), "myapp");
    }

    #[test]
    fn set_consumer_truncates() {
        let mut cfg = Config::new();
        cfg.set_consumer("an overly long name that cannot possibly fit");
        assert_eq!(cfg.consumer().len(), 31);
        assert_eq!(cfg.consumer(), "an overly long name that cannot");
    }

    #[test]
    fn set_consumer_truncates_at_char_boundary() {
        let mut cfg = Config::new();
        // 30 ascii bytes then a multi-byte char that would straddle the cut
        let consumer = "012345678901234567890123456789é";
        cfg.set_consumer(consumer);
        assert_eq!(cfg.consumer(), "012345678901234567890123456789");
    }

    #[test]
    fn set_offsets() {
        let mut cfg = Config::new();
        cfg.set_offsets(&[3, 1, 4, 1, 5, 3]);
        assert_eq!(cfg.offsets(), &[3, 1, 4, 5]);
        assert_eq!(cfg.num_lines(), 4);

        cfg.set_offsets(&[2, 7]);
        assert_eq!(cfg.offsets(), &[2, 7]);
    }

    #[test]
    fn set_offsets_clamps_to_max_lines() {
        let offsets: Vec<Offset> = (0..70).collect();
        let mut cfg = Config::new();
        cfg.set_offsets(&offsets);
        assert_eq!(cfg.num_lines(), NUM_LINES_MAX);
        assert_eq!(cfg.offsets()[NUM_LINES_MAX - 1], (NUM_LINES_MAX - 1) as u32);
    }

    #[test]
    fn to_uapi() {
        let mut cfg = Config::new();
        cfg.set_consumer("myapp")
            .set_offsets(&[3, 1, 4])
            .set_event_buffer_size(42);
        let lr = cfg.to_uapi();
        assert_eq!(lr.num_lines, 3);
        assert_eq!(lr.offsets.get(0), 3);
        assert_eq!(lr.offsets.get(1), 1);
        assert_eq!(lr.offsets.get(2), 4);
        assert_eq!(String::from(&lr.consumer), "myapp");
        assert_eq!(lr.event_buffer_size, 42);
        assert_eq!(lr.config.num_attrs, 0);
    }
}
