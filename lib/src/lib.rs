// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library for configuring and requesting GPIO lines on Linux platforms
//! using the GPIO character device.
//!
//! Lines are reserved from a [`chip::Chip`] by pairing a [`request::Config`],
//! which names the lines, with a [`line::Config`], which describes how they
//! should behave. The resulting [`request::Request`] performs value I/O,
//! reconfiguration and edge event reads on the reserved lines.
//!
//! To request and read a basic input line:
//! ```no_run
//! # fn main() -> linedev::Result<()> {
//! let chip = linedev::chip::Chip::from_path("/dev/gpiochip0")?;
//! let mut rcfg = linedev::request::Config::default();
//! rcfg.set_consumer("myapp").set_offsets(&[3]);
//! let req = chip.request_lines(&rcfg, &linedev::line::Config::default())?;
//! let value = req.value(3)?;
//! # Ok(())
//! # }
//! ```

use linedev_uapi as uapi;
use std::fmt;
use std::path::PathBuf;

/// Types and functions specific to chips.
pub mod chip;

/// Types specific to lines.
pub mod line;

/// Types and functions related to requesting lines.
pub mod request;

pub use request::Request;

/// Errors returned by [`linedev`] functions.
///
/// [`linedev`]: crate
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// Problem accessing GPIO chip character devices.
    #[error("\"{0}\" {1}.")]
    GpioChip(PathBuf, chip::ErrorKind),

    /// An error returned when there is a problem with an argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// The offset is not one of the lines in the request.
    #[error("offset {0} is not a line in the request")]
    NotRequested(line::Offset),

    /// The request has been released and can no longer be used.
    #[error("the request has been released")]
    RequestClosed,

    /// A line configuration requires more distinct attribute groups than
    /// the uAPI can carry in one request.
    #[error("configuration requires {required} attribute groups, the uAPI supports at most {max}")]
    TooManyDistinctConfigurations {
        /// The number of groups the configuration compiles to.
        required: usize,
        /// The protocol limit.
        max: usize,
    },

    /// An error returned from an underlying os call.
    #[error(transparent)]
    Os(#[from] uapi::Errno),

    /// An error returned from an underlying uAPI call.
    #[error("uAPI {0} returned: {1}")]
    Uapi(UapiCall, #[source] uapi::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Os(uapi::Errno(e.raw_os_error().unwrap_or(0)))
    }
}

/// Identifiers for the underlying uAPI calls.
#[doc(hidden)]
#[derive(Debug, Eq, PartialEq)]
pub enum UapiCall {
    GetChipInfo,
    GetLine,
    GetLineInfo,
    GetLineValues,
    HasEvent,
    ReadEvent,
    SetLineConfig,
    SetLineValues,
    UnwatchLineInfo,
    WaitEvent,
    WatchLineInfo,
    EdgeEventFromBuf,
    InfoChangeEventFromBuf,
}

impl fmt::Display for UapiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UapiCall::GetChipInfo => "get_chip_info",
            UapiCall::GetLine => "get_line",
            UapiCall::GetLineInfo => "get_line_info",
            UapiCall::GetLineValues => "get_line_values",
            UapiCall::HasEvent => "has_event",
            UapiCall::ReadEvent => "read_event",
            UapiCall::SetLineConfig => "set_line_config",
            UapiCall::SetLineValues => "set_line_values",
            UapiCall::UnwatchLineInfo => "unwatch_line_info",
            UapiCall::WaitEvent => "wait_event",
            UapiCall::WatchLineInfo => "watch_line_info",
            UapiCall::EdgeEventFromBuf => "LineEdgeEvent::from_slice",
            UapiCall::InfoChangeEventFromBuf => "LineInfoChangeEvent::from_slice",
        };
        write!(f, "{}", name)
    }
}

/// The result for [`linedev`] functions.
///
/// [`linedev`]: crate
pub type Result<T> = std::result::Result<T, Error>;
