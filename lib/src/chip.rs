// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::line::Offset;
use crate::{line, line::InfoChangeEvent, request, Error, Request, Result, UapiCall};
use linedev_uapi as uapi;
use linedev_uapi::v2;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::mem;
use std::ops::Range;
use std::os::linux::fs::MetadataExt;
use std::os::unix::prelude::{AsFd, AsRawFd, BorrowedFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CHARDEV_MODE: u32 = 0x2000;

/// Check if a path corresponds to a GPIO character device.
///
/// Returns the resolved path to the character device.
pub fn is_chip<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let pb = fs::canonicalize(&path)?;
    // if canonical path is of form /dev/gpiochipXX assume we are good
    if let Some(pbstr) = pb.to_str() {
        if let Some(num) = pbstr.strip_prefix("/dev/gpiochip") {
            if num.chars().all(|c| char::is_digit(c, 10)) {
                return Ok(pb);
            }
        }
    }

    // else take a more detailed look...
    let m = fs::metadata(&pb)?;
    if m.st_mode() & CHARDEV_MODE == 0 {
        return Err(Error::GpioChip(pb, ErrorKind::NotCharacterDevice));
    }
    let mut sysfs_dev = PathBuf::from("/sys/bus/gpio/devices");
    sysfs_dev.push(pb.file_name().unwrap_or_default());
    sysfs_dev.push("dev");
    if let Ok(rdev) = fs::read_to_string(sysfs_dev) {
        let st_rdev = m.st_rdev();
        let dev_str = format!("{}:{}", (st_rdev as u16 >> 8) as u8, st_rdev as u8);
        if rdev.trim_end() == dev_str {
            return Ok(pb);
        }
    }
    Err(Error::GpioChip(pb, ErrorKind::NotGpioDevice))
}

/// An iterator that returns the info for each line on the [`Chip`].
pub struct LineInfoIterator<'a> {
    chip: &'a Chip,
    offsets: Range<Offset>,
}

impl<'a> Iterator for LineInfoIterator<'a> {
    type Item = Result<line::Info>;

    fn next(&mut self) -> Option<Result<line::Info>> {
        self.offsets
            .next()
            .map(|offset| self.chip.line_info(offset))
    }
}

/// A GPIO character device.
#[derive(Debug)]
pub struct Chip {
    /// The resolved path of the GPIO character device.
    path: PathBuf,

    /// The open GPIO character device file.
    f: fs::File,
}

impl Chip {
    /// Constructs a Chip using the given path.
    ///
    /// The path must resolve to a valid GPIO character device.
    ///
    /// # Examples
    ///```no_run
    /// # fn example() -> linedev::Result<linedev::chip::Chip>{
    /// let chip = linedev::chip::Chip::from_path("/dev/gpiochip0")?;
    /// # Ok(chip)
    /// # }
    ///```
    pub fn from_path<P: AsRef<Path>>(p: P) -> Result<Chip> {
        let path = is_chip(p.as_ref())?;
        let f = fs::File::open(&path)?;
        Ok(Chip { path, f })
    }

    /// Constructs a Chip using the given name.
    ///
    /// The name must resolve to a valid GPIO character device.
    ///
    /// # Examples
    ///```no_run
    /// # fn example() -> linedev::Result<linedev::chip::Chip>{
    /// let chip = linedev::chip::Chip::from_name("gpiochip0")?;
    /// # Ok(chip)
    /// # }
    ///```
    pub fn from_name(n: &str) -> Result<Chip> {
        let path = is_chip(format!("/dev/{}", n))?;
        let f = fs::File::open(&path)?;
        Ok(Chip { path, f })
    }

    /// Get the information for the chip.
    pub fn info(&self) -> Result<Info> {
        Ok(Info::from(
            uapi::get_chip_info(&self.f).map_err(|e| Error::Uapi(UapiCall::GetChipInfo, e))?,
        ))
    }

    /// Return the name of the chip.
    ///
    /// This is based on the filename component of the resolved chip path, not
    /// the name from the [`Info`], so it does not involve any system calls.
    ///
    /// [`Info`]: Info
    pub fn name(&self) -> String {
        // The unwrap can only fail for directories, and the path is known to refer to a file.
        String::from(self.path.file_name().unwrap().to_string_lossy())
    }

    /// Return the path of the chip.
    pub fn path(&self) -> &Path {
        self.path.as_ref()
    }

    /// Request a set of lines on the chip.
    ///
    /// The request config identifies which lines to reserve and the line
    /// config how they should behave. The requested lines are reserved for
    /// exclusive use by the returned [`Request`] until it is released or
    /// dropped.
    ///
    /// # Examples
    ///```no_run
    /// # fn example() -> linedev::Result<linedev::Request> {
    /// use linedev::line::{EdgeDetection, SettingValue};
    ///
    /// let chip = linedev::chip::Chip::from_path("/dev/gpiochip0")?;
    /// let mut rcfg = linedev::request::Config::default();
    /// rcfg.set_consumer("watcher").set_offsets(&[3, 5]);
    /// let mut lcfg = linedev::line::Config::default();
    /// lcfg.set_default(SettingValue::EdgeDetection(EdgeDetection::Both));
    /// let req = chip.request_lines(&rcfg, &lcfg)?;
    /// # Ok(req)
    /// # }
    ///```
    pub fn request_lines(&self, rcfg: &request::Config, lcfg: &line::Config) -> Result<Request> {
        if rcfg.num_lines() == 0 {
            return Err(Error::InvalidArgument(
                "no lines requested".to_string(),
            ));
        }
        let mut lr = rcfg.to_uapi();
        lr.config = lcfg.to_uapi(rcfg.offsets())?;
        let f = v2::get_line(&self.f, lr).map_err(|e| Error::Uapi(UapiCall::GetLine, e))?;
        Ok(Request::new(f, rcfg.offsets().to_vec()))
    }

    /// Find the info for the named line.
    ///
    /// Returns the first matching line.
    pub fn find_line_info(&self, name: &str) -> Option<line::Info> {
        self.line_info_iter()
            .ok()
            .and_then(|iter| iter.filter_map(|x| x.ok()).find(|li| li.name == name))
    }

    /// Get the information for a line on the chip.
    pub fn line_info(&self, offset: Offset) -> Result<line::Info> {
        v2::get_line_info(&self.f, offset)
            .map(|li| line::Info::from(&li))
            .map_err(|e| Error::Uapi(UapiCall::GetLineInfo, e))
    }

    /// An iterator that returns the info for each line on the chip.
    pub fn line_info_iter(&self) -> Result<LineInfoIterator<'_>> {
        let cinfo = self.info()?;
        Ok(LineInfoIterator {
            chip: self,
            offsets: Range {
                start: 0,
                end: cinfo.num_lines,
            },
        })
    }

    /// Add a watch for changes to the publicly available information on a line.
    ///
    /// Returns the current state of that information.
    ///
    /// This is a null operation if there is already a watch on the line.
    pub fn watch_line_info(&self, offset: Offset) -> Result<line::Info> {
        v2::watch_line_info(&self.f, offset)
            .map(|li| line::Info::from(&li))
            .map_err(|e| Error::Uapi(UapiCall::WatchLineInfo, e))
    }

    /// Remove a watch for changes to the publicly available information on a line.
    ///
    /// This is a null operation if there is no existing watch on the line.
    pub fn unwatch_line_info(&self, offset: Offset) -> Result<()> {
        uapi::unwatch_line_info(&self.f, offset)
            .map_err(|e| Error::Uapi(UapiCall::UnwatchLineInfo, e))
    }

    /// Check if the chip has at least one info change event available to read.
    pub fn has_line_info_change_event(&self) -> Result<bool> {
        uapi::has_event(&self.f).map_err(|e| Error::Uapi(UapiCall::HasEvent, e))
    }

    /// Wait for an info change event to be available.
    ///
    /// A `None` timeout blocks until an event is available.
    /// Returns false if the timeout expires with no event available.
    pub fn wait_line_info_change_event(&self, timeout: Option<Duration>) -> Result<bool> {
        uapi::wait_event(&self.f, timeout).map_err(|e| Error::Uapi(UapiCall::WaitEvent, e))
    }

    /// Read a single line info change event from the chip.
    ///
    /// Will block until an info change event is available.
    pub fn read_line_info_change_event(&self) -> Result<InfoChangeEvent> {
        let mut buf = [0u64; mem::size_of::<v2::LineInfoChangeEvent>() / 8];
        let n = uapi::read_event(&self.f, &mut buf)
            .map_err(|e| Error::Uapi(UapiCall::ReadEvent, e))?;
        let ice = v2::LineInfoChangeEvent::from_slice(&buf[..n])
            .map_err(|e| Error::Uapi(UapiCall::InfoChangeEventFromBuf, e))?;
        Ok(InfoChangeEvent::from(ice))
    }

    /// An iterator for info change events from the chip.
    ///
    /// Blocks until events are available.
    pub fn info_change_events(&self) -> InfoChangeIterator<'_> {
        InfoChangeIterator {
            chip: self,
            buf: vec![0u64; v2::LineInfoChangeEvent::u64_size()],
        }
    }
}

impl AsFd for Chip {
    #[inline]
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.f.as_fd()
    }
}

impl AsRawFd for Chip {
    #[inline]
    fn as_raw_fd(&self) -> i32 {
        self.f.as_raw_fd()
    }
}

impl AsRef<Chip> for Chip {
    #[inline]
    fn as_ref(&self) -> &Chip {
        self
    }
}

/// The publicly available information for a GPIO chip.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Info {
    /// The system name for the chip, such as "*gpiochip0*".
    pub name: String,

    /// A functional name for the chip.
    ///
    /// This typically identifies the type of GPIO chip.
    pub label: String,

    /// The number of lines provided by the chip.
    pub num_lines: u32,
}

impl From<uapi::ChipInfo> for Info {
    fn from(ci: uapi::ChipInfo) -> Self {
        Info {
            name: String::from(&ci.name),
            label: String::from(&ci.label),
            num_lines: ci.num_lines,
        }
    }
}

/// An iterator for reading info change events from a [`Chip`].
///
/// Blocks until events are available.
pub struct InfoChangeIterator<'a> {
    chip: &'a Chip,

    /// The buffer for the raw event, sized for one event.
    buf: Vec<u64>,
}

impl<'a> InfoChangeIterator<'a> {
    fn read_event(&mut self) -> Result<InfoChangeEvent> {
        let n = uapi::read_event(&self.chip.f, &mut self.buf)
            .map_err(|e| Error::Uapi(UapiCall::ReadEvent, e))?;
        let ice = v2::LineInfoChangeEvent::from_slice(&self.buf[..n])
            .map_err(|e| Error::Uapi(UapiCall::InfoChangeEventFromBuf, e))?;
        Ok(InfoChangeEvent::from(ice))
    }
}

impl<'a> Iterator for InfoChangeIterator<'a> {
    type Item = Result<InfoChangeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.read_event())
    }
}

/// Reasons a file cannot be opened as a GPIO character device.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// File is not a character device.
    NotCharacterDevice,

    /// File is not a GPIO character device.
    NotGpioDevice,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorKind::NotCharacterDevice => "is not a character device",
            ErrorKind::NotGpioDevice => "is not a GPIO character device",
        };
        write!(f, "{}", msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Chip and InfoChangeIterator tests requiring GPIO hardware are
    // integration tests.

    mod info {
        use super::*;

        #[test]
        fn from_uapi() {
            let ui = uapi::ChipInfo {
                name: "banana".into(),
                label: "peel".into(),
                num_lines: 42,
            };
            let i = Info::from(ui);
            assert_eq!(i.num_lines, 42);
            assert_eq!(i.name.as_str(), "banana");
            assert_eq!(i.label.as_str(), "peel");
        }
    }

    mod is_chip {
        use super::*;

        #[test]
        fn nonexistent() {
            assert!(matches!(
                is_chip("/dev/does-not-exist"),
                Err(Error::Os(_))
            ));
        }

        #[test]
        fn not_a_character_device() {
            assert_eq!(
                is_chip("/").unwrap_err(),
                Error::GpioChip(PathBuf::from("/"), ErrorKind::NotCharacterDevice)
            );
        }

        #[test]
        fn not_a_gpio_device() {
            assert_eq!(
                is_chip("/dev/null").unwrap_err(),
                Error::GpioChip(PathBuf::from("/dev/null"), ErrorKind::NotGpioDevice)
            );
        }
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(
            format!("{}", ErrorKind::NotCharacterDevice),
            "is not a character device"
        );
        assert_eq!(
            format!("{}", ErrorKind::NotGpioDevice),
            "is not a GPIO character device"
        );
    }

}
