// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::prelude::AsRawFd;
use std::slice;
use std::time::Duration;

pub(crate) const IOCTL_MAGIC: u8 = 0xb4;

// Request codes for the ioctls shared by all ABI versions.
#[repr(u8)]
enum Ioctl {
    GetChipInfo = 1,
    UnwatchLineInfo = 0xC,
}

macro_rules! ior {
    ($nr:expr, $ty:ty) => {
        ioctl_sys::ior!(
            $crate::common::IOCTL_MAGIC,
            $nr as u8,
            std::mem::size_of::<$ty>()
        ) as libc::c_ulong
    };
}
macro_rules! iorw {
    ($nr:expr, $ty:ty) => {
        ioctl_sys::iorw!(
            $crate::common::IOCTL_MAGIC,
            $nr as u8,
            std::mem::size_of::<$ty>()
        ) as libc::c_ulong
    };
}
pub(crate) use iorw;

/// Check if the file has an event available to read.
#[inline]
pub fn has_event(f: &File) -> Result<bool> {
    wait_event(f, Some(Duration::ZERO))
}

/// Wait for the file to have an event available to read.
///
/// A `None` timeout blocks until an event is available or the wait is
/// interrupted. Returns false if the timeout expires with no event.
pub fn wait_event(f: &File, timeout: Option<Duration>) -> Result<bool> {
    let mut pfd = libc::pollfd {
        fd: f.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let ts;
    let tsp = match timeout {
        Some(d) => {
            ts = libc::timespec {
                tv_sec: d.as_secs() as libc::time_t,
                tv_nsec: d.subsec_nanos() as libc::c_long,
            };
            std::ptr::addr_of!(ts)
        }
        None => std::ptr::null(),
    };
    // SAFETY: pfd and ts outlive the call and the null sigmask is allowed.
    match unsafe { libc::ppoll(std::ptr::addr_of_mut!(pfd), 1, tsp, std::ptr::null()) } {
        -1 => Err(Error::from_errno()),
        0 => Ok(false),
        _ => Ok(true),
    }
}

/// Read a raw event from the file into a u64 buffer.
///
/// The buffer is u64 to enforce the alignment the event decoders require.
/// Returns the number of u64 words read.
pub fn read_event(f: &File, buf: &mut [u64]) -> Result<usize> {
    debug_assert!(!buf.is_empty());
    // SAFETY: buf is a valid writable region of buf.len()*8 bytes.
    let bytes = unsafe {
        libc::read(
            f.as_raw_fd(),
            buf.as_mut_ptr() as *mut libc::c_void,
            std::mem::size_of_val(buf),
        )
    };
    match bytes {
        -1 => Err(Error::from_errno()),
        x => Ok(x as usize / 8),
    }
}

/// Information about a particular GPIO chip.
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChipInfo {
    /// The Linux kernel name of this GPIO chip.
    pub name: Name,

    /// A functional name for this GPIO chip, such as a product number.
    ///
    /// May be empty.
    pub label: Name,

    /// The number of GPIO lines on this chip.
    pub num_lines: u32,
}

/// Get the publicly available information for a chip.
///
/// * `cf` - The open gpiochip device file.
pub fn get_chip_info(cf: &File) -> Result<ChipInfo> {
    let mut ci: ChipInfo = Default::default();
    // SAFETY: returned struct contains only raw byte arrays and an int.
    match unsafe { libc::ioctl(cf.as_raw_fd(), ior!(Ioctl::GetChipInfo, ChipInfo), &mut ci) } {
        0 => Ok(ci),
        _ => Err(Error::from_errno()),
    }
}

/// Remove any watch on changes to the line info for a line.
///
/// * `cf` - The open gpiochip device file.
/// * `offset` - The offset of the line to unwatch.
pub fn unwatch_line_info(cf: &File, offset: Offset) -> Result<()> {
    // SAFETY: offset is not modified in a way visible to the caller.
    match unsafe {
        libc::ioctl(
            cf.as_raw_fd(),
            iorw!(Ioctl::UnwatchLineInfo, u32),
            &offset,
        )
    } {
        0 => Ok(()),
        _ => Err(Error::from_errno()),
    }
}

/// The result returned by [`linedev_uapi`] functions.
///
/// [`linedev_uapi`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Result returned by struct validators.
pub type ValidationResult = std::result::Result<(), ValidationError>;

/// Errors returned by [`linedev_uapi`] functions.
///
/// [`linedev_uapi`]: crate
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An error returned from an underlying system call.
    #[error(transparent)]
    Os(#[from] Errno),

    /// A read returned fewer bytes than the struct requires.
    #[error(transparent)]
    UnderRead(#[from] UnderReadError),

    /// A struct returned by the kernel failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Capture the errno of the system call that just failed.
    pub fn from_errno() -> Error {
        Error::Os(Errno::last())
    }
}

/// The error number returned by a failed system call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Errno(pub i32);

impl Errno {
    /// The errno of the most recently failed system call on this thread.
    pub fn last() -> Errno {
        Errno(
            std::io::Error::last_os_error()
                .raw_os_error()
                .unwrap_or(0),
        )
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", std::io::Error::from_raw_os_error(self.0), self.0)
    }
}

impl std::error::Error for Errno {}

/// A failure to read a complete struct from the kernel.
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
#[error("Read {found} bytes for {obj}, expected {expected}")]
pub struct UnderReadError {
    /// The struct that under-read.
    pub obj: &'static str,
    /// The number of bytes required.
    pub expected: usize,
    /// The number of bytes read.
    pub found: usize,
}

impl UnderReadError {
    pub fn new(obj: &'static str, expected: usize, found: usize) -> UnderReadError {
        UnderReadError {
            obj,
            expected,
            found,
        }
    }
}

/// A failure to validate a struct returned from a system call.
//
// Should only be seen if a kernel update adds an enum value we are unaware of.
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
#[error("Kernel returned invalid {field}: {msg}")]
pub struct ValidationError {
    pub field: String,
    pub msg: String,
}

impl ValidationError {
    pub fn new<S: Into<String>, T: Into<String>>(field: S, msg: T) -> ValidationError {
        ValidationError {
            field: field.into(),
            msg: msg.into(),
        }
    }
}

/// The maximum number of bytes stored in a [`Name`].
pub const NAME_LEN_MAX: usize = 32;

/// A uAPI name string.
///
/// Names longer than [`NAME_LEN_MAX`] - 1 are truncated to fit the fixed
/// kernel field, leaving a null terminator.
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Name([u8; NAME_LEN_MAX]);

impl Name {
    /// Checks whether the Name is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// The length of the contained name.
    #[inline]
    pub fn strlen(&self) -> usize {
        self.0.iter().position(|&x| x == 0).unwrap_or(self.0.len())
    }

    /// Convert the contained name to an OsStr slice.
    pub fn as_os_str(&self) -> &OsStr {
        // SAFETY: strlen is contained within the fixed size array.
        unsafe { OsStr::from_bytes(slice::from_raw_parts(&self.0[0], self.strlen())) }
    }

    /// Construct a Name from a byte slice.
    ///
    /// Bytes past the field capacity are dropped, leaving a null terminator.
    /// Truncation may split a multi-byte character, so the result is not
    /// guaranteed to remain valid UTF-8.
    pub fn from_bytes(s: &[u8]) -> Name {
        let mut d: Name = Default::default();
        for (src, dst) in s.iter().zip(d.0.iter_mut().take(NAME_LEN_MAX - 1)) {
            *dst = *src;
        }
        d
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::from_bytes(s.as_bytes())
    }
}

impl From<&Name> for String {
    fn from(s: &Name) -> Self {
        String::from_utf8_lossy(&s.0[0..s.strlen()]).into_owned()
    }
}

/// An identifier for a line on a particular chip.
///
/// Valid offsets are in the range 0..`num_lines` as reported in the [`ChipInfo`].
pub type Offset = u32;

/// The maximum number of lines in a single request.
pub const NUM_LINES_MAX: usize = 64;

/// A collection of line offsets.
///
/// Identifies the lines belonging to a particular request.
#[repr(C)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offsets([Offset; NUM_LINES_MAX]);

impl Offsets {
    /// Create offsets from a slice.
    ///
    /// Offsets beyond [`NUM_LINES_MAX`] are dropped.
    pub fn from_slice(s: &[Offset]) -> Self {
        let mut n: Offsets = Default::default();
        for (src, dst) in s.iter().zip(n.0.iter_mut()) {
            *dst = *src;
        }
        n
    }

    /// Get the indexed offset from the set.
    #[inline]
    pub fn get(&self, idx: usize) -> Offset {
        self.0[idx]
    }

    /// Set the indexed offset in the set.
    #[inline]
    pub fn set(&mut self, idx: usize, offset: Offset) {
        self.0[idx] = offset;
    }
}

impl Default for Offsets {
    fn default() -> Self {
        Offsets([0; NUM_LINES_MAX])
    }
}

/// Space reserved for future use.
///
/// Must be zero filled. Sized in multiples of u32 words.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[doc(hidden)]
pub struct Padding<const SIZE: usize>([u32; SIZE]);

impl<const SIZE: usize> Default for Padding<SIZE> {
    fn default() -> Self {
        Padding([0; SIZE])
    }
}

impl<const SIZE: usize> Padding<SIZE> {
    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|x| *x == 0)
    }
}
