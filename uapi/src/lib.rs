// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A thin but safe Rust layer over the Linux GPIO character device uAPI.
//!
//! Kernel-facing structs are exact binary layouts, asserted by tests, and
//! anything read back from the kernel is validated before use.

pub(crate) mod common;

pub use common::{
    get_chip_info, has_event, read_event, unwatch_line_info, wait_event, ChipInfo, Errno, Error,
    Name, Offset, Result, UnderReadError, ValidationError, NAME_LEN_MAX, NUM_LINES_MAX,
};

/// GPIO ABI v2, as released in Linux v5.10.
pub mod v2;
