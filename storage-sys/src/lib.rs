// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system queries for storage reporting
//!
//! This crate talks to the running kernel on behalf of the report engine:
//! - Device-mapper table and status queries through `dmsetup`
//! - Kernel read-ahead through sysfs
//!
//! Most queries need root privileges; without them every answer degrades to
//! "unavailable" rather than failing the caller.

pub mod error;
pub mod logical;

pub use error::{Result, SysError};
pub use logical::dm_tools::{dm_name, DmsetupLiveState};
