// SPDX-License-Identifier: GPL-3.0-only

pub mod dm_tools;
