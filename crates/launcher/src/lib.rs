// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Composes argv, spawns a service detached from the parent, and produces
//! its run record.

mod argv;
mod error;
mod source;
mod spawn;

pub use argv::{compose_argv, executable_path};
pub use error::LaunchError;
pub use source::{launch_from_source, SOURCE_VERSION};
pub use spawn::launch;
