// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for capture devices
//!
//! - [`camera`]: Capture device trait, GStreamer-backed devices and
//!   static devices described by a JSON profile

pub mod camera;
