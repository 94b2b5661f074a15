// SPDX-License-Identifier: MPL-2.0

//! Format, codec and capture mode utilities
//!
//! This module provides the recording codec/container tables, the capability
//! catalog over a capture device and the capture mode negotiator.

pub mod catalog;
pub mod codec;
pub mod negotiation;

pub use codec::{ContainerType, RecordingCodec};
pub use negotiation::{NegotiatedMode, negotiate, select_mode};
