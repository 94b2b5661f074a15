// SPDX-License-Identifier: MPL-2.0

//! Capture device abstraction
//!
//! The recording core never owns the physical device. It sees it through the
//! [`CaptureDevice`] trait, which hands out a fresh snapshot of the device's
//! operating modes on every call and accepts one configuration at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Recording Engine   │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ Capability Catalog  │  ← Snapshot per query, never cached
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CaptureDevice Trait │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!  ┌─────────┐ ┌────────┐
//!  │GStreamer│ │ Static │  ← Device monitor / JSON profile
//!  └─────────┘ └────────┘
//! ```

pub mod gst_device;
pub mod static_device;
pub mod types;

pub use gst_device::GstCaptureDevice;
pub use static_device::StaticDevice;
pub use types::*;

/// A capture device as seen by the recording core
pub trait CaptureDevice: Send + Sync {
    /// Human readable device name
    fn name(&self) -> &str;

    /// Current operating modes
    ///
    /// Implementations rebuild the list from device state on every call, since
    /// capabilities can change after the device is reconfigured.
    fn capture_modes(&self) -> Vec<DeviceCaptureMode>;

    /// Lock the device, apply the configuration and unlock it again
    ///
    /// # Returns
    /// * `Ok(())` - Configuration applied
    /// * `Err(BackendError::Busy)` - The configuration lock could not be taken
    /// * `Err(BackendError)` - The device rejected the configuration
    fn apply_configuration(&self, config: &DeviceConfiguration) -> BackendResult<()>;

    /// The configuration applied last, if any
    fn active_configuration(&self) -> Option<DeviceConfiguration>;
}
