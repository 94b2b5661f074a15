// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for recording
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Video frames │ ──▶ │  Recording Engine │ ──▶ │ MP4/MOV File │
//! │ Audio buffers│     │  - Timing fixes   │     │              │
//! │              │     │  - HW Encoding    │     │              │
//! │              │     │  - Muxing         │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! Delivery never blocks the producer; samples the writer cannot take are
//! dropped and counted.

pub mod video;
