//! Aspect-ratio resize policies and coalesced aspect-ratio notifications.
//!
//! Decides the box a video/content surface should occupy so its content's
//! aspect ratio fits (or deliberately overflows) the container, and tells a
//! listener about it at most once per event turn.
//!
//! Pure geometry plus a single-threaded coalescer. No rendering, no
//! decoding, `no_std` compatible.
//!
//! # Modules
//!
//! - [`resize`]: Resize modes (Fit, Zoom, AdditionalZoom, etc.) and box resolution
//! - [`dispatch`]: Update events, listeners, and the coalescing dispatcher
//! - [`frame`]: Host-facing frame with configuration setters and an event-turn queue (`alloc`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod dispatch;
#[cfg(feature = "alloc")]
pub mod frame;
mod logging;
pub mod resize;

// Re-exports: core types from resize module
pub use dispatch::{AspectRatioListener, AspectRatioUpdateDispatcher, Scheduler, UpdateEvent};
#[cfg(feature = "alloc")]
pub use frame::{AspectRatioFrame, LayoutHost, Task, TaskQueue};
pub use resize::{ConfigError, CropRatio, ResizeConfig, ResizeMode, Resolution, Size, resolve};
