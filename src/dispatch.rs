//! Coalesced delivery of aspect-ratio updates.
//!
//! A measurement pass may run several times before the host's event loop
//! gets another turn. [`AspectRatioUpdateDispatcher`] keeps only the latest
//! [`UpdateEvent`] and asks its [`Scheduler`] for a single deferred flush, so
//! the listener hears about each burst once, with the last values.
//!
//! ```text
//!     schedule_update ──▶ SCHEDULED ──(flush)──▶ IDLE
//!           ▲                 │
//!           └─ overwrite ─────┘
//! ```
//!
//! # Example
//!
//! ```
//! use zenaspect::{AspectRatioUpdateDispatcher, Scheduler, UpdateEvent};
//!
//! #[derive(Default)]
//! struct Posts(u32);
//! impl Scheduler for Posts {
//!     fn post_flush(&mut self) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let mut posts = Posts::default();
//! let mut dispatcher = AspectRatioUpdateDispatcher::new();
//! dispatcher.schedule_update(UpdateEvent::new(1.5, 2.0, true), &mut posts);
//! dispatcher.schedule_update(UpdateEvent::new(1.5, 1.8, true), &mut posts);
//! assert_eq!(posts.0, 1);
//!
//! let mut seen = None;
//! dispatcher.flush(Some(&mut |event: UpdateEvent| seen = Some(event)));
//! assert_eq!(seen, Some(UpdateEvent::new(1.5, 1.8, true)));
//! ```

use crate::logging::debug;

/// Payload delivered to an [`AspectRatioListener`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UpdateEvent {
    /// The target aspect ratio the pass ran with.
    pub target_aspect_ratio: f32,
    /// The container's own measured ratio, before any resizing.
    pub natural_aspect_ratio: f32,
    /// Whether the resize policy acted on the target ratio.
    pub mismatch: bool,
}

impl UpdateEvent {
    /// Create an update event.
    pub const fn new(target_aspect_ratio: f32, natural_aspect_ratio: f32, mismatch: bool) -> Self {
        Self {
            target_aspect_ratio,
            natural_aspect_ratio,
            mismatch,
        }
    }
}

/// Receives aspect-ratio updates.
///
/// Implemented for every `FnMut(UpdateEvent)`.
pub trait AspectRatioListener {
    /// Called with the latest update of a measurement burst.
    fn on_aspect_ratio_updated(&mut self, event: UpdateEvent);
}

impl<F: FnMut(UpdateEvent)> AspectRatioListener for F {
    fn on_aspect_ratio_updated(&mut self, event: UpdateEvent) {
        self(event)
    }
}

/// Posts a deferred flush onto the host's event turn.
///
/// The flush must run on a later turn, never inside `post_flush` itself.
pub trait Scheduler {
    /// Arrange for [`AspectRatioUpdateDispatcher::flush`] to run later.
    fn post_flush(&mut self);
}

/// Coalesces aspect-ratio updates into one deferred listener call.
#[derive(Clone, Debug, Default)]
pub struct AspectRatioUpdateDispatcher {
    pending: Option<UpdateEvent>,
    scheduled: bool,
}

impl AspectRatioUpdateDispatcher {
    /// Create an idle dispatcher.
    pub const fn new() -> Self {
        Self {
            pending: None,
            scheduled: false,
        }
    }

    /// Store `event`, replacing any pending one, and post a flush if none is
    /// outstanding.
    ///
    /// Returns whether a flush was posted.
    pub fn schedule_update<S: Scheduler + ?Sized>(
        &mut self,
        event: UpdateEvent,
        scheduler: &mut S,
    ) -> bool {
        self.pending = Some(event);
        if self.scheduled {
            debug!(?event, "coalesced aspect ratio update");
            return false;
        }
        self.scheduled = true;
        scheduler.post_flush();
        true
    }

    /// Mark the posted flush as run and take the pending event.
    ///
    /// The dispatcher is idle again before the caller delivers the event, so
    /// an update scheduled during delivery posts a fresh flush.
    pub fn take_due(&mut self) -> Option<UpdateEvent> {
        self.scheduled = false;
        self.pending.take()
    }

    /// Run a posted flush: deliver the pending event to `listener`, or drop
    /// it when there is none.
    ///
    /// Returns whether an event was delivered.
    pub fn flush<L: AspectRatioListener + ?Sized>(&mut self, listener: Option<&mut L>) -> bool {
        let Some(event) = self.take_due() else {
            return false;
        };
        match listener {
            Some(listener) => {
                listener.on_aspect_ratio_updated(event);
                true
            }
            None => {
                debug!(?event, "no aspect ratio listener; update dropped");
                false
            }
        }
    }

    /// Whether a flush is posted and has not run yet.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// The event the next flush will deliver.
    pub fn pending(&self) -> Option<&UpdateEvent> {
        self.pending.as_ref()
    }
}
