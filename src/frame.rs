//! Host-facing aspect-ratio frame.
//!
//! [`AspectRatioFrame`] owns the resize configuration, the update
//! dispatcher, the listener, and an explicit single-threaded task queue
//! standing in for the host's "post to next turn" primitive. The host
//! supplies measurements through [`LayoutHost`] and drives the queue with
//! [`AspectRatioFrame::run_turn`].
//!
//! # Example
//!
//! ```
//! use zenaspect::{AspectRatioFrame, LayoutHost, ResizeMode, Size};
//!
//! struct Window {
//!     available: Size,
//!     laid_out: Option<Size>,
//! }
//!
//! impl LayoutHost for Window {
//!     fn measured_size(&mut self) -> Size {
//!         self.available
//!     }
//!     fn apply_exact(&mut self, size: Size) {
//!         self.laid_out = Some(size);
//!     }
//! }
//!
//! let mut window = Window { available: Size::new(1000, 500), laid_out: None };
//! let mut frame = AspectRatioFrame::new();
//! frame.set_resize_mode(ResizeMode::Zoom);
//! frame.set_aspect_ratio(16.0 / 9.0);
//!
//! frame.run_turn(&mut window); // layout pass, posts the update
//! assert_eq!(window.laid_out, Some(Size::new(1000, 562)));
//! frame.run_turn(&mut window); // update delivered (no listener: dropped)
//! assert!(!frame.has_pending_tasks());
//! ```

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use core::fmt;

use crate::dispatch::{AspectRatioListener, AspectRatioUpdateDispatcher, Scheduler};
use crate::logging::debug;
use crate::resize::{self, ConfigError, ResizeConfig, ResizeMode, Size};

/// The host widget system, as seen by the frame.
pub trait LayoutHost {
    /// Unconstrained measurement of the container for this layout pass.
    /// Height must be non-zero.
    fn measured_size(&mut self) -> Size;

    /// Lay the container out again with an exact-size constraint.
    fn apply_exact(&mut self, size: Size);
}

/// Work posted to the frame's event turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    /// Re-measure and lay out the container.
    Layout,
    /// Deliver the pending aspect-ratio update.
    FlushAspectRatioUpdate,
}

/// FIFO of posted [`Task`]s.
#[derive(Clone, Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Append a task.
    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Remove the oldest task.
    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Whether `task` is queued.
    pub fn contains(&self, task: Task) -> bool {
        self.tasks.contains(&task)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Scheduler for TaskQueue {
    fn post_flush(&mut self) {
        self.push(Task::FlushAspectRatioUpdate);
    }
}

/// A container that resizes itself to a target aspect ratio.
pub struct AspectRatioFrame {
    config: ResizeConfig,
    dispatcher: AspectRatioUpdateDispatcher,
    listener: Option<Box<dyn AspectRatioListener>>,
    tasks: TaskQueue,
}

impl Default for AspectRatioFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AspectRatioFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectRatioFrame")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .field("has_listener", &self.listener.is_some())
            .field("tasks", &self.tasks)
            .finish()
    }
}

impl AspectRatioFrame {
    /// Create a frame with no target ratio and [`ResizeMode::Fit`].
    pub fn new() -> Self {
        Self::with_config(ResizeConfig::default())
    }

    /// Create a frame with the given configuration.
    pub fn with_config(config: ResizeConfig) -> Self {
        Self {
            config,
            dispatcher: AspectRatioUpdateDispatcher::new(),
            listener: None,
            tasks: TaskQueue::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.aspect_ratio
    }

    pub fn resize_mode(&self) -> ResizeMode {
        self.config.mode
    }

    pub fn crop_ratio(&self) -> f64 {
        self.config.crop_ratio.get()
    }

    pub fn keep_exact(&self) -> bool {
        self.config.keep_exact
    }

    /// Set the target width-to-height ratio. `<= 0.0` disables resizing.
    ///
    /// Returns whether a layout was requested.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) -> bool {
        self.replace_config(self.config.aspect_ratio(aspect_ratio))
    }

    /// Returns whether a layout was requested.
    pub fn set_resize_mode(&mut self, mode: ResizeMode) -> bool {
        self.replace_config(self.config.mode(mode))
    }

    /// Set the additional-zoom crop ratio. Values outside `0.0..1.0` are
    /// ignored and the previous ratio kept.
    ///
    /// Returns whether a layout was requested.
    pub fn set_crop_ratio(&mut self, ratio: f64) -> bool {
        self.replace_config(self.config.crop_ratio(ratio))
    }

    /// Returns whether a layout was requested.
    pub fn set_keep_exact(&mut self, keep_exact: bool) -> bool {
        self.replace_config(self.config.keep_exact(keep_exact))
    }

    /// Set or clear the deformation tolerance.
    ///
    /// Returns whether a layout was requested, or the validation error (the
    /// configuration is then unchanged).
    pub fn set_deformation_tolerance(
        &mut self,
        tolerance: Option<f32>,
    ) -> Result<bool, ConfigError> {
        let config = self.config.deformation_tolerance(tolerance)?;
        Ok(self.replace_config(config))
    }

    /// Replace the listener. `None` detaches it; a flush already posted
    /// then drops its update.
    pub fn set_aspect_ratio_listener(&mut self, listener: Option<Box<dyn AspectRatioListener>>) {
        self.listener = listener;
    }

    /// Ask for a layout pass on the next turn. No-op while one is queued.
    pub fn request_layout(&mut self) {
        if !self.tasks.contains(Task::Layout) {
            self.tasks.push(Task::Layout);
        }
    }

    /// Whether a layout pass is queued.
    pub fn is_layout_requested(&self) -> bool {
        self.tasks.contains(Task::Layout)
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Resolve the box for one measurement pass and schedule the update.
    ///
    /// The host lays the container out at the returned size with an exact
    /// constraint.
    pub fn measure(&mut self, measured: Size) -> Size {
        let resolution = resize::resolve(measured, &self.config);
        if let Some(event) = resolution.update() {
            self.dispatcher.schedule_update(event, &mut self.tasks);
        }
        resolution.size
    }

    /// Run the tasks queued before this call. Tasks posted while running
    /// wait for the next turn.
    ///
    /// Returns the number of tasks run.
    pub fn run_turn<H: LayoutHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let due = self.tasks.len();
        for _ in 0..due {
            let Some(task) = self.tasks.pop() else {
                break;
            };
            match task {
                Task::Layout => {
                    let measured = host.measured_size();
                    let size = self.measure(measured);
                    host.apply_exact(size);
                }
                Task::FlushAspectRatioUpdate => self.flush_update(),
            }
        }
        due
    }

    fn flush_update(&mut self) {
        self.dispatcher.flush(self.listener.as_deref_mut());
    }

    fn replace_config(&mut self, config: ResizeConfig) -> bool {
        if config == self.config {
            return false;
        }
        debug!(old = ?self.config, new = ?config, "resize config changed");
        self.config = config;
        self.request_layout();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::UpdateEvent;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    struct FixedHost {
        available: Size,
        applied: Vec<Size>,
    }

    impl FixedHost {
        fn new(width: u32, height: u32) -> Self {
            Self {
                available: Size::new(width, height),
                applied: Vec::new(),
            }
        }
    }

    impl LayoutHost for FixedHost {
        fn measured_size(&mut self) -> Size {
            self.available
        }

        fn apply_exact(&mut self, size: Size) {
            self.applied.push(size);
        }
    }

    fn recording_listener() -> (Rc<RefCell<Vec<UpdateEvent>>>, Box<dyn AspectRatioListener>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let listener = Box::new(move |e: UpdateEvent| sink.borrow_mut().push(e));
        (events, listener)
    }

    #[test]
    fn setters_request_layout_only_on_change() {
        let mut frame = AspectRatioFrame::new();
        assert!(frame.set_aspect_ratio(1.5));
        assert!(frame.is_layout_requested());
        assert!(!frame.set_aspect_ratio(1.5));
        assert!(!frame.set_resize_mode(ResizeMode::Fit));
        assert!(frame.set_resize_mode(ResizeMode::Zoom));
        assert!(!frame.set_keep_exact(true));
        assert!(frame.set_keep_exact(false));
        assert!(frame.set_crop_ratio(0.3));
        assert!(!frame.set_crop_ratio(0.3));

        // Layout requests coalesce into one queued task.
        assert_eq!(frame.tasks.len(), 1);
    }

    #[test]
    fn invalid_crop_ratio_keeps_previous() {
        let mut frame = AspectRatioFrame::new();
        assert!(!frame.set_crop_ratio(-0.1));
        assert!(!frame.set_crop_ratio(1.0));
        assert_eq!(frame.crop_ratio(), 0.2);
        assert!(!frame.has_pending_tasks());

        frame.set_crop_ratio(0.5);
        assert!(!frame.set_crop_ratio(2.0));
        assert_eq!(frame.crop_ratio(), 0.5);
    }

    #[test]
    fn tolerance_setter_validates() {
        let mut frame = AspectRatioFrame::new();
        assert_eq!(
            frame.set_deformation_tolerance(Some(-1.0)),
            Err(ConfigError::InvalidTolerance)
        );
        assert_eq!(frame.config().deformation_tolerance, None);
        assert_eq!(frame.set_deformation_tolerance(Some(0.01)), Ok(true));
        assert_eq!(frame.set_deformation_tolerance(Some(0.01)), Ok(false));
    }

    #[test]
    fn measure_without_target_posts_nothing() {
        let mut frame = AspectRatioFrame::new();
        assert_eq!(frame.measure(Size::new(640, 480)), Size::new(640, 480));
        assert!(!frame.has_pending_tasks());
    }

    #[test]
    fn listener_runs_on_turn_after_layout() {
        let (events, listener) = recording_listener();
        let mut frame = AspectRatioFrame::new();
        frame.set_aspect_ratio_listener(Some(listener));
        frame.set_aspect_ratio(16.0 / 9.0);

        let mut host = FixedHost::new(1000, 500);
        assert_eq!(frame.run_turn(&mut host), 1);
        assert_eq!(host.applied, [Size::new(889, 500)]);
        assert!(events.borrow().is_empty());

        assert_eq!(frame.run_turn(&mut host), 1);
        assert_eq!(
            *events.borrow(),
            [UpdateEvent::new(16.0 / 9.0, 2.0, true)]
        );
        assert_eq!(frame.run_turn(&mut host), 0);
    }

    #[test]
    fn repeated_measures_deliver_once() {
        let (events, listener) = recording_listener();
        let mut frame = AspectRatioFrame::with_config(ResizeConfig::new(2.0));
        frame.set_aspect_ratio_listener(Some(listener));

        frame.measure(Size::new(1000, 1000));
        frame.measure(Size::new(1000, 800));
        frame.measure(Size::new(1000, 400));

        let mut host = FixedHost::new(1, 1);
        frame.run_turn(&mut host);
        assert_eq!(*events.borrow(), [UpdateEvent::new(2.0, 2.5, true)]);
        assert!(host.applied.is_empty());
    }

    #[test]
    fn detached_listener_drops_posted_update() {
        let (events, listener) = recording_listener();
        let mut frame = AspectRatioFrame::with_config(ResizeConfig::new(1.0));
        frame.set_aspect_ratio_listener(Some(listener));
        frame.measure(Size::new(300, 200));
        frame.set_aspect_ratio_listener(None);

        let mut host = FixedHost::new(1, 1);
        frame.run_turn(&mut host);
        assert!(events.borrow().is_empty());

        // The next burst posts and delivers normally.
        let (events, listener) = recording_listener();
        frame.set_aspect_ratio_listener(Some(listener));
        frame.measure(Size::new(300, 200));
        frame.run_turn(&mut host);
        assert_eq!(events.borrow().len(), 1);
    }
}
