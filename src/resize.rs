//! Resize policies for fitting a container to a target aspect ratio.
//!
//! Maps a measured container box, a target aspect ratio and a
//! [`ResizeMode`] to the box the container should occupy. Pure geometry:
//! no state beyond the inputs, no allocations, `no_std` compatible.
//!
//! # Example
//!
//! ```
//! use zenaspect::{ResizeConfig, ResizeMode, Size, resolve};
//!
//! let config = ResizeConfig::new(16.0 / 9.0).mode(ResizeMode::Fit);
//! let resolution = resolve(Size::new(1000, 500), &config);
//!
//! // 2:1 container, 16:9 content → width shrinks to 500 × 16/9
//! assert_eq!(resolution.size, Size::new(889, 500));
//! assert!(resolution.mismatch);
//! assert_eq!(resolution.natural_aspect_ratio, 2.0);
//! ```

use core::fmt;
use core::str::FromStr;

#[cfg(not(feature = "std"))]
use num_traits::Float;

use crate::dispatch::UpdateEvent;
use crate::logging::trace;

/// How the container box adapts to the target aspect ratio.
///
/// Integer attribute values (see [`attr_value`](Self::attr_value)) follow
/// declaration order, `Fit = 0` through `AdditionalZoom = 5`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResizeMode {
    /// Shrink either width or height to reach the target aspect ratio.
    #[default]
    Fit,
    /// Keep the width; grow or shrink the height.
    FixedWidth,
    /// Keep the height; grow or shrink the width.
    FixedHeight,
    /// Ignore the target aspect ratio.
    Fill,
    /// Grow either width or height to reach the target aspect ratio.
    Zoom,
    /// Zoom with an extra crop budget on the height.
    ///
    /// The box grows by up to [`CropRatio`] of its height so that a strip of
    /// the content (burned-in subtitles, letterbox bars) falls outside the
    /// visible area. See `ResizeConfig::keep_exact` for how the budget is
    /// spent.
    AdditionalZoom,
}

impl ResizeMode {
    /// Every mode, in attribute-value order.
    pub const ALL: [Self; 6] = [
        Self::Fit,
        Self::FixedWidth,
        Self::FixedHeight,
        Self::Fill,
        Self::Zoom,
        Self::AdditionalZoom,
    ];

    /// Integer attribute value for this mode.
    pub const fn attr_value(self) -> i32 {
        match self {
            Self::Fit => 0,
            Self::FixedWidth => 1,
            Self::FixedHeight => 2,
            Self::Fill => 3,
            Self::Zoom => 4,
            Self::AdditionalZoom => 5,
        }
    }

    /// Snake-case name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::FixedWidth => "fixed_width",
            Self::FixedHeight => "fixed_height",
            Self::Fill => "fill",
            Self::Zoom => "zoom",
            Self::AdditionalZoom => "additional_zoom",
        }
    }
}

impl TryFrom<i32> for ResizeMode {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.attr_value() == value)
            .ok_or(ConfigError::UnknownResizeMode)
    }
}

impl FromStr for ResizeMode {
    type Err = ConfigError;

    /// Case-insensitive; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| name_matches(mode.name(), s))
            .ok_or(ConfigError::UnknownResizeMode)
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn name_matches(name: &str, input: &str) -> bool {
    name.len() == input.len()
        && name.bytes().zip(input.bytes()).all(|(n, i)| {
            let i = if i == b'-' { b'_' } else { i };
            n == i.to_ascii_lowercase()
        })
}

/// Fraction of the height that [`ResizeMode::AdditionalZoom`] may crop.
///
/// Always within `0.0..1.0`.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct CropRatio(f64);

impl CropRatio {
    /// 20% of the height.
    pub const DEFAULT: Self = Self(0.2);

    /// Validate a crop ratio. Anything outside `0.0..1.0` (including NaN) is rejected.
    pub fn new(ratio: f64) -> Result<Self, ConfigError> {
        if (0.0..1.0).contains(&ratio) {
            Ok(Self(ratio))
        } else {
            Err(ConfigError::CropRatioOutOfRange)
        }
    }

    /// The ratio as a fraction of height.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for CropRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Width × height dimensions in layout units.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in layout units.
    pub width: u32,
    /// Height in layout units.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width-to-height ratio. Infinite or NaN for a zero height.
    pub fn aspect_ratio(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Resize configuration: target aspect ratio plus policy.
///
/// An immutable value. Hosts keep the current configuration, derive a new
/// one through the builder methods on every change, and compare the two to
/// decide whether a re-layout is needed.
///
/// # Example
///
/// ```
/// use zenaspect::{ResizeConfig, ResizeMode};
///
/// let config = ResizeConfig::new(4.0 / 3.0)
///     .mode(ResizeMode::AdditionalZoom)
///     .crop_ratio(0.1)
///     .keep_exact(false);
///
/// assert_eq!(config.crop_ratio.get(), 0.1);
/// // Out-of-range crop ratios keep the previous value.
/// assert_eq!(config.crop_ratio(1.5).crop_ratio.get(), 0.1);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResizeConfig {
    /// Target width-to-height ratio. `<= 0.0` means unset: no resizing, no updates.
    pub aspect_ratio: f32,
    pub mode: ResizeMode,
    pub crop_ratio: CropRatio,
    /// Under [`ResizeMode::AdditionalZoom`], spend the whole crop budget even
    /// when the natural zoom already needs less.
    pub keep_exact: bool,
    /// Skip resizing while `|deformation|` stays within this fraction.
    /// `None` (the default) always resizes.
    pub deformation_tolerance: Option<f32>,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 0.0,
            mode: ResizeMode::Fit,
            crop_ratio: CropRatio::DEFAULT,
            keep_exact: true,
            deformation_tolerance: None,
        }
    }
}

impl ResizeConfig {
    /// Tolerance that lets a near-matching container keep its full size.
    ///
    /// Avoids a re-layout and an extra composited layer when the content is
    /// within 1% of the container's own aspect ratio.
    pub const DEFAULT_DEFORMATION_TOLERANCE: f32 = 0.01;

    /// Create a configuration with the given target ratio and default policy.
    pub fn new(aspect_ratio: f32) -> Self {
        Self::default().aspect_ratio(aspect_ratio)
    }

    /// Set the target aspect ratio. Non-finite values become `0.0` (unset).
    pub fn aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = if aspect_ratio.is_finite() {
            aspect_ratio
        } else {
            0.0
        };
        self
    }

    /// Set the resize mode.
    pub fn mode(mut self, mode: ResizeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the crop ratio. Values outside `0.0..1.0` are ignored.
    pub fn crop_ratio(mut self, ratio: f64) -> Self {
        if let Ok(ratio) = CropRatio::new(ratio) {
            self.crop_ratio = ratio;
        }
        self
    }

    /// Set whether additional zoom always spends the full crop budget.
    pub fn keep_exact(mut self, keep_exact: bool) -> Self {
        self.keep_exact = keep_exact;
        self
    }

    /// Set the deformation tolerance. Must be finite and non-negative.
    pub fn deformation_tolerance(mut self, tolerance: Option<f32>) -> Result<Self, ConfigError> {
        if let Some(t) = tolerance
            && !(t.is_finite() && t >= 0.0)
        {
            return Err(ConfigError::InvalidTolerance);
        }
        self.deformation_tolerance = tolerance;
        Ok(self)
    }

    /// Whether a usable target aspect ratio is set.
    pub fn has_target(&self) -> bool {
        self.aspect_ratio > 0.0 && self.aspect_ratio.is_finite()
    }
}

/// Outcome of one [`resolve`] pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The box the pass started from.
    pub measured: Size,
    /// The box the container should be laid out at with an exact constraint.
    pub size: Size,
    /// Target ratio the pass ran with.
    pub target_aspect_ratio: f32,
    /// `measured.width / measured.height`, before any resizing.
    pub natural_aspect_ratio: f32,
    /// Whether the policy acted on the target ratio.
    pub mismatch: bool,
}

impl Resolution {
    /// Update to report for this pass. `None` when no target ratio is set.
    pub fn update(&self) -> Option<UpdateEvent> {
        (self.target_aspect_ratio > 0.0 && self.target_aspect_ratio.is_finite()).then(|| {
            UpdateEvent::new(
                self.target_aspect_ratio,
                self.natural_aspect_ratio,
                self.mismatch,
            )
        })
    }

    /// Whether the resolved box differs from the measured one.
    pub fn is_resized(&self) -> bool {
        self.size != self.measured
    }
}

/// Resolve the box a container of `measured` size should occupy.
///
/// `measured.height` must be non-zero; that is the caller's responsibility.
/// The function never panics on a zero height, but the result is
/// unspecified.
pub fn resolve(measured: Size, config: &ResizeConfig) -> Resolution {
    let mut resolution = Resolution {
        measured,
        size: measured,
        target_aspect_ratio: config.aspect_ratio,
        natural_aspect_ratio: measured.aspect_ratio(),
        mismatch: false,
    };
    if !config.has_target() {
        return resolution;
    }

    let ratio = f64::from(config.aspect_ratio);
    let view_ratio = f64::from(measured.width) / f64::from(measured.height);
    // > 0: content is wider than the container. < 0: narrower.
    let deformation = ratio / view_ratio - 1.0;

    if let Some(tolerance) = config.deformation_tolerance
        && deformation.abs() <= f64::from(tolerance)
    {
        trace!(
            mode = %config.mode,
            deformation,
            tolerance,
            "aspect deformation within tolerance"
        );
        return resolution;
    }

    let Size { width, height } = measured;
    let (w, h) = match config.mode {
        ResizeMode::FixedWidth => (width, height_for(width, ratio)),
        ResizeMode::FixedHeight => (width_for(height, ratio), height),
        ResizeMode::Zoom => {
            if matches_ratio(width, height, ratio) {
                (width, height)
            } else if deformation > 0.0 {
                (width_for(height, ratio), height)
            } else {
                (width, height_for(width, ratio))
            }
        }
        ResizeMode::Fit => {
            if matches_ratio(width, height, ratio) {
                (width, height)
            } else if deformation > 0.0 {
                (width, height_for(width, ratio))
            } else {
                (width_for(height, ratio), height)
            }
        }
        ResizeMode::AdditionalZoom => additional_zoom(
            width,
            height,
            ratio,
            deformation,
            config.crop_ratio.get(),
            config.keep_exact,
        ),
        ResizeMode::Fill => (width, height),
    };

    resolution.size = Size::new(w, h);
    resolution.mismatch = true;
    trace!(
        mode = %config.mode,
        deformation,
        measured = ?measured,
        resolved = ?resolution.size,
        "resolved container box"
    );
    resolution
}

/// Zoom that grows the height by up to `crop` of itself.
///
/// Content at least as wide as the container always grows by the full
/// budget, width following from the new height. Narrower content first
/// looks at the plain zoom height: past the budget it is taken as is;
/// within it, `keep_exact` spends the full budget instead.
fn additional_zoom(
    width: u32,
    height: u32,
    ratio: f64,
    deformation: f64,
    crop: f64,
    keep_exact: bool,
) -> (u32, u32) {
    let cropped_height = || round_dimension(f64::from(height) * (1.0 + crop));

    if deformation >= 0.0 {
        let h = cropped_height();
        return (width_for(h, ratio), h);
    }

    let zoom_height = height_for(width, ratio);
    let growth = (f64::from(zoom_height) - f64::from(height)) / f64::from(height);
    if growth < crop && keep_exact {
        let h = cropped_height();
        (width_for(h, ratio), h)
    } else {
        (width, zoom_height)
    }
}

/// Whether the box already has the target ratio to the nearest unit on
/// either axis.
fn matches_ratio(width: u32, height: u32, ratio: f64) -> bool {
    height_for(width, ratio) == height || width_for(height, ratio) == width
}

fn height_for(width: u32, ratio: f64) -> u32 {
    round_dimension(f64::from(width) / ratio)
}

fn width_for(height: u32, ratio: f64) -> u32 {
    round_dimension(f64::from(height) * ratio)
}

/// Round to the nearest unit, at least 1. Saturates at `u32::MAX`.
fn round_dimension(v: f64) -> u32 {
    let v = v.round();
    if v >= 1.0 { v as u32 } else { 1 }
}

/// Configuration error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Crop ratio outside `0.0..1.0`.
    CropRatioOutOfRange,
    /// Deformation tolerance negative or not finite.
    InvalidTolerance,
    /// Resize mode attribute value or name not recognized.
    UnknownResizeMode,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CropRatioOutOfRange => f.write_str("crop ratio must be within [0, 1)"),
            Self::InvalidTolerance => {
                f.write_str("deformation tolerance must be finite and non-negative")
            }
            Self::UnknownResizeMode => f.write_str("unknown resize mode"),
        }
    }
}

impl core::error::Error for ConfigError {}
