//! Camera and lens math that drives pattern spacing.
//!
//! Everything here is a pure function of its numeric inputs: field of view,
//! ground sample distance (GSD), circle of confusion, hyperfocal distance and
//! depth of field, the on-ground image footprint, and the photo spacing
//! needed for a given overlap. Degenerate inputs (non-positive focal length,
//! aperture, or sensor dimension) fail with
//! [`PlanningError::InvalidOpticsInput`] instead of quietly propagating NaN;
//! an *unbounded* depth-of-field far limit is a legitimate value and gets its
//! own representation ([`DofLimit::Unbounded`]) rather than an infinity
//! sentinel.

use crate::error::PlanningError;
use uom::si::f64::{Angle, Length, Ratio};
use uom::si::{
    angle::radian,
    length::{centimeter, meter, millimeter},
    ratio::ratio,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sensor size class, used to pick the circle-of-confusion tier.
///
/// The class matters because the acceptable blur circle scales with the
/// sensor, not the lens. The thresholds in [`circle_of_confusion`] are an
/// empirical industry classification, preserved exactly for compatibility
/// with existing mission plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorFormat {
    MediumFormat,
    FullFrame,
    ApsC,
    OneInch,
    /// Anything smaller than the named classes (action cams, phone sensors).
    Compact,
}

/// An immutable camera body description from the hardware catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CameraProfile {
    /// Catalog label, e.g. `"a7r-iv"`.
    pub name: String,
    pub sensor_width: Length,
    pub sensor_height: Length,
    pub image_width_px: u32,
    pub image_height_px: u32,
    pub format: SensorFormat,
}

/// An immutable lens description from the hardware catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LensProfile {
    /// Catalog label, e.g. `"fe-24mm-f14"`.
    pub name: String,
    pub focal_length: Length,
    /// Widest f-number the lens supports (smallest numeric value).
    pub max_aperture: f64,
    /// Narrowest f-number the lens supports (largest numeric value).
    pub min_aperture: f64,
}

/// A camera/lens pairing, the unit the pattern generators consume.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpticsInput {
    pub camera: CameraProfile,
    pub lens: LensProfile,
}

impl OpticsInput {
    /// Horizontal angle of view of the pairing.
    pub fn horizontal_fov(&self) -> Result<Angle, PlanningError> {
        field_of_view(self.lens.focal_length, self.camera.sensor_width)
    }

    /// Vertical angle of view of the pairing.
    pub fn vertical_fov(&self) -> Result<Angle, PlanningError> {
        field_of_view(self.lens.focal_length, self.camera.sensor_height)
    }

    /// Ground sample distance at the given subject distance.
    pub fn ground_sample_distance(&self, distance: Length) -> Result<Length, PlanningError> {
        ground_sample_distance(
            distance,
            self.lens.focal_length,
            self.camera.sensor_width,
            self.camera.image_width_px,
        )
    }

    /// On-ground image footprint when looking straight down from `altitude`.
    pub fn footprint(&self, altitude: Length) -> Result<Footprint, PlanningError> {
        footprint(&self.camera, &self.lens, altitude)
    }

    /// The blur tolerance for this camera, from its sensor class.
    pub fn circle_of_confusion(&self) -> Result<Length, PlanningError> {
        circle_of_confusion(self.camera.format, self.camera.sensor_width)
    }

    /// Depth of field at the given aperture and focus distance.
    pub fn depth_of_field(
        &self,
        aperture: f64,
        focus_distance: Length,
    ) -> Result<DofResult, PlanningError> {
        let coc = self.circle_of_confusion()?;
        depth_of_field(self.lens.focal_length, aperture, coc, focus_distance)
    }
}

/// The far edge of a depth-of-field range.
///
/// `Unbounded` is the "everything to the horizon is sharp" case that occurs
/// whenever the focus distance reaches the hyperfocal distance. It is a
/// perfectly good outcome for survey work, which is why it is a value and
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DofLimit {
    Finite(Length),
    Unbounded,
}

impl DofLimit {
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, DofLimit::Unbounded)
    }

    /// The finite value, if there is one.
    #[must_use]
    pub fn finite(&self) -> Option<Length> {
        match self {
            DofLimit::Finite(length) => Some(*length),
            DofLimit::Unbounded => None,
        }
    }
}

/// Full depth-of-field characterization at one aperture + focus distance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DofResult {
    pub hyperfocal: Length,
    pub near_limit: Length,
    pub far_limit: DofLimit,
    pub total: DofLimit,
    pub circle_of_confusion: Length,
}

/// The on-ground extent of a single image.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Footprint {
    pub width: Length,
    pub height: Length,
}

/// Computes the angle of view subtended by a sensor dimension behind a lens:
/// `2·atan(d / 2f)`.
///
/// # Errors
///
/// [`PlanningError::InvalidOpticsInput`] if the focal length or sensor
/// dimension is not strictly positive.
pub fn field_of_view(
    focal_length: Length,
    sensor_dimension: Length,
) -> Result<Angle, PlanningError> {
    let f = focal_length.get::<millimeter>();
    let d = sensor_dimension.get::<millimeter>();
    if f <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "focal length must be positive",
        ));
    }
    if d <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "sensor dimension must be positive",
        ));
    }
    Ok(Angle::new::<radian>(2. * (d / (2. * f)).atan()))
}

/// Computes the ground sample distance: the real-world size covered by one
/// image pixel at the given subject distance.
///
/// # Errors
///
/// [`PlanningError::InvalidOpticsInput`] if the focal length, sensor width,
/// or pixel count is not strictly positive, or the distance is negative.
pub fn ground_sample_distance(
    distance: Length,
    focal_length: Length,
    sensor_width: Length,
    image_width_px: u32,
) -> Result<Length, PlanningError> {
    let f = focal_length.get::<millimeter>();
    let sw = sensor_width.get::<millimeter>();
    let dist = distance.get::<meter>();
    if f <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "focal length must be positive",
        ));
    }
    if sw <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "sensor width must be positive",
        ));
    }
    if image_width_px == 0 {
        return Err(PlanningError::InvalidOpticsInput(
            "image width must be positive",
        ));
    }
    if dist < 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "distance must not be negative",
        ));
    }
    let cm_per_px = (dist * 100. * sw) / (f * f64::from(image_width_px));
    Ok(Length::new::<centimeter>(cm_per_px))
}

/// Looks up the acceptable circle of confusion for a sensor.
///
/// Tiered classification (empirical, preserved exactly):
///
/// - medium format: sensor width / 1500
/// - full frame, or width ≥ 35 mm: 0.03 mm
/// - APS-C, or 20 mm ≤ width < 35 mm: 0.02 mm
/// - 1-inch, or 10 mm ≤ width < 20 mm: 0.011 mm
/// - anything smaller: 0.005 mm
///
/// # Errors
///
/// [`PlanningError::InvalidOpticsInput`] if the sensor width is not strictly
/// positive.
pub fn circle_of_confusion(
    format: SensorFormat,
    sensor_width: Length,
) -> Result<Length, PlanningError> {
    let width = sensor_width.get::<millimeter>();
    if width <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "sensor width must be positive",
        ));
    }
    let coc_mm = if format == SensorFormat::MediumFormat {
        width / 1500.
    } else if format == SensorFormat::FullFrame || width >= 35. {
        0.03
    } else if format == SensorFormat::ApsC || width >= 20. {
        0.02
    } else if format == SensorFormat::OneInch || width >= 10. {
        0.011
    } else {
        0.005
    };
    Ok(Length::new::<millimeter>(coc_mm))
}

/// Computes the hyperfocal distance `f² / (N·c)`: the focus distance beyond
/// which everything to infinity is acceptably sharp.
///
/// # Errors
///
/// [`PlanningError::InvalidOpticsInput`] if the focal length, aperture, or
/// circle of confusion is not strictly positive.
pub fn hyperfocal_distance(
    focal_length: Length,
    aperture: f64,
    circle_of_confusion: Length,
) -> Result<Length, PlanningError> {
    let f = focal_length.get::<millimeter>();
    let c = circle_of_confusion.get::<millimeter>();
    if f <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "focal length must be positive",
        ));
    }
    if aperture <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "aperture must be positive",
        ));
    }
    if c <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "circle of confusion must be positive",
        ));
    }
    Ok(Length::new::<millimeter>(f * f / (aperture * c)))
}

/// Computes the thin-lens depth of field around a focus distance.
///
/// With hyperfocal distance `H` and focus distance `s`:
///
/// - near limit = `H·s / (H + s)`
/// - far limit = `H·s / (H − s)` when `s < H`, otherwise
///   [`DofLimit::Unbounded`]
/// - total = far − near, unbounded exactly when the far limit is
///
/// # Errors
///
/// [`PlanningError::InvalidOpticsInput`] if any of focal length, aperture,
/// circle of confusion, or focus distance is not strictly positive.
pub fn depth_of_field(
    focal_length: Length,
    aperture: f64,
    circle_of_confusion: Length,
    focus_distance: Length,
) -> Result<DofResult, PlanningError> {
    let hyperfocal = hyperfocal_distance(focal_length, aperture, circle_of_confusion)?;
    let h = hyperfocal.get::<meter>();
    let s = focus_distance.get::<meter>();
    if s <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "focus distance must be positive",
        ));
    }

    let near_limit = Length::new::<meter>(h * s / (h + s));
    let (far_limit, total) = if s >= h {
        (DofLimit::Unbounded, DofLimit::Unbounded)
    } else {
        let far = Length::new::<meter>(h * s / (h - s));
        (DofLimit::Finite(far), DofLimit::Finite(far - near_limit))
    };

    Ok(DofResult {
        hyperfocal,
        near_limit,
        far_limit,
        total,
        circle_of_confusion,
    })
}

/// Computes the on-ground footprint of one nadir image from `altitude`: the
/// ground sample distance scaled by the pixel dimensions.
///
/// # Errors
///
/// [`PlanningError::InvalidOpticsInput`] on non-positive camera/lens
/// parameters or negative altitude.
pub fn footprint(
    camera: &CameraProfile,
    lens: &LensProfile,
    altitude: Length,
) -> Result<Footprint, PlanningError> {
    let gsd_w = ground_sample_distance(
        altitude,
        lens.focal_length,
        camera.sensor_width,
        camera.image_width_px,
    )?;
    let gsd_h = ground_sample_distance(
        altitude,
        lens.focal_length,
        camera.sensor_height,
        camera.image_height_px,
    )?;
    Ok(Footprint {
        width: gsd_w * f64::from(camera.image_width_px),
        height: gsd_h * f64::from(camera.image_height_px),
    })
}

/// Computes the distance between consecutive image centers so that adjacent
/// images overlap by `overlap` percent of the given footprint dimension.
///
/// # Errors
///
/// [`PlanningError::InvalidOpticsInput`] if the footprint dimension is not
/// strictly positive or the overlap lies outside [0%, 100%).
pub fn image_spacing(
    footprint_dimension: Length,
    overlap: Ratio,
) -> Result<Length, PlanningError> {
    let dim = footprint_dimension.get::<meter>();
    let fraction = overlap.get::<ratio>();
    if dim <= 0. {
        return Err(PlanningError::InvalidOpticsInput(
            "footprint dimension must be positive",
        ));
    }
    if !(0. ..1.).contains(&fraction) {
        return Err(PlanningError::InvalidOpticsInput(
            "overlap must be in [0%, 100%)",
        ));
    }
    Ok(Length::new::<meter>(dim * (1. - fraction)))
}
