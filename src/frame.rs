use crate::error::PlanningError;
use crate::geodetic::{Ecef, Geodetic};
use crate::local::Enu;
use nalgebra::Matrix3;
use uom::si::angle::radian;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The takeoff-centric frame of reference for a planning session.
///
/// A mission is planned in meters-from-launch ([`Enu`]) so field operators
/// can reason about "50 m east, 30 m up" instead of raw latitudes. The
/// `ReferenceFrame` owns the single geodetic origin those local coordinates
/// are measured from and performs the local⇄global conversions.
///
/// The frame is an explicit value: pass it (by reference) into whatever
/// needs to convert, rather than reaching for ambient state. There is
/// exactly one origin at a time; recalibrating with [`set_origin`] *replaces*
/// it and hands back the previous origin so the caller can re-project any
/// retained geometry. Every replacement also bumps [`generation`], which
/// callers should snapshot alongside any [`Enu`] that outlives a single
/// synchronous computation: a local coordinate tagged with generation `n` is
/// stale once the frame reports `n + 1`.
///
/// [`set_origin`]: ReferenceFrame::set_origin
/// [`generation`]: ReferenceFrame::generation
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferenceFrame {
    origin: Option<Geodetic>,
    generation: u64,
}

impl ReferenceFrame {
    /// Creates a frame with no origin.
    ///
    /// All conversions fail with [`PlanningError::NoReferenceFrame`] until
    /// [`set_origin`](ReferenceFrame::set_origin) has been called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frame anchored at the given takeoff point.
    #[must_use]
    pub fn anchored_at(origin: Geodetic) -> Self {
        Self {
            origin: Some(origin),
            generation: 1,
        }
    }

    /// Replaces the active origin, returning the previous one (if any).
    ///
    /// Any [`Enu`] produced before this call belongs to the *previous*
    /// frame; re-project retained geometry through the returned origin if it
    /// must survive the recalibration.
    pub fn set_origin(&mut self, origin: Geodetic) -> Option<Geodetic> {
        self.generation += 1;
        self.origin.replace(origin)
    }

    /// Whether an origin has been set.
    #[must_use]
    pub fn has_origin(&self) -> bool {
        self.origin.is_some()
    }

    /// The active origin, if any.
    #[must_use]
    pub fn origin(&self) -> Option<&Geodetic> {
        self.origin.as_ref()
    }

    /// A counter that increments every time the origin is replaced.
    ///
    /// Zero means "never had an origin".
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Converts a global position into this frame's local ENU coordinates.
    ///
    /// The conversion is the ECEF difference from the origin rotated into
    /// the tangent-plane ENU basis at the origin's latitude/longitude. It is
    /// exact as a round trip, but as a *flat-plane reading* of the curved
    /// earth it degrades with distance; treat coordinates beyond a few
    /// hundred kilometers from the origin as qualitative.
    ///
    /// # Errors
    ///
    /// [`PlanningError::NoReferenceFrame`] if no origin has been set.
    pub fn global_to_local(&self, global: &Geodetic) -> Result<Enu, PlanningError> {
        let origin = self.origin.as_ref().ok_or(PlanningError::NoReferenceFrame)?;

        let origin_ecef = Ecef::from_geodetic(origin);
        let target_ecef = Ecef::from_geodetic(global);
        let delta = target_ecef.point - origin_ecef.point;

        let enu = Self::ecef_to_enu_rotation(origin) * delta;
        Ok(Enu::from_nalgebra_point(enu.into()))
    }

    /// Converts local ENU coordinates back into a global position.
    ///
    /// This is the exact inverse of
    /// [`global_to_local`](ReferenceFrame::global_to_local): rotate the ENU
    /// offset back into the ECEF basis, add the origin, and reduce to
    /// geodetic.
    ///
    /// # Errors
    ///
    /// [`PlanningError::NoReferenceFrame`] if no origin has been set.
    pub fn local_to_global(&self, local: &Enu) -> Result<Geodetic, PlanningError> {
        let origin = self.origin.as_ref().ok_or(PlanningError::NoReferenceFrame)?;

        let origin_ecef = Ecef::from_geodetic(origin);
        let delta = Self::ecef_to_enu_rotation(origin).transpose() * local.point.coords;

        Ok(Ecef::from_nalgebra_point(origin_ecef.point + delta).to_geodetic())
    }

    /// The rotation taking ECEF-basis vectors into the ENU basis at the
    /// given origin.
    ///
    /// Rows are the East, North, and Up unit vectors expressed in ECEF; see
    /// <https://en.wikipedia.org/wiki/Local_tangent_plane_coordinates#Local_east,_north,_up_(ENU)_coordinates>.
    fn ecef_to_enu_rotation(origin: &Geodetic) -> Matrix3<f64> {
        let lat = origin.latitude.get::<radian>();
        let lon = origin.longitude.get::<radian>();

        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        Matrix3::new(
            -sin_lon,
            cos_lon,
            0.,
            -sin_lat * cos_lon,
            -sin_lat * sin_lon,
            cos_lat,
            cos_lat * cos_lon,
            cos_lat * sin_lon,
            sin_lat,
        )
    }
}
