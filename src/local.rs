use crate::util::BoundedAngle;
use crate::Point3;
use std::fmt;
use std::fmt::{Display, Formatter};
use uom::si::angle::radian;
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the local East-North-Up tangent-plane frame.
///
/// - Positive X is East.
/// - Positive Y is North.
/// - Positive Z is away from the center of the earth ("Up").
///
/// An `Enu` is only meaningful relative to the origin of the
/// [`ReferenceFrame`](crate::ReferenceFrame) that produced it. Two `Enu`
/// values from different frames (or from before and after a
/// [`set_origin`](crate::ReferenceFrame::set_origin)) must never be compared
/// or mixed without re-projection; snapshot the frame's
/// [`generation`](crate::ReferenceFrame::generation) alongside any `Enu`
/// that outlives a single computation.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Enu {
    /// east, north, up in meters
    pub(crate) point: Point3,
}

impl Enu {
    pub(crate) fn from_nalgebra_point(point: Point3) -> Self {
        Self { point }
    }

    /// Constructs a point at the given east/north/up offsets from the frame
    /// origin.
    pub fn from_cartesian(
        east: impl Into<Length>,
        north: impl Into<Length>,
        up: impl Into<Length>,
    ) -> Self {
        Self::from_nalgebra_point(Point3::new(
            east.into().get::<meter>(),
            north.into().get::<meter>(),
            up.into().get::<meter>(),
        ))
    }

    /// Constructs a point from named components.
    pub fn build(Components { east, north, up }: Components) -> Self {
        Self::from_cartesian(east, north, up)
    }

    /// The frame origin itself: (0 m, 0 m, 0 m).
    #[must_use]
    pub fn origin() -> Self {
        Self {
            point: Point3::origin(),
        }
    }

    #[must_use]
    pub fn east(&self) -> Length {
        Length::new::<meter>(self.point.x)
    }

    #[must_use]
    pub fn north(&self) -> Length {
        Length::new::<meter>(self.point.y)
    }

    #[must_use]
    pub fn up(&self) -> Length {
        Length::new::<meter>(self.point.z)
    }

    /// Returns the cartesian components in east, north, up order.
    #[must_use]
    pub fn to_cartesian(&self) -> [Length; 3] {
        [self.east(), self.north(), self.up()]
    }

    /// Returns a copy of this point shifted by the given offsets.
    #[must_use]
    pub fn translated(
        &self,
        east: impl Into<Length>,
        north: impl Into<Length>,
        up: impl Into<Length>,
    ) -> Self {
        Self::from_nalgebra_point(Point3::new(
            self.point.x + east.into().get::<meter>(),
            self.point.y + north.into().get::<meter>(),
            self.point.z + up.into().get::<meter>(),
        ))
    }

    /// Returns a copy of this point with the up component replaced.
    #[must_use]
    pub fn with_up(&self, up: impl Into<Length>) -> Self {
        Self::from_nalgebra_point(Point3::new(
            self.point.x,
            self.point.y,
            up.into().get::<meter>(),
        ))
    }

    /// Computes the straight-line distance to another point in the same
    /// frame.
    #[must_use]
    pub fn distance_from(&self, other: &Enu) -> Length {
        Length::new::<meter>((self.point - other.point).norm())
    }

    /// Computes the distance to another point ignoring the up components.
    #[must_use]
    pub fn horizontal_distance_from(&self, other: &Enu) -> Length {
        Length::new::<meter>((self.point.x - other.point.x).hypot(self.point.y - other.point.y))
    }

    /// Computes the compass heading (clockwise from North, in [0°, 360°))
    /// from this point towards another, ignoring the up components.
    ///
    /// Returns `None` when the two points are horizontally coincident, as
    /// the heading is then ill-defined.
    #[must_use]
    pub fn heading_towards(&self, other: &Enu) -> Option<Angle> {
        let delta_east = other.point.x - self.point.x;
        let delta_north = other.point.y - self.point.y;
        if delta_east == 0. && delta_north == 0. {
            return None;
        }
        let heading = delta_east.atan2(delta_north);
        Some(Angle::new::<radian>(
            BoundedAngle::new(Angle::new::<radian>(heading)).get_bounded(),
        ))
    }

    /// Linearly interpolates between this point and another.
    ///
    /// Returns `self * (1 - t) + rhs * t`; `t` is not restricted to [0, 1].
    #[must_use]
    pub fn lerp(&self, rhs: &Self, t: f64) -> Self {
        Self {
            point: self.point.lerp(&rhs.point, t),
        }
    }
}

impl Default for Enu {
    fn default() -> Self {
        Self::origin()
    }
}

impl PartialEq<Self> for Enu {
    fn eq(&self, other: &Self) -> bool {
        self.point.eq(&other.point)
    }
}

impl Display for Enu {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(E {}m, N {}m, U {}m)",
            self.point.x, self.point.y, self.point.z
        )
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Enu {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        // in meters; planning geometry is happily sub-decimeter
        Length::new::<meter>(0.1)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        // per-component comparison, not vector magnitude
        self.point.abs_diff_eq(&other.point, epsilon.get::<meter>())
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Enu {
    fn default_max_relative() -> Self::Epsilon {
        Length::new::<meter>(Point3::default_max_relative())
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.point.relative_eq(
            &other.point,
            epsilon.get::<meter>(),
            max_relative.get::<meter>(),
        )
    }
}

/// Argument type for [`Enu::build`].
#[derive(Debug, Default, Clone, Copy)]
#[must_use]
pub struct Components {
    pub east: Length,
    pub north: Length,
    pub up: Length,
}

#[cfg(test)]
mod tests {
    use super::Enu;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::angle::degree;
    use uom::si::f64::Length;
    use uom::si::length::meter;

    fn m(meters: f64) -> Length {
        Length::new::<meter>(meters)
    }
    fn enu(east: f64, north: f64, up: f64) -> Enu {
        Enu::from_cartesian(m(east), m(north), m(up))
    }

    #[test]
    fn distances() {
        let a = enu(3., 4., 0.);
        assert_relative_eq!(a.distance_from(&Enu::origin()).get::<meter>(), 5.);

        let b = enu(3., 4., 12.);
        assert_relative_eq!(b.distance_from(&Enu::origin()).get::<meter>(), 13.);
        assert_relative_eq!(b.horizontal_distance_from(&Enu::origin()).get::<meter>(), 5.);
    }

    #[rstest]
    #[case(enu(0., 10., 0.), 0.)] // due north
    #[case(enu(10., 0., 0.), 90.)] // due east
    #[case(enu(0., -10., 0.), 180.)] // due south
    #[case(enu(-10., 0., 0.), 270.)] // due west
    #[case(enu(10., 10., 0.), 45.)]
    fn heading_towards_is_compass_style(#[case] target: Enu, #[case] expected_degrees: f64) {
        let heading = Enu::origin()
            .heading_towards(&target)
            .expect("target is not coincident");
        assert_relative_eq!(heading.get::<degree>(), expected_degrees, epsilon = 1e-9);
    }

    #[test]
    fn heading_towards_coincident_is_none() {
        let p = enu(1., 2., 3.);
        assert_eq!(p.heading_towards(&p.with_up(m(50.))), None);
    }

    #[test]
    fn lerp_blends_components() {
        let a = enu(0., 0., 10.);
        let b = enu(10., 20., 30.);
        assert_relative_eq!(a.lerp(&b, 0.5), enu(5., 10., 20.));
        assert_relative_eq!(a.lerp(&b, 0.), a);
        assert_relative_eq!(a.lerp(&b, 1.), b);
    }
}
