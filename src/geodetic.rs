use crate::util::{to_degrees_minutes_seconds, BoundedAngle};
use crate::Point3;
use std::fmt;
use std::fmt::Display;
use std::marker::PhantomData;
use uom::si::f64::{Angle, Length};
use uom::si::{
    angle::{degree, radian},
    length::meter,
};
use uom::ConstZero;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Defining parameters of the WGS84 reference ellipsoid,
// https://nsgreg.nga.mil/doc/view?i=4085 table 3.1
#[doc(alias = "equatorial radius")]
#[doc(alias = "a")]
pub(crate) const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
#[doc(alias = "1/f")]
const FLATTENING_FACTOR: f64 = 298.257_223_563;
#[doc(alias = "f")]
const FLATTENING: f64 = 1.0 / FLATTENING_FACTOR;
#[doc(alias = "polar radius")]
#[doc(alias = "b")]
const SEMI_MINOR_AXIS: f64 = SEMI_MAJOR_AXIS * (1.0 - FLATTENING);
// e^2 = 1 - b^2/a^2 = 2f - f^2
#[doc(alias = "e^2")]
const ECCENTRICITY_SQ: f64 = 2.0 * FLATTENING - FLATTENING * FLATTENING;
// e'^2 = (a^2 - b^2) / b^2, the second eccentricity squared, which appears in
// Bowring's auxiliary-angle formulation of ECEF -> geodetic.
const SECOND_ECCENTRICITY_SQ: f64 = (SEMI_MAJOR_AXIS * SEMI_MAJOR_AXIS
    - SEMI_MINOR_AXIS * SEMI_MINOR_AXIS)
    / (SEMI_MINOR_AXIS * SEMI_MINOR_AXIS);

/// An Earth-bound location in the [World Geodetic System
/// '84](https://en.wikipedia.org/wiki/World_Geodetic_System#WGS_84):
/// latitude, longitude, and altitude above the reference ellipsoid.
///
/// This is the "global" half of the planning core's coordinate model; the
/// local half is [`Enu`](crate::Enu), and [`ReferenceFrame`](crate::ReferenceFrame)
/// converts between the two.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geodetic {
    // uom does not guarantee how angles are normalized, so accessors
    // re-normalize on the way out rather than trusting stored values.
    pub(crate) latitude: Angle,
    pub(crate) longitude: Angle,
    altitude: Length,
}

impl Geodetic {
    /// Constructs a location from latitude, longitude, and altitude.
    ///
    /// The latitude must be in [-90°, 90°] % 360°. If it is not, this
    /// function returns `None`.
    ///
    /// The altitude is measured as distance above the WGS84 reference
    /// ellipsoid.
    #[must_use]
    pub fn build(
        Components {
            latitude,
            longitude,
            altitude,
        }: Components,
    ) -> Option<Self> {
        Some(
            Self::builder()
                .latitude(latitude)?
                .longitude(longitude)
                .altitude(altitude)
                .build(),
        )
    }

    /// Provides a constructor for a [`Geodetic`] location.
    pub fn builder() -> Builder<MissingLatitude, MissingLongitude, MissingAltitude> {
        Builder {
            under_construction: Geodetic {
                latitude: Angle::ZERO,
                longitude: Angle::ZERO,
                altitude: Length::ZERO,
            },
            has: (PhantomData, PhantomData, PhantomData),
        }
    }

    /// Returns the angle north of the equator ("northing").
    ///
    /// The returned value is always in [-90°, 90°].
    #[must_use]
    pub fn latitude(&self) -> Angle {
        Angle::new::<radian>(BoundedAngle::new(self.latitude).to_signed_range())
    }

    /// Returns the angle east of the [IERS Reference Meridian] near Greenwich
    /// ("easting").
    ///
    /// [IERS Reference Meridian]: https://en.wikipedia.org/wiki/IERS_Reference_Meridian
    #[must_use]
    pub fn longitude(&self) -> Angle {
        Angle::new::<radian>(BoundedAngle::new(self.longitude).to_signed_range())
    }

    /// Returns the distance beyond the WGS84 reference ellipsoid.
    ///
    /// Note that the ellipsoid is an approximation that does not align with
    /// ground level, so this is neither height above ground nor above mean
    /// sea level, though it is close to the latter.
    #[must_use]
    pub fn altitude(&self) -> Length {
        self.altitude
    }

    /// Computes the [great-circle distance] between two locations on the
    /// surface of the earth.
    ///
    /// This is an approximation as the earth is not a perfect sphere; it is
    /// good enough for survey-scale sanity checks like "how far is the area
    /// of interest from the launch point". The current implementation uses
    /// the inverse haversine.
    ///
    /// [great-circle distance]: https://en.wikipedia.org/wiki/Great-circle_distance
    #[doc(alias = "great_circle_distance")]
    #[must_use]
    pub fn haversine_distance_on_surface(&self, other: &Geodetic) -> Length {
        let lat_a = self.latitude.get::<radian>();
        let lat_b = other.latitude.get::<radian>();
        let delta_lat = lat_b - lat_a;
        let delta_lon = (other.longitude - self.longitude).get::<radian>();

        let inner = 1. - delta_lat.cos() + lat_a.cos() * lat_b.cos() * (1. - delta_lon.cos());
        let central_angle = 2. * (inner / 2.).sqrt().asin();

        central_angle * Length::new::<meter>(SEMI_MAJOR_AXIS)
    }

    /// Formats the latitude in the requested style, suffixed with the
    /// hemisphere (`N`/`S`).
    #[must_use]
    pub fn format_latitude(&self, style: LatLonFormat) -> String {
        let lat = self.latitude();
        let hemisphere = if lat.is_sign_positive() { 'N' } else { 'S' };
        style.render(lat.abs().get::<degree>(), hemisphere)
    }

    /// Formats the longitude in the requested style, suffixed with the
    /// hemisphere (`E`/`W`).
    #[must_use]
    pub fn format_longitude(&self, style: LatLonFormat) -> String {
        let lon = self.longitude();
        let hemisphere = if lon.is_sign_positive() { 'E' } else { 'W' };
        style.render(lon.abs().get::<degree>(), hemisphere)
    }
}

impl Display for Geodetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}m",
            self.format_latitude(LatLonFormat::DecimalDegrees),
            self.format_longitude(LatLonFormat::DecimalDegrees),
            self.altitude.get::<meter>()
        )
    }
}

/// Human-readable rendering styles for latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LatLonFormat {
    /// `37.774900°N`
    DecimalDegrees,
    /// `37°46'29.64"N`
    DegreesMinutesSeconds,
    /// `37°46.4940'N`
    DegreesDecimalMinutes,
}

impl LatLonFormat {
    fn render(self, absolute_degrees: f64, hemisphere: char) -> String {
        match self {
            LatLonFormat::DecimalDegrees => {
                format!("{absolute_degrees:.6}°{hemisphere}")
            }
            LatLonFormat::DegreesMinutesSeconds => {
                let (d, m, s) = to_degrees_minutes_seconds(absolute_degrees);
                format!("{d}°{m}'{s:.2}\"{hemisphere}")
            }
            LatLonFormat::DegreesDecimalMinutes => {
                let whole = absolute_degrees.trunc();
                let minutes = (absolute_degrees - whole) * 60.;
                format!("{whole:.0}°{minutes:.4}'{hemisphere}")
            }
        }
    }
}

/// A position in the [Earth-Centered, Earth-Fixed][ecef] cartesian frame.
///
/// - Positive Z is towards the North pole.
/// - Positive X is towards the prime meridian on the equator.
/// - Positive Y is towards 90°E on the equator.
///
/// `Ecef` is the interchange frame between [`Geodetic`] and the local
/// tangent-plane [`Enu`](crate::Enu) frame; most callers never touch it
/// directly and instead go through [`ReferenceFrame`](crate::ReferenceFrame).
///
/// [ecef]: https://en.wikipedia.org/wiki/Earth-centered,_Earth-fixed_coordinate_system
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Ecef {
    /// X, Y, Z in meters.
    pub(crate) point: Point3,
}

impl Ecef {
    pub(crate) fn from_nalgebra_point(point: Point3) -> Self {
        Self { point }
    }

    /// Constructs an ECEF position from its cartesian components.
    pub fn from_cartesian(
        x: impl Into<Length>,
        y: impl Into<Length>,
        z: impl Into<Length>,
    ) -> Self {
        Self::from_nalgebra_point(Point3::new(
            x.into().get::<meter>(),
            y.into().get::<meter>(),
            z.into().get::<meter>(),
        ))
    }

    #[must_use]
    pub fn x(&self) -> Length {
        Length::new::<meter>(self.point.x)
    }

    #[must_use]
    pub fn y(&self) -> Length {
        Length::new::<meter>(self.point.y)
    }

    #[must_use]
    pub fn z(&self) -> Length {
        Length::new::<meter>(self.point.z)
    }

    /// Converts latitude, longitude, and altitude into ECEF using the
    /// standard [prime-vertical-radius formula][conv].
    ///
    /// [conv]: https://en.wikipedia.org/wiki/Geographic_coordinate_conversion#From_geodetic_to_ECEF_coordinates
    #[must_use]
    pub fn from_geodetic(geodetic: &Geodetic) -> Self {
        let height = geodetic.altitude.get::<meter>();
        let lat = geodetic.latitude.get::<radian>();
        let lon = geodetic.longitude.get::<radian>();

        let sin_lat = lat.sin();
        // prime vertical radius of curvature at this latitude
        let n = SEMI_MAJOR_AXIS / (1. - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();

        let x = (n + height) * lat.cos() * lon.cos();
        let y = (n + height) * lat.cos() * lon.sin();
        let z = ((1. - ECCENTRICITY_SQ) * n + height) * sin_lat;

        Self::from_nalgebra_point(Point3::new(x, y, z))
    }

    /// Converts an ECEF position into latitude, longitude, and altitude
    /// using [Bowring's method].
    ///
    /// The auxiliary angle θ = atan2(z·a, p·b) gives a closed-form latitude
    /// with no iteration, which keeps the conversion deterministic and fast.
    /// The residual error is far below a millimeter for any position a drone
    /// can reach, which is well inside this crate's round-trip contract of
    /// 1e-6° / 1e-3 m.
    ///
    /// The altitude uses the form `h = p·cosφ + z·sinφ − a·√(1−e²·sin²φ)`,
    /// which stays well-conditioned at the poles where the more common
    /// `p/cosφ − N` blows up.
    ///
    /// [Bowring's method]: https://en.wikipedia.org/wiki/Geographic_coordinate_conversion#From_ECEF_to_geodetic_coordinates
    #[must_use]
    pub fn to_geodetic(&self) -> Geodetic {
        let x = self.point.x;
        let y = self.point.y;
        let z = self.point.z;

        let lon = y.atan2(x);

        let p = x.hypot(y);
        let theta = (z * SEMI_MAJOR_AXIS).atan2(p * SEMI_MINOR_AXIS);
        let (sin_theta, cos_theta) = theta.sin_cos();

        let lat = (z + SECOND_ECCENTRICITY_SQ * SEMI_MINOR_AXIS * sin_theta.powi(3))
            .atan2(p - ECCENTRICITY_SQ * SEMI_MAJOR_AXIS * cos_theta.powi(3));

        let (sin_lat, cos_lat) = lat.sin_cos();
        let altitude =
            p * cos_lat + z * sin_lat - SEMI_MAJOR_AXIS * (1. - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();

        Geodetic::builder()
            .latitude(Angle::new::<radian>(lat))
            .expect("atan2 produces latitude in [-pi/2, pi/2]")
            .longitude(Angle::new::<radian>(lon))
            .altitude(Length::new::<meter>(altitude))
            .build()
    }
}

impl From<&Geodetic> for Ecef {
    fn from(geodetic: &Geodetic) -> Self {
        Self::from_geodetic(geodetic)
    }
}

impl From<Ecef> for Geodetic {
    fn from(ecef: Ecef) -> Self {
        ecef.to_geodetic()
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Geodetic {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        // in meters; sub-meter agreement is all the lat/lon representation
        // itself can promise once an ECEF conversion is involved.
        Length::new::<meter>(0.75)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.haversine_distance_on_surface(other) < epsilon
            && self
                .altitude
                .get::<meter>()
                .abs_diff_eq(&other.altitude.get::<meter>(), epsilon.get::<meter>())
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Ecef {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        Length::new::<meter>(0.001)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.point.abs_diff_eq(&other.point, epsilon.get::<meter>())
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Ecef {
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

/// Argument type for [`Geodetic::build`].
#[derive(Debug, Default)]
#[must_use]
pub struct Components {
    /// The latitude of the proposed [`Geodetic`] location.
    ///
    /// Must be in [-90°, 90°] % 360°.
    pub latitude: Angle,

    /// The longitude of the proposed [`Geodetic`] location.
    pub longitude: Angle,

    /// The altitude of the proposed [`Geodetic`] location, measured above
    /// the WGS84 reference ellipsoid.
    pub altitude: Length,
}

/// Used to indicate that a partially-constructed [`Geodetic`] is missing the latitude.
pub struct MissingLatitude;
/// Used to indicate that a partially-constructed [`Geodetic`] has the latitude set.
pub struct HasLatitude;
/// Used to indicate that a partially-constructed [`Geodetic`] is missing the longitude.
pub struct MissingLongitude;
/// Used to indicate that a partially-constructed [`Geodetic`] has the longitude set.
pub struct HasLongitude;
/// Used to indicate that a partially-constructed [`Geodetic`] is missing the altitude.
pub struct MissingAltitude;
/// Used to indicate that a partially-constructed [`Geodetic`] has the altitude set.
pub struct HasAltitude;

/// [Builder] for a [`Geodetic`] location.
///
/// Construct one through [`Geodetic::builder`], and finalize with
/// [`Builder::build`].
///
/// [Builder]: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
#[derive(Debug)]
#[must_use]
pub struct Builder<Latitude, Longitude, Altitude> {
    under_construction: Geodetic,
    has: (
        PhantomData<Latitude>,
        PhantomData<Longitude>,
        PhantomData<Altitude>,
    ),
}

// manual impls of Clone and Copy to avoid bounds on the marker parameters
impl<L1, L2, A> Clone for Builder<L1, L2, A> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<L1, L2, A> Copy for Builder<L1, L2, A> {}

impl<L1, L2, A> Builder<L1, L2, A> {
    /// Sets the latitude of the [`Geodetic`]-to-be.
    ///
    /// The latitude must be in [-90°, 90°] % 360°. If it is not, this
    /// function returns `None`.
    pub fn latitude(mut self, latitude: impl Into<Angle>) -> Option<Builder<HasLatitude, L2, A>> {
        let latitude = latitude.into();
        let in_signed_radians = BoundedAngle::new(latitude).to_signed_range();
        if !(-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2)
            .contains(&in_signed_radians)
        {
            None
        } else {
            self.under_construction.latitude = latitude;
            Some(Builder {
                under_construction: self.under_construction,
                has: (PhantomData::<HasLatitude>, self.has.1, self.has.2),
            })
        }
    }

    /// Sets the longitude of the [`Geodetic`]-to-be.
    pub fn longitude(mut self, longitude: impl Into<Angle>) -> Builder<L1, HasLongitude, A> {
        self.under_construction.longitude = longitude.into();
        Builder {
            under_construction: self.under_construction,
            has: (self.has.0, PhantomData::<HasLongitude>, self.has.2),
        }
    }

    /// Sets the altitude of the [`Geodetic`]-to-be, measured above the WGS84
    /// reference ellipsoid.
    pub fn altitude(mut self, altitude: impl Into<Length>) -> Builder<L1, L2, HasAltitude> {
        self.under_construction.altitude = altitude.into();
        Builder {
            under_construction: self.under_construction,
            has: (self.has.0, self.has.1, PhantomData::<HasAltitude>),
        }
    }
}

impl Builder<HasLatitude, HasLongitude, HasAltitude> {
    #[must_use]
    pub fn build(self) -> Geodetic {
        self.under_construction
    }
}
