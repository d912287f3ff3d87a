use uom::si::angle::radian;
use uom::si::f64::Angle;

/// An angle normalized into [0°, 360°).
///
/// Headings, orbit sweeps, and longitudes all arrive in whatever range the
/// caller happened to produce them in; this wrapper pins down a single
/// normalization so comparisons and formatting don't have to re-derive it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundedAngle {
    angle: Angle,
}

impl BoundedAngle {
    pub(crate) fn new(angle: impl Into<Angle>) -> Self {
        // uom may store the value differently-normalized than we handed it
        // in, so we must also normalize again on every read.
        Self {
            angle: Angle::new::<radian>(Self::into_bounds(angle.into())),
        }
    }

    /// Returns the angle in [0°, 360°) in radians.
    pub(crate) fn get_bounded(self) -> f64 {
        Self::into_bounds(self.angle)
    }

    /// Returns the angle in [-180°, 180°) in radians.
    pub(crate) fn to_signed_range(self) -> f64 {
        let angle = self.get_bounded();
        if angle < Angle::HALF_TURN.get::<radian>() {
            angle
        } else {
            angle - Angle::FULL_TURN.get::<radian>()
        }
    }

    fn into_bounds(angle: Angle) -> f64 {
        let out_of_bounds: f64 = angle.get::<radian>();
        out_of_bounds.rem_euclid(Angle::FULL_TURN.get::<radian>())
    }
}

/// Splits a non-negative angle in degrees into whole degrees, whole minutes,
/// and decimal seconds for sexagesimal display.
pub(crate) fn to_degrees_minutes_seconds(degrees: f64) -> (u32, u32, f64) {
    let degrees = degrees.abs();
    let whole_degrees = degrees.trunc();
    let minutes = (degrees - whole_degrees) * 60.;
    let whole_minutes = minutes.trunc();
    let seconds = (minutes - whole_minutes) * 60.;
    (whole_degrees as u32, whole_minutes as u32, seconds)
}

#[cfg(test)]
mod tests {
    use super::{to_degrees_minutes_seconds, BoundedAngle};
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::angle::degree;
    use uom::si::f64::Angle;

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    #[rstest]
    #[case(d(0.), 0.)]
    #[case(d(-390.), 330.)]
    #[case(d(360.), 0.)]
    #[case(d(360. + 120.), 120.)]
    #[case(d(270.), 270.)]
    fn bounded_angle_wraps_into_full_turn(#[case] input: Angle, #[case] expected_degrees: f64) {
        let bounded = BoundedAngle::new(input);
        assert_relative_eq!(
            bounded.get_bounded(),
            expected_degrees.to_radians(),
            epsilon = f64::EPSILON * 1000.
        );
    }

    #[rstest]
    #[case(d(0.), 0.)]
    #[case(d(180.), -180.)]
    #[case(d(359.), -1.)]
    #[case(d(270.), -90.)]
    #[case(d(-90.), -90.)]
    #[case(d(360. + 340.), -20.)]
    fn bounded_angle_to_signed_range_converts_correctly(
        #[case] input: Angle,
        #[case] expected_degrees: f64,
    ) {
        let bounded = BoundedAngle::new(input);
        assert_relative_eq!(
            bounded.to_signed_range(),
            expected_degrees.to_radians(),
            epsilon = f64::EPSILON * 1000.
        );
    }

    #[test]
    fn dms_split() {
        let (d, m, s) = to_degrees_minutes_seconds(37.7749);
        assert_eq!((d, m), (37, 46));
        assert_relative_eq!(s, 29.64, epsilon = 1e-6);

        let (d, m, s) = to_degrees_minutes_seconds(-122.4194);
        assert_eq!((d, m), (122, 25));
        assert_relative_eq!(s, 9.84, epsilon = 1e-6);
    }
}
