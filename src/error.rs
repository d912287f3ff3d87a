use thiserror::Error;

/// Errors produced by the planning core.
///
/// The taxonomy deliberately separates "you gave me garbage"
/// ([`InvalidGeometry`](PlanningError::InvalidGeometry),
/// [`InvalidOpticsInput`](PlanningError::InvalidOpticsInput)) from "your input
/// was fine but produced nothing" ([`EmptyPattern`](PlanningError::EmptyPattern)),
/// so that an interactive caller can tell the operator *why* there is nothing
/// to display rather than showing a single generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// A local↔global conversion was requested before any origin was set on
    /// the [`ReferenceFrame`](crate::ReferenceFrame).
    ///
    /// Local coordinates are meaningless without an origin, so this is never
    /// silently defaulted to (0°, 0°, 0 m).
    #[error("no reference frame origin has been set")]
    NoReferenceFrame,

    /// A pattern generator was handed degenerate geometry: a non-positive
    /// radius or standoff, a polygon with fewer than three corners or zero
    /// area, a zero-length wall, and so on.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),

    /// An optics computation was handed a physically meaningless input, such
    /// as a non-positive focal length, aperture, or sensor dimension.
    ///
    /// Note that an *unbounded* depth-of-field far limit is not an error; see
    /// [`DofLimit`](crate::optics::DofLimit).
    #[error("invalid optics input: {0}")]
    InvalidOpticsInput(&'static str),

    /// The inputs were valid but yield zero waypoints, e.g. an orbit with a
    /// zero-degree sweep (or zero orbit count) or a survey polygon that no
    /// flight line crosses.
    #[error("pattern parameters produce no waypoints")]
    EmptyPattern,
}
