//! Physical length conversions.
//!
//! Vector surfaces (SVG, PDF, PS) measure in points: 72 points per inch and
//! 2.54 cm per inch.

/// Points per meter.
pub const PT_PER_METER: f64 = 72.0 / 2.54 * 100.0;

/// Convert a length in meters to points.
#[inline]
pub fn meters_to_points(meters: f64) -> f64 {
    meters * PT_PER_METER
}

/// Convert a length in points to meters.
#[inline]
pub fn points_to_meters(points: f64) -> f64 {
    points / PT_PER_METER
}
