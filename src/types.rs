//! Value types shared by the matcher: points, tolerances, partition keys.
//!
//! Raw `f64`s coming from documents or the command line are validated once
//! on the way in (`Tolerance::try_new`, `Point::try_new`) so the matcher
//! never has to think about NaN.

use std::fmt;
use std::ops::{Add, Sub};

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw number rejected on the way in
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    #[error("got NaN, expected a number")]
    NaN,
    #[error("got {0}, expected a finite number")]
    Infinite(f64),
    #[error("got {0}, expected zero or more")]
    Negative(f64),
}

fn finite(val: f64) -> Result<f64, NumericError> {
    match val {
        v if v.is_nan() => Err(NumericError::NaN),
        v if v.is_infinite() => Err(NumericError::Infinite(v)),
        v => Ok(v),
    }
}

/// A 2-D point. Which coordinate space it lives in is up to the owner:
/// reference nodes hold local points, artifacts hold target-space points.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Create a point with validation (rejects NaN/infinite coordinates)
    pub fn try_new(x: f64, y: f64) -> Result<Self, NumericError> {
        Ok(Point {
            x: finite(x)?,
            y: finite(y)?,
        })
    }

    /// Euclidean distance to `other`
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        // hypot keeps tiny offsets from squaring to zero
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub fn to_dvec2(self) -> DVec2 {
        dvec2(self.x, self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::from((self.to_dvec2() + other.to_dvec2()) * 0.5)
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Point { x: v.x, y: v.y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Maximum accepted distance between an artifact and its reference node.
///
/// Always finite and non-negative. A tolerance of zero only accepts
/// exactly coincident points.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Tolerance(f64);

impl Tolerance {
    pub const ZERO: Tolerance = Tolerance(0.0);

    /// Create a tolerance with validation
    pub fn try_new(val: f64) -> Result<Tolerance, NumericError> {
        let val = finite(val)?;
        if val < 0.0 {
            Err(NumericError::Negative(val))
        } else {
            Ok(Tolerance(val))
        }
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Whether `distance` is within this tolerance (inclusive)
    #[inline]
    pub fn accepts(self, distance: f64) -> bool {
        distance <= self.0
    }
}

impl<'de> Deserialize<'de> for Tolerance {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Tolerance::try_new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tree label grouping nodes and artifacts, e.g. `A`.
///
/// Keys are trimmed and ASCII upper-cased so `a` and ` A ` name the same
/// tree; the id conventions use lower case, the artwork labels upper case.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        PartitionKey(key.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PartitionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PartitionKey::new(raw))
    }
}

impl From<&str> for PartitionKey {
    fn from(s: &str) -> Self {
        PartitionKey::new(s)
    }
}

impl From<String> for PartitionKey {
    fn from(s: String) -> Self {
        PartitionKey::new(s)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    /// An empty bounding box; expanding it with any point makes it that point
    pub fn new() -> Self {
        BBox {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_point(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(self.max)
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Point> for BBox {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut bbox = BBox::new();
        for p in iter {
            bbox.expand_point(p);
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_try_new_rejects_nan() {
        assert_eq!(Point::try_new(f64::NAN, 0.0), Err(NumericError::NaN));
        assert_eq!(Point::try_new(0.0, f64::INFINITY), Err(NumericError::Infinite(f64::INFINITY)));
        assert!(Point::try_new(1.0, -2.0).is_ok());
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn point_distance_does_not_underflow() {
        let d = Point::new(1e-200, 0.0).distance(Point::ORIGIN);
        assert_eq!(d, 1e-200);
        assert!(Point::new(3e-200, 4e-200).distance(Point::ORIGIN) > 0.0);
    }

    #[test]
    fn point_arithmetic() {
        let p = Point::new(1.0, 2.0) + Point::new(3.0, 4.0);
        assert_eq!(p, Point::new(4.0, 6.0));
        assert_eq!(p - Point::new(4.0, 6.0), Point::ORIGIN);
        assert_eq!(Point::new(0.0, 0.0).midpoint(Point::new(2.0, 4.0)), Point::new(1.0, 2.0));
    }

    #[test]
    fn tolerance_try_new_valid() {
        assert_eq!(Tolerance::try_new(0.0).map(Tolerance::raw), Ok(0.0));
        assert_eq!(Tolerance::try_new(15.0).map(Tolerance::raw), Ok(15.0));
    }

    #[test]
    fn tolerance_try_new_rejects_invalid() {
        assert_eq!(Tolerance::try_new(-0.5), Err(NumericError::Negative(-0.5)));
        assert_eq!(Tolerance::try_new(f64::NAN), Err(NumericError::NaN));
        assert_eq!(Tolerance::try_new(f64::INFINITY), Err(NumericError::Infinite(f64::INFINITY)));
    }

    #[test]
    fn tolerance_is_inclusive() {
        let t = Tolerance::try_new(5.0).unwrap();
        assert!(t.accepts(5.0));
        assert!(t.accepts(0.0));
        assert!(!t.accepts(5.000001));
        assert!(Tolerance::ZERO.accepts(0.0));
        assert!(!Tolerance::ZERO.accepts(f64::MIN_POSITIVE));
    }

    #[test]
    fn tolerance_deserialize_validates() {
        let t: Tolerance = serde_json::from_str("12.5").unwrap();
        assert_eq!(t.raw(), 12.5);
        assert!(serde_json::from_str::<Tolerance>("-1").is_err());
    }

    #[test]
    fn partition_key_normalizes() {
        assert_eq!(PartitionKey::new(" a "), PartitionKey::new("A"));
        assert_eq!(PartitionKey::from("tree").as_str(), "TREE");
        let key: PartitionKey = serde_json::from_str("\"c\"").unwrap();
        assert_eq!(key.as_str(), "C");
    }

    #[test]
    fn bbox_new_is_empty() {
        assert!(BBox::new().is_empty());
    }

    #[test]
    fn bbox_from_points() {
        let bbox: BBox = [Point::new(1.0, 5.0), Point::new(-1.0, 2.0), Point::new(3.0, 3.0)]
            .into_iter()
            .collect();
        assert!(!bbox.is_empty());
        assert_eq!(bbox.min, Point::new(-1.0, 2.0));
        assert_eq!(bbox.max, Point::new(3.0, 5.0));
        assert_eq!(bbox.width(), 4.0);
        assert_eq!(bbox.height(), 3.0);
        assert_eq!(bbox.center(), Point::new(1.0, 3.5));
    }
}
