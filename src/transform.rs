//! Affine transforms between a tree's local space and the artwork space.

use std::collections::BTreeMap;
use std::fmt;

use glam::{DAffine2, DMat2, dvec2};
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, SingularTransform, TransformParseError};
use crate::parse::{TransformOp, parse_transform_list};
use crate::types::{PartitionKey, Point};

/// Determinants smaller than this are treated as zero when inverting.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A 2-D affine map in SVG `matrix(a b c d e f)` order:
///
/// ```text
/// x' = a·x + c·y + e
/// y' = b·x + d·y + f
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        AffineTransform { a, b, c, d, e, f }
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        AffineTransform::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        AffineTransform::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation about the origin. Positive angles turn +x toward +y, which
    /// is clockwise on screen since SVG's y axis points down.
    pub fn rotate_degrees(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        AffineTransform::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn skew_x_degrees(degrees: f64) -> Self {
        AffineTransform::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y_degrees(degrees: f64) -> Self {
        AffineTransform::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// Parse an SVG transform list such as `translate(10,20) rotate(45)`.
    ///
    /// As in SVG, the list composes left to right, so the rightmost
    /// function is applied to the point first. An empty list is the identity.
    pub fn parse(source: &str) -> Result<Self, TransformParseError> {
        Self::parse_named("<transform>", source)
    }

    /// Like [`AffineTransform::parse`], naming the source in diagnostics
    pub fn parse_named(name: &str, source: &str) -> Result<Self, TransformParseError> {
        let ops = parse_transform_list(name, source)?;
        Ok(ops
            .into_iter()
            .map(AffineTransform::from)
            .fold(AffineTransform::IDENTITY, |acc, op| op.then(acc)))
    }

    /// Apply the transform to a point
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// The transform that applies `self` first and then `next`
    pub fn then(self, next: AffineTransform) -> AffineTransform {
        AffineTransform::from(next.to_daffine2() * self.to_daffine2())
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Map artwork coordinates back into local space
    pub fn inverse(&self) -> Result<AffineTransform, SingularTransform> {
        let determinant = self.determinant();
        if determinant.abs() < SINGULAR_EPSILON {
            return Err(SingularTransform { determinant });
        }
        Ok(AffineTransform::from(self.to_daffine2().inverse()))
    }

    pub fn is_identity(&self) -> bool {
        *self == AffineTransform::IDENTITY
    }

    pub fn to_daffine2(&self) -> DAffine2 {
        DAffine2 {
            matrix2: DMat2::from_cols(dvec2(self.a, self.b), dvec2(self.c, self.d)),
            translation: dvec2(self.e, self.f),
        }
    }

    /// Coefficients in `matrix()` order
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        AffineTransform::IDENTITY
    }
}

impl From<DAffine2> for AffineTransform {
    fn from(m: DAffine2) -> Self {
        AffineTransform::new(
            m.matrix2.x_axis.x,
            m.matrix2.x_axis.y,
            m.matrix2.y_axis.x,
            m.matrix2.y_axis.y,
            m.translation.x,
            m.translation.y,
        )
    }
}

impl From<[f64; 6]> for AffineTransform {
    fn from([a, b, c, d, e, f]: [f64; 6]) -> Self {
        AffineTransform::new(a, b, c, d, e, f)
    }
}

impl From<TransformOp> for AffineTransform {
    fn from(op: TransformOp) -> Self {
        match op {
            TransformOp::Matrix(coeffs) => AffineTransform::from(coeffs),
            TransformOp::Translate { tx, ty } => AffineTransform::translate(tx, ty),
            TransformOp::Scale { sx, sy } => AffineTransform::scale(sx, sy),
            TransformOp::Rotate { degrees, center: None } => AffineTransform::rotate_degrees(degrees),
            TransformOp::Rotate {
                degrees,
                center: Some((cx, cy)),
            } => AffineTransform::translate(-cx, -cy)
                .then(AffineTransform::rotate_degrees(degrees))
                .then(AffineTransform::translate(cx, cy)),
            TransformOp::SkewX(degrees) => AffineTransform::skew_x_degrees(degrees),
            TransformOp::SkewY(degrees) => AffineTransform::skew_y_degrees(degrees),
        }
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matrix({},{},{},{},{},{})",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

/// Transforms keyed by partition. Iterates in key order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformTable {
    transforms: BTreeMap<PartitionKey, AffineTransform>,
}

impl TransformTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the transform for `partition`
    pub fn insert(&mut self, partition: impl Into<PartitionKey>, transform: AffineTransform) {
        self.transforms.insert(partition.into(), transform);
    }

    pub fn with(mut self, partition: impl Into<PartitionKey>, transform: AffineTransform) -> Self {
        self.insert(partition, transform);
        self
    }

    pub fn get(&self, partition: &PartitionKey) -> Option<&AffineTransform> {
        self.transforms.get(partition)
    }

    /// Look up a transform, failing with [`ConfigError::MissingTransform`]
    pub fn require(&self, partition: &PartitionKey) -> Result<&AffineTransform, ConfigError> {
        self.get(partition).ok_or_else(|| ConfigError::MissingTransform {
            partition: partition.clone(),
        })
    }

    pub fn contains(&self, partition: &PartitionKey) -> bool {
        self.transforms.contains_key(partition)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartitionKey, &AffineTransform)> {
        self.transforms.iter()
    }
}

impl<K: Into<PartitionKey>> FromIterator<(K, AffineTransform)> for TransformTable {
    fn from_iter<I: IntoIterator<Item = (K, AffineTransform)>>(iter: I) -> Self {
        TransformTable {
            transforms: iter.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: Point, expected: Point) {
        assert!(
            actual.distance(expected) < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn apply_follows_matrix_formula() {
        let t = AffineTransform::new(2.0, 3.0, 5.0, 7.0, 11.0, 13.0);
        // x' = 2*1 + 5*10 + 11, y' = 3*1 + 7*10 + 13
        assert_eq!(t.apply(Point::new(1.0, 10.0)), Point::new(63.0, 86.0));
    }

    #[test]
    fn identity_and_translate() {
        let p = Point::new(4.5, -2.0);
        assert_eq!(AffineTransform::IDENTITY.apply(p), p);
        assert_eq!(AffineTransform::translate(10.0, 0.0).apply(Point::ORIGIN), Point::new(10.0, 0.0));
    }

    #[test]
    fn horizontal_flip_from_artwork_matrix() {
        let t = AffineTransform::new(-1.0, 0.0, 0.0, 1.0, 552.10903, 48.512262);
        assert_close(t.apply(Point::new(100.0, 10.0)), Point::new(452.10903, 58.512262));
    }

    #[test]
    fn rotate_quarter_turn() {
        let t = AffineTransform::rotate_degrees(90.0);
        assert_close(t.apply(Point::new(1.0, 0.0)), Point::new(0.0, 1.0));
    }

    #[test]
    fn then_applies_self_first() {
        let t = AffineTransform::scale(2.0, 2.0).then(AffineTransform::translate(1.0, 0.0));
        assert_close(t.apply(Point::new(1.0, 1.0)), Point::new(3.0, 2.0));
    }

    #[test]
    fn parse_list_composes_like_svg() {
        // translate(1) scale(2): scale first, then translate
        let t = AffineTransform::parse("translate(1) scale(2)").unwrap();
        assert_close(t.apply(Point::new(1.0, 1.0)), Point::new(3.0, 2.0));
    }

    #[test]
    fn parse_matrix_round_trips_coefficients() {
        let t = AffineTransform::parse("matrix(0.82544171,0.56448736,0.56221371,-0.82211698,81.266847,463.85256)")
            .unwrap();
        assert_eq!(
            t.to_array(),
            [0.82544171, 0.56448736, 0.56221371, -0.82211698, 81.266847, 463.85256]
        );
    }

    #[test]
    fn parse_rotate_about_center() {
        let t = AffineTransform::parse("rotate(180 5 5)").unwrap();
        assert_close(t.apply(Point::new(0.0, 0.0)), Point::new(10.0, 10.0));
        assert_close(t.apply(Point::new(5.0, 5.0)), Point::new(5.0, 5.0));
    }

    #[test]
    fn parse_empty_is_identity() {
        assert!(AffineTransform::parse("").unwrap().is_identity());
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = AffineTransform::new(0.82544171, 0.56448736, 0.56221371, -0.82211698, 81.266847, 463.85256);
        let inv = t.inverse().unwrap();
        let p = Point::new(123.0, -45.0);
        assert_close(inv.apply(t.apply(p)), p);
    }

    #[test]
    fn inverse_of_singular_fails() {
        let err = AffineTransform::scale(0.0, 1.0).inverse().unwrap_err();
        assert_eq!(err.determinant, 0.0);
    }

    #[test]
    fn daffine2_round_trip() {
        let t = AffineTransform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(AffineTransform::from(t.to_daffine2()), t);
        let p = Point::new(-3.0, 7.0);
        assert_eq!(Point::from(t.to_daffine2().transform_point2(p.to_dvec2())), t.apply(p));
    }

    #[test]
    fn display_uses_matrix_syntax() {
        assert_eq!(AffineTransform::translate(10.0, 0.0).to_string(), "matrix(1,0,0,1,10,0)");
    }

    #[test]
    fn table_require_reports_missing_partition() {
        let table = TransformTable::new().with("a", AffineTransform::IDENTITY);
        assert!(table.require(&PartitionKey::new("A")).is_ok());
        match table.require(&PartitionKey::new("B")) {
            Err(ConfigError::MissingTransform { partition }) => assert_eq!(partition.as_str(), "B"),
            other => panic!("expected missing transform, got {other:?}"),
        }
    }

    #[test]
    fn table_from_iter_normalizes_keys() {
        let table: TransformTable = [("b", AffineTransform::IDENTITY), ("A", AffineTransform::IDENTITY)]
            .into_iter()
            .collect();
        let keys: Vec<_> = table.iter().map(|(k, _)| k.as_str().to_string()).collect();
        assert_eq!(keys, ["A", "B"]);
        assert_eq!(table.len(), 2);
    }
}
