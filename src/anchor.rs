//! Pick the single point that stands for a shape, from its path data.
//!
//! Path data is read as a flat run of numbers taken two at a time; command
//! letters are skipped and relative segments are not accumulated. That is
//! exact for the first moveto and a good estimate for the small rounded
//! rectangles the containers are drawn as, which is all the matcher needs.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use enum_dispatch::enum_dispatch;
use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::types::{BBox, Point};

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("number pattern is valid")
});

/// Reduce a shape's coordinates to one point
#[enum_dispatch]
pub trait Anchor {
    /// `None` when there are no coordinates
    fn anchor(&self, coords: &[Point]) -> Option<Point>;
}

/// The first coordinate pair, i.e. where the path's initial moveto lands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartPoint;

impl Anchor for StartPoint {
    fn anchor(&self, coords: &[Point]) -> Option<Point> {
        coords.first().copied()
    }
}

/// Center of the coordinates' bounding box
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundsCenter;

impl Anchor for BoundsCenter {
    fn anchor(&self, coords: &[Point]) -> Option<Point> {
        let bbox: BBox = coords.iter().copied().collect();
        (!bbox.is_empty()).then(|| bbox.center())
    }
}

/// Mean of the coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Centroid;

impl Anchor for Centroid {
    fn anchor(&self, coords: &[Point]) -> Option<Point> {
        if coords.is_empty() {
            return None;
        }
        let sum = coords.iter().fold(Point::ORIGIN, |acc, p| acc + *p);
        let n = coords.len() as f64;
        Some(Point::new(sum.x / n, sum.y / n))
    }
}

#[enum_dispatch(Anchor)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorStrategy {
    StartPoint,
    BoundsCenter,
    Centroid,
}

impl Default for AnchorStrategy {
    fn default() -> Self {
        AnchorStrategy::StartPoint(StartPoint)
    }
}

impl AnchorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            AnchorStrategy::StartPoint(_) => "start-point",
            AnchorStrategy::BoundsCenter(_) => "bounds-center",
            AnchorStrategy::Centroid(_) => "centroid",
        }
    }

    /// Anchor of a path's `d` attribute
    pub fn anchor_path(&self, d: &str) -> Option<Point> {
        self.anchor(&path_coordinates(d))
    }
}

/// Unknown anchor strategy name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown anchor `{0}` (expected start-point, bounds-center or centroid)")]
pub struct UnknownAnchor(pub String);

impl FromStr for AnchorStrategy {
    type Err = UnknownAnchor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start-point" | "start" => Ok(StartPoint.into()),
            "bounds-center" | "bbox" => Ok(BoundsCenter.into()),
            "centroid" | "mean" => Ok(Centroid.into()),
            other => Err(UnknownAnchor(other.to_string())),
        }
    }
}

impl fmt::Display for AnchorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for AnchorStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AnchorStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Numbers in path data, paired up as points. A trailing odd number is
/// dropped.
pub fn path_coordinates(d: &str) -> Vec<Point> {
    let numbers: Vec<f64> = NUMBER_RE
        .find_iter(d)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();
    numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}
