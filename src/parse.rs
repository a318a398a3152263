//! Parse pest pairs into transform operations

use miette::{NamedSource, SourceSpan};
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;

use crate::errors::TransformParseError;
use crate::{Rule, TransformParser};

/// One function of an SVG transform list, with defaults filled in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// `matrix(a b c d e f)`
    Matrix([f64; 6]),
    /// `translate(tx [ty])`, ty defaults to 0
    Translate { tx: f64, ty: f64 },
    /// `scale(sx [sy])`, sy defaults to sx
    Scale { sx: f64, sy: f64 },
    /// `rotate(deg [cx cy])`
    Rotate { degrees: f64, center: Option<(f64, f64)> },
    /// `skewX(deg)`
    SkewX(f64),
    /// `skewY(deg)`
    SkewY(f64),
}

/// Parse a transform list into its operations, leftmost first.
///
/// `name` only labels the source in diagnostics (a file name, a tree key).
pub fn parse_transform_list(name: &str, source: &str) -> Result<Vec<TransformOp>, TransformParseError> {
    let named = || NamedSource::new(name, source.to_string());

    let pairs = TransformParser::parse(Rule::transform_list, source).map_err(|err| {
        let span = match err.location {
            InputLocation::Pos(pos) => SourceSpan::from((pos, 0)),
            InputLocation::Span((start, end)) => SourceSpan::from((start, end - start)),
        };
        TransformParseError::Syntax { src: named(), span }
    })?;

    let mut ops = Vec::new();
    for pair in pairs {
        if pair.as_rule() == Rule::transform_list {
            for inner in pair.into_inner() {
                if inner.as_rule() == Rule::transform {
                    ops.push(parse_transform(inner, &named)?);
                }
            }
        }
    }

    Ok(ops)
}

fn parse_transform(
    pair: Pair<Rule>,
    named: &impl Fn() -> NamedSource<String>,
) -> Result<TransformOp, TransformParseError> {
    let pest_span = pair.as_span();
    let span = SourceSpan::from((pest_span.start(), pest_span.end() - pest_span.start()));

    let mut function = "";
    let mut args = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::function_name => function = inner.as_str(),
            Rule::arguments => {
                for num in inner.into_inner() {
                    args.push(parse_number(num, named)?);
                }
            }
            _ => {}
        }
    }

    let arity = |expected: &'static str| TransformParseError::Arity {
        function: function.to_string(),
        expected,
        got: args.len(),
        src: named(),
        span,
    };

    let op = match (function, args.as_slice()) {
        ("matrix", &[a, b, c, d, e, f]) => TransformOp::Matrix([a, b, c, d, e, f]),
        ("matrix", _) => return Err(arity("6")),
        ("translate", &[tx]) => TransformOp::Translate { tx, ty: 0.0 },
        ("translate", &[tx, ty]) => TransformOp::Translate { tx, ty },
        ("translate", _) => return Err(arity("1 or 2")),
        ("scale", &[s]) => TransformOp::Scale { sx: s, sy: s },
        ("scale", &[sx, sy]) => TransformOp::Scale { sx, sy },
        ("scale", _) => return Err(arity("1 or 2")),
        ("rotate", &[degrees]) => TransformOp::Rotate { degrees, center: None },
        ("rotate", &[degrees, cx, cy]) => TransformOp::Rotate {
            degrees,
            center: Some((cx, cy)),
        },
        ("rotate", _) => return Err(arity("1 or 3")),
        ("skewX", &[degrees]) => TransformOp::SkewX(degrees),
        ("skewY", &[degrees]) => TransformOp::SkewY(degrees),
        (_, _) => return Err(arity("1")),
    };

    Ok(op)
}

fn parse_number(
    pair: Pair<Rule>,
    named: &impl Fn() -> NamedSource<String>,
) -> Result<f64, TransformParseError> {
    let pest_span = pair.as_span();
    match pair.as_str().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TransformParseError::InvalidNumber {
            src: named(),
            span: SourceSpan::from((pest_span.start(), pest_span.end() - pest_span.start())),
        }),
    }
}
