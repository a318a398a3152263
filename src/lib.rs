//! Match shapes extracted from vector artwork to skill-tree nodes.
//!
//! Skill-tree nodes live in their tree's local coordinates; the artwork
//! places each tree with an affine transform. [`match_artifacts`] moves
//! the nodes into artwork space and gives every artifact its nearest
//! same-tree node within a tolerance.
//!
//! ```
//! use skillmatch::{AffineTransform, Artifact, MatchOptions, Point, ReferenceNode, TransformTable};
//!
//! let transforms = TransformTable::new().with("A", AffineTransform::translate(10.0, 0.0));
//! let nodes = [ReferenceNode::new("tree-a-node-0", Point::new(0.0, 0.0), "A")];
//! let artifacts = [Artifact::new("path12", Point::new(10.0, 0.0), "A")];
//!
//! let options = MatchOptions::try_with_tolerance(1.0)?;
//! let outcome = skillmatch::match_artifacts(&artifacts, &nodes, &transforms, &options)?;
//! assert_eq!(outcome.node_for("path12"), Some("tree-a-node-0"));
//! # Ok::<(), skillmatch::ConfigError>(())
//! ```

use pest_derive::Parser;

pub mod anchor;
pub mod audit;
pub mod config;
pub mod errors;
pub mod label;
pub mod log;
pub mod matcher;
pub mod model;
pub mod parse;
pub mod report;
pub mod transform;
pub mod types;

pub use anchor::{Anchor, AnchorStrategy};
pub use config::{ArtifactRecord, SkillTreeDocument};
pub use errors::{ConfigError, SingularTransform, TransformParseError};
pub use label::NodeRef;
pub use matcher::{CoordinateMatcher, MatchOptions, match_artifacts, place_nodes, transform_point};
pub use model::{Artifact, Match, MatchOutcome, ReferenceNode};
pub use transform::{AffineTransform, TransformTable};
pub use types::{BBox, NumericError, PartitionKey, Point, Tolerance};

#[derive(Parser)]
#[grammar = "transform.pest"]
pub struct TransformParser;

/// Match an artifact document against a skill-tree document, both given as
/// JSON text. Artifacts without explicit coordinates are anchored at the
/// start of their path data.
pub fn match_json(
    config_json: &str,
    artifacts_json: &str,
    options: &MatchOptions,
) -> Result<MatchOutcome, miette::Report> {
    let doc = SkillTreeDocument::from_json("<config>", config_json)?;
    let artifacts = config::artifacts_from_json("<artifacts>", artifacts_json, AnchorStrategy::default())?;
    let nodes = doc.reference_nodes()?;
    let transforms = doc.transform_table()?;
    Ok(match_artifacts(&artifacts, &nodes, &transforms, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pest::Parser;

    #[test]
    fn parse_transform_list_rule() {
        let result = TransformParser::parse(Rule::transform_list, "translate(1, 2) scale(3)");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }

    #[test]
    fn parse_single_number_rule() {
        for input in ["1", "-2.5", ".5", "5.", "1e-3", "+4E2"] {
            let result = TransformParser::parse(Rule::number, input);
            assert!(result.is_ok(), "Failed to parse {input}: {:?}", result.err());
        }
    }

    #[test]
    fn parse_rejects_unbalanced_parens() {
        assert!(TransformParser::parse(Rule::transform_list, "matrix(1,0,0,1,0,0").is_err());
    }

    #[test]
    fn match_json_end_to_end() {
        let config = r#"{
            "version": "1",
            "maxSkillPoints": 10,
            "trees": { "A": { "id": "A", "transform": "translate(10)", "nodes": [
                { "id": "tree-a-node-0", "x": 0, "y": 0, "maxPoints": 2 }
            ] } }
        }"#;
        let artifacts = r#"[{ "id": "container-a-0", "d": "m 10,0 h 5 v 5 z" }]"#;
        let options = MatchOptions::try_with_tolerance(1.0).unwrap();
        let outcome = match_json(config, artifacts, &options).unwrap();
        assert_eq!(outcome.node_for("container-a-0"), Some("tree-a-node-0"));
    }

    #[test]
    fn match_json_reports_config_errors() {
        let options = MatchOptions::try_with_tolerance(1.0).unwrap();
        let err = match_json("{}", "[]", &options).unwrap_err();
        assert!(err.to_string().contains("<config>"), "{err}");
    }
}
