use std::collections::BTreeMap;

use datatest_stable::Utf8Path;
use serde::Deserialize;
use skillmatch::{AnchorStrategy, ArtifactRecord, MatchOptions, ReferenceNode, SkillTreeDocument, match_artifacts};

/// A matching scenario: a skill-tree document, the artifacts pulled from
/// artwork, and the mapping the run must produce
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    #[allow(dead_code)]
    description: String,
    options: MatchOptions,
    config: SkillTreeDocument,
    artifacts: Vec<ArtifactRecord>,
    #[serde(default)]
    multi_point_only: bool,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    mapping: BTreeMap<String, String>,
    unmatched: Vec<String>,
}

fn test_fixture_file(path: &Utf8Path) -> datatest_stable::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let fixture: Fixture = serde_json::from_str(&text)?;
    fixture.config.validate()?;

    let mut nodes = fixture.config.reference_nodes()?;
    if fixture.multi_point_only {
        nodes.retain(ReferenceNode::is_multi_point);
    }
    let transforms = fixture.config.transform_table()?;
    let artifacts = fixture
        .artifacts
        .iter()
        .map(|r| r.resolve(AnchorStrategy::default()))
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = match_artifacts(&artifacts, &nodes, &transforms, &fixture.options)?;

    let mapping: BTreeMap<String, String> = outcome
        .mapping
        .iter()
        .map(|m| (m.artifact.id.clone(), m.node.id.clone()))
        .collect();
    let unmatched: Vec<String> = outcome.unmatched.iter().map(|a| a.id.clone()).collect();

    assert_eq!(mapping, fixture.expected.mapping, "mapping mismatch for {path}");
    assert_eq!(unmatched, fixture.expected.unmatched, "unmatched mismatch for {path}");

    for m in &outcome.mapping {
        assert!(
            fixture.options.tolerance.accepts(m.distance),
            "{} matched {} beyond tolerance ({}) in {path}",
            m.artifact.id,
            m.node.id,
            m.distance
        );
    }
    Ok(())
}

datatest_stable::harness! {
    { test = test_fixture_file, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"), pattern = r"\.json$" },
}
