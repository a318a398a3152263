use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, WrapErr};
use skillmatch::audit::audit;
use skillmatch::config::load_artifacts;
use skillmatch::report::{audit_summary, mapping_json, summary};
use skillmatch::{
    AnchorStrategy, Artifact, CoordinateMatcher, MatchOptions, MatchOutcome, ReferenceNode, SkillTreeDocument,
};

/// Inputs shared by `match` and `audit`
#[derive(Debug, Clone)]
pub struct Inputs {
    pub config: Utf8PathBuf,
    pub artifacts: Utf8PathBuf,
    pub tolerance: f64,
    pub exclusive: bool,
    pub multi_point_only: bool,
    pub anchor: AnchorStrategy,
}

struct Loaded {
    matcher: CoordinateMatcher,
    nodes: Vec<ReferenceNode>,
    artifacts: Vec<Artifact>,
}

impl Loaded {
    fn run(&self) -> miette::Result<MatchOutcome> {
        Ok(self.matcher.run(&self.artifacts, &self.nodes)?)
    }
}

fn load_nodes(config: &Utf8Path, multi_point_only: bool) -> miette::Result<(SkillTreeDocument, Vec<ReferenceNode>)> {
    let doc = SkillTreeDocument::load(config)?;
    let mut nodes = doc.reference_nodes()?;
    if multi_point_only {
        nodes.retain(ReferenceNode::is_multi_point);
    }
    tracing::info!(nodes = nodes.len(), %config, "loaded reference nodes");
    Ok((doc, nodes))
}

fn load(inputs: &Inputs) -> miette::Result<Loaded> {
    let options = MatchOptions::try_with_tolerance(inputs.tolerance)?.exclusive(inputs.exclusive);
    let (doc, nodes) = load_nodes(&inputs.config, inputs.multi_point_only)?;
    let artifacts = load_artifacts(&inputs.artifacts, inputs.anchor)?;
    tracing::info!(artifacts = artifacts.len(), path = %inputs.artifacts, "loaded artifacts");
    Ok(Loaded {
        matcher: CoordinateMatcher::new(doc.transform_table()?, options),
        nodes,
        artifacts,
    })
}

pub fn run_match(inputs: &Inputs, output: Option<&Utf8Path>) -> miette::Result<()> {
    let loaded = load(inputs)?;
    let outcome = loaded.run()?;

    eprint!("{}", summary(&outcome));
    let json = mapping_json(&outcome);
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to write {path}"))?;
            eprintln!("saved mapping to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn run_audit(inputs: &Inputs, strict: bool) -> miette::Result<()> {
    let loaded = load(inputs)?;
    let outcome = loaded.run()?;
    let report = audit(
        &loaded.artifacts,
        &loaded.nodes,
        loaded.matcher.transforms(),
        loaded.matcher.options().tolerance,
        &outcome,
    )?;

    print!("{}", audit_summary(&report));
    if strict && !report.is_clean() {
        miette::bail!(
            code = "skillmatch::audit::findings",
            "audit found {} ambiguous pairs, {} contested nodes and {} label mismatches",
            report.ambiguous.len(),
            report.contested.len(),
            report.mismatches.len()
        );
    }
    Ok(())
}

pub fn run_transform(config: &Utf8Path, multi_point_only: bool) -> miette::Result<()> {
    let (doc, nodes) = load_nodes(config, multi_point_only)?;
    let transforms = doc.transform_table()?;
    print!("{}", transform_listing(&nodes, &transforms)?);
    Ok(())
}

/// `id (tree): local -> placed`, one node per line
fn transform_listing(nodes: &[ReferenceNode], transforms: &skillmatch::TransformTable) -> miette::Result<String> {
    let placed = skillmatch::place_nodes(nodes, transforms)?;
    let mut out = String::new();
    for (node, point) in nodes.iter().zip(placed) {
        out.push_str(&format!(
            "{} ({}): x={:.6}, y={:.6} -> x={:.6}, y={:.6}\n",
            node.id, node.partition, node.point.x, node.point.y, point.x, point.y
        ));
    }
    Ok(out)
}
