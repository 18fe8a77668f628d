//! Netlist to workbook, one stage after another

use std::path::PathBuf;

use anyhow::{Context, Result};
use netbom_core::{build_rows, group_components, BomConfig, PartEquivalence};
use netbom_parser::{parse_file, ComponentFilter};
use netbom_render::ExcelRenderer;
use tracing::debug;

/// What to read, what to write, and how to filter
#[derive(Debug, Default)]
pub struct Options {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub include_excluded: bool,
    pub skip_dnp: bool,
    pub exclude_from_board: bool,
    /// Footprint patterns, matched at the start of the footprint
    pub excluded_footprints: Vec<String>,
}

/// Counts reported after a successful run
#[derive(Debug, PartialEq, Eq)]
pub struct Summary {
    /// Components on the BOM after filtering
    pub components: usize,
    /// BOM lines written
    pub lines: usize,
}

fn load_config(options: &Options) -> Result<BomConfig> {
    match &options.config {
        Some(path) => BomConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(BomConfig::default()),
    }
}

fn component_filter(options: &Options) -> Result<ComponentFilter> {
    let mut filter = ComponentFilter::kicad_defaults()
        .context("Invalid default exclusion patterns")?
        .exclude_from_bom(!options.include_excluded)
        .exclude_from_board(options.exclude_from_board)
        .exclude_dnp(options.skip_dnp);
    for pattern in &options.excluded_footprints {
        filter = filter
            .exclude_footprint(pattern)
            .with_context(|| format!("Invalid footprint pattern '{pattern}'"))?;
    }
    Ok(filter)
}

/// Load, filter, group and render
pub fn generate(options: &Options) -> Result<Summary> {
    let config = load_config(options)?;
    let filter = component_filter(options)?;

    let netlist = parse_file(&options.input)
        .with_context(|| format!("Failed to load netlist {}", options.input.display()))?;
    let components = netlist.interesting_components(&filter);
    let component_count = components.len();
    debug!(
        tool = %netlist.tool,
        components = component_count,
        "netlist loaded"
    );

    let groups = group_components(components, &PartEquivalence)
        .with_context(|| format!("Invalid netlist {}", options.input.display()))?;
    let rows = build_rows(&groups);

    ExcelRenderer::with_config(config)
        .save(&rows, &options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    Ok(Summary {
        components: component_count,
        lines: rows.len(),
    })
}
