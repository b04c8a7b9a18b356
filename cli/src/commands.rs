use crate::cli::{BuildArgs, EntitiesArgs, InputArgs};
use anyhow::{Context, Result};
use builder::build_graph_from_str;
use jsongraph_core::config::{AppConfig, BuildOptions};
use jsongraph_core::error::GraphError;
use jsongraph_core::model::Graph;
use query::GraphIndex;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::info;

pub fn build_execute(args: BuildArgs) -> Result<()> {
    let graph = load_graph(&args.input)?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&graph)?
    } else {
        serde_json::to_string(&graph)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

pub fn entities_execute(args: EntitiesArgs) -> Result<()> {
    let graph = load_graph(&args.input)?;
    let index = GraphIndex::new(&graph);

    let mut stdout = io::stdout().lock();
    for summary in index.entity_summaries() {
        writeln!(stdout, "{}\t{}", summary.entity, summary.node_count)?;
    }
    Ok(())
}

fn load_graph(args: &InputArgs) -> Result<Graph> {
    let options = resolve_options(args)?;
    let raw = read_input(&args.input)?;

    let graph = build_graph_from_str(&raw, &options).map_err(|err| {
        let code = err.error_code();
        anyhow::Error::new(err).context(format!("build failed [{code}]"))
    })?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph built"
    );
    Ok(graph)
}

fn resolve_options(args: &InputArgs) -> Result<BuildOptions> {
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load configuration")?,
    };
    Ok(apply_overrides(config.build, args))
}

fn apply_overrides(mut options: BuildOptions, args: &InputArgs) -> BuildOptions {
    if let Some(separate) = args.separate_array_nodes() {
        options.separate_array_nodes = separate;
    }
    if !args.linked_fields.is_empty() {
        options.linked_fields = args.linked_fields.clone();
    }
    if let Some(id_synthesis) = args.id_synthesis {
        options.id_synthesis = id_synthesis.into();
    }
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    options
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read document from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
