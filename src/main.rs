//! qgraph CLI: inspect Biolink models and lay out query graphs.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use qgraph::config::EditorConfig;
use qgraph::layout::LayoutEngine;
use qgraph::ontology::BiolinkModel;
use qgraph::ontology::resolver::{QualifierRange, resolve};
use qgraph::query_graph::display::DisplayGraph;
use qgraph::query_graph::{QueryGraph, topology};
use qgraph::style::NoColors;

#[derive(Parser)]
#[command(name = "qgraph", version, about = "Biomedical query graph editor core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List associations valid for a subject/predicate/object triple.
    Resolve {
        /// Path to a Biolink model JSON file.
        #[arg(long)]
        model: PathBuf,

        /// Subject category (label or CURIE).
        #[arg(long, default_value = "biolink:NamedThing")]
        subject: String,

        /// Predicate (label or CURIE).
        #[arg(long, default_value = "biolink:related_to")]
        predicate: String,

        /// Object category (label or CURIE).
        #[arg(long, default_value = "biolink:NamedThing")]
        object: String,

        /// Emit JSON instead of a listing.
        #[arg(long)]
        json: bool,
    },

    /// List predicates selectable between two categories.
    Predicates {
        /// Path to a Biolink model JSON file.
        #[arg(long)]
        model: PathBuf,

        #[arg(long, default_value = "biolink:NamedThing")]
        subject_category: String,

        #[arg(long, default_value = "biolink:NamedThing")]
        object_category: String,
    },

    /// Run the layout on a query graph and print the resulting frame as JSON.
    Layout {
        /// Path to a TRAPI query graph JSON file.
        #[arg(long)]
        graph: PathBuf,

        /// Editor config TOML.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum ticks to run; the layout stops early once settled.
        #[arg(long, default_value = "300")]
        ticks: usize,

        /// Seed for initial placement.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the node order used for result tables.
    Order {
        /// Path to a TRAPI query graph JSON file.
        #[arg(long)]
        graph: PathBuf,
    },
}

/// Printable view of a resolved association.
#[derive(Serialize)]
struct AssociationView {
    association: String,
    depth: usize,
    subject: String,
    predicate: String,
    object: String,
    qualifiers: Vec<QualifierView>,
}

#[derive(Serialize)]
struct QualifierView {
    qualifier: String,
    range: Option<String>,
    subproperty_of: Option<String>,
}

fn load_graph(path: &Path) -> Result<QueryGraph> {
    let json = std::fs::read_to_string(path).into_diagnostic()?;
    Ok(QueryGraph::from_json(&json)?)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            model,
            subject,
            predicate,
            object,
            json,
        } => {
            let model = BiolinkModel::load(&model)?;
            let name = |id| model.element(id).curie.clone();
            let views: Vec<AssociationView> = resolve(&subject, &predicate, &object, &model)
                .into_iter()
                .map(|a| AssociationView {
                    association: name(a.association),
                    depth: a.depth,
                    subject: name(a.inherited.subject),
                    predicate: name(a.inherited.predicate),
                    object: name(a.inherited.object),
                    qualifiers: a
                        .qualifiers
                        .iter()
                        .map(|q| QualifierView {
                            qualifier: name(q.qualifier),
                            range: q.range.as_ref().map(|r| match r {
                                QualifierRange::Enum(e) => e.clone(),
                                QualifierRange::Class(c) => name(*c),
                            }),
                            subproperty_of: q.subproperty_of.map(name),
                        })
                        .collect(),
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&views).into_diagnostic()?);
            } else if views.is_empty() {
                println!("No valid associations for {subject} -{predicate}-> {object}.");
            } else {
                for view in &views {
                    println!(
                        "{} (depth {}): {} -{}-> {}",
                        view.association, view.depth, view.subject, view.predicate, view.object
                    );
                    for q in &view.qualifiers {
                        let range = q.range.as_deref().unwrap_or("-");
                        match &q.subproperty_of {
                            Some(sub) => println!("  {} [{range}] subproperty of {sub}", q.qualifier),
                            None => println!("  {} [{range}]", q.qualifier),
                        }
                    }
                }
            }
        }

        Commands::Predicates {
            model,
            subject_category,
            object_category,
        } => {
            let model = BiolinkModel::load(&model)?;
            match model.predicate_options(&[subject_category], &[object_category]) {
                Some(options) => {
                    for predicate in options {
                        println!("{predicate}");
                    }
                }
                None => println!("No predicate options (unknown category or empty model)."),
            }
        }

        Commands::Layout {
            graph,
            config,
            ticks,
            seed,
        } => {
            let graph = load_graph(&graph)?;
            let mut config = match config {
                Some(path) => EditorConfig::load(&path)?,
                None => EditorConfig::default(),
            };
            if seed.is_some() {
                config.layout.seed = seed;
            }
            let mut engine = LayoutEngine::new(config.viewport()?, config.layout.clone())?;
            engine.reseed(&DisplayGraph::derive(&graph, &[], &NoColors));
            let mut ran = 0;
            while ran < ticks && engine.step() {
                ran += 1;
            }
            tracing::info!(ticks = ran, alpha = engine.alpha(), "layout finished");
            println!("{}", serde_json::to_string_pretty(engine.frame()).into_diagnostic()?);
        }

        Commands::Order { graph } => {
            let graph = load_graph(&graph)?;
            for id in topology::topological_order(&graph) {
                let node = graph.node(&id);
                let label = node
                    .and_then(|n| n.name.clone())
                    .unwrap_or_else(|| node.map_or(String::new(), |n| n.primary_category().to_string()));
                println!("{id}\t{label}");
            }
        }
    }

    Ok(())
}
