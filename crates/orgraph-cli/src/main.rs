use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orgraph_api::{DivisionDto, FunctionalRelationDto, OrganizationDto, Record, StaffDto};
use orgraph_app::{GraphController, Settings};
use orgraph_core::{Node, NodeId, NoSavedPositions, StructureType};
use orgraph_graph::{GraphSnapshot, LayoutEngine, map_structure};
use orgraph_storage::{CommentStore, PositionStore, SharedStore, Storage};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Organization graph tools", long_about = None)]
struct Args {
    /// Settings file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the settings file
    #[arg(long, global = true)]
    api: Option<String>,

    /// Bearer token for the backend
    #[arg(long, global = true)]
    token: Option<String>,

    /// Path to the local SQLite store
    #[arg(short, long, global = true)]
    db: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map and lay out records from a JSON dump without contacting the backend
    Layout {
        /// JSON object with `organizations`, `divisions`, `staff` and
        /// `functional_relations` arrays
        input: PathBuf,
        #[arg(short, long, default_value = "business")]
        structure: StructureType,
        /// Prefer positions saved in the local store
        #[arg(long)]
        saved: bool,
        /// Print the positioned graph as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a structure view from the backend and summarize it
    Fetch {
        #[arg(short, long, default_value = "business")]
        structure: StructureType,
        #[arg(short, long)]
        organization: Option<i64>,
    },
    /// Inspect or reset saved node positions
    Positions {
        #[command(subcommand)]
        action: PositionsAction,
    },
    /// Node comments kept in the local store
    Comments {
        #[command(subcommand)]
        action: CommentsAction,
    },
}

#[derive(Subcommand, Debug)]
enum PositionsAction {
    Show {
        #[arg(short, long, default_value = "business")]
        structure: StructureType,
    },
    Clear {
        #[arg(short, long, default_value = "business")]
        structure: StructureType,
    },
}

#[derive(Subcommand, Debug)]
enum CommentsAction {
    List {
        node: String,
        #[arg(short, long, default_value = "business")]
        structure: StructureType,
    },
    Add {
        node: String,
        text: String,
        #[arg(short, long, default_value = "business")]
        structure: StructureType,
    },
    Toggle {
        node: String,
        index: usize,
        #[arg(short, long, default_value = "business")]
        structure: StructureType,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordDump {
    organizations: Vec<OrganizationDto>,
    divisions: Vec<DivisionDto>,
    staff: Vec<StaffDto>,
    functional_relations: Vec<FunctionalRelationDto>,
}

impl RecordDump {
    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn records(&self) -> Vec<Record> {
        let organizations = self.organizations.iter().cloned().map(Record::Organization);
        let divisions = self.divisions.iter().cloned().map(Record::Division);
        let staff = self.staff.iter().cloned().map(Record::Staff);
        organizations.chain(divisions).chain(staff).collect()
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    if let Some(api) = &args.api {
        settings.api_base_url = api.clone();
    }
    if let Some(token) = &args.token {
        settings.api_token = Some(token.clone());
    }
    if let Some(db) = &args.db {
        settings.database_path = Some(db.clone());
    }
    Ok(settings)
}

fn open_store(settings: &Settings) -> Result<SharedStore> {
    let path = settings
        .database_path()
        .context("No data directory for the local store")?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    tracing::debug!("Opening local store at {:?}", path);
    let storage = Storage::open(&path)
        .with_context(|| format!("Failed to open local store at {}", path.display()))?;
    Ok(Arc::new(storage))
}

fn print_nodes(nodes: &[Node]) {
    for node in nodes {
        println!(
            "{:<24} {:<20} {:>8.1} {:>8.1}  {}",
            node.id.as_str(),
            node.kind.as_str(),
            node.position.x,
            node.position.y,
            node.label
        );
    }
}

fn run_layout(
    settings: &Settings,
    input: &Path,
    structure: StructureType,
    saved: bool,
    json: bool,
) -> Result<()> {
    let dump = RecordDump::read(input)?;
    let mapped = map_structure(structure, &dump.records(), &dump.functional_relations);
    let nodes = if saved {
        let positions = PositionStore::new(open_store(settings)?);
        LayoutEngine::new(settings.layout, positions).layout(mapped.nodes, &mapped.edges, structure)
    } else {
        LayoutEngine::new(settings.layout, NoSavedPositions).layout(
            mapped.nodes,
            &mapped.edges,
            structure,
        )
    };

    if json {
        let snapshot = GraphSnapshot::new(structure, nodes, mapped.edges);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_nodes(&nodes);
        println!("{} nodes, {} edges", nodes.len(), mapped.edges.len());
    }
    Ok(())
}

async fn run_fetch(
    settings: &Settings,
    structure: StructureType,
    organization: Option<i64>,
) -> Result<()> {
    let settings = Settings {
        organization_id: organization.or(settings.organization_id),
        ..settings.clone()
    };
    let mut controller = GraphController::from_settings(&settings)?;
    let report = controller.open_view(structure).await?;

    let coordinator = controller.coordinator();
    print_nodes(&coordinator.snapshot().nodes);
    println!(
        "{} view: {} nodes, {} administrative edges, {} functional edges",
        report.structure,
        report.node_count,
        coordinator.administrative_edges().len(),
        coordinator.functional_edges().len()
    );
    for failure in &report.failures {
        eprintln!("Failed to fetch {}: {}", failure.kind.as_str(), failure.error);
    }
    Ok(())
}

fn run_positions(settings: &Settings, action: PositionsAction) -> Result<()> {
    let store = PositionStore::new(open_store(settings)?);
    match action {
        PositionsAction::Show { structure } => {
            let mut positions: Vec<_> = store.load(structure).into_iter().collect();
            positions.sort_by(|a, b| a.0.cmp(&b.0));
            for (id, pos) in &positions {
                println!("{:<24} {:>8.1} {:>8.1}", id.as_str(), pos.x, pos.y);
            }
            println!("{} saved positions", positions.len());
        }
        PositionsAction::Clear { structure } => {
            store.clear(structure)?;
            println!("Cleared saved positions for {structure}");
        }
    }
    Ok(())
}

fn run_comments(settings: &Settings, action: CommentsAction) -> Result<()> {
    let store = CommentStore::new(open_store(settings)?);
    match action {
        CommentsAction::List { node, structure } => {
            let comments = store.load_comments(&NodeId::from(node), structure);
            for (index, comment) in comments.iter().enumerate() {
                let mark = if comment.completed { "x" } else { " " };
                println!(
                    "{index:>3} [{mark}] {}  {}",
                    comment.date.format("%Y-%m-%d %H:%M"),
                    comment.text
                );
            }
        }
        CommentsAction::Add {
            node,
            text,
            structure,
        } => {
            let comment = store.add_comment(&NodeId::from(node), structure, &text)?;
            println!("Added: {}", comment.text);
        }
        CommentsAction::Toggle {
            node,
            index,
            structure,
        } => {
            let comment = store.toggle_comment(&NodeId::from(node), structure, index)?;
            let state = if comment.completed { "done" } else { "open" };
            println!("{}: {state}", comment.text);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let settings = load_settings(&args)?;

    match args.command {
        Command::Layout {
            input,
            structure,
            saved,
            json,
        } => run_layout(&settings, &input, structure, saved, json),
        Command::Fetch {
            structure,
            organization,
        } => run_fetch(&settings, structure, organization).await,
        Command::Positions { action } => run_positions(&settings, action),
        Command::Comments { action } => run_comments(&settings, action),
    }
}
