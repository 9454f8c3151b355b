use futures::executor::block_on;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;

use stemma::{FsTreeStore, StaticAuth, TreeEngine, TreeStore};
use stemma_core::{AttributePatch, Point, Relation};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Engine(stemma::Error),
    Json(serde_json::Error),
    TreeExists(String),
    UnknownTree(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Engine(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::TreeExists(id) => write!(f, "Tree already exists: {id}"),
            CliError::UnknownTree(id) => write!(f, "Tree not found: {id}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<stemma::Error> for CliError {
    fn from(value: stemma::Error) -> Self {
        Self::Engine(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    List,
    New,
    Delete,
    Show,
    Apply,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    tree_id: Option<String>,
    script: Option<String>,
    data_dir: Option<String>,
    user: Option<String>,
    pretty: bool,
}

/// One mutation step in an `apply` script.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum ScriptCommand {
    AddChild {
        parent: String,
    },
    AddSpouse {
        partner: String,
    },
    AddParent {
        child: String,
    },
    Connect {
        source: String,
        target: String,
        relation: Relation,
    },
    #[serde(rename_all = "camelCase")]
    UpdateAttributes {
        id: String,
        patch: AttributePatch,
    },
    DeleteNode {
        id: String,
    },
    ToggleCollapse {
        id: String,
    },
    MoveNode {
        id: String,
        x: f64,
        y: f64,
    },
    Select {
        id: Option<String>,
    },
    Undo,
    Redo,
    Layout,
}

#[derive(Serialize)]
struct NodeOut<'a> {
    id: &'a str,
    label: &'a str,
    level: i64,
    x: f64,
    y: f64,
    collapsed: bool,
}

#[derive(Serialize)]
struct TreeOut<'a> {
    tree_id: &'a str,
    nodes: Vec<NodeOut<'a>>,
    hidden_edges: Vec<&'a str>,
    created: Vec<String>,
}

fn usage() -> &'static str {
    "stemma-cli\n\
\n\
USAGE:\n\
  stemma-cli list [--data-dir <dir>]\n\
  stemma-cli new <tree-id> [--data-dir <dir>]\n\
  stemma-cli delete <tree-id> [--data-dir <dir>]\n\
  stemma-cli show <tree-id> [--pretty] [--data-dir <dir>]\n\
  stemma-cli apply <tree-id> [<script>|-] [--pretty] [--data-dir <dir>]\n\
\n\
NOTES:\n\
  - Trees are stored as one JSON file per tree under --data-dir (default '.').\n\
  - apply reads a JSON array of commands from <script> (or stdin with '-'),\n\
    runs them against the tree, saves, and prints the resulting tree.\n\
  - Command objects are tagged with \"op\", e.g.\n\
    [{\"op\":\"addChild\",\"parent\":\"root_1\"},{\"op\":\"undo\"}]\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut command_seen = false;

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "list" | "new" | "delete" | "show" | "apply" if !command_seen => {
                command_seen = true;
                args.command = match a.as_str() {
                    "list" => Command::List,
                    "new" => Command::New,
                    "delete" => Command::Delete,
                    "show" => Command::Show,
                    _ => Command::Apply,
                };
            }
            "--pretty" => args.pretty = true,
            "--data-dir" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.data_dir = Some(dir.clone());
            }
            "--user" => {
                let Some(user) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.user = Some(user.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            positional => {
                if !command_seen {
                    return Err(CliError::Usage(usage()));
                }
                if args.tree_id.is_none() {
                    args.tree_id = Some(positional.to_string());
                } else if args.script.is_none() && matches!(args.command, Command::Apply) {
                    args.script = Some(positional.to_string());
                } else {
                    return Err(CliError::Usage(usage()));
                }
            }
        }
    }

    if !command_seen {
        return Err(CliError::Usage(usage()));
    }
    let needs_tree = !matches!(args.command, Command::List);
    if needs_tree && args.tree_id.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_script(script: Option<&str>) -> Result<Vec<ScriptCommand>, CliError> {
    let text = match script {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)?,
    };
    Ok(serde_json::from_str(&text)?)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn run_script(engine: &mut TreeEngine, commands: Vec<ScriptCommand>) -> Result<Vec<String>, CliError> {
    let mut created = Vec::new();
    for command in commands {
        match command {
            ScriptCommand::AddChild { parent } => created.push(engine.add_child(&parent)?),
            ScriptCommand::AddSpouse { partner } => created.push(engine.add_spouse(&partner)?),
            ScriptCommand::AddParent { child } => created.push(engine.add_parent(&child)?),
            ScriptCommand::Connect {
                source,
                target,
                relation,
            } => {
                engine.connect(&source, &target, relation)?;
            }
            ScriptCommand::UpdateAttributes { id, patch } => {
                engine.update_node_attributes(&id, patch)?;
            }
            ScriptCommand::DeleteNode { id } => {
                engine.delete_node(&id);
            }
            ScriptCommand::ToggleCollapse { id } => {
                engine.toggle_collapse(&id)?;
            }
            ScriptCommand::MoveNode { id, x, y } => {
                engine.set_manual_position(&id, Point::new(x, y))?;
            }
            ScriptCommand::Select { id } => engine.select(id),
            ScriptCommand::Undo => {
                engine.undo();
            }
            ScriptCommand::Redo => {
                engine.redo();
            }
            ScriptCommand::Layout => engine.apply_layout(),
        }
    }
    Ok(created)
}

fn tree_out<'a>(engine: &'a TreeEngine, created: Vec<String>) -> TreeOut<'a> {
    TreeOut {
        tree_id: engine.tree_id(),
        nodes: engine
            .render_nodes()
            .into_iter()
            .map(|n| NodeOut {
                id: n.id,
                label: &n.attributes.label,
                level: n.level,
                x: n.position.x,
                y: n.position.y,
                collapsed: n.collapsed,
            })
            .collect(),
        hidden_edges: engine.hidden_edges(),
        created,
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let data_dir = args.data_dir.as_deref().unwrap_or(".");
    let store: Arc<dyn TreeStore> = Arc::new(FsTreeStore::new(data_dir));
    let auth = Arc::new(StaticAuth::signed_in(
        args.user.as_deref().unwrap_or("local"),
    ));

    match args.command {
        Command::List => {
            let ids = block_on(stemma::list_trees(store.as_ref(), auth.as_ref()))?;
            for id in ids {
                println!("{id}");
            }
            Ok(())
        }
        Command::New => {
            // tree_id presence was checked in parse_args.
            let tree_id = args.tree_id.as_deref().unwrap_or_default();
            let existing = block_on(store.load_tree(tree_id)).map_err(stemma::Error::from)?;
            if !existing.is_empty() {
                return Err(CliError::TreeExists(tree_id.to_string()));
            }
            block_on(stemma::create_tree(store.as_ref(), auth.as_ref(), tree_id))?;
            println!("{tree_id}");
            Ok(())
        }
        Command::Delete => {
            let tree_id = args.tree_id.as_deref().unwrap_or_default();
            block_on(stemma::delete_tree(store.as_ref(), auth.as_ref(), tree_id))?;
            Ok(())
        }
        Command::Show => {
            let tree_id = args.tree_id.as_deref().unwrap_or_default();
            // Read-only: an absent tree is reported, not synthesized.
            let existing = block_on(store.load_tree(tree_id)).map_err(stemma::Error::from)?;
            if existing.is_empty() {
                return Err(CliError::UnknownTree(tree_id.to_string()));
            }
            let mut engine = TreeEngine::new(tree_id, store, auth);
            block_on(engine.load())?;
            write_json(&tree_out(&engine, Vec::new()), args.pretty)
        }
        Command::Apply => {
            let tree_id = args.tree_id.as_deref().unwrap_or_default();
            let commands = read_script(args.script.as_deref())?;
            let mut engine = TreeEngine::new(tree_id, store, auth);
            block_on(engine.load())?;
            let created = run_script(&mut engine, commands)?;
            block_on(engine.save_now())?;
            write_json(&tree_out(&engine, created), args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
