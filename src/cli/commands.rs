use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::config::{IndexTrust, StoreConfig};
use crate::filters::{AgentSearch, FilterOptions, parse_end_bound, parse_start_bound};
use crate::models::EntryType;
use crate::output::{
    Format, write_agent_matches, write_entries, write_projects, write_resolved_path,
    write_sessions, write_tree,
};
use crate::parsers::MalformedPolicy;
use crate::store::{HistoryStore, QueryScope};
use crate::utils::CLAUDE_CONFIG_DIR_ENV;
use crate::utils::paths::{decode_path, encode_path, session_file_in};

#[derive(Parser)]
#[command(name = "claude-history")]
#[command(version = "0.1.0")]
#[command(about = "Query and traverse Claude Code session history", long_about = None)]
pub struct Cli {
    /// Store root to read instead of ~/.claude
    #[arg(long, global = true, env = CLAUDE_CONFIG_DIR_ENV)]
    pub claude_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum)]
    pub format: Option<Format>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Fail on the first malformed JSONL line instead of skipping it
    #[arg(long, global = true)]
    pub strict: bool,

    /// Ignore index records older than the session file they describe
    #[arg(long, global = true)]
    pub check_index_mtime: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects, or the sessions of one project
    List {
        /// Project path; omit to list all projects
        project: Option<String>,

        /// Encoded project directory name, instead of a path
        #[arg(long, conflicts_with = "project")]
        project_id: Option<String>,
    },
    /// Query and filter conversation entries
    Query(QueryArgs),
    /// Show the agent hierarchy of a session
    Tree {
        project: String,

        /// Session id or unique prefix; defaults to the most recent session
        #[arg(long)]
        session: Option<String>,

        /// Agent levels to show (0 = all)
        #[arg(long, default_value_t = 0)]
        depth: usize,
    },
    /// Print the storage path of a project, session or agent
    Resolve(ResolveArgs),
    /// Find sessions and agents by files explored, tools used or time range
    FindAgent(FindAgentArgs),
}

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ResolveArgs {
    #[command(subcommand)]
    command: Option<PathCommand>,

    /// Project path; without it, --session is looked up in every project
    project: Option<String>,

    /// Session id or unique prefix
    #[arg(long)]
    session: Option<String>,

    /// Agent id or unique prefix; requires --session
    #[arg(long, requires = "session")]
    agent: Option<String>,
}

#[derive(Subcommand)]
enum PathCommand {
    /// Encode a file system path into a project directory name
    #[command(hide = true)]
    Encode { path: String },
    /// Decode a project directory name into a path (best effort)
    #[command(hide = true)]
    Decode {
        #[arg(allow_hyphen_values = true)]
        encoded: String,
    },
}

#[derive(Args)]
pub struct FindAgentArgs {
    project: String,

    /// Glob over files touched by Read, Write, Edit and other file tools
    #[arg(long)]
    explored: Option<String>,

    /// Tool names, comma-separated, case-insensitive
    #[arg(long = "tool", value_delimiter = ',')]
    tools: Vec<String>,

    /// Regex matched against tool inputs
    #[arg(long)]
    tool_match: Option<String>,

    /// Earliest timestamp, RFC 3339 or YYYY-MM-DD (inclusive)
    #[arg(long)]
    start: Option<String>,

    /// Latest timestamp, RFC 3339 or YYYY-MM-DD (inclusive)
    #[arg(long)]
    end: Option<String>,

    /// Search one session only (id or unique prefix)
    #[arg(long)]
    session: Option<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    project: String,

    /// Session id or unique prefix
    #[arg(long)]
    session: Option<String>,

    /// Read one agent's file (id or unique prefix); requires --session
    #[arg(long, requires = "session")]
    agent: Option<String>,

    /// Include entries from every nested agent
    #[arg(long, conflicts_with = "agent")]
    include_agents: bool,

    /// Earliest timestamp, RFC 3339 or YYYY-MM-DD (inclusive)
    #[arg(long)]
    start: Option<String>,

    /// Latest timestamp, RFC 3339 or YYYY-MM-DD (inclusive)
    #[arg(long)]
    end: Option<String>,

    /// Entry types, comma-separated (user,assistant,system,...)
    #[arg(long = "type", value_delimiter = ',')]
    types: Vec<String>,

    /// Tool names, comma-separated, case-insensitive
    #[arg(long = "tool", value_delimiter = ',')]
    tools: Vec<String>,

    /// Regex matched against tool inputs
    #[arg(long)]
    tool_match: Option<String>,

    /// Maximum characters of text per entry in list output (0 = no limit)
    #[arg(long, default_value_t = 100)]
    limit: usize,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = StoreConfig::resolve(cli.claude_dir.clone())
        .context("Failed to locate the Claude directory")?;
    if cli.strict {
        config = config.with_malformed_policy(MalformedPolicy::Strict);
    }
    if cli.check_index_mtime {
        config = config.with_index_trust(IndexTrust::CheckMtime);
    }
    debug!(root = %config.root.display(), "Using store root");
    let store = HistoryStore::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::List { project, project_id } => {
            let format = cli.format.unwrap_or(Format::List);
            list(&store, project.as_deref(), project_id.as_deref(), format, &mut out)
        }
        Commands::Query(args) => query(&store, args, cli.format.unwrap_or(Format::List), &mut out),
        Commands::Tree { project, session, depth } => {
            let format = cli.format.unwrap_or(Format::Ascii);
            tree(&store, project, session.as_deref(), *depth, format, &mut out)
        }
        Commands::Resolve(args) => {
            resolve(&store, args, cli.format.unwrap_or(Format::List), &mut out)
        }
        Commands::FindAgent(args) => {
            find_agent(&store, args, cli.format.unwrap_or(Format::List), &mut out)
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter =
        EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn list<W: Write>(
    store: &HistoryStore,
    project: Option<&str>,
    project_id: Option<&str>,
    format: Format,
    out: &mut W,
) -> Result<()> {
    let project_dir = match (project, project_id) {
        (_, Some(id)) => Some(store.project_dir_by_name(id)?),
        (Some(path), None) => Some(store.project_dir(path)?),
        (None, None) => None,
    };

    let Some(project_dir) = project_dir else {
        let projects = store.list_projects().context("Failed to list projects")?;
        if projects.is_empty() {
            eprintln!("No projects found");
            return Ok(());
        }
        write_projects(out, &projects, format)?;
        return Ok(());
    };

    let sessions = store.list_sessions(&project_dir).context("Failed to list sessions")?;
    if sessions.is_empty() {
        eprintln!("No sessions found");
        return Ok(());
    }
    write_sessions(out, &sessions, format)?;
    Ok(())
}

fn query<W: Write>(
    store: &HistoryStore,
    args: &QueryArgs,
    format: Format,
    out: &mut W,
) -> Result<()> {
    let project_dir = store.project_dir(&args.project)?;
    let filters = build_filter_options(args)?;

    let session_id = args
        .session
        .as_deref()
        .map(|prefix| store.resolve_session_id(&project_dir, prefix))
        .transpose()
        .context("Failed to resolve session ID")?;

    let scope = match (session_id, args.agent.as_deref()) {
        (Some(session_id), Some(agent_prefix)) => {
            let agent_id = store
                .resolve_agent_id(&project_dir, &session_id, agent_prefix)
                .context("Failed to resolve agent ID")?;
            QueryScope::Agent { session_id, agent_id }
        }
        (Some(session_id), None) => {
            QueryScope::Session { session_id, include_agents: args.include_agents }
        }
        (None, Some(_)) => bail!("--agent requires --session"),
        (None, None) => QueryScope::Project { include_agents: args.include_agents },
    };

    let entries = store.query(&project_dir, &scope, &filters)?;
    if entries.is_empty() {
        eprintln!("No entries found matching criteria");
        return Ok(());
    }
    write_entries(out, &entries, format, args.limit)?;
    Ok(())
}

fn build_filter_options(args: &QueryArgs) -> Result<FilterOptions> {
    let start = args.start.as_deref().map(parse_start_bound).transpose()?;
    let end = args.end.as_deref().map(parse_end_bound).transpose()?;

    let types = args
        .types
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| EntryType::parse(t))
        .collect();
    let tools =
        args.tools.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();

    Ok(FilterOptions {
        start,
        end,
        types,
        agent_id: String::new(),
        tools,
        tool_pattern: args.tool_match.clone().unwrap_or_default(),
    })
}

fn tree<W: Write>(
    store: &HistoryStore,
    project: &str,
    session: Option<&str>,
    depth: usize,
    format: Format,
    out: &mut W,
) -> Result<()> {
    let project_dir = store.project_dir(project)?;
    let session_id = match session {
        Some(prefix) => store
            .resolve_session_id(&project_dir, prefix)
            .context("Failed to resolve session ID")?,
        None => most_recent_session(store, &project_dir)?,
    };

    let tree = store.build_tree(&project_dir, &session_id)?;
    write_tree(out, &tree, format, depth)?;
    Ok(())
}

fn most_recent_session(store: &HistoryStore, project_dir: &Path) -> Result<String> {
    let sessions = store.list_sessions(project_dir)?;
    match sessions.into_iter().next() {
        Some(session) => Ok(session.id),
        None => bail!("No sessions found in project"),
    }
}

fn resolve<W: Write>(
    store: &HistoryStore,
    args: &ResolveArgs,
    format: Format,
    out: &mut W,
) -> Result<()> {
    match &args.command {
        Some(PathCommand::Encode { path }) => {
            writeln!(out, "{}", encode_path(path))?;
            return Ok(());
        }
        Some(PathCommand::Decode { encoded }) => {
            writeln!(out, "{}", decode_path(encoded).display())?;
            return Ok(());
        }
        None => {}
    }

    let path = match (args.project.as_deref(), args.session.as_deref(), args.agent.as_deref()) {
        (Some(project), Some(session), agent) => {
            let project_dir = store.project_dir(project)?;
            let session_id = store
                .resolve_session_id(&project_dir, session)
                .context("Failed to resolve session ID")?;
            match agent {
                Some(agent_prefix) => {
                    let agent_id = store
                        .resolve_agent_id(&project_dir, &session_id, agent_prefix)
                        .context("Failed to resolve agent ID")?;
                    store.agent_file(&project_dir, &session_id, &agent_id)?
                }
                None => session_file_in(&project_dir, &session_id),
            }
        }
        (None, Some(_), Some(_)) => bail!("A project path is required with --session and --agent"),
        (None, Some(session), None) => store.locate_session(session)?,
        (Some(project), None, _) => store.paths().project_dir(project)?,
        (None, None, _) => bail!("Provide a project path or --session"),
    };

    if format != Format::Json && !path.exists() {
        eprintln!("Warning: path does not exist");
    }
    write_resolved_path(out, &path, format)?;
    Ok(())
}

fn find_agent<W: Write>(
    store: &HistoryStore,
    args: &FindAgentArgs,
    format: Format,
    out: &mut W,
) -> Result<()> {
    let project_dir = store.project_dir(&args.project)?;
    let session_id = args
        .session
        .as_deref()
        .map(|prefix| store.resolve_session_id(&project_dir, prefix))
        .transpose()
        .context("Failed to resolve session ID")?;

    let search = AgentSearch {
        explored: args.explored.clone().filter(|glob| !glob.is_empty()),
        tools: args.tools.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
        tool_pattern: args.tool_match.clone().unwrap_or_default(),
        start: args.start.as_deref().map(parse_start_bound).transpose()?,
        end: args.end.as_deref().map(parse_end_bound).transpose()?,
        session_id,
    };

    let matches = store.find_agents(&project_dir, &search)?;
    if matches.is_empty() && format != Format::Json {
        eprintln!("No agents found matching criteria");
        return Ok(());
    }
    write_agent_matches(out, &matches, format)?;
    Ok(())
}
