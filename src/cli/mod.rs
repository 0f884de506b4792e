use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;

use crate::config::resolve::{resolve_config_with_overrides, ResolvedConfig};
use crate::config::KinfolkConfig;
use crate::core::member::{Member, MemberId};
use crate::core::relations::{resolve_relatives, Relatives};
use crate::error::{KinfolkError, Result};
use crate::graph::family::build_family_tree;
use crate::graph::focal::focal_graph_from;
use crate::graph::integrity::{check_members, IntegrityReport};
use crate::graph::{viz, FlowGraph};
use crate::store::{MemberRepository, SnapshotStore};
use crate::util::{output, template};

#[derive(Parser, Debug)]
#[command(name = "kinfolk")]
#[command(about = "Family relationship graphs from member snapshots", long_about = None)]
pub struct Cli {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Snapshot file or glob; repeatable. Replaces the configured sources.
    #[arg(short, long = "data")]
    pub data: Vec<String>,
    #[arg(short, long)]
    pub jobs: Option<usize>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Tree(TreeArgs),
    Focus(FocusArgs),
    Relatives(RelativesArgs),
    Check(CheckArgs),
    Members(MembersArgs),
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    #[arg(long, default_value = "json")]
    pub format: String,
    #[arg(long)]
    pub label_template: Option<String>,
}

#[derive(Args, Debug)]
pub struct FocusArgs {
    pub member: String,
    #[arg(long, default_value = "json")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct RelativesArgs {
    pub member: String,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct MembersArgs {
    #[arg(short = 'm', long = "match")]
    pub pattern: Option<String>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[derive(Clone, Copy, Debug)]
enum GraphFormat {
    Json,
    Dot,
    Text,
}

struct Session {
    config: KinfolkConfig,
    repo: Box<dyn MemberRepository>,
}

#[derive(Serialize)]
struct RelativesJson<'a> {
    member: &'a Member,
    #[serde(flatten)]
    relatives: &'a Relatives,
}

#[derive(Serialize)]
struct MemberRowJson<'a> {
    id: &'a str,
    name: String,
}

pub fn run() {
    let cli = Cli::parse();
    if cli.no_color {
        output::set_colors(false);
    }
    output::init_tracing(cli.verbose, cli.quiet);
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        clap_complete::generate(args.shell, &mut Cli::command(), "kinfolk", &mut io::stdout());
        return Ok(());
    }

    let session = load_session(&cli)?;
    match cli.command {
        Commands::Tree(args) => handle_tree(args, &session),
        Commands::Focus(args) => handle_focus(args, &session),
        Commands::Relatives(args) => handle_relatives(args, &session),
        Commands::Check(args) => handle_check(args, &session, cli.quiet),
        Commands::Members(args) => handle_members(args, &session),
        Commands::Completions(_) => Ok(()),
    }
}

fn load_session(cli: &Cli) -> Result<Session> {
    let cwd = std::env::current_dir()?;
    let ResolvedConfig { root, config, .. } =
        resolve_config_with_overrides(&cwd, cli.config.clone())?;

    let store = if cli.data.is_empty() {
        SnapshotStore::new(root, config.data.sources.clone())
    } else {
        SnapshotStore::new(cwd, cli.data.clone())
    };
    let store = store.with_jobs(cli.jobs.or(config.data.jobs));

    Ok(Session {
        config,
        repo: Box::new(store),
    })
}

fn parse_graph_format(input: &str) -> Result<GraphFormat> {
    match input.to_ascii_lowercase().as_str() {
        "json" => Ok(GraphFormat::Json),
        "dot" => Ok(GraphFormat::Dot),
        "text" => Ok(GraphFormat::Text),
        _ => Err(KinfolkError::Other(anyhow::anyhow!(format!(
            "unknown graph format '{}'",
            input
        )))),
    }
}

fn handle_tree(args: TreeArgs, session: &Session) -> Result<()> {
    let format = parse_graph_format(&args.format)?;
    let members = session.members()?;
    let mut graph = build_family_tree(&members, &session.config.layout);

    let label_template = args
        .label_template
        .as_deref()
        .or(session.config.labels.template.as_deref());
    if let Some(label_template) = label_template {
        template::relabel_nodes(&mut graph, &members, label_template)?;
    }

    emit_graph(&graph, format)
}

fn handle_focus(args: FocusArgs, session: &Session) -> Result<()> {
    let format = parse_graph_format(&args.format)?;
    let graph = focal_graph_from(
        session.repo.as_ref(),
        &MemberId::new(args.member.as_str()),
        &session.config.focal,
    )?
    .ok_or_else(|| unknown_member(&args.member))?;
    emit_graph(&graph, format)
}

fn handle_relatives(args: RelativesArgs, session: &Session) -> Result<()> {
    let members = session.members()?;
    let (focal, relatives) = resolve_relatives(&members, &MemberId::new(args.member.as_str()))
        .ok_or_else(|| unknown_member(&args.member))?;

    if args.json {
        return print_json(&RelativesJson {
            member: &focal,
            relatives: &relatives,
        });
    }

    output::heading(&format!("{} [{}]", focal.full_name(), focal.id));
    let single = |title: &str, member: &Option<Member>| {
        if let Some(member) = member {
            println!("{title}: {} [{}]", member.full_name(), member.id);
        }
    };
    single("father", &relatives.father);
    single("mother", &relatives.mother);
    single("spouse", &relatives.spouse);
    for (title, list) in [
        ("siblings", &relatives.siblings),
        ("children", &relatives.children),
    ] {
        if list.is_empty() {
            continue;
        }
        println!("{title}:");
        for member in list {
            println!("  {} [{}]", member.full_name(), member.id);
        }
    }
    Ok(())
}

fn handle_check(args: CheckArgs, session: &Session, quiet: bool) -> Result<()> {
    let report = check_members(&session.members()?);

    if args.json {
        print_json(&report)?;
    } else {
        print_integrity_report(&report, quiet);
    }

    if args.strict && !report.is_clean() {
        return Err(KinfolkError::Other(anyhow::anyhow!(format!(
            "{} integrity issue(s) found",
            report.issue_count()
        ))));
    }
    Ok(())
}

fn handle_members(args: MembersArgs, session: &Session) -> Result<()> {
    let pattern = args
        .pattern
        .as_deref()
        .map(regex::Regex::new)
        .transpose()
        .map_err(|err| KinfolkError::Other(anyhow::Error::new(err)))?;

    let members = session.members()?;
    let rows: Vec<MemberRowJson> = members
        .iter()
        .filter(|member| {
            pattern.as_ref().map_or(true, |re| {
                re.is_match(&member.full_name()) || re.is_match(member.id.as_str())
            })
        })
        .map(|member| MemberRowJson {
            id: member.id.as_str(),
            name: member.full_name(),
        })
        .collect();

    if args.json {
        return print_json(&rows);
    }
    for row in rows {
        println!("{}\t{}", row.id, row.name);
    }
    Ok(())
}

impl Session {
    fn members(&self) -> Result<Vec<Member>> {
        let members = self.repo.members()?;
        tracing::info!(members = members.len(), "loaded member snapshot");
        Ok(members)
    }
}

fn unknown_member(id: &str) -> KinfolkError {
    KinfolkError::Other(anyhow::anyhow!(format!("unknown member {}", id)))
}

fn emit_graph(graph: &FlowGraph, format: GraphFormat) -> Result<()> {
    match format {
        GraphFormat::Json => print_json(graph),
        GraphFormat::Dot => {
            print!("{}", viz::render_dot(graph));
            Ok(())
        }
        GraphFormat::Text => {
            print!("{}", viz::render_rows(graph));
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .map_err(|err| KinfolkError::Other(anyhow::Error::new(err)))?
    );
    Ok(())
}

fn print_integrity_report(report: &IntegrityReport, quiet: bool) {
    if report.is_clean() {
        if !quiet {
            output::info("no integrity issues found");
        }
        return;
    }

    if !report.duplicates.is_empty() {
        println!("duplicate ids:");
        for id in &report.duplicates {
            println!("  {}", id);
        }
    }

    if !report.dangling.is_empty() {
        println!("dangling references:");
        for item in &report.dangling {
            println!(
                "  {} {} -> {} (missing)",
                item.member,
                item.relation.as_str(),
                item.target
            );
        }
    }

    if !report.self_references.is_empty() {
        println!("self references:");
        for item in &report.self_references {
            println!("  {} is its own {}", item.member, item.relation.as_str());
        }
    }

    if !report.asymmetric_spouses.is_empty() {
        println!("asymmetric spouses:");
        for item in &report.asymmetric_spouses {
            let back = item
                .spouse_points_to
                .as_ref()
                .map(|id| id.as_str())
                .unwrap_or("nobody");
            println!("  {} -> {} (but {} -> {})", item.member, item.spouse, item.spouse, back);
        }
    }

    if !report.cycles.is_empty() {
        println!("ancestry cycles:");
        for cycle in &report.cycles {
            let line = cycle
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");
            println!("  {}", line);
        }
    }

    if !quiet {
        output::warn(&format!("{} integrity issue(s) found", report.issue_count()));
    }
}
