use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use foundry_core::{FoundryConfig, Workspace};
use foundry_model::{EntityId, ProblemPatch, ProblemStatus, RoadmapItemPatch, RoadmapStatus};
use foundry_store::{EntityStore, FileStore};
use foundry_strategy::GatingResult;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for a transition the gate refused
const EXIT_BLOCKED: u8 = 2;
const EXIT_OK: u8 = 0;
const EXIT_USAGE: u8 = 64;

fn rice_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(value_parser!(u8).range(1..=10))
        .help(format!("{name} (1-10)"))
}

fn cli() -> Command {
    Command::new("foundry")
        .version(foundry_core::VERSION)
        .about("Product strategy workspace: graph, orphans, gated status changes")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Workspace JSON document (overrides configuration)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("graph")
                .about("Print the strategy graph")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("orphans-only")
                        .long("orphans-only")
                        .action(ArgAction::SetTrue)
                        .help("Only list orphaned nodes"),
                ),
        )
        .subcommand(
            Command::new("orphans")
                .about("Count orphans per node type")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("problem-status")
                .about("Change a problem's status through the acceptance gate")
                .arg(Arg::new("id").required(true))
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(|s: &str| s.parse::<ProblemStatus>()),
                ),
        )
        .subcommand(
            Command::new("item-status")
                .about("Change a roadmap item's status through the commit gate")
                .arg(Arg::new("id").required(true))
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(|s: &str| s.parse::<RoadmapStatus>()),
                ),
        )
        .subcommand(
            Command::new("score")
                .about("Set RICE inputs on a roadmap item")
                .arg(Arg::new("id").required(true))
                .arg(rice_arg("reach"))
                .arg(rice_arg("impact"))
                .arg(rice_arg("confidence"))
                .arg(rice_arg("effort")),
        )
        .subcommand(
            Command::new("link")
                .about("Link a roadmap item to a problem or an objective")
                .arg(Arg::new("item").required(true))
                .arg(
                    Arg::new("problem")
                        .long("problem")
                        .conflicts_with("objective")
                        .required_unless_present("objective"),
                )
                .arg(Arg::new("objective").long("objective"))
                .arg(
                    Arg::new("impact")
                        .long("impact")
                        .requires("objective")
                        .value_parser(value_parser!(u8).range(1..=10))
                        .help("Impact on the objective (1-10)"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<FoundryConfig> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => FoundryConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_env(|key| std::env::var(key).ok()),
        None => FoundryConfig::from_env(),
    };
    Ok(match matches.get_one::<PathBuf>("data") {
        Some(path) => config.with_data_path(path),
        None => config,
    })
}

fn init_tracing(config: &FoundryConfig, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn id_arg(args: &ArgMatches, name: &str) -> Result<EntityId> {
    args.get_one::<String>(name)
        .map(|s| EntityId::from(s.as_str()))
        .with_context(|| format!("missing <{name}>"))
}

fn report_gate(result: &GatingResult, out: &mut impl Write) -> Result<u8> {
    match result.failure() {
        None => {
            writeln!(out, "ok")?;
            Ok(EXIT_OK)
        }
        Some(failure) => {
            writeln!(out, "blocked: {}", failure.message)?;
            writeln!(out, "missing: {}", failure.codes().join(", "))?;
            Ok(EXIT_BLOCKED)
        }
    }
}

async fn run<S: EntityStore>(
    workspace: &Workspace<S>,
    matches: &ArgMatches,
    out: &mut impl Write,
) -> Result<u8> {
    match matches.subcommand() {
        Some(("graph", args)) => {
            let graph = workspace.strategy_graph().await?;
            let orphans_only = args.get_flag("orphans-only");
            if args.get_flag("json") {
                if orphans_only {
                    let orphans: Vec<_> = graph.orphans().collect();
                    serde_json::to_writer_pretty(&mut *out, &orphans)?;
                } else {
                    serde_json::to_writer_pretty(&mut *out, &graph)?;
                }
                writeln!(out)?;
                return Ok(EXIT_OK);
            }
            for node in &graph.nodes {
                if orphans_only && !node.is_orphan {
                    continue;
                }
                writeln!(
                    out,
                    "{:<11} {:<28} {:<12} {}{}",
                    node.node_type.as_str(),
                    node.entity_id.as_str(),
                    node.status.as_deref().unwrap_or("-"),
                    node.label,
                    if node.is_orphan { "  [orphan]" } else { "" }
                )?;
            }
            writeln!(
                out,
                "{} nodes, {} edges, {} orphans",
                graph.nodes.len(),
                graph.edges.len(),
                graph.orphans().count()
            )?;
            Ok(EXIT_OK)
        }
        Some(("orphans", args)) => {
            let counts = workspace.orphan_counts().await?;
            if args.get_flag("json") {
                serde_json::to_writer_pretty(&mut *out, &counts)?;
                writeln!(out)?;
            } else {
                writeln!(out, "problems:    {}", counts.problems)?;
                writeln!(out, "initiatives: {}", counts.initiatives)?;
                writeln!(out, "epics:       {}", counts.epics)?;
                writeln!(out, "features:    {}", counts.features)?;
                writeln!(out, "total:       {}", counts.total())?;
            }
            Ok(EXIT_OK)
        }
        Some(("problem-status", args)) => {
            let id = id_arg(args, "id")?;
            let status = *args
                .get_one::<ProblemStatus>("status")
                .context("missing <status>")?;
            let result = workspace
                .update_problem(&id, ProblemPatch::status(status))
                .await?;
            report_gate(&result, out)
        }
        Some(("item-status", args)) => {
            let id = id_arg(args, "id")?;
            let status = *args
                .get_one::<RoadmapStatus>("status")
                .context("missing <status>")?;
            let result = workspace
                .update_roadmap_item(&id, RoadmapItemPatch::status(status))
                .await?;
            report_gate(&result, out)
        }
        Some(("score", args)) => {
            let id = id_arg(args, "id")?;
            let patch = RoadmapItemPatch {
                reach: args.get_one::<u8>("reach").copied(),
                impact: args.get_one::<u8>("impact").copied(),
                confidence: args.get_one::<u8>("confidence").copied(),
                effort: args.get_one::<u8>("effort").copied(),
                ..RoadmapItemPatch::default()
            };
            workspace.update_roadmap_item(&id, patch).await?;
            let item = workspace
                .roadmap_item(&id)
                .await?
                .with_context(|| format!("roadmap item '{id}' not found"))?
                .item;
            match item.score {
                Some(score) => writeln!(out, "score: {score:.1}")?,
                None => writeln!(out, "score: - (incomplete inputs)")?,
            }
            Ok(EXIT_OK)
        }
        Some(("link", args)) => {
            let item = id_arg(args, "item")?;
            if let Some(problem) = args.get_one::<String>("problem") {
                let link = workspace
                    .link_problem_to_roadmap_item(&item, &problem.as_str().into())
                    .await?;
                writeln!(out, "linked {}", link.id)?;
            } else {
                let objective = id_arg(args, "objective")?;
                let impact = args.get_one::<u8>("impact").copied();
                let link = workspace
                    .link_objective_to_roadmap_item(&item, &objective, impact)
                    .await?;
                writeln!(out, "linked {}", link.id)?;
            }
            Ok(EXIT_OK)
        }
        _ => Ok(EXIT_USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    init_tracing(&config, matches.get_flag("log-json"));

    tracing::debug!(
        data = %config.data_path.display(),
        provider = config.ai.provider.as_str(),
        model = %config.ai.model,
        "opening workspace"
    );
    let store = FileStore::open(&config.data_path)
        .await
        .with_context(|| format!("opening {}", config.data_path.display()))?;
    let workspace = Workspace::new(store);

    let mut stdout = std::io::stdout().lock();
    let code = run(&workspace, &matches, &mut stdout).await?;
    Ok(ExitCode::from(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_model::{Problem, RoadmapItem, RoadmapItemType};
    use foundry_store::MemoryStore;

    async fn exec(workspace: &Workspace<MemoryStore>, argv: &[&str]) -> (u8, String) {
        let matches = cli()
            .try_get_matches_from(std::iter::once("foundry").chain(argv.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        let code = run(workspace, &matches, &mut out).await.unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    async fn seeded() -> Workspace<MemoryStore> {
        let ws = Workspace::new(MemoryStore::new());
        ws.create_roadmap_item(RoadmapItem::new("Exports", RoadmapItemType::Initiative).with_id("i1"))
            .await
            .unwrap();
        ws.create_problem(Problem::new("Slow", "Exports are slow").with_id("p1"))
            .await
            .unwrap();
        ws
    }

    #[test]
    fn rejects_unknown_status() {
        let err = cli()
            .try_get_matches_from(["foundry", "item-status", "i1", "shipped"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rice_values_are_bounded() {
        assert!(cli()
            .try_get_matches_from(["foundry", "score", "i1", "--reach", "11"])
            .is_err());
    }

    #[tokio::test]
    async fn blocked_commit_exits_with_two() {
        let ws = seeded().await;
        let (code, out) = exec(&ws, &["item-status", "i1", "committed"]).await;
        assert_eq!(code, EXIT_BLOCKED);
        assert!(out.contains("missing: objective, acceptedProblem"));
    }

    #[tokio::test]
    async fn link_then_accept_problem() {
        let ws = seeded().await;
        let (_, out) = exec(&ws, &["problem-status", "p1", "accepted"]).await;
        assert!(out.starts_with("blocked"));

        let (code, _) = exec(&ws, &["link", "i1", "--problem", "p1"]).await;
        assert_eq!(code, EXIT_OK);
        let (code, out) = exec(&ws, &["problem-status", "p1", "accepted"]).await;
        assert_eq!(code, EXIT_OK);
        assert_eq!(out, "ok\n");
    }

    #[tokio::test]
    async fn score_prints_derived_value() {
        let ws = seeded().await;
        let (_, out) = exec(
            &ws,
            &["score", "i1", "--reach", "8", "--impact", "5", "--confidence", "7", "--effort", "3"],
        )
        .await;
        assert_eq!(out, "score: 93.3\n");
    }

    #[tokio::test]
    async fn orphans_json_lists_every_type() {
        let ws = seeded().await;
        let (_, out) = exec(&ws, &["orphans", "--json"]).await;
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["initiatives"], 0);
        assert_eq!(value["problems"], 0);
    }
}
