#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use argonaut_api::{ApiConfig, ApiResult, ArgoApi, Config, HttpApi, Instance};
use argonaut_tui::{ApiFactory, ArgonautApp};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

mod headless;

#[derive(Parser, Debug)]
#[command(name = "argonaut", version, about = "Terminal UI for Argo CD applications")]
struct Cli {
    /// Instances file
    #[arg(long = "config", env = "CONFIG_PATH", default_value = argonaut_api::config::DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Instance to use (default: the only one, or pick in the UI)
    #[arg(long = "instance", global = true)]
    instance: Option<String>,

    /// Log destination while the terminal UI is running
    #[arg(long = "log-file", default_value = "argonaut.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// List applications
    Apps {
        #[command(flatten)]
        status: StatusArgs,
        #[arg(long = "project")]
        project: Option<String>,
        #[arg(short = 'o', long = "output", value_enum, default_value_t = Output::Human)]
        output: Output,
    },
    /// Print the resource tree of one application
    Tree {
        app: String,
        #[command(flatten)]
        status: StatusArgs,
        /// Only roots of this kind (and their subtrees)
        #[arg(long = "kind")]
        kind: Option<String>,
        /// Show roots only
        #[arg(long = "collapsed")]
        collapsed: bool,
        #[arg(short = 'o', long = "output", value_enum, default_value_t = Output::Human)]
        output: Output,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct StatusArgs {
    #[arg(long = "health")]
    health: Option<String>,
    #[arg(long = "sync")]
    sync: Option<String>,
    #[arg(long = "search")]
    search: Option<String>,
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let env = std::env::var("ARGONAUT_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(std::sync::Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn http_factory() -> ApiFactory {
    let cfg = ApiConfig::from_env();
    Arc::new(move |inst: &Instance| -> ApiResult<Arc<dyn ArgoApi>> {
        Ok(Arc::new(HttpApi::new(inst, cfg)?))
    })
}

fn pick_instance<'a>(config: &'a Config, name: Option<&str>) -> Result<&'a Instance> {
    match (name, config.needs_selection()) {
        (None, true) => Err(anyhow!("several instances configured; pass --instance <name>")),
        _ => config.instance(name).ok_or_else(|| anyhow!("unknown instance: {}", name.unwrap_or_default())),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let tui = cli.command.is_none();
    init_tracing(tui.then_some(cli.log_file.as_path()))?;
    let config = Config::load(&cli.config).with_context(|| format!("load config {}", cli.config.display()))?;
    let factory = http_factory();

    let Some(command) = cli.command else {
        info!(instances = config.instances.len(), "starting terminal ui");
        let preferred = cli.instance.clone();
        return tokio::task::spawn_blocking(move || {
            let mut app = ArgonautApp::new(config, factory);
            app.start(preferred.as_deref());
            argonaut_tui::run_terminal(app)
        })
        .await
        .context("ui task")?
        .context("terminal");
    };

    let inst = pick_instance(&config, cli.instance.as_deref())?;
    let api = factory(inst)?;
    let out = match command {
        Commands::Apps { status, project, output } => {
            let q = headless::AppsQuery { project, health: status.health, sync: status.sync, search: status.search };
            headless::apps(api.as_ref(), &q, output).await?
        }
        Commands::Tree { app, status, kind, collapsed, output } => {
            let q = headless::TreeQuery { kind, health: status.health, sync: status.sync, search: status.search, collapsed };
            headless::tree(api.as_ref(), &app, &q, output).await?
        }
    };
    print!("{}", out);
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("argonaut error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn inst(name: &str) -> Instance {
        Instance { name: name.into(), url: "argo.local".into(), token: "t".into(), insecure_skip_verify: false }
    }

    #[test]
    fn cli_definition_is_valid() { Cli::command().debug_assert(); }

    #[test]
    fn parses_tree_flags() {
        let cli = Cli::parse_from(["argonaut", "--instance", "prod", "tree", "web", "--kind", "Service", "-o", "json", "--collapsed"]);
        assert_eq!(cli.instance.as_deref(), Some("prod"));
        match cli.command {
            Some(Commands::Tree { app, kind, collapsed, output, .. }) => {
                assert_eq!(app, "web");
                assert_eq!(kind.as_deref(), Some("Service"));
                assert!(collapsed);
                assert_eq!(output, Output::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::parse_from(["argonaut"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_file, PathBuf::from("argonaut.log"));
    }

    #[test]
    fn instance_choice_for_headless_commands() {
        let one = Config { instances: vec![inst("a")] };
        assert_eq!(pick_instance(&one, None).expect("single").name, "a");
        let two = Config { instances: vec![inst("a"), inst("b")] };
        assert!(pick_instance(&two, None).is_err());
        assert_eq!(pick_instance(&two, Some("b")).expect("named").name, "b");
        assert!(pick_instance(&two, Some("zz")).is_err());
    }
}
