use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use envpm::plugin::id::display_set;
use envpm::plugin::{PluginId, StoreLifecycle};
use envpm::store::TomlFileStore;
use envpm::{App, AppConfig, Environment, RequestParams};

type SharedStore = Rc<RefCell<TomlFileStore>>;
type HostApp = App<SharedStore, StoreLifecycle<SharedStore>>;

#[derive(Parser)]
#[command(name = "envpm")]
#[command(about = "Keep only the current environment's plugins active", long_about = None)]
struct Cli {
    /// Config file to merge over the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the environment, trigger mode, tag sets and active plugins
    Status,
    /// Tag a plugin for the current environment
    Tag { plugin: String },
    /// Remove a plugin from the current environment's tag set
    Untag { plugin: String },
    /// Reconcile active plugins with the current environment now
    Reset,
    /// Bootstrap a request from a query string and print the resulting notices
    Request {
        /// e.g. "reset_env_plugins" or "stage_only=akismet/akismet.php"
        #[arg(default_value = "")]
        query: String,
        /// Request URI used for the toolbar reset link
        #[arg(long, default_value = "/wp-admin/plugins.php")]
        uri: String,
    },
    /// Print toggle links for every active plugin
    Links,
    /// Async toggle callback: apply key=value and print the refreshed link
    Ajax { key: String, value: String },
}

fn main() -> Result<()> {
    // Initialize logging to file (stdout is the command's output)
    let log_dir = directories::ProjectDirs::from("", "", "envpm")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "envpm.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("envpm=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::info!("envpm starting (store {})", config.store.path);

    let store = TomlFileStore::open(config.store_path())
        .with_context(|| format!("opening store {}", config.store.path))?;
    let store: SharedStore = Rc::new(RefCell::new(store));
    let installed = config.host.installed.iter().map(|id| PluginId::new(id.as_str()));
    let lifecycle = StoreLifecycle::new(Rc::clone(&store), installed);
    let mut app = App::new(config, store, lifecycle);

    run(&mut app, cli.command)
}

fn run(app: &mut HostApp, command: Commands) -> Result<()> {
    match command {
        Commands::Status => print_status(app),
        Commands::Tag { plugin } => {
            let env = app.state().require()?;
            app.reconciler().tags().add(env, PluginId::new(plugin));
            print_status(app);
        }
        Commands::Untag { plugin } => {
            let env = app.state().require()?;
            app.reconciler().tags().remove(env, &PluginId::new(plugin));
            print_status(app);
        }
        Commands::Reset => {
            let applied = app.reset()?;
            println!(
                "{env}: activated [{}], deactivated [{}]",
                display_set(&applied.activated),
                display_set(&applied.deactivated),
                env = applied.environment
            );
        }
        Commands::Request { query, uri } => {
            let request = RequestParams::parse(&query)
                .with_context(|| format!("parsing query {query:?}"))?;
            let bootstrap = app.bootstrap(&request);

            for notice in app.notices(&bootstrap) {
                println!("{}", notice.to_html());
            }
            if let Some(Err(e)) = &bootstrap.reconciled {
                eprintln!("reconcile failed: {e}");
            }
            if let Some(html) = app.toolbar(&uri).to_html() {
                println!("{html}");
            }
        }
        Commands::Links => {
            let active = app.lifecycle().active_plugins();
            for link in app.toggle_links(&active) {
                println!("{}", link.to_html());
            }
        }
        Commands::Ajax { key, value } => match app.handle_async_toggle(&key, &value) {
            Some(html) => println!("{html}"),
            None => eprintln!("no environment configured"),
        },
    }

    Ok(())
}

fn print_status(app: &mut HostApp) {
    match app.state().environment() {
        Some(env) => println!("environment: {env} [{}]", app.mode().label()),
        None => println!("environment: {:?} (disabled)", app.state()),
    }

    for env in Environment::ALL {
        let set = app.reconciler().tags().get(env);
        println!("  {:<12} {}", env.label(), display_set(&set));
    }

    println!("active: {}", display_set(&app.lifecycle().active_plugins()));
}
