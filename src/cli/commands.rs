use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use http::Method;
use serde_json::json;
use tracing::debug;

use crate::dispatcher::{CoercionPolicy, HandlerRequest, HandlerResponse};
use crate::echo;
use crate::ids::RequestId;
use crate::logging::init_logging;
use crate::router::Router;
use crate::runtime_config::RouterConfig;

/// Command-line interface for classrouter
#[derive(Debug, Parser)]
#[command(name = "classrouter", version)]
#[command(about = "Convention-based class/method request router", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub router: RouterArgs,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command; they shape the router being built.
#[derive(Debug, Default, Args)]
pub struct RouterArgs {
    /// YAML config file
    #[arg(short, long, global = true, env = "CLASSROUTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Context segment paths must start with (empty for none)
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Only load plugin modules declaring this identity
    #[arg(long, global = true)]
    pub plugin_id: Option<String>,

    /// Additional plugin location (repeatable)
    #[arg(long = "plugin-path", global = true)]
    pub plugin_paths: Vec<PathBuf>,

    /// Reject requests whose arguments fail to convert instead of passing defaults
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl RouterArgs {
    /// File, then environment, then these flags.
    pub fn to_config(&self) -> Result<RouterConfig> {
        let config = match &self.config {
            Some(path) => RouterConfig::load(path)?,
            None => RouterConfig::default(),
        };
        let mut config = config.apply_env();

        if let Some(context) = &self.context {
            config.context.clone_from(context);
        }
        if let Some(plugin_id) = &self.plugin_id {
            config.plugin_id = Some(plugin_id.clone()).filter(|id| !id.is_empty());
        }
        config
            .plugin_locations
            .extend(self.plugin_paths.iter().cloned());
        if self.strict {
            config.coercion = CoercionPolicy::Strict;
        }
        if let Some(level) = &self.log_level {
            config.log.level.clone_from(level);
        }
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List registered classes and their dispatchable operations
    List {
        /// Print JSON instead of one line per operation
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Dispatch a single path and print the response
    Route {
        /// Request path, e.g. /api/Widgets/get/id/42
        path: String,

        /// HTTP method recorded on the request
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Header as NAME=VALUE (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Reuse this request id instead of minting one
        #[arg(long)]
        request_id: Option<String>,
    },
}

fn build_router(config: &RouterConfig) -> Router {
    let mut registry = config.registry_builder(None).discover();
    if !registry.register(echo::handler()) {
        debug!(class = echo::ECHO_CLASS, "Built-in echo handler shadowed");
    }
    Router::new(registry, config.context.clone()).with_policy(config.coercion)
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .or_else(|| raw.split_once(':'))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse arguments, set up logging and run the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.router.to_config()?;
    init_logging(&config.log)?;
    let stdout = std::io::stdout();
    execute(&cli.command, &config, &mut stdout.lock())
}

/// Run `command` against a router built from `config`, writing results to `out`.
///
/// The binary has no platform module loader, so only statically linked handlers
/// are available; plugin modules found under the locations are reported and skipped.
/// The built-in `echo` handler is added after discovery and yields to any
/// discovered class of the same name.
pub fn execute<W: Write>(command: &Commands, config: &RouterConfig, out: &mut W) -> Result<()> {
    let router = build_router(config);

    match command {
        Commands::List { json } => {
            if *json {
                let classes: Vec<_> = router
                    .registry()
                    .entries()
                    .map(|entry| {
                        let methods: Vec<String> =
                            entry.endpoints().map(|d| d.signature()).collect();
                        json!({ "class": entry.class_name(), "methods": methods })
                    })
                    .collect();
                serde_json::to_writer_pretty(&mut *out, &classes)?;
                writeln!(out)?;
            } else {
                for endpoint in router.registry().endpoints() {
                    writeln!(out, "{endpoint}")?;
                }
            }
            Ok(())
        }
        Commands::Route {
            path,
            method,
            headers,
            request_id,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("Invalid HTTP method '{method}'"))?;
            let mut request = HandlerRequest::new(method, path.as_str());
            request.request_id = RequestId::from_header_or_new(request_id.as_deref());
            for (name, value) in headers {
                request = request.with_header(name, value.as_str());
            }

            let mut response = HandlerResponse::default();
            let handled = router.dispatch(&mut request, &mut response);
            let report = json!({
                "request_id": request.request_id,
                "handled": handled,
                "status": response.status,
                "body": response.body,
            });
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;

            if !handled {
                bail!("No operation matched {path}");
            }
            Ok(())
        }
    }
}
