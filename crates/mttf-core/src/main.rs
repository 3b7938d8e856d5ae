//! mttf - mean time to first failure of Markov storage reliability models
//!
//! Builds a fault/recovery state graph for one of the built-in redundancy
//! schemes and reports its fault resilience together with the exact and
//! asymptotic MTTFF, symbolically and, where every rate is bound, numerically.

use clap::{Args, Parser, Subcommand};
use mttf_common::{format_error_human, Envelope, Error, OutputFormat, StructuredError};
use mttf_config::{load_config, ConfigSnapshot, LoadedConfig, ValidationError};
use mttf_core::analysis::{AnalysisOptions, AnalysisReport, ExactMode};
use mttf_core::exit_codes::ExitCode;
use mttf_core::log_event;
use mttf_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogLevel, Stage,
};
use mttf_core::models::ModelKind;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mttf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Configuration file (defaults to MTTF_CONFIG, then the XDG and system locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a built-in reliability model
    Analyze(AnalyzeArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Model to analyze: nk, nk-latent or lrc2 (defaults to the configured model)
    model: Option<String>,

    /// Number of tolerated failures (R)
    #[arg(long, short = 'r')]
    redundancy: Option<u32>,

    /// Always run the exact solver, ignoring the configured state limit
    #[arg(long, conflicts_with = "no_exact")]
    exact: bool,

    /// Skip the exact solver
    #[arg(long)]
    no_exact: bool,

    /// Run the asymptotic estimator (the default)
    #[arg(long, conflicts_with = "no_asymptotic")]
    asymptotic: bool,

    /// Skip the asymptotic estimator
    #[arg(long)]
    no_asymptotic: bool,

    /// Bind a rate variable, e.g. --bind e=1e-5 (overrides the config file)
    #[arg(long = "bind", value_name = "NAME=VALUE", value_parser = parse_binding)]
    bindings: Vec<(String, f64)>,

    /// Include the rendered state graph in the output
    #[arg(long)]
    show_graph: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the resolved configuration)
        path: Option<PathBuf>,
    },
}

fn parse_binding(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {}: {}", name, e))?;
    if !value.is_finite() {
        return Err(format!("value for {} must be finite", name));
    }
    Ok((name.to_string(), value))
}

fn main() {
    let cli = Cli::parse();

    let base = LogConfig::from_env(None, None);
    let level = LogLevel::from_verbosity(base.level, cli.global.verbose, cli.global.quiet);
    init_logging(&base.with_level(level));

    let run_id = generate_run_id();
    let exit_code = match &cli.command {
        Commands::Analyze(args) => run_analyze(&cli.global, args, &run_id),
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => run_config_show(&cli.global, &run_id),
            ConfigCommands::Validate { path } => {
                run_config_validate(&cli.global, path.as_deref(), &run_id)
            }
        },
        Commands::Version => {
            print_version(&cli.global, &run_id);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// analyze
// ============================================================================

fn run_analyze(global: &GlobalOpts, args: &AnalyzeArgs, run_id: &str) -> ExitCode {
    let mut ctx = LogContext::new(run_id);
    let build = ctx.span(Stage::Build).entered();
    log_event!(INFO, event_names::RUN_STARTED, "analysis run started");

    let loaded = match load(global.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => return output_error(global, &err, run_id),
    };
    let config = &loaded.config;

    let model = match args
        .model
        .as_deref()
        .or(config.default_model.as_deref())
        .unwrap_or(ModelKind::Nk.name())
        .parse::<ModelKind>()
    {
        Ok(model) => model,
        Err(err) => return output_error(global, &err, run_id),
    };
    let redundancy = args.redundancy.unwrap_or(config.redundancy);

    let mut options = AnalysisOptions::from_config(config);
    options.exact = if args.exact {
        ExactMode::Always
    } else if args.no_exact {
        ExactMode::Never
    } else {
        ExactMode::Auto
    };
    options.asymptotic = args.asymptotic || !args.no_asymptotic;
    options.show_graph = args.show_graph;
    for (name, value) in &args.bindings {
        options.bindings.insert(name.clone(), *value);
    }
    if let Some(regime) = options.regime.as_mut() {
        for (name, value) in &args.bindings {
            let value = if config.compare_regime.fault_variables.contains(name) {
                value * regime.fault_rate_scale
            } else {
                *value
            };
            regime.bindings.insert(name.clone(), value);
        }
    }
    drop(build);

    ctx = ctx.with_model(model.name());
    let report = ctx
        .span(Stage::Build)
        .in_scope(|| AnalysisReport::run(model, redundancy, &options));
    let report = match report {
        Ok(report) => report,
        Err(err) => {
            ctx.span(Stage::Report).in_scope(|| {
                log_event!(
                    ERROR,
                    event_names::ANALYSIS_FAILED,
                    err.to_string(),
                    code = err.code()
                )
            });
            return output_error(global, &err, run_id);
        }
    };

    let _report = ctx.span(Stage::Report).entered();
    match global.format {
        OutputFormat::Json => {
            if let Err(err) = print_json(&Envelope::new(run_id, &report)) {
                return output_error(global, &err, run_id);
            }
        }
        OutputFormat::Md => print!("{}", report.to_markdown()),
        OutputFormat::Summary => println!("[{}] {}", run_id, report.summary_line()),
    }
    log_event!(
        INFO,
        event_names::RUN_FINISHED,
        "analysis run finished",
        resilience = report.analysis.summary.resilience as u64
    );
    ExitCode::Clean
}

// ============================================================================
// config
// ============================================================================

#[derive(Serialize)]
struct ConfigShow<'a> {
    source: &'a ConfigSnapshot,
    config: &'a mttf_config::AnalysisConfig,
}

fn run_config_show(global: &GlobalOpts, run_id: &str) -> ExitCode {
    let loaded = match load(global.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => return output_error(global, &err, run_id),
    };
    let snapshot = ConfigSnapshot::new(&loaded.config, &loaded.paths, loaded.raw.as_deref());
    let source = snapshot
        .config_path
        .clone()
        .unwrap_or_else(|| "built-in defaults".to_string());

    match global.format {
        OutputFormat::Json => {
            let payload = ConfigShow {
                source: &snapshot,
                config: &loaded.config,
            };
            if let Err(err) = print_json(&Envelope::new(run_id, payload)) {
                return output_error(global, &err, run_id);
            }
        }
        OutputFormat::Summary => {
            println!("[{}] config: {} ({})", run_id, source, snapshot.short_id());
        }
        OutputFormat::Md => {
            let toml = match loaded.config.to_toml() {
                Ok(toml) => toml,
                Err(err) => return output_error(global, &config_error(err), run_id),
            };
            println!("# mttf config show");
            println!();
            println!("Source: {} ({})", source, snapshot.config_source);
            println!("Hash: {}", snapshot.config_hash);
            println!();
            println!("```toml");
            print!("{}", toml);
            println!("```");
        }
    }
    ExitCode::Clean
}

#[derive(Serialize)]
struct ConfigValidation<'a> {
    status: &'static str,
    source: &'a ConfigSnapshot,
}

fn run_config_validate(global: &GlobalOpts, path: Option<&Path>, run_id: &str) -> ExitCode {
    let loaded = match load(path.or(global.config.as_deref())) {
        Ok(loaded) => loaded,
        Err(err) => return output_error(global, &err, run_id),
    };
    let snapshot = ConfigSnapshot::new(&loaded.config, &loaded.paths, loaded.raw.as_deref());

    match global.format {
        OutputFormat::Json => {
            let payload = ConfigValidation {
                status: "valid",
                source: &snapshot,
            };
            if let Err(err) = print_json(&Envelope::new(run_id, payload)) {
                return output_error(global, &err, run_id);
            }
        }
        OutputFormat::Summary => println!("[{}] config validate: OK", run_id),
        OutputFormat::Md => {
            println!("# Configuration Validation");
            println!();
            println!("Status: valid");
            match &snapshot.config_path {
                Some(path) => println!("File: {}", path),
                None => println!("File: none, using built-in defaults"),
            }
        }
    }
    ExitCode::Clean
}

fn load(path: Option<&Path>) -> Result<LoadedConfig, Error> {
    match load_config(path) {
        Ok(loaded) => {
            match &loaded.paths.config {
                Some(path) => log_event!(
                    DEBUG,
                    event_names::CONFIG_LOADED,
                    "configuration loaded",
                    path = tracing::field::display(path.display())
                ),
                None => log_event!(
                    DEBUG,
                    event_names::CONFIG_DEFAULT_USED,
                    "no configuration file, using defaults"
                ),
            }
            Ok(loaded)
        }
        Err(err) => {
            log_event!(WARN, event_names::CONFIG_ERROR, err.to_string(), code = err.code());
            Err(config_error(err))
        }
    }
}

fn config_error(err: ValidationError) -> Error {
    match err {
        ValidationError::IoError(msg) => Error::Config(msg),
        ValidationError::VersionMismatch { .. } => Error::SchemaValidation(err.to_string()),
        ValidationError::ParseError(_)
        | ValidationError::SemanticError(_)
        | ValidationError::InvalidValue { .. } => Error::InvalidConfig(err.to_string()),
    }
}

// ============================================================================
// output
// ============================================================================

fn print_json<T: Serialize>(payload: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

/// Report an error on stderr and pick the exit code.
fn output_error(global: &GlobalOpts, err: &Error, run_id: &str) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            let structured = StructuredError::from(err).with_context("run_id", run_id);
            eprintln!("{}", structured.to_json_pretty());
        }
        OutputFormat::Summary => eprintln!("[{}] error {}: {}", run_id, err.code(), err),
        OutputFormat::Md => {
            let color = !global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(err, color));
        }
    }
    ExitCode::from(err)
}

#[derive(Serialize)]
struct VersionInfo {
    version: &'static str,
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    name: &'static str,
    description: &'static str,
    symbols: &'static [&'static str],
}

fn print_version(global: &GlobalOpts, run_id: &str) {
    let version = env!("CARGO_PKG_VERSION");
    match global.format {
        OutputFormat::Json => {
            let info = VersionInfo {
                version,
                models: ModelKind::ALL
                    .iter()
                    .map(|kind| ModelInfo {
                        name: kind.name(),
                        description: kind.description(),
                        symbols: kind.symbols(),
                    })
                    .collect(),
            };
            if let Err(err) = print_json(&Envelope::new(run_id, info)) {
                output_error(global, &err, run_id);
            }
        }
        OutputFormat::Summary => println!("mttf {}", version),
        OutputFormat::Md => {
            println!("# mttf {}", version);
            println!();
            for kind in ModelKind::ALL {
                println!("- `{}`: {}", kind.name(), kind.description());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bindings_parse() {
        assert_eq!(parse_binding("e=0.5").unwrap(), ("e".to_string(), 0.5));
        assert_eq!(parse_binding(" N = 10 ").unwrap(), ("N".to_string(), 10.0));
        assert!(parse_binding("e").is_err());
        assert!(parse_binding("=1").is_err());
        assert!(parse_binding("e=abc").is_err());
        assert!(parse_binding("e=inf").is_err());
    }

    #[test]
    fn config_errors_map_to_config_codes() {
        let err = config_error(ValidationError::ParseError("bad".into()));
        assert_eq!(ExitCode::from(&err), ExitCode::ConfigError);
        let err = config_error(ValidationError::IoError("missing".into()));
        assert_eq!(err.code(), 10);
    }
}
