//! go-testgen command line
//!
//! `generate` writes tests for a file or directory; `config` shows or edits
//! `$HOME/.go-testgen/config.json`.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use testgen_composition::{GenerationPolicy, Granularity, Mode};
use testgen_core::{Config, GoImports, HttpGenerator, NoFormat, Pipeline, PipelineOptions};
use testgen_symbol::{PackageResolver, SymbolLocator};

mod logging;

fn cli() -> Command {
    Command::new("go-testgen")
        .version(testgen_core::VERSION)
        .about("Generate Go unit tests with the declarations they depend on as context")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .about("Generate tests for a Go file or every Go file below a directory")
                .arg(
                    Arg::new("path")
                        .long("path")
                        .short('p')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Go source file or directory"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .default_value("append")
                        .value_parser(value_parser!(Mode))
                        .help("What to do when a test exists: append or skip"),
                )
                .arg(
                    Arg::new("granularity")
                        .long("granularity")
                        .short('g')
                        .default_value("function")
                        .value_parser(value_parser!(Granularity))
                        .help(
                            "file or function. With mode=skip, file skips any source whose test file \
                             exists and function skips targets whose test exists. With mode=append the \
                             test is always appended.",
                        ),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .short('f')
                        .help("Only functions whose name matches this regex"),
                )
                .arg(
                    Arg::new("ignore-error")
                        .long("ignore-error")
                        .short('c')
                        .action(ArgAction::SetTrue)
                        .help("Continue with the next file when one fails"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change the configuration")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the configuration as JSON"))
                .subcommand(
                    Command::new("set")
                        .about("Set a configuration key")
                        .arg(Arg::new("key").required(true).value_parser(testgen_core::config::CONFIG_KEYS.to_vec()))
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(
                    Command::new("prompt")
                        .about("Use the content of a file as the custom prompt")
                        .arg(Arg::new("file").required(true).value_parser(value_parser!(PathBuf))),
                ),
        )
}

fn generate(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("path")
        .context("--path is required")?;
    if !path.exists() {
        bail!("path does not exist: {}", path.display());
    }

    let mode = args.get_one::<Mode>("mode").copied().unwrap_or_default();
    let granularity = args.get_one::<Granularity>("granularity").copied().unwrap_or_default();
    let policy = GenerationPolicy::new(mode, granularity);

    let config = Config::load().context("failed to load configuration")?;

    let mut options = PipelineOptions::new()
        .with_policy(policy)
        .with_continue_on_error(args.get_flag("ignore-error"))
        .with_custom_prompt(config.prompt.clone());
    if let Some(filter) = args.get_one::<String>("filter") {
        options = options.with_filter(filter)?;
    }

    tracing::info!("path: {}", path.display());
    tracing::info!("policy: {}", policy);

    let generator = HttpGenerator::from_config(&config).context("failed to create generator")?;
    let locator = SymbolLocator::with_resolver(PackageResolver::new(config.go_env()));

    let mut pipeline = Pipeline::new(locator, Box::new(generator)).with_options(options);
    pipeline = if config.formatter.trim().is_empty() {
        pipeline.with_formatter(Box::new(NoFormat))
    } else {
        pipeline.with_formatter(Box::new(GoImports::new(config.formatter.trim())))
    };

    let summary = pipeline.process_path(path)?;
    tracing::info!(
        "done: {} written, {} unchanged, {} skipped, {} without targets, {} tests generated",
        summary.written,
        summary.unchanged,
        summary.skipped,
        summary.no_targets,
        summary.generated
    );

    if !summary.failed.is_empty() {
        for (file, err) in &summary.failed {
            tracing::error!("{}: {}", file.display(), err);
        }
        bail!("{} of {} files failed", summary.failed.len(), summary.files());
    }
    Ok(())
}

fn config(args: &ArgMatches) -> Result<()> {
    let mut config = Config::load().context("failed to load configuration")?;

    match args.subcommand() {
        Some(("show", _)) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").context("missing key")?;
            let value = sub.get_one::<String>("value").context("missing value")?;
            config.set(key, value)?;
            config.save()?;
            println!("Config updated: {key} set to {value}");
        }
        Some(("prompt", sub)) => {
            let file = sub.get_one::<PathBuf>("file").context("missing file")?;
            let prompt = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            config.set("prompt", &prompt)?;
            config.save()?;
            println!("Config updated: prompt loaded from {}", file.display());
        }
        _ => unreachable!("subcommand required"),
    }
    Ok(())
}

fn main() -> Result<()> {
    logging::init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("generate", args)) => generate(args),
        Some(("config", args)) => config(args),
        _ => unreachable!("subcommand required"),
    }
}
