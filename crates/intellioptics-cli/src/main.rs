// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use intellioptics_app::DashboardState;
use intellioptics_tui::DashboardRuntime;
use log::info;
use runtime::{ApiRuntime, DemoRuntime};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path)
        .and_then(|config| config.resolve())
        .with_context(|| {
            format!(
                "load config {}; run `intellioptics-dashboard --print-example-config` for a v1 template",
                options.config_path.display()
            )
        })?;

    let log_path = match &config.log_file {
        Some(path) => path.clone(),
        None => logging::default_log_path()?,
    };
    logging::init(&config.log_level, &log_path)
        .with_context(|| format!("set up logging at {}; set [log].file to a writable path", log_path.display()))?;
    info!(
        "starting {} against {} (demo: {})",
        env!("CARGO_PKG_VERSION"),
        config.backend_url,
        options.demo
    );

    if options.demo {
        let mut runtime = DemoRuntime::new();
        if options.check_only {
            return check(&mut runtime, "demo data");
        }
        let mut state = DashboardState::with_layout(config.view.layout);
        return intellioptics_tui::run_app(&mut state, &config.view, &mut runtime);
    }

    let mut runtime = ApiRuntime::new(&config)?;
    if options.check_only {
        let source = runtime.client().detectors_url();
        return check(&mut runtime, &source);
    }

    let mut state = DashboardState::with_layout(config.view.layout);
    intellioptics_tui::run_app(&mut state, &config.view, &mut runtime)
}

fn check<R: DashboardRuntime>(runtime: &mut R, source: &str) -> Result<()> {
    let detectors = runtime
        .fetch_detectors()
        .map_err(|error| anyhow!("fetch detectors from {source}: {error}"))?;
    println!("ok: {} detectors from {source}", detectors.len());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("intellioptics-dashboard {}", env!("CARGO_PKG_VERSION"));
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with seeded demo detectors (no network)");
    println!("  --check                  Validate config and fetch the detector list once");
    println!("  --help                   Show this help");
}
