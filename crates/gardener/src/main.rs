//! `gardener` binary
//!
//! Parses the CLI, assembles the [`Runtime`], dispatches one command, and
//! maps the error taxonomy onto exit codes.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use std::process::ExitCode;

use clap::Parser;
use gardener_domain::entities::{CapabilitySet, Project, TIER_CAPABILITIES};
use gardener_domain::error::{Error, Result};
use gardener_infrastructure::{AnalysisMode, ConfigLoader, Runtime, logging};

use cli::{Cli, Command, ProjectCommand};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let settings = match loader.load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_code_for(&e);
        }
    };
    if let Err(e) = logging::init(&settings) {
        eprintln!("error: {e}");
        return exit_code_for(&e);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build();
    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start the async runtime: {e}");
            return ExitCode::from(2);
        }
    };

    match runtime.block_on(run(cli, settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &Error) -> ExitCode {
    // The taxonomy collapses to two failure codes: 1 caller, 2 runtime.
    ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(2))
}

async fn run(cli: Cli, settings: gardener_infrastructure::Settings) -> Result<()> {
    let runtime = Runtime::bootstrap(settings).await?;
    for warning in runtime.registry.load_warnings() {
        eprintln!("warning: {warning}");
    }

    match cli.command {
        Command::Analyze { advanced, dir } => {
            let mode = if advanced {
                AnalysisMode::Advanced
            } else {
                AnalysisMode::Auto
            };
            let report = runtime.controller.analyze(&dir, mode).await?;
            print_report(&report);
        }
        Command::Chat { project, question } => {
            let project_id = match project {
                Some(id) => id,
                None => active_project(&runtime)?.id,
            };
            let answer = runtime.controller.chat(&project_id, &question).await?;
            println!("{answer}");
        }
        Command::Export { file } => {
            let markdown = runtime.controller.export_markdown()?;
            match file {
                Some(path) => {
                    std::fs::write(&path, markdown)?;
                    println!("exported to {}", path.display());
                }
                None => println!("{markdown}"),
            }
        }
        Command::Status => print_status(&runtime).await,
        Command::Features => {
            let features = runtime.controller.features().await;
            print_features(&features);
        }
        Command::Projects => {
            let projects = runtime.registry.list();
            if projects.is_empty() {
                println!("no projects registered; run `gardener analyze <dir>`");
            }
            for project in projects {
                print_project_line(&runtime, &project);
            }
        }
        Command::Project { command } => run_project_command(&runtime, command).await?,
    }

    runtime.shutdown()?;
    Ok(())
}

async fn run_project_command(runtime: &Runtime, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Create { name, path } => {
            let canonical = std::fs::canonicalize(&path)
                .map_err(|_| Error::user(format!("'{}' does not exist", path.display())))?;
            let project = runtime.registry.register(&name, &canonical)?;
            println!("created project {} ({})", project.name, project.id);
        }
        ProjectCommand::Info { id } => {
            let project = match id {
                Some(id) => runtime.registry.get(&id)?,
                None => active_project(runtime)?,
            };
            print_project_info(&project);
        }
        ProjectCommand::Switch { id } => {
            let project = runtime.controller.switch(&id).await?;
            println!("switched to {} ({})", project.name, project.id);
        }
        ProjectCommand::Cleanup { id } => {
            let project = runtime.registry.get(&id)?;
            runtime.registry.remove(&id)?;
            println!("removed project {} ({})", project.name, id);
        }
        ProjectCommand::Health => {
            let findings = runtime.registry.validate();
            if findings.is_empty() {
                println!("registry: ok ({} projects)", runtime.registry.list().len());
            } else {
                for finding in &findings {
                    println!("registry: {finding}");
                }
            }
            let features = runtime.controller.features().await;
            print_features(&features);
            if !findings.is_empty() {
                return Err(Error::user("registry has consistency findings"));
            }
        }
    }
    Ok(())
}

fn active_project(runtime: &Runtime) -> Result<Project> {
    runtime
        .registry
        .get_active()
        .ok_or_else(|| Error::user("no active project; run `gardener analyze <dir>` first"))
}

fn print_report(report: &gardener_domain::entities::AnalysisReport) {
    println!("analysis of project {}", report.project_id);
    println!("  tier:      {}", report.tier);
    println!("  files:     {}", report.file_count);
    println!(
        "  chunks:    {} ({} embedded)",
        report.chunk_count, report.embedded_count
    );
    println!("  training:  {}", if report.training_scheduled { "scheduled" } else { "not scheduled" });
    if !report.language_histogram.is_empty() {
        let summary: Vec<String> = report
            .language_histogram
            .iter()
            .map(|(language, count)| format!("{language}={count}"))
            .collect();
        println!("  languages: {}", summary.join(", "));
    }
    for warning in &report.warnings {
        println!("  warning:   {warning}");
    }
    for failure in &report.failures {
        println!("  skipped:   {} ({})", failure.path, failure.message);
    }
}

async fn print_status(runtime: &Runtime) {
    println!("data root: {}", runtime.paths.root().display());
    match runtime.registry.get_active() {
        Some(project) => {
            println!("active project:");
            print_project_info(&project);
        }
        None => println!("active project: none"),
    }
    println!("projects: {}", runtime.registry.list().len());
    if let Some(loaded) = runtime.loader.active().await {
        println!("loaded adapter: {loaded}");
    }
    let features = runtime.controller.features().await;
    let available = features
        .features
        .iter()
        .filter(|(name, on)| **on && TIER_CAPABILITIES.contains(&name.as_str()))
        .count();
    println!("capabilities: {available}/{} available", TIER_CAPABILITIES.len());
}

fn print_features(features: &CapabilitySet) {
    println!("capabilities:");
    for (name, available) in &features.features {
        if *available {
            println!("  {name}: available");
        } else {
            let reason = features
                .reasons
                .get(name)
                .map_or_else(String::new, |r| format!(" ({r})"));
            println!("  {name}: unavailable{reason}");
        }
    }
}

fn print_project_line(runtime: &Runtime, project: &Project) {
    let active = runtime
        .registry
        .get_active()
        .is_some_and(|p| p.id == project.id);
    let marker = if active { "*" } else { " " };
    println!(
        "{marker} {}  {}  [{}]  {}",
        project.id,
        project.name,
        project.training_status,
        project.source_path.display()
    );
}

fn print_project_info(project: &Project) {
    println!("  id:              {}", project.id);
    println!("  name:            {}", project.name);
    println!("  source:          {}", project.source_path.display());
    println!("  created:         {}", project.created_at.to_rfc3339());
    println!("  last updated:    {}", project.last_updated.to_rfc3339());
    println!("  training status: {}", project.training_status);
    if let Some(path) = &project.adapter_path {
        println!("  adapter:         {}", path.display());
    }
    if let Some(path) = &project.vector_store_path {
        println!("  vector store:    {}", path.display());
    }
}
