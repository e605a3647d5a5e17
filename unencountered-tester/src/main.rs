mod common;
mod logic;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::scenario::{TestScenario, get_scenario, list_scenarios, script};
use common::{FileConfigLoader, split_csv};
use logic::{LogicTester, ScenarioResult};
use unencountered_engine::GameEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "unencountered-tester", version)]
#[command(about = "Scripted scenario runner for the Unencountered engine")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Extra scenarios loaded from a JSON script
    #[arg(long)]
    script: Option<PathBuf>,

    /// Number of iterations per scenario
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Engine config JSON (defaults to the built-in bindings)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();
    let start_time = Instant::now();

    let config = GameEngine::new(FileConfigLoader::new(args.config.clone()))
        .load_config()
        .context("loading engine config")?;
    let scenarios = collect_scenarios(&args)?;
    let tester = LogicTester::new(config, args.verbose);
    let results: Vec<ScenarioResult> = scenarios
        .iter()
        .map(|scenario| tester.run_scenario(scenario, args.iterations))
        .collect();

    write_report(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 Unencountered Scenario Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for (name, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == name) {
                scenarios.push(name.to_string());
            }
        }
    }
    scenarios
}

fn collect_scenarios(args: &Args) -> Result<Vec<TestScenario>> {
    let mut scenarios = Vec::new();
    for name in expand_scenarios(&args.scenarios) {
        if let Some(scenario) = get_scenario(&name) {
            scenarios.push(scenario);
        } else {
            eprintln!("⚠️  Unknown scenario: {}", name.yellow());
        }
    }
    if let Some(path) = &args.script {
        scenarios.extend(script::load(path)?);
    }
    if scenarios.is_empty() {
        bail!("no scenarios to run");
    }
    Ok(scenarios)
}

fn write_report(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(&mut output_target, results)?,
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, results)?;
        }
        ReportFormat::Console => {
            logic::reports::generate_console_report(
                &mut output_target,
                results,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            script: None,
            iterations: 1,
            report: ReportFormat::Json,
            config: None,
            verbose: false,
            output: None,
        }
    }

    #[test]
    fn all_expands_to_every_catalog_entry_once() {
        let expanded = expand_scenarios("smoke,all");
        assert_eq!(expanded[0], "smoke");
        assert_eq!(expanded.len(), list_scenarios().len());
    }

    #[test]
    fn unknown_scenarios_alone_are_an_error() {
        let args = Args {
            scenarios: "speedrun".to_string(),
            ..base_args()
        };
        assert!(collect_scenarios(&args).is_err());
    }

    #[test]
    fn args_parse_report_formats() {
        let args = Args::try_parse_from([
            "unencountered-tester",
            "--report",
            "markdown",
            "--scenarios",
            "all",
        ])
        .unwrap();
        assert_eq!(args.report, ReportFormat::Markdown);
        assert!(Args::try_parse_from(["unencountered-tester", "--report", "csv"]).is_err());
    }
}
