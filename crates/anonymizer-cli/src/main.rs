mod logging;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{info, warn};

use anonymizer_core::{Dataset, Error as CoreError};
use anonymizer_policy::{AnonymizerConfig, PolicyError, ReplacerRegistry};
use logging::init_logging;
use report::{RunSummary, write_report};

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "anonymizer", version, about = "Replace record attributes with fake values")]
struct Cli {
    /// Append JSON logs to this file instead of logging to stderr.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Anonymize a dataset with the policies of a config file.
    Run(RunArgs),
    /// Check a config file against a dataset without altering it.
    Validate(ValidateArgs),
    /// List the named replacers.
    Strategies,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML policy file.
    #[arg(long)]
    config: PathBuf,
    /// JSON dataset to anonymize.
    #[arg(long)]
    data: PathBuf,
    /// Output dataset path. Defaults to rewriting `--data` in place.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Seed overriding the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// TOML policy file.
    #[arg(long)]
    config: PathBuf,
    /// JSON dataset the policies apply to.
    #[arg(long)]
    data: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Command::Run(args) => run_anonymize(args),
        Command::Validate(args) => run_validate(args),
        Command::Strategies => {
            list_strategies();
            Ok(())
        }
    }
}

fn run_anonymize(args: RunArgs) -> Result<(), CliError> {
    let RunArgs {
        config: config_path,
        data,
        out,
        seed,
        report,
    } = args;

    let config = AnonymizerConfig::from_path(&config_path)?;
    let mut store = Dataset::from_path(&data)?.into_store()?;
    let mut faker = config.faker(seed)?;
    let registry = ReplacerRegistry::with_defaults();
    let mut policies = config.policy_set();
    if policies.is_empty() {
        warn!(event = "no_policies", config = %config_path.display());
    }

    let run = policies.run(&mut store, &mut faker, &registry)?;

    // The dataset is only written once every policy succeeded.
    let out = out.unwrap_or_else(|| data.clone());
    Dataset::from_store(&store)?.write_to(&out)?;
    info!(event = "dataset_written", path = %out.display());

    if let Some(path) = report {
        let summary = RunSummary {
            config: config_path,
            data,
            out: out.clone(),
            report: &run,
        };
        write_report(&path, &summary)?;
        info!(event = "report_written", path = %path.display());
    }

    println!(
        "run {}: {} records processed, {} saved, seed {} -> {}",
        run.run_id,
        run.processed(),
        run.saved(),
        run.seed,
        out.display()
    );
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let config = AnonymizerConfig::from_path(&args.config)?;
    config.locale_key()?;
    let store = Dataset::from_path(&args.data)?.into_store()?;
    let registry = ReplacerRegistry::with_defaults();
    let mut policies = config.policy_set();

    policies.validate(&store, &registry)?;
    info!(event = "config_validated", policies = policies.len());
    println!("{} policies valid", policies.len());
    Ok(())
}

fn list_strategies() {
    let registry = ReplacerRegistry::with_defaults();
    for strategy in registry.strategies() {
        println!(
            "{:<24} option: {:<8} {}",
            strategy.id(),
            strategy.param().as_str(),
            strategy.summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use serde_json::json;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("anonymizer-cli-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    fn write_fixture(dir: &Path) -> (PathBuf, PathBuf) {
        let config = dir.join("policy.toml");
        fs::write(
            &config,
            r#"
seed = 3

[[policy]]
record_type = "person"
attributes = [
  { name = "id", replacer = "SKIP" },
  { name = "name", replacer = "simple_pattern", option = "???" },
]
"#,
        )
        .expect("config");

        let data = dir.join("data.json");
        let dataset = json!({
            "record_types": [{
                "name": "person",
                "fields": [
                    { "name": "id", "kind": "integer" },
                    { "name": "name", "kind": "text", "max_length": 8, "unique": true }
                ],
                "records": [
                    { "id": 1, "name": "alice" },
                    { "id": 2, "name": "bruno" }
                ]
            }]
        });
        fs::write(&data, dataset.to_string()).expect("data");
        (config, data)
    }

    #[test]
    fn parses_run_with_global_log_file() {
        let cli = Cli::try_parse_from([
            "anonymizer",
            "run",
            "--config",
            "policy.toml",
            "--data",
            "data.json",
            "--seed",
            "9",
            "--log-file",
            "run.ndjson",
        ])
        .expect("args");

        assert_eq!(cli.log_file, Some(PathBuf::from("run.ndjson")));
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.seed, Some(9));
                assert!(args.out.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn validate_requires_data() {
        assert!(Cli::try_parse_from(["anonymizer", "validate", "--config", "p.toml"]).is_err());
    }

    #[test]
    fn run_writes_anonymized_dataset_and_report() {
        let dir = scratch("run");
        let (config, data) = write_fixture(&dir);
        let out = dir.join("out.json");
        let report = dir.join("reports/run.json");

        run_anonymize(RunArgs {
            config,
            data: data.clone(),
            out: Some(out.clone()),
            seed: None,
            report: Some(report.clone()),
        })
        .expect("run");

        let anonymized = Dataset::from_path(&out).expect("out dataset");
        let names: Vec<String> = anonymized.record_types[0]
            .records
            .iter()
            .filter_map(|record| record.get("name").and_then(|name| name.as_str()))
            .map(str::to_string)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|name| name.chars().count() == 3));
        assert_ne!(names[0], names[1]);

        let original = Dataset::from_path(&data).expect("input dataset");
        assert_eq!(original.record_types[0].records[0]["name"], json!("alice"));

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
        assert_eq!(summary["seed"], json!(3));
        assert_eq!(summary["policies"][0]["saved"], json!(2));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn validate_reports_missing_fields() {
        let dir = scratch("validate");
        let (config, data) = write_fixture(&dir);
        fs::write(
            &config,
            "[[policy]]\nrecord_type = \"person\"\nattributes = [{ name = \"id\", replacer = \"SKIP\" }]\n",
        )
        .expect("config");

        let err = run_validate(ValidateArgs { config, data }).expect_err("mismatch");
        assert!(err.to_string().contains("missing: name"), "{err}");

        fs::remove_dir_all(&dir).ok();
    }
}
