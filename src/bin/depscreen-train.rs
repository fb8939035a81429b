//! Train the risk model from the labeled survey CSV and write the artifact bundle.

use std::path::PathBuf;

use depscreen::config;
use depscreen::logging;
use depscreen::training::{TrainingOptions, train_and_save};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    if let Err(err) = logging::init_stderr() {
        eprintln!("Logging disabled: {err}");
    }
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    let options = parse_args(std::env::args().skip(1).collect(), CliOptions::from(&settings))?;

    println!("Loading data...");
    println!(
        "Preprocessing data and training random forest ({} trees)...",
        options.training.forest.n_trees
    );
    let outcome = train_and_save(&options.dataset, &options.out, &options.training)
        .map_err(|err| err.to_string())?;

    let evaluation = &outcome.bundle.evaluation;
    println!("Model Accuracy: {:.4}", evaluation.accuracy);
    println!(
        "precision={:.4}  recall={:.4}  f1={:.4}  (held out: {} rows, trained on: {} rows)",
        evaluation.precision,
        evaluation.recall,
        evaluation.f1,
        evaluation.rows,
        outcome.train_rows
    );
    println!("Model and artifacts saved to {}", options.out.display());
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    dataset: PathBuf,
    out: PathBuf,
    training: TrainingOptions,
}

impl From<&config::AppSettings> for CliOptions {
    fn from(settings: &config::AppSettings) -> Self {
        Self {
            dataset: settings.paths.dataset.clone(),
            out: settings.paths.artifact.clone(),
            training: TrainingOptions::from(settings),
        }
    }
}

fn parse_args(args: Vec<String>, mut options: CliOptions) -> Result<CliOptions, String> {
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--dataset" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                options.dataset = PathBuf::from(value);
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                options.out = PathBuf::from(value);
            }
            "--trees" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--trees requires a value".to_string())?;
                let trees = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --trees value: {value}"))?;
                if trees == 0 {
                    return Err("--trees must be at least 1".to_string());
                }
                options.training.forest.n_trees = trees;
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                options.training.forest.seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid --seed value: {value}"))?;
            }
            "--test-fraction" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--test-fraction requires a value".to_string())?;
                let fraction = value
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid --test-fraction value: {value}"))?;
                if !(fraction > 0.0 && fraction < 1.0) {
                    return Err(format!("--test-fraction must be in (0, 1), got {value}"));
                }
                options.training.test_fraction = fraction;
            }
            "--max-depth" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--max-depth requires a value".to_string())?;
                let depth = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --max-depth value: {value}"))?;
                options.training.forest.max_depth = (depth > 0).then_some(depth);
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "depscreen-train",
        "",
        "Usage:",
        "  depscreen-train [options]",
        "",
        "Options:",
        "  --dataset <csv>          Labeled survey CSV (default from config).",
        "  --out <json>             Artifact bundle to write (default from config).",
        "  --trees <n>              Number of trees (default: 100).",
        "  --seed <n>               Split and forest seed (default: 42).",
        "  --test-fraction <f>      Held-out share in (0, 1) (default: 0.2).",
        "  --max-depth <n>          Tree depth limit, 0 for unlimited (default: unlimited).",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> CliOptions {
        CliOptions::from(&config::AppSettings::default())
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn no_arguments_keep_configured_defaults() {
        let options = parse_args(Vec::new(), defaults()).unwrap();
        assert_eq!(options.dataset, PathBuf::from("Student Depression Dataset.csv"));
        assert_eq!(options.out, PathBuf::from("depression_model.json"));
        assert_eq!(options.training.forest.n_trees, 100);
    }

    #[test]
    fn flags_override_settings() {
        let options = parse_args(
            args(&[
                "--dataset", "d.csv", "--out", "m.json", "--trees", "12", "--seed", "7",
                "--test-fraction", "0.3", "--max-depth", "6",
            ]),
            defaults(),
        )
        .unwrap();
        assert_eq!(options.dataset, PathBuf::from("d.csv"));
        assert_eq!(options.out, PathBuf::from("m.json"));
        assert_eq!(options.training.forest.n_trees, 12);
        assert_eq!(options.training.forest.seed, 7);
        assert_eq!(options.training.test_fraction, 0.3);
        assert_eq!(options.training.forest.max_depth, Some(6));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(parse_args(args(&["--trees", "0"]), defaults()).is_err());
        assert!(parse_args(args(&["--test-fraction", "1.5"]), defaults()).is_err());
        assert!(parse_args(args(&["--seed"]), defaults()).is_err());
        assert!(parse_args(args(&["--bogus"]), defaults()).is_err());
    }
}
