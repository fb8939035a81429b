//! Score a labeled survey CSV with a trained artifact bundle.

use std::path::PathBuf;

use depscreen::config;
use depscreen::data::load_csv;
use depscreen::logging;
use depscreen::predict::Predictor;
use depscreen::training::evaluate_dataset;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    model_path: PathBuf,
    dataset: PathBuf,
    threshold: f32,
}

fn run() -> Result<(), String> {
    if let Err(err) = logging::init_stderr() {
        eprintln!("Logging disabled: {err}");
    }
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    let options = parse_args(
        std::env::args().skip(1).collect(),
        CliOptions {
            model_path: settings.paths.artifact.clone(),
            dataset: settings.paths.dataset.clone(),
            threshold: settings.serving.risk_threshold,
        },
    )?;

    let predictor =
        Predictor::load(&options.model_path, options.threshold).map_err(|err| err.to_string())?;
    let dataset = load_csv(&options.dataset).map_err(|err| err.to_string())?;
    let rows = dataset.len();
    let evaluation = evaluate_dataset(&predictor, dataset);

    let cm = &evaluation.confusion;
    let summary = cm.summary();
    println!(
        "rows: {rows}  scored: {}  rejected: {}  imputed cells: {}",
        summary.rows, evaluation.rejected, evaluation.imputed_cells
    );
    println!("accuracy: {:.4}", summary.accuracy);
    println!(
        "precision={:.4}  recall={:.4}  f1={:.4}",
        summary.precision, summary.recall, summary.f1
    );
    println!("confusion matrix (rows=true, cols=pred):");
    println!("{:>8}{:>8}", cm.true_negative, cm.false_positive);
    println!("{:>8}{:>8}", cm.false_negative, cm.true_positive);
    if let Some((row, err)) = &evaluation.first_rejection {
        println!();
        println!("first rejected row ({row}): {err}");
    }
    Ok(())
}

fn parse_args(args: Vec<String>, mut options: CliOptions) -> Result<CliOptions, String> {
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                options.model_path = PathBuf::from(value);
            }
            "--dataset" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                options.dataset = PathBuf::from(value);
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "depscreen-eval",
        "",
        "Usage:",
        "  depscreen-eval [--model <model.json>] [--dataset <csv>]",
        "",
        "Rows with categories the model never saw are counted as rejected.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> CliOptions {
        CliOptions {
            model_path: PathBuf::from("depression_model.json"),
            dataset: PathBuf::from("data.csv"),
            threshold: 0.5,
        }
    }

    #[test]
    fn flags_override_paths() {
        let args = ["--model", "m.json", "--dataset", "x.csv"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        let options = parse_args(args, defaults()).unwrap();
        assert_eq!(options.model_path, PathBuf::from("m.json"));
        assert_eq!(options.dataset, PathBuf::from("x.csv"));
        assert_eq!(options.threshold, 0.5);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(parse_args(vec!["--split".to_string()], defaults()).is_err());
    }
}
