use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use fedprep_core::backend::backends::{MockBackend, TfheBackend};
use fedprep_core::{BackendId, FheBackend, Pipeline, Submission};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;

use super::{Context, with_thread_pool};
use crate::input::read_csv;
use crate::output::{print_info, print_json, print_success};

#[derive(Args)]
pub struct EncryptArgs {
    /// CSV file with a header row
    pub file: PathBuf,
    /// Output file (default: <file>.enc.json)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Decrypt the result and compare it with the input before writing
    #[arg(long)]
    pub self_test: bool,
}

pub fn run(args: EncryptArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let backend_id = ctx.resolve_backend_id(&config)?;
    let threads = ctx.threads(&config);
    let self_test = args.self_test || config.self_test;

    let input = read_csv(&args.file)?;
    let matrix = fedprep_core::encode(&input)
        .with_context(|| format!("{} cannot be encrypted", args.file.display()))?;
    debug!(
        rows = matrix.row_count(),
        columns = matrix.column_count(),
        "Input validated"
    );

    let spinner = if !ctx.json_output {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {msg}")?,
        );
        pb.set_message(format!(
            "Encrypting {} cells with {backend_id}",
            matrix.row_count() * matrix.column_count()
        ));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = with_thread_pool(threads, || match backend_id {
        BackendId::Tfhe => prepare(TfheBackend::new(), &matrix, self_test),
        BackendId::Mock => prepare(MockBackend::new(), &matrix, self_test),
    })?;

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    let submission = result?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.file, config.output_dir.as_deref()));
    let json = serde_json::to_string_pretty(&submission)?;
    fs::write(&output_path, json)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if ctx.json_output {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output {
            input: String,
            output: String,
            backend: BackendId,
            row_count: usize,
            column_count: usize,
            self_test: bool,
        }
        print_json(&Output {
            input: args.file.display().to_string(),
            output: output_path.display().to_string(),
            backend: submission.backend,
            row_count: submission.row_count,
            column_count: submission.column_count,
            self_test,
        })?;
    } else {
        print_success(format!(
            "Encrypted {} → {} ({} rows × {} columns)",
            args.file.display(),
            output_path.display(),
            submission.row_count,
            submission.column_count
        ));
        if self_test {
            print_info("Self-test passed: every cell decrypts to its input value");
        }
    }

    Ok(())
}

fn prepare<B: FheBackend>(
    backend: B,
    matrix: &fedprep_core::EncodedMatrix,
    self_test: bool,
) -> Result<Submission> {
    let pipeline = Pipeline::new(backend);
    let submission = pipeline
        .prepare_matrix(matrix)
        .context("Encryption failed")?;

    if self_test {
        pipeline
            .self_test(&submission, matrix)
            .context("Self-test failed")?;
    }
    Ok(submission)
}

/// `<dir>/<name>.enc.json`, next to the input unless an output dir is set
fn default_output(input: &Path, output_dir: Option<&str>) -> PathBuf {
    let mut name = input.file_name().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".enc.json");

    match output_dir {
        Some(dir) => Path::new(dir).join(name),
        None => input.with_file_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output(Path::new("data/table.csv"), None),
            PathBuf::from("data/table.csv.enc.json")
        );
        assert_eq!(
            default_output(Path::new("data/table.csv"), Some("/out")),
            PathBuf::from("/out/table.csv.enc.json")
        );
    }

    #[test]
    fn prepare_with_self_test() {
        let matrix =
            fedprep_core::EncodedMatrix::new(vec!["x".into()], vec![vec![5], vec![0]]).unwrap();
        let submission = prepare(MockBackend::new(), &matrix, true).unwrap();

        assert_eq!(submission.backend, BackendId::Mock);
        assert_eq!(submission.row_count, 2);
    }
}
