use std::fs;
use std::path::PathBuf;

use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use colored::Colorize;
use fedprep_core::Submission;
use fedprep_core::serialize::peek;
use serde::Serialize;

use super::Context;
use crate::output::print_json;

#[derive(Args)]
pub struct InspectArgs {
    /// Submission JSON produced by `fedprep encrypt`
    pub file: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    file: String,
    backend: String,
    row_count: usize,
    column_count: usize,
    headers: Vec<String>,
    ciphertext_bytes: usize,
    evaluation_key_bytes: usize,
}

pub fn run(args: InspectArgs, ctx: &Context) -> Result<()> {
    let contents = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let submission: Submission =
        serde_json::from_str(&contents).context("Not a submission file")?;

    let table = submission.to_table().context("Malformed submission")?;
    let eval = submission
        .evaluation_key_bytes()
        .context("Malformed evaluation key")?;
    let (_, eval_backend) = peek(&eval).context("Malformed evaluation key")?;
    if eval_backend != submission.backend {
        anyhow::bail!(
            "Evaluation key was produced by the {eval_backend} backend, submission claims {}",
            submission.backend
        );
    }

    let output = Output {
        file: args.file.display().to_string(),
        backend: submission.backend.to_string(),
        row_count: table.row_count(),
        column_count: table.column_count(),
        headers: table.headers().to_vec(),
        ciphertext_bytes: table.cells().iter().flatten().map(Vec::len).sum(),
        evaluation_key_bytes: eval.len(),
    };

    if ctx.json_output {
        return print_json(&output);
    }

    println!("{}", output.file.bold());
    println!("  {}: {}", "backend".dimmed(), output.backend);
    println!(
        "  {}: {} rows × {} columns",
        "shape".dimmed(),
        output.row_count,
        output.column_count
    );
    println!("  {}: {}", "headers".dimmed(), output.headers.join(", "));
    println!(
        "  {}: {} bytes",
        "ciphertexts".dimmed(),
        output.ciphertext_bytes
    );
    println!(
        "  {}: {} bytes",
        "evaluation key".dimmed(),
        output.evaluation_key_bytes
    );
    if ctx.verbose {
        let cells = output.row_count * output.column_count;
        println!(
            "  {}: {} bytes",
            "per cell".dimmed(),
            output.ciphertext_bytes / cells.max(1)
        );
    }

    Ok(())
}
