use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fedprep_core::TabularInput;
use serde::Serialize;

use super::Context;
use crate::input::read_csv;
use crate::output::{print_error, print_json, print_success};

#[derive(Args)]
pub struct ValidateArgs {
    /// CSV file with a header row
    pub file: PathBuf,
}

#[derive(Serialize)]
struct Output {
    file: String,
    valid: bool,
    rows: usize,
    columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    let input = read_csv(&args.file)?;
    let output = check(args.file.display().to_string(), &input);

    if ctx.json_output {
        print_json(&output)?;
    } else if let Some(e) = &output.error {
        print_error(format!("{}: {e}", output.file));
    } else {
        print_success(format!(
            "{}: {} rows × {} columns, all values in 0..={}",
            output.file,
            output.rows,
            output.columns,
            fedprep_core::MESSAGE_DOMAIN_MAX
        ));
    }

    if !output.valid {
        std::process::exit(1);
    }
    Ok(())
}

/// Run the structural validator; on failure, encode once more to say why
fn check(file: String, input: &TabularInput) -> Output {
    let valid = fedprep_core::validate(input);
    let error = if valid {
        None
    } else {
        fedprep_core::encode(input).err().map(|e| e.to_string())
    };

    Output {
        file,
        valid,
        rows: input.rows().len(),
        columns: input.rows().first().map_or(0, |r| r.len()),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn check_csv(contents: &str) -> Output {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        check("t.csv".into(), &read_csv(file.path()).unwrap())
    }

    #[test]
    fn valid_table_has_no_error() {
        let output = check_csv("x,y\n3,7\n5 kg,0\n");
        assert!(output.valid);
        assert_eq!((output.rows, output.columns), (2, 2));
        assert!(output.error.is_none());
    }

    #[test]
    fn invalid_table_explains_position() {
        let output = check_csv("x,y\n3,7\n1,9\n");
        assert!(!output.valid);

        let error = output.error.unwrap();
        assert!(error.contains("row 1, column 1 ('y')"), "{error}");
        assert!(!error.contains('9'));
    }

    #[test]
    fn header_only_table_is_invalid() {
        let output = check_csv("x,y\n");
        assert!(!output.valid);
        assert!(output.error.is_some());
    }
}
