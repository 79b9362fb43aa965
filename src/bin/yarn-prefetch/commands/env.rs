//! `yarn-prefetch env` command

use anyhow::Result;

use crate::cli::{EnvArgs, EnvFormat};
use yarn_prefetch::ops::{build_environment, substitute_output_dir};

pub fn execute(args: EnvArgs) -> Result<()> {
    let mut vars = build_environment();
    if let Some(ref output_dir) = args.output_dir {
        vars = substitute_output_dir(&vars, output_dir);
    }

    match args.format {
        EnvFormat::Env => {
            for var in &vars {
                println!("export {}={}", var.name, shell_quote(&var.value));
            }
        }
        EnvFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&vars)?);
        }
    }

    Ok(())
}

/// Single-quote a value unless it is plainly safe.
fn shell_quote(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/._-:".contains(c));
    if plain && !value.is_empty() {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
