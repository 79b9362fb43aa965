//! `yarn-prefetch fetch` command

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::FetchArgs;
use yarn_prefetch::util::fs::ensure_dir;
use yarn_prefetch::util::process::{find_executable, find_yarn, SystemRunner};
use yarn_prefetch::util::TracingSink;
use yarn_prefetch::{fetch_yarn_source, GlobalContext, LockfileResolver, PrefetchContext, Request};

pub fn execute(args: FetchArgs, config: Option<&Path>) -> Result<()> {
    let mut ctx =
        GlobalContext::with_config_file(config).context("failed to load configuration")?;
    if let Some(yarn) = args.yarn {
        ctx.config_mut().yarn.program = Some(yarn);
    }

    let source = ctx.resolve_path(&args.source);
    let output = ctx.resolve_path(&args.output);
    let request = Request::new(source, output, args.packages);

    let yarn = yarn_program(&ctx);
    tracing::debug!("using yarn at {}", yarn.display());

    let runner = SystemRunner;
    let resolver = LockfileResolver;
    let events = TracingSink;
    let prefetch =
        PrefetchContext::new(&runner, &resolver, &events, ctx.config()).with_yarn_program(yarn);

    let result = fetch_yarn_source(&request, &prefetch)?;
    let json = result
        .to_json_pretty()
        .context("failed to serialize the fetch result")?;

    match args.output_file {
        Some(path) => {
            let path = ctx.resolve_path(&path);
            if let Some(parent) = path.parent() {
                ensure_dir(parent)?;
            }
            fs::write(&path, format!("{}\n", json))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Wrote {} components to {}", result.components.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// A configured program with a directory part is used as given; bare names
/// and the default are looked up in PATH.
fn yarn_program(ctx: &GlobalContext) -> PathBuf {
    let config = ctx.config();

    match config.yarn.program.clone() {
        Some(program) if program.components().count() > 1 => ctx.resolve_path(&program),
        Some(program) => find_executable(&program.to_string_lossy()).unwrap_or(program),
        None => find_yarn().unwrap_or_else(|| config.yarn_program()),
    }
}
