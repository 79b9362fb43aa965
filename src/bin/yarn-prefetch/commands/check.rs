//! `yarn-prefetch check` command

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::CheckArgs;
use yarn_prefetch::ops::check_request;
use yarn_prefetch::{GlobalContext, Request};

pub fn execute(args: CheckArgs, config: Option<&Path>) -> Result<()> {
    let ctx = GlobalContext::with_config_file(config).context("failed to load configuration")?;
    let source = ctx.resolve_path(&args.source);

    // Nothing is written; the output directory only has to be well-formed.
    let request = Request::new(&source, source.join("output"), args.packages);

    for project in check_request(&request)? {
        println!("ok: {}", project.source_dir());
    }

    Ok(())
}
