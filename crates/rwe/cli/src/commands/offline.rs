//! Offline stages on an existing run directory

use super::Context;
use crate::error::CliResult;
use crate::output::{print_field, print_success};
use rwe_engine::PostPass;

fn post_pass(ctx: &Context) -> PostPass {
    let pass = PostPass::new(ctx.layout.clone()).with_stopwords(ctx.config.stopwords.clone());
    match &ctx.config_path {
        Some(path) => pass.with_config_path(path.clone()),
        None => pass,
    }
}

/// Execute `rwe cluster`
pub fn cluster(ctx: &Context) -> CliResult<()> {
    let report = post_pass(ctx).cluster()?;
    print_success(&format!("{} iterations in {} clusters", report.items.len(), report.k));
    print_field("Method", &report.method);
    print_field("Clusters JSON", ctx.layout.clusters().display());
    Ok(())
}

/// Execute `rwe epochs`
pub fn epochs(ctx: &Context) -> CliResult<()> {
    let epochs = post_pass(ctx).epochs()?;
    print_success(&format!("{} epochs", epochs.len()));
    for e in &epochs {
        println!(
            "  Epoch {:02}: iter {}-{} (n={}) avg novelty {:.3}",
            e.epoch_id, e.iteration_start, e.iteration_end, e.size, e.avg_novelty
        );
    }
    print_field("Epochs JSON", ctx.layout.epochs().display());
    Ok(())
}

/// Execute `rwe atlas`
pub fn atlas(ctx: &Context) -> CliResult<()> {
    let report = post_pass(ctx).run()?;
    print_success(&format!(
        "atlas with {} pages from {} clusters and {} epochs",
        report.atlas.pages,
        report.clusters.k,
        report.epochs.len()
    ));
    print_field("Atlas PDF", report.atlas.pdf.display());
    Ok(())
}
