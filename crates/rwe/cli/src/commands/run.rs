//! The iteration loop command

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{print_field, print_success};
use clap::Args;
use rwe_capability::{Capabilities, HttpModelService};
use rwe_engine::{PostPass, ReflectiveEngine};

/// Arguments for `rwe run`
#[derive(Args)]
pub struct RunArgs {
    /// Iterations to run
    #[arg(short = 'n', long, env = "RWE_ITERS", default_value_t = 10)]
    pub iterations: u64,

    /// Seed for prompt composition and mutation jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use the in-process simulator instead of a model service
    #[arg(long)]
    pub simulate: bool,

    /// Model service endpoint
    #[arg(long, env = "RWE_SERVICE_URL")]
    pub service_url: Option<String>,

    /// Backend tag reported by the model service
    #[arg(long, default_value = "remote")]
    pub backend: String,

    /// The model service cannot do image-to-image
    #[arg(long)]
    pub no_img2img: bool,

    /// Stop after the loop, without clustering or atlas
    #[arg(long)]
    pub skip_post: bool,
}

fn capabilities(args: &RunArgs) -> CliResult<Capabilities> {
    if args.simulate {
        return Ok(Capabilities::simulated());
    }
    let Some(url) = args.service_url.as_deref() else {
        return Err(CliError::InvalidInput(
            "no model service configured; pass --service-url or --simulate".into(),
        ));
    };
    let service = HttpModelService::new(url)?
        .with_backend(args.backend.clone())
        .with_image_to_image(!args.no_img2img);
    Ok(Capabilities::remote(service))
}

/// Execute `rwe run`
pub async fn execute(args: RunArgs, ctx: &Context) -> CliResult<()> {
    let caps = capabilities(&args)?;
    let mut engine = ReflectiveEngine::open(ctx.config.clone(), ctx.layout.clone(), caps)?;
    if let Some(seed) = args.seed {
        engine = engine.with_seed(seed);
    }

    println!("RWE loop starting");
    print_field("Output", ctx.layout.root().display());
    if let Some(path) = &ctx.config_path {
        print_field("Config", path.display());
    }
    print_field("Backend", &engine.world().backend);
    print_field("Resume from", engine.world().iteration);

    let records = engine.run(args.iterations).await?;
    print_success(&format!(
        "{} iterations complete (world at iteration {})",
        records.len(),
        engine.world().iteration
    ));
    if args.skip_post {
        return Ok(());
    }

    println!("Clustering + PDF...");
    let mut pass = PostPass::new(ctx.layout.clone()).with_stopwords(ctx.config.stopwords.clone());
    if let Some(path) = &ctx.config_path {
        pass = pass.with_config_path(path.clone());
    }
    let report = pass.run()?;
    print_field("Clusters", report.clusters.k);
    print_field("Epochs JSON", ctx.layout.epochs().display());
    print_field("Atlas PDF", report.atlas.pdf.display());
    print_success("Done.");
    Ok(())
}
