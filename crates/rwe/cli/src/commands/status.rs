//! Run inspection

use super::Context;
use crate::error::CliResult;
use crate::output::{print_field, print_json, print_warning};
use rwe_store::{RunLog, WorldStateStore};

/// Execute `rwe status`
pub fn execute(ctx: &Context, json: bool) -> CliResult<()> {
    let layout = &ctx.layout;
    let Some(world) = WorldStateStore::new(layout.world_state()).load()? else {
        print_warning(&format!("no world state under {}", layout.root().display()));
        return Ok(());
    };
    if json {
        print_json(&world)?;
        return Ok(());
    }
    let records = RunLog::new(layout.run_log()).read_all()?;

    println!("World");
    print_field("Iteration", world.iteration);
    print_field("Backend", &world.backend);
    print_field("Style", &world.prompt_style);
    print_field("cfg / steps", format!("{:.2} / {}", world.cfg, world.steps));
    print_field("Novelty target", format!("{:.2}", world.novelty_target));
    print_field("Interior strikes", world.interior_strikes);
    print_field("Motifs", world.motif_bank.len());

    println!("Run log");
    print_field("Records", records.len());
    if let Some(last) = records.last() {
        print_field("Last rule", &last.rule_change);
        if let Some(n) = last.novelty_prev {
            print_field("Last novelty", format!("{:.3}", n));
        }
    }

    println!("Derived");
    for (name, path) in [
        ("clusters.json", layout.clusters()),
        ("epochs.json", layout.epochs()),
        ("atlas", layout.atlas_pdf()),
    ] {
        print_field(name, if path.is_file() { "present" } else { "missing" });
    }
    Ok(())
}
