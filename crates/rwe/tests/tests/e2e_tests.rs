#[path = "e2e/five_iteration_run.rs"]
mod five_iteration_run;

#[path = "e2e/resume_after_failure.rs"]
mod resume_after_failure;

#[path = "e2e/genesis_style_transfer.rs"]
mod genesis_style_transfer;

#[path = "e2e/post_pass.rs"]
mod post_pass;
