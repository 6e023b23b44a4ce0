use crate::core::{
    command_init::{CommandContext, GlobalOptions},
    error::Result,
    node::LatentSource,
    output::format_detail,
    print_section_header, print_warning,
};

pub fn execute_generate(
    options: &GlobalOptions,
    resolution: &str,
    batch_size: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut context = CommandContext::initialize(options)?;
    let mut node = context.node();
    let (min, max, default) = node.batch_bounds();
    let batch_size = batch_size.unwrap_or(default);
    if !(min..=max).contains(&batch_size) {
        log::debug!("Batch size {batch_size} outside {min}-{max}; node will fall back");
    }
    let result = node.generate(resolution, batch_size);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match &result.source {
        LatentSource::Resolved { .. } => {}
        LatentSource::Fallback { resolution, reason } => {
            print_warning(&format!("{reason}. Using fallback {resolution}x{resolution}."));
        }
        LatentSource::Minimal { reason } => {
            print_warning(&format!("{reason}. Using minimal latent."));
        }
    }

    print_section_header("Empty latent");
    let source = match &result.source {
        LatentSource::Resolved { key, .. } => key.clone(),
        LatentSource::Fallback { resolution, .. } => format!("fallback {resolution}x{resolution}"),
        LatentSource::Minimal { .. } => "minimal".to_string(),
    };
    println!("{}", format_detail("Resolution", &source));
    println!("{}", format_detail("Shape", &result.latent.shape.to_string()));
    println!(
        "{}",
        format_detail("Elements", &result.latent.shape.element_count().to_string())
    );
    println!();

    Ok(())
}
