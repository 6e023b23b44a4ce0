use crate::core::{
    catalog::Catalog,
    command_init::{CommandContext, GlobalOptions},
    error::Result,
    output::format_indexed,
    print_info, print_section_header,
};
use std::collections::HashSet;

pub fn execute_list(options: &GlobalOptions, category: Option<&str>, plain: bool) -> Result<()> {
    let mut context = CommandContext::initialize(options)?;
    let resolutions = context.node().available_resolutions();

    let allowed: Option<HashSet<String>> = category.map(|name| {
        context
            .catalog
            .filter_by_category(Some(name))
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect()
    });

    let visible: Vec<_> = resolutions
        .iter()
        .filter(|marked| allowed.as_ref().map_or(true, |keys| keys.contains(&marked.key)))
        .collect();

    if plain {
        for marked in &visible {
            println!("{}", marked.label());
        }
        return Ok(());
    }

    if visible.is_empty() {
        print_info(&format!(
            "No resolutions found in {}",
            context.catalog.directory().display()
        ));
        return Ok(());
    }

    print_section_header("Resolutions");
    for (i, marked) in visible.iter().enumerate() {
        println!("{}", format_indexed(i + 1, marked.label()));
    }
    println!();

    Ok(())
}
