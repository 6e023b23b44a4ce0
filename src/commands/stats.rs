use crate::core::{
    catalog::Catalog,
    command_init::{CommandContext, GlobalOptions},
    error::Result,
    output::format_detail,
    print_section_header,
};

pub fn execute_stats(options: &GlobalOptions, json: bool) -> Result<()> {
    let mut context = CommandContext::initialize(options)?;
    context.catalog.load(false);
    let stats = context.catalog.statistics();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_section_header("Catalog statistics");
    println!(
        "{}",
        format_detail("Directory", &context.catalog.directory().display().to_string())
    );
    println!("{}", format_detail("Total", &stats.total_count.to_string()));
    for (category, count) in &stats.per_category {
        println!("{}", format_detail(category.as_str(), &count.to_string()));
    }

    let pixels = |value: Option<u64>| value.map_or("-".to_string(), |v| v.to_string());
    println!("{}", format_detail("Min pixels", &pixels(stats.min_pixel_count)));
    println!("{}", format_detail("Max pixels", &pixels(stats.max_pixel_count)));
    println!(
        "{}",
        format_detail(
            "Avg pixels",
            &stats
                .avg_pixel_count
                .map_or("-".to_string(), |v| format!("{v:.0}"))
        )
    );

    if !stats.duplicates.is_empty() {
        print_section_header("Duplicates");
        for duplicate in &stats.duplicates {
            println!(
                "{}",
                format_detail(&duplicate.key, &duplicate.sources.join(", "))
            );
        }
    }
    println!();

    Ok(())
}
