use crate::core::{
    command_init::{CommandContext, GlobalOptions},
    error::Result,
    output::{format_detail, format_indexed},
    print_section_header, print_success,
};
use colored::*;

pub fn execute_usage(options: &GlobalOptions, cleanup_days: Option<i64>) -> Result<()> {
    let mut context = CommandContext::initialize(options)?;

    if let Some(days) = cleanup_days {
        let removed = context.usage.cleanup_older_than(days, chrono::Utc::now())?;
        print_success(&format!(
            "Removed {removed} recent entries older than {days} days"
        ));
    }

    let display = &context.config.display_settings;
    let usage = &context.usage;
    let summary = usage.usage_summary();

    print_section_header("Usage statistics");
    println!("{}", format_detail("Total usage", &summary.total_usage.to_string()));
    println!(
        "{}",
        format_detail("Unique resolutions", &summary.unique_resolutions.to_string())
    );
    println!("{}", format_detail("Favorites", &summary.favorites_count.to_string()));
    let most_used = summary
        .most_used
        .as_ref()
        .map_or("none".to_string(), |(key, count)| format!("{key} ({count} times)"));
    println!("{}", format_detail("Most used", &most_used));

    print_section_header("Recent");
    print_keys(&usage.recent(display.recent_limit));

    let threshold = u64::from(display.frequent_threshold);
    print_section_header(&format!("Frequently used (threshold {threshold}+)"));
    let frequent = usage.frequently_used(20, threshold.max(1));
    if frequent.is_empty() {
        println!("  {}", "none".bright_black());
    } else {
        for (i, key) in frequent.iter().enumerate() {
            let line = format!("{key} ({} times)", usage.usage_count(key));
            println!("{}", format_indexed(i + 1, &line));
        }
    }

    print_section_header("Favorites");
    let favorites: Vec<&str> = usage.favorites().iter().map(String::as_str).collect();
    print_keys(&favorites);
    println!();

    Ok(())
}

fn print_keys(keys: &[&str]) {
    if keys.is_empty() {
        println!("  {}", "none".bright_black());
        return;
    }
    for (i, key) in keys.iter().enumerate() {
        println!("{}", format_indexed(i + 1, key));
    }
}
