use std::time::Duration;

use mdmirror_core::CrawlResult;
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "mdmirror".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Markdown mirrors for LLM crawlers\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled detail line under a step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print timing with a color keyed to how long it took
pub fn print_timing(label: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 250.0 {
        eprintln!("  {} {:>8.2}ms", label.dimmed(), ms.green());
    } else if ms < 1000.0 {
        eprintln!("  {} {:>8.2}ms", label.dimmed(), ms.bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms", label.dimmed(), ms.bright_red());
    }
}

/// Print the discovered pages as a table
pub fn print_crawl_summary(pages: &CrawlResult) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Discovered Pages".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    for (address, label) in pages.sorted() {
        eprintln!("  {} {}", label.bright_white(), address.dimmed());
    }
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
