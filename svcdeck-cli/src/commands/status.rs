use anyhow::Context;

use svcdeck_core::backend::Backend;
use svcdeck_core::filter::ServiceFilter;
use svcdeck_core::model::{ServiceCounts, format_percent};
use svcdeck_core::view::{Badge, ServiceRow, render_table};

const RESET: &str = "\x1b[0m";

fn badge_color(badge: Badge) -> &'static str {
    match badge {
        Badge::Running => "\x1b[32m",
        Badge::Failed => "\x1b[31m",
        Badge::Stopped => "\x1b[90m",
    }
}

fn format_row(row: &ServiceRow, name_width: usize) -> String {
    format!(
        "  {}{} {:<7}{}  {:<width$}  {}",
        badge_color(row.badge),
        row.badge.icon(),
        row.badge.label(),
        RESET,
        row.name,
        row.description,
        width = name_width
    )
}

pub async fn run_status(backend: &dyn Backend, filter: Option<String>) -> anyhow::Result<()> {
    let (stats, services) = tokio::join!(backend.stats(), backend.services());

    match stats {
        Ok(stats) => println!(
            "CPU {}  RAM {}\n",
            format_percent(stats.cpu_percent),
            format_percent(stats.ram_percent)
        ),
        Err(e) => eprintln!("Stats unavailable: {}\n", e),
    }

    let services = services.context("failed to fetch services")?;
    let filter = ServiceFilter::with_term(filter.unwrap_or_default());
    let table = render_table(&services, &filter);

    if let Some(placeholder) = table.placeholder() {
        println!("  {}", placeholder);
        return Ok(());
    }

    let name_width = table.rows().iter().map(|r| r.name.len()).max().unwrap_or(0);
    for row in table.rows() {
        println!("{}", format_row(row, name_width));
    }

    let counts = ServiceCounts::from_services(&services);
    println!(
        "\n{} services, {} running, {} failed",
        counts.total, counts.running, counts.failed
    );
    Ok(())
}
