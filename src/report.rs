use std::fmt::Write;

use serde::Serialize;

use crate::models::{ActivitySource, DashboardData};

#[derive(Debug, Serialize)]
struct SeriesRow<'a> {
    month: &'a str,
    activity: f64,
    potential: f64,
}

pub fn build_report(data: &DashboardData) -> String {
    let mut output = String::new();
    let repo_label = if data.repo.is_empty() {
        "unknown repository"
    } else {
        data.repo.as_str()
    };

    let _ = writeln!(output, "# Repository Potential Report");
    let _ = writeln!(
        output,
        "Generated for {} (potential {:.2}, {} to {})",
        repo_label,
        data.potential,
        data.months[0],
        data.months[data.months.len() - 1]
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Activity and Potential");
    let _ = writeln!(output, "| Month | Activity | Potential |");
    let _ = writeln!(output, "|-------|----------|-----------|");

    let activity = data.monthly_activity.values();
    let potential = data.monthly_potential.values();
    for (index, month) in data.months.iter().enumerate() {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} |",
            month, activity[index], potential[index]
        );
    }

    let _ = writeln!(output);
    match &data.activity_source {
        ActivitySource::Field {
            field,
            fallback: false,
        } => {
            let _ = writeln!(output, "Activity taken from `{field}`.");
        }
        ActivitySource::Field {
            field,
            fallback: true,
        } => {
            let _ = writeln!(
                output,
                "Activity taken from fallback metric `{field}`; the preferred series was missing."
            );
        }
        ActivitySource::Synthesized => {
            let _ = writeln!(
                output,
                "No activity series was returned; the values above are synthesized."
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trends");
    for config in data.trend_configs.iter() {
        let _ = writeln!(
            output,
            "- {}: {} ({})",
            config.name, config.display, config.description
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Detailed Metrics");

    if data.detailed_data.is_empty() {
        let _ = writeln!(output, "No detailed metrics returned.");
    } else {
        for (metric, values) in data.detailed_data.iter() {
            let _ = writeln!(output, "- {}: {} points", metric, values.len());
        }
    }

    output
}

/// Writes one `month,activity,potential` row per period.
pub fn write_series_csv<W: std::io::Write>(writer: W, data: &DashboardData) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let activity = data.monthly_activity.values();
    let potential = data.monthly_potential.values();

    for (index, month) in data.months.iter().enumerate() {
        csv.serialize(SeriesRow {
            month,
            activity: activity[index],
            potential: potential[index],
        })?;
    }

    csv.flush()?;
    Ok(())
}
