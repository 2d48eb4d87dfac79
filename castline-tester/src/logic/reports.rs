use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::{Distribution, RunReport};

fn write_distribution_rows<W: Write>(writer: &mut W, distribution: &Distribution) -> Result<()> {
    for (key, count) in &distribution.counts {
        writeln!(
            writer,
            "  {key:20}: {count:>5} ({:.2}%)",
            distribution.percent(key)
        )?;
    }
    Ok(())
}

pub fn generate_console_report<W: Write>(
    writer: &mut W,
    reports: &[RunReport],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Catch Distribution Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "==============================".cyan())?;
    writeln!(writer, "Runs: {}", reports.len())?;
    writeln!(writer, "Total time: {total_duration:?}")?;

    for report in reports {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} seed {} ({})",
            format!("🎣 {}", report.kind.as_str()).bold(),
            report.seed,
            report.seed_token
        )?;
        writeln!(
            writer,
            "   Casts: {}  Catches: {}  Junk: {}  Dropped: {}",
            report.casts,
            report.catches.to_string().green(),
            report.junk,
            if report.dropped == 0 {
                report.dropped.to_string().normal()
            } else {
                report.dropped.to_string().red()
            }
        )?;
        if let Some(live) = &report.live {
            writeln!(
                writer,
                "   Ticks: {}  Anglers: {}  Claims: {}  Refused: {}  Deck resets: {}",
                live.ticks, live.players, live.claims, live.refused, live.deck_resets
            )?;
            writeln!(
                writer,
                "   Clock ends at hour {} with event {}",
                live.final_hour,
                live.final_event.as_deref().unwrap_or("none")
            )?;
        }
        for distribution in &report.distributions {
            writeln!(
                writer,
                "{}",
                format!("{} distribution:", distribution.label).yellow()
            )?;
            if distribution.total == 0 {
                writeln!(writer, "  (none)")?;
            } else {
                write_distribution_rows(writer, distribution)?;
            }
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(writer: &mut W, reports: &[RunReport]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, reports)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(writer: &mut W, reports: &[RunReport]) -> Result<()> {
    writeln!(writer, "# Castline Catch Report\n")?;

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "| Mode | Seed | Casts | Catches | Junk | Dropped |")?;
    writeln!(writer, "|---|---|---|---|---|---|")?;
    for report in reports {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} | {} |",
            report.kind.as_str(),
            report.seed,
            report.casts,
            report.catches,
            report.junk,
            report.dropped
        )?;
    }
    writeln!(writer)?;

    for report in reports {
        writeln!(writer, "## {} seed {}\n", report.kind.as_str(), report.seed)?;
        if let Some(live) = &report.live {
            writeln!(writer, "- **Ticks**: {}", live.ticks)?;
            writeln!(writer, "- **Anglers**: {}", live.players)?;
            writeln!(writer, "- **Claims**: {}", live.claims)?;
            writeln!(writer, "- **Deck resets**: {}\n", live.deck_resets)?;
        }
        for distribution in &report.distributions {
            writeln!(writer, "### {}\n", distribution.label)?;
            writeln!(writer, "| Outcome | Count | Share |")?;
            writeln!(writer, "|---|---|---|")?;
            for (key, count) in &distribution.counts {
                writeln!(
                    writer,
                    "| {key} | {count} | {:.2}% |",
                    distribution.percent(key)
                )?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// One row per (run, distribution, outcome).
pub fn generate_csv_report<W: Write>(writer: &mut W, reports: &[RunReport]) -> Result<()> {
    writeln!(writer, "mode,seed,distribution,outcome,count,percent")?;
    for report in reports {
        for distribution in &report.distributions {
            for (key, count) in &distribution.counts {
                writeln!(
                    writer,
                    "{},{},{},{},{count},{:.4}",
                    report.kind.as_str(),
                    report.seed,
                    distribution.label,
                    csv_field(key),
                    distribution.percent(key)
                )?;
            }
        }
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{LiveCounters, RunKind};
    use chrono::Utc;

    fn sample() -> Vec<RunReport> {
        let mut fish = Distribution::new("fish");
        fish.record("cod");
        fish.record("cod");
        fish.record("tin can");
        fish.record("odd, name");
        vec![RunReport {
            kind: RunKind::Loop,
            seed: 42,
            seed_token: "42".to_string(),
            started_at: Utc::now(),
            casts: 5,
            catches: 4,
            dropped: 1,
            junk: 1,
            live: Some(LiveCounters {
                ticks: 3,
                players: 2,
                claims: 4,
                ..LiveCounters::default()
            }),
            distributions: vec![Distribution::new("event"), fish],
        }]
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn console_report_lists_every_outcome() {
        colored::control::set_override(false);
        let text = render(|w| generate_console_report(w, &sample(), Duration::from_millis(5)));
        assert!(text.contains("Catch Distribution Summary"));
        assert!(text.contains("seed 42"));
        assert!(text.contains("cod"));
        assert!(text.contains("50.00%"));
        assert!(text.contains("Claims: 4"));
        assert!(text.contains("(none)"));
    }

    #[test]
    fn json_report_round_trips_through_serde_value() {
        let text = render(|w| generate_json_report(w, &sample()));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["kind"], "loop");
        assert_eq!(value[0]["seedToken"], "42");
        assert_eq!(value[0]["live"]["claims"], 4);
        assert_eq!(value[0]["distributions"][1]["counts"]["cod"], 2);
    }

    #[test]
    fn markdown_report_has_tables() {
        let text = render(|w| generate_markdown_report(w, &sample()));
        assert!(text.starts_with("# Castline Catch Report"));
        assert!(text.contains("| loop | 42 | 5 | 4 | 1 | 1 |"));
        assert!(text.contains("| cod | 2 | 50.00% |"));
    }

    #[test]
    fn csv_report_quotes_awkward_names() {
        let text = render(|w| generate_csv_report(w, &sample()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "mode,seed,distribution,outcome,count,percent");
        assert!(lines.contains(&"loop,42,fish,cod,2,50.0000"));
        assert!(lines.contains(&"loop,42,fish,\"odd, name\",1,25.0000"));
        assert_eq!(lines.len(), 4);
    }
}
