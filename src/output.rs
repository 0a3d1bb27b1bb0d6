//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan results.

use crate::config::OutputFormat;
use crate::scanner::{PortStatus, ScanProgress, ScanResult};
use console::{style, Style};
use std::cmp::Ordering;
use std::io::{self, Write};
use std::net::IpAddr;
use std::time::Duration;

const RULE: &str = "═══════════════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────────────────";

/// Sort results by target (numerically for IP literals), then port, then protocol.
pub fn sort_results(results: &mut [ScanResult]) {
    results.sort_by(|a, b| {
        compare_targets(&a.target, &b.target)
            .then(a.port.cmp(&b.port))
            .then(a.protocol.cmp(&b.protocol))
    });
}

fn compare_targets(a: &str, b: &str) -> Ordering {
    match (a.parse::<IpAddr>(), b.parse::<IpAddr>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Summarize a finished result list as a final progress snapshot.
pub fn summarize(results: &[ScanResult], total: u64) -> ScanProgress {
    let mut summary = ScanProgress::new(total);
    for result in results {
        summary.record(result.status);
    }
    summary
}

/// Format and print scan results to stdout.
pub fn print_results(
    results: &[ScanResult],
    summary: &ScanProgress,
    elapsed: Duration,
    format: OutputFormat,
) -> io::Result<()> {
    let stdout = io::stdout();
    write_results(stdout.lock(), results, summary, elapsed, format)
}

/// Format scan results into any writer.
pub fn write_results<W: Write>(
    out: W,
    results: &[ScanResult],
    summary: &ScanProgress,
    elapsed: Duration,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, results, summary, elapsed),
        OutputFormat::Json => write_json(out, results),
        OutputFormat::Csv => write_csv(out, results),
    }
}

/// Write results in human-readable plain text format.
fn write_plain<W: Write>(
    mut out: W,
    results: &[ScanResult],
    summary: &ScanProgress,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                          {} Scan Results", style("Porty").cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    // Statistics
    writeln!(
        out,
        "  {} {}/{} probes completed in {:.2}s",
        style("Statistics:").bold(),
        summary.completed,
        summary.total,
        elapsed.as_secs_f64()
    )?;
    writeln!(
        out,
        "              {} open, {} closed, {} filtered, {} errors",
        style(summary.open).green().bold(),
        style(summary.closed).red(),
        style(summary.filtered).yellow(),
        style(summary.errors()).magenta()
    )?;
    writeln!(out)?;

    if results.is_empty() {
        writeln!(out, "  {}", style("No ports to display.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<16}  {:<24}  {:>6}  {:<5}  {:<14}  {}",
            style("TARGET").bold(),
            style("HOSTNAME").bold(),
            style("PORT").bold(),
            style("PROTO").bold(),
            style("STATE").bold(),
            style("SERVICE").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for result in results {
            let status_style = match result.status {
                PortStatus::Open | PortStatus::OpenFiltered => Style::new().green().bold(),
                PortStatus::Closed => Style::new().red(),
                PortStatus::Filtered => Style::new().yellow(),
                PortStatus::Error => Style::new().magenta(),
            };

            writeln!(
                out,
                "  {:<16}  {:<24}  {:>6}  {:<5}  {:<14}  {}",
                result.target,
                truncate_string(result.hostname.as_deref().unwrap_or(""), 24),
                result.port,
                result.protocol.to_string(),
                status_style.apply_to(result.status.to_string()),
                result.service
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    Ok(())
}

/// Write results as a pretty-printed JSON array.
fn write_json<W: Write>(mut out: W, results: &[ScanResult]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, results).map_err(io::Error::other)?;
    writeln!(out)
}

/// Write results in CSV format.
fn write_csv<W: Write>(out: W, results: &[ScanResult]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record([
        "host",
        "hostname",
        "port",
        "protocol",
        "status",
        "service",
        "timestamp",
    ])?;

    for result in results {
        let port = result.port.to_string();
        let protocol = result.protocol.to_string();
        let status = result.status.to_string();
        let timestamp = result.timestamp.to_rfc3339();

        wtr.write_record([
            result.target.as_str(),
            result.hostname.as_deref().unwrap_or(""),
            port.as_str(),
            protocol.as_str(),
            status.as_str(),
            result.service.as_str(),
            timestamp.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(targets: usize, ports: usize, protocol: &str, total: u64) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("Porty").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{} Protocol: {}", style("•").dim(), style(protocol).yellow());
    eprintln!(
        "{} {} targets × {} ports = {} probes",
        style("•").dim(),
        style(targets).white().bold(),
        style(ports).white().bold(),
        style(total).white().bold()
    );
    eprintln!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Protocol;
    use crate::types::Port;

    fn result(target: &str, port: u16, protocol: Protocol, status: PortStatus) -> ScanResult {
        ScanResult::new(target, Port::new(port).unwrap(), protocol).complete(status)
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_sort_results() {
        let mut results = vec![
            result("10.0.0.10", 22, Protocol::Tcp, PortStatus::Open),
            result("example.com", 80, Protocol::Tcp, PortStatus::Open),
            result("10.0.0.9", 443, Protocol::Udp, PortStatus::Open),
            result("10.0.0.9", 443, Protocol::Tcp, PortStatus::Open),
            result("10.0.0.9", 22, Protocol::Tcp, PortStatus::Open),
        ];
        sort_results(&mut results);

        let order: Vec<(String, u16, Protocol)> = results
            .iter()
            .map(|r| (r.target.clone(), r.port.as_u16(), r.protocol))
            .collect();
        assert_eq!(
            order,
            vec![
                ("10.0.0.9".to_string(), 22, Protocol::Tcp),
                ("10.0.0.9".to_string(), 443, Protocol::Tcp),
                ("10.0.0.9".to_string(), 443, Protocol::Udp),
                ("10.0.0.10".to_string(), 22, Protocol::Tcp),
                ("example.com".to_string(), 80, Protocol::Tcp),
            ]
        );
    }

    #[test]
    fn test_csv_output() {
        let results = vec![
            result("10.0.0.1", 22, Protocol::Tcp, PortStatus::Open)
                .with_hostname(Some("gw.lan".to_string())),
            result("10.0.0.1", 53, Protocol::Udp, PortStatus::OpenFiltered),
        ];
        let summary = summarize(&results, 2);
        let mut buf = Vec::new();
        write_results(&mut buf, &results, &summary, Duration::ZERO, OutputFormat::Csv).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "host,hostname,port,protocol,status,service,timestamp");
        assert!(lines[1].starts_with("10.0.0.1,gw.lan,22,TCP,open,SSH,"));
        assert!(lines[2].starts_with("10.0.0.1,,53,UDP,open|filtered,DNS,"));
    }

    #[test]
    fn test_json_output() {
        let results = vec![result("10.0.0.1", 80, Protocol::Tcp, PortStatus::Open)];
        let summary = summarize(&results, 1);
        let mut buf = Vec::new();
        write_results(&mut buf, &results, &summary, Duration::ZERO, OutputFormat::Json).unwrap();

        let parsed: Vec<ScanResult> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, results);
    }

    #[test]
    fn test_plain_output() {
        let results = vec![result("10.0.0.1", 3306, Protocol::Tcp, PortStatus::Open)];
        let summary = summarize(&results, 4);
        let mut buf = Vec::new();
        write_results(&mut buf, &results, &summary, Duration::from_millis(1500), OutputFormat::Plain)
            .unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("10.0.0.1"));
        assert!(text.contains("MySQL"));
        assert!(text.contains("1/4"));
    }

    #[test]
    fn test_summarize() {
        let results = vec![
            result("a", 1, Protocol::Tcp, PortStatus::Open),
            result("a", 2, Protocol::Udp, PortStatus::OpenFiltered),
            result("a", 3, Protocol::Tcp, PortStatus::Error),
        ];
        let summary = summarize(&results, 3);
        assert_eq!(summary.open, 2);
        assert_eq!(summary.errors(), 1);
        assert!(summary.is_complete());
    }
}
