//! Output formatting utilities for the CLI
//!
//! Coloured status lines for progress and results, and a table for the VM
//! listing. Success and progress go to stdout, failures and warnings to
//! stderr.

use tabled::{settings::Style, Table, Tabled};

use lc_core::ResourceSummary;
use lc_probe::{ProbeOutcome, ProbeReport};

/// Longest VM name shown in the table before it is cut
const NAME_WIDTH: usize = 32;

/// Format the resource listing as a table
///
/// Rows keep server order; the first row is the VM a check would pick.
pub fn format_vms(vms: &[ResourceSummary]) -> String {
    if vms.is_empty() {
        return "No VMs available".to_string();
    }

    #[derive(Tabled)]
    struct VmRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "UUID")]
        uuid: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "STATUS")]
        status: String,
    }

    let rows: Vec<VmRow> = vms
        .iter()
        .enumerate()
        .map(|(i, vm)| VmRow {
            index: i + 1,
            uuid: vm.uuid.to_string(),
            name: vm
                .name
                .as_deref()
                .map(|n| truncate(n, NAME_WIDTH))
                .unwrap_or_else(|| "-".to_string()),
            status: vm.status.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Print the final probe verdict, with handshake headers for rejections
pub fn print_probe_report(report: &ProbeReport) {
    if report.is_success() {
        print_success(&report.outcome.to_string());
    } else {
        print_error(&report.outcome.to_string());
    }

    if let ProbeOutcome::Rejected { headers, .. } = &report.outcome {
        for (name, value) in headers {
            print_warning(&format!("  {}: {}", name, value));
        }
    }

    print_info(&format!("Probe took {} ms", report.elapsed_ms));
}

/// Print any serializable report as pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
///
/// Outputs to stderr.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
///
/// Outputs to stderr.
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc_core::ResourceHandle;

    fn vm(uuid: &str, name: Option<&str>) -> ResourceSummary {
        ResourceSummary {
            uuid: ResourceHandle::new(uuid),
            name: name.map(str::to_string),
            status: Some("Running".into()),
        }
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(format_vms(&[]), "No VMs available");
    }

    #[test]
    fn test_table_keeps_server_order() {
        let table = format_vms(&[vm("abc-123", Some("web")), vm("def-456", None)]);
        let abc = table.find("abc-123").unwrap();
        let def = table.find("def-456").unwrap();
        assert!(abc < def);
        assert!(table.contains("UUID"));
        assert!(table.contains("Running"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("가나다라마바사", 5), "가나...");
    }
}
