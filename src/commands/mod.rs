pub mod generate;
pub mod init;
pub mod list;
pub mod validate;

use crate::generator::GenerationReport;

/// Print a generation report in the shape every command shares.
pub(crate) fn print_report(report: &GenerationReport, dry_run: bool) {
    let (created, modified, skipped) = if dry_run {
        ("Would create", "Would modify", "Would skip")
    } else {
        ("Created", "Modified", "Skipped")
    };

    for path in &report.created {
        println!("  {}: {}", created, path.display());
    }
    for path in &report.modified {
        println!("  {}: {}", modified, path.display());
    }
    for path in &report.skipped {
        println!("  {}: {} (unchanged)", skipped, path.display());
    }
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
}
