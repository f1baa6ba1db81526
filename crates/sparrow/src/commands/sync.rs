//! `sparrow sync`: one bulk import, summarized.

use std::fmt::Write as _;

use sparrow_core::BulkImportSummary;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util::Session;

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let summary = session.sync(global.quiet).await?;
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &summary,
        |s| detail(s, color),
        |s| format!("{} {}", s.item_count, s.error_count),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(summary: &BulkImportSummary, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Imported:  {}", output::status_count(summary.item_count, true, color));
    let _ = write!(out, "Failed:    {}", output::status_count(summary.error_count, false, color));
    if summary.cancelled {
        let _ = write!(out, "\n{}", output::dim("(cancelled before completion)", color));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_notes_cancellation() {
        let summary = BulkImportSummary {
            item_count: 2,
            error_count: 1,
            cancelled: true,
        };
        let text = detail(&summary, false);
        assert!(text.contains("Imported:  2"));
        assert!(text.contains("Failed:    1"));
        assert!(text.contains("cancelled"));
    }
}
