use std::fmt::Write;

use crate::pipeline::Analysis;

pub fn build_report(title: &str, source: &str, analysis: &Analysis) -> String {
    let mut output = String::new();
    let thresholds = &analysis.thresholds;

    let _ = writeln!(output, "# {title}");
    let _ = writeln!(
        output,
        "Generated from {} ({} curve)",
        source, analysis.curve
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Input");
    let _ = writeln!(output, "- Rows read: {}", analysis.rows_read);
    let _ = writeln!(output, "- Rows skipped: {}", analysis.rows_skipped);
    let _ = writeln!(output, "- Cases counted: {}", analysis.total_cases);
    let _ = writeln!(output, "- Buckets: {}", analysis.series.len());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Thresholds");
    let _ = writeln!(output, "| Line | Value |");
    let _ = writeln!(output, "| --- | ---: |");
    let _ = writeln!(output, "| Mean | {:.2} |", thresholds.mean);
    let _ = writeln!(output, "| Standard deviation | {:.2} |", thresholds.sd);
    let _ = writeln!(output, "| Alert (Mean + 1 SD) | {:.2} |", thresholds.alert_line);
    let _ = writeln!(output, "| Action (Mean + 2 SD) | {:.2} |", thresholds.action_line);
    if thresholds.degenerate {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Only one bucket had cases, so the standard deviation is reported as 0."
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Cases");
    let _ = writeln!(output, "| Bucket | Cases | Above action line |");
    let _ = writeln!(output, "| --- | ---: | :---: |");
    for bucket in analysis.series.iter() {
        let _ = writeln!(
            output,
            "| {} | {} | {} |",
            bucket.label,
            bucket.count,
            if bucket.exceeds_action { "yes" } else { "" }
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "**English:** {}", analysis.summary.en);
    let _ = writeln!(output);
    let _ = writeln!(output, "**Bahasa Melayu:** {}", analysis.summary.bm);

    output
}
