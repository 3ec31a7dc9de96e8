use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, total_cases};
use crate::config::{ColumnConfig, WeeklySort};
use crate::error::PipelineError;
use crate::input::decode_rows;
use crate::models::{ClassifiedBucket, CurveType, RawRecord, Summary};
use crate::normalize::normalize;
use crate::summary::generate_summary;
use crate::threshold::{classify, exceeding_labels, ThresholdModel};

/// Everything one run needs, built once at the boundary.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub file: Vec<u8>,
    pub columns: ColumnConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub curve: CurveType,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub total_cases: u64,
    pub thresholds: ThresholdModel,
    pub series: Vec<ClassifiedBucket>,
    pub exceeding: Vec<String>,
    pub summary: Summary,
}

pub fn run(input: &AnalysisInput) -> Result<Analysis, PipelineError> {
    let table = decode_rows(&input.file)?;
    debug!(
        rows = table.rows.len(),
        columns = table.headers.len(),
        "input table decoded"
    );

    for column in input.columns.required_columns() {
        if !table.headers.iter().any(|header| header == column) {
            warn!(column, "configured column not found in input header");
        }
    }

    analyze_rows(&table.rows, &input.columns)
}

/// Runs normalize → aggregate → thresholds → classify → summarize.
pub fn analyze_rows(rows: &[RawRecord], columns: &ColumnConfig) -> Result<Analysis, PipelineError> {
    let curve = columns.curve();
    let sort = match columns {
        ColumnConfig::Weekly { sort, .. } => *sort,
        ColumnConfig::Daily { .. } => WeeklySort::default(),
    };

    let keys: Vec<_> = rows.iter().filter_map(|row| normalize(row, columns)).collect();
    let rows_read = rows.len();
    let rows_skipped = rows_read - keys.len();
    let buckets = aggregate(keys, sort);
    let total = total_cases(&buckets);

    info!(
        %curve,
        rows_read,
        rows_skipped,
        buckets = buckets.len(),
        total_cases = total,
        "rows aggregated"
    );

    let thresholds = ThresholdModel::from_buckets(&buckets).ok_or(PipelineError::EmptySeries {
        rows_read,
        rows_skipped,
    })?;
    let series = classify(&buckets, thresholds.action_line);
    let exceeding = exceeding_labels(&series);
    let summary = generate_summary(&exceeding, curve);

    info!(
        mean = thresholds.mean,
        sd = thresholds.sd,
        action_line = thresholds.action_line,
        exceeding = exceeding.len(),
        "thresholds computed"
    );

    Ok(Analysis {
        curve,
        rows_read,
        rows_skipped,
        total_cases: total,
        thresholds,
        series,
        exceeding,
        summary,
    })
}
