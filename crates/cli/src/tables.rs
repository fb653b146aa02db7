//! CSV tables for one analyzed conversation, one file per table so they open
//! directly in a spreadsheet.

use crate::output::AnalysisDocument;
use anyhow::{Context, Result};
use emergence_metrics::{LengthBin, PerTurnMetrics};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Control columns appended to every per-turn row
#[derive(Serialize)]
struct ControlColumns {
    emergence_score_control: Option<f64>,
    control_partner: Option<usize>,
}

#[derive(Serialize)]
struct SummaryRow {
    rows: usize,
    hot_threshold: f64,
    emergence_mean: Option<f64>,
    emergence_median: Option<f64>,
    emergence_min: Option<f64>,
    emergence_max: Option<f64>,
    emergence_q1: Option<f64>,
    emergence_q3: Option<f64>,
    hot_share: Option<f64>,
    legacy_mean: Option<f64>,
    legacy_median: Option<f64>,
    legacy_min: Option<f64>,
    legacy_max: Option<f64>,
}

#[derive(Serialize)]
struct BinRow {
    bin: LengthBin,
    count: usize,
    mean: Option<f64>,
    median: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Serialize)]
struct ChecksRow {
    even_count: usize,
    even_mean: Option<f64>,
    even_hot_share: Option<f64>,
    odd_count: usize,
    odd_mean: Option<f64>,
    odd_hot_share: Option<f64>,
    control_mean: Option<f64>,
    control_hot_share: Option<f64>,
    delta_mean: Option<f64>,
}

/// Per-turn metrics with the aligned control score, one row per pair.
pub fn write_metrics_csv<W: Write>(out: W, doc: &AnalysisDocument) -> Result<()> {
    write_turn_rows(out, doc, doc.analysis.metrics.iter())
}

/// Write every table as `<base>_<table>.csv` under `dir`; returns the paths written.
pub fn write_tables(doc: &AnalysisDocument, dir: &Path, base: &str) -> Result<Vec<PathBuf>> {
    let summary = &doc.summary;
    let mut written = Vec::with_capacity(5);

    let path = table_path(dir, base, "metrics");
    write_metrics_csv(create(&path)?, doc).with_context(|| context(&path))?;
    written.push(path);

    let path = table_path(dir, base, "summary");
    let emergence = &summary.emergence;
    write_rows(
        create(&path)?,
        [SummaryRow {
            rows: summary.rows,
            hot_threshold: summary.hot_threshold,
            emergence_mean: emergence.distribution.mean,
            emergence_median: emergence.distribution.median,
            emergence_min: emergence.distribution.min,
            emergence_max: emergence.distribution.max,
            emergence_q1: emergence.q1,
            emergence_q3: emergence.q3,
            hot_share: emergence.hot_share,
            legacy_mean: summary.legacy.mean,
            legacy_median: summary.legacy.median,
            legacy_min: summary.legacy.min,
            legacy_max: summary.legacy.max,
        }],
    )
    .with_context(|| context(&path))?;
    written.push(path);

    let path = table_path(dir, base, "bin_summary");
    let bins = summary.length_bins.iter().map(|bin| BinRow {
        bin: bin.bin,
        count: bin.emergence.count,
        mean: bin.emergence.mean,
        median: bin.emergence.median,
        min: bin.emergence.min,
        max: bin.emergence.max,
    });
    write_rows(create(&path)?, bins).with_context(|| context(&path))?;
    written.push(path);

    let path = table_path(dir, base, "exp_checks");
    let control = summary.control.as_ref();
    write_rows(
        create(&path)?,
        [ChecksRow {
            even_count: summary.even.count,
            even_mean: summary.even.mean,
            even_hot_share: summary.even.hot_share,
            odd_count: summary.odd.count,
            odd_mean: summary.odd.mean,
            odd_hot_share: summary.odd.hot_share,
            control_mean: control.and_then(|c| c.mean),
            control_hot_share: control.and_then(|c| c.hot_share),
            delta_mean: control.and_then(|c| c.delta_mean),
        }],
    )
    .with_context(|| context(&path))?;
    written.push(path);

    let path = table_path(dir, base, "top_emergent");
    let top = summary.top_turns.iter().filter_map(|top| {
        doc.analysis
            .metrics
            .iter()
            .find(|turn| turn.index == top.index)
    });
    write_turn_rows(create(&path)?, doc, top).with_context(|| context(&path))?;
    written.push(path);

    Ok(written)
}

fn write_turn_rows<'a, W: Write>(
    out: W,
    doc: &AnalysisDocument,
    turns: impl Iterator<Item = &'a PerTurnMetrics>,
) -> Result<()> {
    let control = doc.analysis.control.as_ref();
    let rows = turns.map(|turn| {
        let slot = turn.index.saturating_sub(1);
        let columns = ControlColumns {
            emergence_score_control: control.and_then(|c| c.scores.get(slot).copied()),
            control_partner: control.and_then(|c| c.partners.get(slot).copied()),
        };
        (turn, columns)
    });
    write_rows(out, rows)
}

fn write_rows<W: Write, T: Serialize>(out: W, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn table_path(dir: &Path, base: &str, table: &str) -> PathBuf {
    dir.join(format!("{base}_{table}.csv"))
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}

fn context(path: &Path) -> String {
    format!("Failed to write {}", path.display())
}
