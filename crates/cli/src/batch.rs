use crate::output::{to_json, AnalysisDocument};
use crate::report::render_conversation_report;
use crate::tables::write_tables;
use anyhow::{Context, Result};
use emergence_metrics::ConversationAnalyzer;
use emergence_transcript::{read_transcript, ExportFormat};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub recursive: bool,
    pub jobs: Option<usize>,
    pub pretty: bool,
    /// Also write the CSV tables next to the JSON results
    pub csv: bool,
}

#[derive(Debug, Serialize)]
pub struct ProcessedFile {
    pub source: String,
    pub results: String,
    pub report: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,
    pub turns: usize,
    pub hot_turns: usize,
}

#[derive(Debug, Serialize)]
pub struct FailedFile {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub conversations: Vec<ProcessedFile>,
    pub failed: Vec<FailedFile>,
}

/// Analyze every supported transcript under `input_dir`.
///
/// Only an unreadable input directory or an output directory that cannot be
/// created fails the batch; per-file errors are collected in the summary.
pub fn run_batch(
    analyzer: &ConversationAnalyzer,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    let inputs = collect_inputs(&options.input_dir, options.recursive)?;
    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;
    log::info!(
        "Processing {} transcripts from {}",
        inputs.len(),
        options.input_dir.display()
    );

    let process = || -> Vec<(PathBuf, Result<ProcessedFile>)> {
        inputs
            .par_iter()
            .map(|path| (path.clone(), process_file(analyzer, options, path)))
            .collect()
    };
    let outcomes = match options.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("Failed to build worker pool")?
            .install(process),
        None => process(),
    };

    let mut summary = BatchSummary {
        processed: 0,
        conversations: Vec::new(),
        failed: Vec::new(),
    };
    for (path, outcome) in outcomes {
        match outcome {
            Ok(file) => {
                summary.processed += 1;
                summary.conversations.push(file);
            }
            Err(err) => {
                log::warn!("Skipping {}: {err:#}", path.display());
                summary.failed.push(FailedFile {
                    source: path.display().to_string(),
                    error: format!("{err:#}"),
                });
            }
        }
    }
    log::info!(
        "Batch finished: {} processed, {} failed",
        summary.processed,
        summary.failed.len()
    );
    Ok(summary)
}

/// Supported transcript files, sorted by path
pub fn collect_inputs(input_dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read input directory {}", input_dir.display()))?;

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut paths: Vec<PathBuf> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| ExportFormat::is_supported_path(path))
        .collect();
    paths.sort();
    Ok(paths)
}

fn process_file(
    analyzer: &ConversationAnalyzer,
    options: &BatchOptions,
    path: &Path,
) -> Result<ProcessedFile> {
    let text =
        read_transcript(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let relative = path.strip_prefix(&options.input_dir).unwrap_or(path);
    let doc = AnalysisDocument::build(analyzer, relative.display().to_string(), &text);

    let outputs = OutputPaths::for_input(&options.output_dir, relative);
    fs::create_dir_all(&outputs.dir)
        .with_context(|| format!("Failed to create {}", outputs.dir.display()))?;
    fs::write(&outputs.results, to_json(&doc, options.pretty)?)
        .with_context(|| format!("Failed to write {}", outputs.results.display()))?;
    fs::write(&outputs.report, render_conversation_report(&doc))
        .with_context(|| format!("Failed to write {}", outputs.report.display()))?;
    let tables = if options.csv {
        write_tables(&doc, &outputs.dir, &outputs.base)?
    } else {
        Vec::new()
    };

    log::debug!(
        "{}: {} turns, {} hot",
        relative.display(),
        doc.summary.rows,
        doc.analysis.hot_turns()
    );
    Ok(ProcessedFile {
        source: relative.display().to_string(),
        results: outputs.results.display().to_string(),
        report: outputs.report.display().to_string(),
        tables: tables.iter().map(|p| p.display().to_string()).collect(),
        turns: doc.summary.rows,
        hot_turns: doc.analysis.hot_turns(),
    })
}

/// Output locations for one input, mirroring its subdirectory.
///
/// The base name keeps the input extension, so `chat.txt` and `chat.json` in
/// one folder write `chat.txt_results.json` and `chat.json_results.json`.
#[derive(Debug, PartialEq)]
struct OutputPaths {
    dir: PathBuf,
    base: String,
    results: PathBuf,
    report: PathBuf,
}

impl OutputPaths {
    fn for_input(output_dir: &Path, relative: &Path) -> Self {
        let base = relative
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = match relative.parent() {
            Some(parent) => output_dir.join(parent),
            None => output_dir.to_path_buf(),
        };
        Self {
            results: dir.join(format!("{base}_results.json")),
            report: dir.join(format!("{base}_report.md")),
            dir,
            base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn output_paths_mirror_subdirectories() {
        let out = Path::new("/out");
        let paths = OutputPaths::for_input(out, Path::new("chat.txt"));
        assert_eq!(paths.dir, PathBuf::from("/out"));
        assert_eq!(paths.results, PathBuf::from("/out/chat.txt_results.json"));
        assert_eq!(paths.report, PathBuf::from("/out/chat.txt_report.md"));
        assert_eq!(
            OutputPaths::for_input(out, Path::new("2024/log.json")).results,
            PathBuf::from("/out/2024/log.json_results.json")
        );
    }

    #[test]
    fn inputs_sharing_a_stem_get_distinct_outputs() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("in");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("chat.txt"), "User: plain\nAssistant: text").unwrap();
        fs::write(
            input.join("chat.json"),
            r#"[{"role": "user", "content": "structured"}, {"role": "assistant", "content": "export"}]"#,
        )
        .unwrap();

        let output = temp.path().join("out");
        let options = BatchOptions {
            input_dir: input,
            output_dir: output.clone(),
            recursive: false,
            jobs: Some(2),
            pretty: false,
            csv: true,
        };
        let summary = run_batch(&ConversationAnalyzer::with_defaults(), &options).unwrap();

        assert_eq!(summary.processed, 2);
        let results: HashSet<_> = summary.conversations.iter().map(|c| &c.results).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(fs::read_dir(&output).unwrap().count(), 2 * (2 + 5));

        let json = fs::read_to_string(output.join("chat.json_results.json")).unwrap();
        assert!(json.contains("structured"));
        let txt = fs::read_to_string(output.join("chat.txt_results.json")).unwrap();
        assert!(txt.contains("plain"));
        assert!(output.join("chat.txt_metrics.csv").exists());
    }

    #[test]
    fn collect_inputs_filters_and_respects_depth() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("b.txt"), "x").unwrap();
        fs::write(root.join("a.json"), "{}").unwrap();
        fs::write(root.join("notes.pdf"), "x").unwrap();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("nested/c.txt"), "x").unwrap();

        let flat = collect_inputs(root, false).unwrap();
        assert_eq!(flat, vec![root.join("a.json"), root.join("b.txt")]);

        let deep = collect_inputs(root, true).unwrap();
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&root.join("nested/c.txt")));
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let temp = tempdir().unwrap();
        assert!(collect_inputs(&temp.path().join("missing"), false).is_err());
    }

    #[test]
    fn failures_are_isolated_per_file() {
        let temp = tempdir().unwrap();
        let input = temp.path().join("in");
        fs::create_dir_all(&input).unwrap();
        fs::write(
            input.join("good.txt"),
            "User: Hello there.\nAssistant: Hi! How can I help?",
        )
        .unwrap();
        fs::write(input.join("bad.json"), "{ not json").unwrap();

        let options = BatchOptions {
            input_dir: input,
            output_dir: temp.path().join("out"),
            recursive: false,
            jobs: Some(2),
            pretty: false,
            csv: false,
        };
        let summary = run_batch(&ConversationAnalyzer::with_defaults(), &options).unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.conversations[0].source, "good.txt");
        assert_eq!(summary.conversations[0].turns, 1);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].source.ends_with("bad.json"));
        assert!(temp.path().join("out/good.txt_results.json").exists());
        assert!(temp.path().join("out/good.txt_report.md").exists());
        assert!(summary.conversations[0].tables.is_empty());
    }
}
