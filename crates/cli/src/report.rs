use crate::output::AnalysisDocument;
use emergence_metrics::{Distribution, ParityGroup};

const PREVIEW_CHARS: usize = 120;

pub fn render_conversation_report(doc: &AnalysisDocument) -> String {
    let summary = &doc.summary;
    let emergence = &summary.emergence;

    let mut md = String::new();
    md.push_str("# Emergence report\n\n");
    md.push_str(&format!("- Source: `{}`\n", doc.source));
    md.push_str(&format!("- Segmentation: `{}`\n", doc.analysis.strategy.as_str()));
    md.push_str(&format!("- Turns: `{}`\n", summary.rows));
    md.push_str(&format!("- Hot threshold: `{:.2}`\n\n", summary.hot_threshold));

    md.push_str("## Scores\n\n");
    md.push_str("| score | mean | median | min | max | q1 | q3 | hot_share |\n");
    md.push_str("|---|---:|---:|---:|---:|---:|---:|---:|\n");
    md.push_str(&format!(
        "| emergence | {} | {} | {} | {} | {} | {} | {} |\n",
        cell(emergence.distribution.mean),
        cell(emergence.distribution.median),
        cell(emergence.distribution.min),
        cell(emergence.distribution.max),
        cell(emergence.q1),
        cell(emergence.q3),
        cell(emergence.hot_share),
    ));
    md.push_str(&format!(
        "| legacy | {} | {} | {} | {} | n/a | n/a | n/a |\n\n",
        cell(summary.legacy.mean),
        cell(summary.legacy.median),
        cell(summary.legacy.min),
        cell(summary.legacy.max),
    ));

    md.push_str("## Emergence by assistant length\n\n");
    md.push_str("| bin | count | mean | median | min | max |\n");
    md.push_str("|---|---:|---:|---:|---:|---:|\n");
    for bin in &summary.length_bins {
        md.push_str(&format!(
            "| `{}` | {} |\n",
            bin.bin.as_str(),
            distribution_cells(&bin.emergence)
        ));
    }
    md.push('\n');

    md.push_str("## Turn parity\n\n");
    md.push_str("| parity | count | mean | hot_share |\n");
    md.push_str("|---|---:|---:|---:|\n");
    md.push_str(&parity_row("even", &summary.even));
    md.push_str(&parity_row("odd", &summary.odd));
    md.push('\n');

    md.push_str("## Negative control (prompt rotation)\n\n");
    match (&summary.control, &doc.analysis.control) {
        (Some(control), Some(series)) => {
            md.push_str(&format!("- Rotation shift: `{}`\n", series.shift));
            md.push_str(&format!("- Control mean: `{}`\n", cell(control.mean)));
            md.push_str(&format!("- Control hot share: `{}`\n", cell(control.hot_share)));
            md.push_str(&format!(
                "- Δ mean (emergence - control): `{}`\n",
                cell(control.delta_mean)
            ));
            if series.is_self_paired() {
                md.push_str("- Rotation reduces to self-pairing: control is not informative\n");
            }
        }
        _ => md.push_str("- No turns to rotate\n"),
    }
    md.push('\n');

    md.push_str("## Top turns\n\n");
    md.push_str("| turn | emergence | hot | legacy | bin | assistant |\n");
    md.push_str("|---:|---:|---|---:|---|---|\n");
    for top in &summary.top_turns {
        let assistant = doc
            .analysis
            .metrics
            .iter()
            .find(|m| m.index == top.index)
            .map(|m| m.assistant.as_str())
            .unwrap_or_default();
        md.push_str(&format!(
            "| {} | `{:.3}` | {} | `{:.2}` | `{}` | {} |\n",
            top.index,
            top.emergence_score,
            if top.hot { "yes" } else { "no" },
            top.legacy_presence,
            top.assistant_len_bin.as_str(),
            preview_cell(assistant, PREVIEW_CHARS),
        ));
    }

    md
}

fn cell(value: Option<f64>) -> String {
    value.map_or("n/a".to_string(), |v| format!("{v:.3}"))
}

fn distribution_cells(stats: &Distribution) -> String {
    format!(
        "{} | {} | {} | {} | {}",
        stats.count,
        cell(stats.mean),
        cell(stats.median),
        cell(stats.min),
        cell(stats.max)
    )
}

fn parity_row(label: &str, group: &ParityGroup) -> String {
    format!(
        "| {label} | {} | {} | {} |\n",
        group.count,
        cell(group.mean),
        cell(group.hot_share)
    )
}

/// Single-line table cell preview, cut at a word boundary when over `max_chars`.
fn preview_cell(text: &str, max_chars: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let flat = words.join(" ");
    let preview = if flat.chars().count() <= max_chars {
        flat
    } else {
        let budget = max_chars.saturating_sub(1);
        let mut kept = String::new();
        let mut kept_chars = 0;
        for word in &words {
            let extra = word.chars().count() + usize::from(kept_chars > 0);
            if kept_chars + extra > budget {
                break;
            }
            if kept_chars > 0 {
                kept.push(' ');
            }
            kept.push_str(word);
            kept_chars += extra;
        }
        // a single word longer than the budget is cut mid-word
        if kept.is_empty() {
            kept = flat.chars().take(budget).collect();
        }
        format!("{kept}…")
    };
    preview.replace('|', "\\|")
}
