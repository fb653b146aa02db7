use anyhow::Result;
use emergence_metrics::{ConversationAnalysis, ConversationAnalyzer, ConversationSummary};
use serde::Serialize;
use std::io::{self, Write};

/// JSON document written for one analyzed conversation
#[derive(Debug, Serialize)]
pub struct AnalysisDocument {
    pub source: String,
    #[serde(flatten)]
    pub analysis: ConversationAnalysis,
    pub summary: ConversationSummary,
}

impl AnalysisDocument {
    pub fn build(analyzer: &ConversationAnalyzer, source: impl Into<String>, text: &str) -> Self {
        let analysis = analyzer.analyze_transcript(text);
        let summary = analyzer.summarize(&analysis);
        Self {
            source: source.into(),
            analysis,
            summary,
        }
    }
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Print `text` and a trailing newline; a closed pipe (`| head`) is not an error.
pub fn print_stdout(text: &str) -> Result<()> {
    emit_line(&mut io::stdout().lock(), text)
}

fn emit_line(out: &mut impl Write, text: &str) -> Result<()> {
    match writeln!(out, "{text}").and_then(|()| out.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe(io::ErrorKind);

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn emits_text_with_newline() {
        let mut buf = Vec::new();
        emit_line(&mut buf, "{\"rows\":0}").unwrap();
        assert_eq!(buf, b"{\"rows\":0}\n");
    }

    #[test]
    fn broken_pipe_is_ignored_other_errors_are_not() {
        assert!(emit_line(&mut ClosedPipe(io::ErrorKind::BrokenPipe), "x").is_ok());
        assert!(emit_line(&mut ClosedPipe(io::ErrorKind::PermissionDenied), "x").is_err());
    }
}
