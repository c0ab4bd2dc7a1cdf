// rxscan entry point
// Prescription text in, one JSON clinical record out.

use anyhow::Context;
use clap::Parser;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use rxscan_core::logging::{self, LogFormat};
use rxscan_core::text_extract;
use rxscan_core::{extract_clinical_data, ClinicalExtractor, ExtractorConfig, FailurePolicy};

#[derive(Debug, Parser)]
#[command(name = "rxscan")]
#[command(about = "Extract medicines, activities and vitals from prescription text")]
struct Cli {
    /// Prescription text. With no text and no --input, prints an empty record.
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Read the text from a file (txt, md, csv, json, pdf, docx). Use '-' for stdin.
    #[arg(
        long,
        short = 'i',
        value_name = "FILE",
        value_hint = clap::ValueHint::FilePath,
        conflicts_with = "text"
    )]
    input: Option<PathBuf>,

    /// Read stdin line by line and write one JSON record per line.
    #[arg(long, conflicts_with_all = ["text", "input"])]
    lines: bool,

    /// Indent the JSON output (ignored with --lines).
    #[arg(long)]
    pretty: bool,

    /// Collapse repeated mentions with the same text and category.
    #[arg(long)]
    dedupe: bool,

    /// Return vitals only instead of failing when the recognizer is unavailable.
    #[arg(long)]
    regex_only_fallback: bool,

    /// Log format written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn apply_overrides(&self, config: &mut ExtractorConfig) {
        if self.dedupe {
            config.dedupe_spans = true;
        }
        if self.regex_only_fallback {
            config.on_recognizer_failure = FailurePolicy::RegexOnly;
        }
    }

    /// The text to process: `--input` wins, then TEXT, else none.
    fn input_text(&self) -> anyhow::Result<Option<String>> {
        match self.input {
            Some(ref path) => text_extract::read_input(path)
                .map(Some)
                .with_context(|| format!("reading {}", path.display())),
            None => Ok(self.text.clone()),
        }
    }

    /// Produce the single JSON document for the non-streaming modes
    fn render(&self, config: ExtractorConfig) -> anyhow::Result<String> {
        let text = self.input_text()?;
        Ok(extract_clinical_data(text.as_deref(), config, self.pretty)?)
    }
}

/// Write one compact JSON record per input line. Stops at the first failing line.
fn write_lines<R: BufRead, W: Write>(
    extractor: &ClinicalExtractor,
    input: R,
    out: W,
) -> anyhow::Result<usize> {
    let mut out = BufWriter::new(out);
    let mut count = 0usize;

    for line in input.lines() {
        let line = line.context("reading stdin")?;
        let json = extractor
            .extract_json(&line, false)
            .with_context(|| format!("extracting line {}", count + 1))?;
        writeln!(out, "{}", json)?;
        count += 1;
    }

    out.flush()?;
    info!(
        "Processed {} lines (dedupe: {})",
        count,
        extractor.config().dedupe_spans
    );
    Ok(count)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format)?;

    let mut config = ExtractorConfig::from_env().context("loading configuration")?;
    cli.apply_overrides(&mut config);

    if cli.lines {
        let extractor = ClinicalExtractor::new(config);
        write_lines(&extractor, std::io::stdin().lock(), std::io::stdout().lock())?;
        return Ok(());
    }

    let json = cli.render(config)?;
    println!("{}", json);
    Ok(())
}
