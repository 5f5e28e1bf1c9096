//! Analyze command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::knowledge::KnowledgeContext;
use crate::orchestrator::Orchestrator;
use crate::report::AnalysisReport;
use crate::transcription::{SourceRouter, TextSource, TranscriptSource, UploadKind};
use anyhow::Result;
use std::path::Path;

/// Run the analyze command.
pub async fn run_analyze(
    input: &str,
    text: bool,
    knowledge: Option<&str>,
    json: bool,
    settings: &Settings,
) -> Result<()> {
    let as_text = text || UploadKind::from_filename(input) == UploadKind::Text;
    let operation = if as_text {
        Operation::AnalyzeText
    } else {
        Operation::AnalyzeRecording
    };

    // Pre-flight checks
    if let Err(e) = preflight::check(operation, settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let report = match analyze_file(input, as_text, knowledge, json, settings).await {
        Ok(report) => report,
        Err(e) => {
            Output::error(&format!("Analysis failed: {}", e));
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Output::report(&report);
        println!();
    }

    Ok(())
}

async fn analyze_file(
    input: &str,
    as_text: bool,
    knowledge: Option<&str>,
    quiet: bool,
    settings: &Settings,
) -> Result<AnalysisReport> {
    let path = Settings::expand_path(input);
    let bytes = std::fs::read(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let filename = file_name(&path, input);

    let knowledge = match knowledge {
        Some(playbook) => KnowledgeContext::load(&Settings::expand_path(playbook))?,
        None => KnowledgeContext::from_settings(settings)?,
    };

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let orchestrator = Orchestrator::from_settings(settings, &prompts)?;

    let source: Box<dyn TranscriptSource> = if as_text {
        Box::new(TextSource)
    } else {
        let router = SourceRouter::from_settings(settings, &prompts)?;
        if !quiet {
            Output::info(&format!("Transcribing with {}", router.audio_provider()));
        }
        Box::new(router)
    };

    let spinner = (!quiet).then(|| Output::spinner(&format!("Analyzing {}...", filename)));
    let result = orchestrator
        .analyze_recording(source.as_ref(), &bytes, &filename, &knowledge)
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    Ok(result?)
}

fn file_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}
