//! CLI output formatting utilities.

use crate::agents::AgentKind;
use crate::report::{AgentStatus, AnalysisReport};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a 0-10 score, colored by band.
    pub fn score(label: &str, value: f64) {
        let text = format!("{:.1}/10", value);
        let styled = if value >= 7.0 {
            style(text).green().bold()
        } else if value >= 4.0 {
            style(text).yellow().bold()
        } else {
            style(text).red().bold()
        };
        println!("  {}: {}", style(label).dim(), styled);
    }

    /// Print a titled list, or a placeholder when it is empty.
    pub fn section(title: &str, items: &[String]) {
        Self::header(title);
        if items.is_empty() {
            println!("  {}", style("(none)").dim());
        }
        for item in items {
            Self::list_item(item);
        }
    }

    /// Print a human-readable analysis report.
    pub fn report(report: &AnalysisReport) {
        let summary = &report.executive_summary;

        Self::header("Call Analysis");
        Self::kv("File", &format!("{} ({} bytes)", report.filename, report.filesize));
        Self::kv("Analyzed", &report.timestamp.to_rfc3339());
        Self::score("Overall", summary.overall_score);
        Self::score("Engagement", report.agents.transcript_analyzer.result.score);
        Self::score("Closing", report.agents.sales_coach.result.closing_score);

        let analysis = &report.agents.transcript_analyzer.result;
        Self::kv("Topics", &join_or_none(&analysis.topics));
        Self::kv("Customer needs", &join_or_none(&analysis.customer_needs));

        Self::section("What Went Well", &summary.what_went_well);
        Self::section("Improvements", &summary.improvements);
        Self::section("Missed Opportunities", &summary.missed_opportunities);
        Self::section("Recommended Actions", &summary.recommended_actions);

        let agents = [
            (AgentKind::TranscriptAnalyzer, report.agents.transcript_analyzer.status, &report.agents.transcript_analyzer.error),
            (AgentKind::SalesCoach, report.agents.sales_coach.status, &report.agents.sales_coach.error),
            (AgentKind::ObjectionExpert, report.agents.objection_expert.status, &report.agents.objection_expert.error),
        ];
        for (kind, status, error) in agents {
            if status == AgentStatus::Degraded {
                Self::warning(&format!(
                    "{} unavailable, neutral defaults used: {}",
                    kind.title(),
                    error.as_deref().unwrap_or("unknown error")
                ));
            }
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
