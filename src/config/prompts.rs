//! Prompt templates for callcoach.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

/// A `{{name}}` placeholder.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub analyzer: AgentPrompt,
    pub coach: AgentPrompt,
    pub objection: AgentPrompt,
    /// Prompt for tagging raw transcripts with speakers.
    pub labeling: LabelingPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            analyzer: AgentPrompt::analyzer(),
            coach: AgentPrompt::coach(),
            objection: AgentPrompt::objection(),
            labeling: LabelingPrompts::default(),
            variables: HashMap::new(),
        }
    }
}

/// System and user template for one analysis agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AgentPrompt {
    pub system: String,
    pub user: String,
}

impl AgentPrompt {
    fn analyzer() -> Self {
        Self {
            system: r#"You analyze sales call transcripts. Lines are tagged "Customer:" or "Rep:".

Identify the subjects discussed and what the customer needs. Rate the engagement and quality of the conversation from 0 to 10.

Respond with a JSON object only:
{"topics": ["..."], "customer_needs": ["..."], "score": 0.0}

Rules:
- topics are short noun phrases ("pricing", "ROI")
- customer_needs come only from what the customer said
- score is a number between 0 and 10"#
                .to_string(),
            user: r#"Transcript:
{{transcript}}"#
                .to_string(),
        }
    }

    fn coach() -> Self {
        Self {
            system: r#"You are a sales coach reviewing a call transcript. Lines are tagged "Customer:" or "Rep:".

Use the knowledge base when it is provided; when it is empty, rely on the transcript alone.

Respond with a JSON object only:
{"what_went_well": ["..."], "improvements": ["..."], "closing_score": 0.0}

Rules:
- each entry is one short, self-contained observation about the rep
- an observation never appears in both lists
- both lists contain at least one entry
- closing_score (0 to 10) rates how well the rep moved the deal toward a close"#
                .to_string(),
            user: r#"Knowledge base:
{{knowledge}}

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }

    fn objection() -> Self {
        Self {
            system: r#"You are an objection-handling expert reviewing a sales call. Lines are tagged "Customer:" or "Rep:".

Detect objections raised by the customer and recommend next actions for the rep.

Respond with a JSON object only:
{"objections_detected": ["..."], "next_actions": ["..."]}

Rules:
- objections_detected uses short lowercase categories such as "budget", "timing", "authority", "trust", "competition", "need"
- an empty objections_detected list is valid
- next_actions is ordered by priority, most important first, and is never empty"#
                .to_string(),
            user: r#"Knowledge base:
{{knowledge}}

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

/// Prompts for speaker labeling of raw transcripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingPrompts {
    pub system: String,
}

impl Default for LabelingPrompts {
    fn default() -> Self {
        Self {
            system: r#"You receive the raw transcript of a recorded sales call between a sales representative and a customer.

Rewrite it as dialogue, one turn per line, each line starting with "Customer: " or "Rep: ".

Rules:
- Keep the spoken words; fix punctuation only
- Never add content that was not spoken
- The rep is the person presenting the product, pricing, or next steps

Respond with a JSON object: {"lines": ["Customer: ...", "Rep: ..."]}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let analyzer_path = custom_path.join("analyzer.toml");
            if analyzer_path.exists() {
                let content = std::fs::read_to_string(&analyzer_path)?;
                prompts.analyzer = toml::from_str(&content)?;
            }

            let coach_path = custom_path.join("coach.toml");
            if coach_path.exists() {
                let content = std::fs::read_to_string(&coach_path)?;
                prompts.coach = toml::from_str(&content)?;
            }

            let objection_path = custom_path.join("objection.toml");
            if objection_path.exists() {
                let content = std::fs::read_to_string(&objection_path)?;
                prompts.objection = toml::from_str(&content)?;
            }

            let labeling_path = custom_path.join("labeling.toml");
            if labeling_path.exists() {
                let content = std::fs::read_to_string(&labeling_path)?;
                prompts.labeling = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are replaced in a single pass over the template, so text
    /// inside a substituted value is never expanded. Unknown placeholders are
    /// left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.analyzer.user.contains("{{transcript}}"));
        assert!(prompts.coach.user.contains("{{knowledge}}"));
        assert!(prompts.objection.system.contains("next_actions"));
        assert!(!prompts.labeling.system.is_empty());
    }

    #[test]
    fn test_render_prefers_provided_vars() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("product".to_string(), "Acme CRM".to_string());
        prompts
            .variables
            .insert("transcript".to_string(), "stale".to_string());

        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), "Customer: hi".to_string());

        let rendered = prompts.render_with_custom("{{product}} / {{transcript}}", &vars);
        assert_eq!(rendered, "Acme CRM / Customer: hi");
    }

    #[test]
    fn test_substituted_values_are_not_expanded() {
        let mut vars = HashMap::new();
        vars.insert(
            "transcript".to_string(),
            "Customer: what is {{knowledge}}?".to_string(),
        );
        vars.insert("knowledge".to_string(), "Lead with ROI.".to_string());

        let rendered = Prompts::render("{{transcript}}\n{{knowledge}}\n{{missing}}", &vars);
        assert_eq!(
            rendered,
            "Customer: what is {{knowledge}}?\nLead with ROI.\n{{missing}}"
        );
    }

    #[test]
    fn test_custom_dir_overrides_single_prompt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("coach.toml"),
            "system = \"Be brief.\"\nuser = \"{{transcript}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.coach.system, "Be brief.");
        assert_eq!(prompts.analyzer.system, AgentPrompt::analyzer().system);
    }
}
