//! Callcoach - Multi-agent sales call analysis
//!
//! Turns a recorded or transcribed sales call into a structured coaching
//! report. Three independent agents examine the same transcript and their
//! findings are merged into an executive summary.
//!
//! # Overview
//!
//! Callcoach allows you to:
//! - Transcribe call recordings, or analyze ready-made text transcripts
//! - Extract topics, customer needs and an engagement score
//! - Get coaching feedback and a closing score for the sales rep
//! - Detect customer objections and get prioritized next actions
//! - Serve all of the above over HTTP
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `transcription` - Recording and text upload to [`transcription::Transcript`]
//! - `knowledge` - Sales playbook context shared by the agents
//! - `agents` - The three analysis agents and their result types
//! - `aggregate` - Executive summary built from agent results
//! - `report` - The analysis report
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use callcoach::knowledge::KnowledgeContext;
//! use callcoach::orchestrator::{AgentSet, Orchestrator};
//! use callcoach::report::FileMetadata;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(AgentSet::heuristic());
//!     let transcript = "Customer: Budget is tight.\nRep: It pays back in 6 months.";
//!
//!     let report = orchestrator
//!         .run(transcript, &KnowledgeContext::empty(), FileMetadata::new("call.txt", 60))
//!         .await?;
//!     println!("Overall score: {}", report.executive_summary.overall_score);
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod openai;
pub mod orchestrator;
pub mod report;
pub mod transcription;

pub use error::{CoachError, Result};
