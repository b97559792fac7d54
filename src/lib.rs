// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # voxroute
//!
//! Routing core for a voice assistant: turns a transcribed utterance into
//! a command dispatched to a plugin, plus a spoken reply.
//!
//! ## Architecture
//!
//! - **Intent engine** (`nlu`): regex-scored intent classification, entity
//!   extraction, emotion tagging, templated replies, runtime pattern learning
//! - **Command registry** (`plugin`): keyword → (plugin, command) routing with
//!   failure-contained dispatch
//! - **Orchestrator** (`orchestrator`): confidence gating, keyword fallback,
//!   run state, and a bounded conversation context
//! - **Configuration** (`config`, `paths`): TOML config under XDG directories
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! use voxroute::config::AssistantConfig;
//! use voxroute::orchestrator::Orchestrator;
//!
//! let config = AssistantConfig::default();
//! let mut assistant = Orchestrator::from_config(&config, Path::new("patterns.json"));
//! let turn = assistant.handle("코드를 정리해줘").unwrap();
//! println!("{}", turn.response());
//! ```

pub mod config;
pub mod error;
pub mod nlu;
pub mod orchestrator;
pub mod paths;
pub mod plugin;
