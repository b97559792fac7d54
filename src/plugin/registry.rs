//! Command registry and dispatcher.
//!
//! Merges every plugin's keyword declarations into one ordered
//! `keyword → (plugin, command)` table. A keyword registered twice keeps its
//! original scan position but points at the latest registration. Resolution
//! returns the first keyword, in table order, found in the utterance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

use super::Plugin;

/// How keywords are located inside an utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatching {
    /// Anywhere in the text, including inside longer words.
    #[default]
    Substring,
    /// Only where bounded by non-alphanumeric characters or the text edges.
    WordBoundary,
}

/// Target of a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRoute {
    pub plugin_id: String,
    pub command_id: String,
}

/// A successful keyword lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub plugin_id: String,
    pub command_id: String,
    /// The registry keyword found in the text.
    pub keyword: String,
}

/// A keyword whose mapping was replaced by a later registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCollision {
    pub keyword: String,
    pub previous: CommandRoute,
    pub replacement: CommandRoute,
}

/// Result of running a resolved command. Never an error: failures are
/// turned into user-facing text here.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The plugin produced a reply.
    Completed(String),
    /// The plugin reported a failure.
    Failed { response: String, error: PluginError },
    /// No plugin with the routed id is registered.
    PluginNotFound { response: String },
}

impl DispatchOutcome {
    /// Text to show or speak.
    pub fn response(&self) -> &str {
        match self {
            Self::Completed(response) => response,
            Self::Failed { response, .. } | Self::PluginNotFound { response } => response,
        }
    }

    /// Whether the plugin completed normally.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Registered plugins plus the merged keyword table.
pub struct CommandRegistry {
    plugins: Vec<Box<dyn Plugin>>,
    keywords: Vec<(String, CommandRoute)>,
    /// keyword → position in `keywords`.
    index: HashMap<String, usize>,
    collisions: Vec<KeywordCollision>,
    matching: KeywordMatching,
}

impl CommandRegistry {
    /// Create an empty registry with substring keyword matching.
    pub fn new() -> Self {
        Self::with_matching(KeywordMatching::default())
    }

    /// Create an empty registry with the given keyword matching mode.
    pub fn with_matching(matching: KeywordMatching) -> Self {
        Self {
            plugins: Vec::new(),
            keywords: Vec::new(),
            index: HashMap::new(),
            collisions: Vec::new(),
            matching,
        }
    }

    /// Build a registry from an explicit plugin list, registered in order.
    pub fn from_plugins(
        plugins: impl IntoIterator<Item = Box<dyn Plugin>>,
        matching: KeywordMatching,
    ) -> Self {
        let mut registry = Self::with_matching(matching);
        for plugin in plugins {
            registry.register(plugin);
        }
        registry
    }

    /// Register a plugin and merge its keywords.
    ///
    /// A plugin with the same id replaces the old one. A keyword that is
    /// already mapped is overwritten (last registration wins) and recorded
    /// in [`collisions`](Self::collisions).
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        let plugin_id = plugin.id().to_string();
        for spec in plugin.commands() {
            for keyword in &spec.keywords {
                let keyword = keyword.to_lowercase();
                if keyword.is_empty() {
                    continue;
                }
                let route = CommandRoute {
                    plugin_id: plugin_id.clone(),
                    command_id: spec.id.clone(),
                };
                match self.index.get(&keyword) {
                    Some(&slot) => {
                        let previous = std::mem::replace(&mut self.keywords[slot].1, route.clone());
                        if previous != route {
                            tracing::debug!(
                                %keyword,
                                previous = %format!("{}/{}", previous.plugin_id, previous.command_id),
                                replacement = %format!("{}/{}", route.plugin_id, route.command_id),
                                "keyword remapped"
                            );
                            self.collisions.push(KeywordCollision {
                                keyword,
                                previous,
                                replacement: route,
                            });
                        }
                    }
                    None => {
                        self.index.insert(keyword.clone(), self.keywords.len());
                        self.keywords.push((keyword, route));
                    }
                }
            }
        }

        match self.plugins.iter().position(|p| p.id() == plugin_id) {
            Some(pos) => self.plugins[pos] = plugin,
            None => self.plugins.push(plugin),
        }
        tracing::debug!(plugin = %plugin_id, keywords = self.keywords.len(), "registered plugin");
    }

    /// Find the first registered keyword contained in `text`.
    pub fn resolve(&self, text: &str) -> Option<ResolvedCommand> {
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .find(|(keyword, _)| match self.matching {
                KeywordMatching::Substring => lower.contains(keyword.as_str()),
                KeywordMatching::WordBoundary => contains_word(&lower, keyword),
            })
            .map(|(keyword, route)| ResolvedCommand {
                plugin_id: route.plugin_id.clone(),
                command_id: route.command_id.clone(),
                keyword: keyword.clone(),
            })
    }

    /// Run `command_id` on `plugin_id`, containing any failure.
    pub fn dispatch(&self, plugin_id: &str, command_id: &str, text: &str) -> DispatchOutcome {
        let Some(plugin) = self.plugin(plugin_id) else {
            tracing::warn!(plugin = plugin_id, command = command_id, "dispatch to unknown plugin");
            return DispatchOutcome::PluginNotFound {
                response: format!("죄송해요, '{plugin_id}' 플러그인을 찾을 수 없어요."),
            };
        };

        match plugin.execute(command_id, text) {
            Ok(response) => DispatchOutcome::Completed(response),
            Err(error) => {
                tracing::warn!(
                    plugin = plugin_id,
                    command = command_id,
                    error = %error,
                    "plugin command failed"
                );
                DispatchOutcome::Failed {
                    response: format!("명령을 실행하는 중 오류가 발생했어요: {error}"),
                    error,
                }
            }
        }
    }

    /// Whether the routed command ends the assistant loop.
    pub fn is_stop_command(&self, plugin_id: &str, command_id: &str) -> bool {
        self.plugin(plugin_id)
            .is_some_and(|p| p.is_stop_command(command_id))
    }

    /// Get a plugin by id.
    pub fn plugin(&self, id: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.as_ref())
    }

    /// Registered plugins in registration order.
    pub fn plugins(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    /// The keyword table in scan order.
    pub fn keywords(&self) -> impl Iterator<Item = (&str, &CommandRoute)> {
        self.keywords.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Every keyword overwrite seen so far.
    pub fn collisions(&self) -> &[KeywordCollision] {
        &self.collisions
    }

    /// Active keyword matching mode.
    pub fn matching(&self) -> KeywordMatching {
        self.matching
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("plugins", &self.plugins.iter().map(|p| p.id()).collect::<Vec<_>>())
            .field("keywords", &self.keywords.len())
            .field("matching", &self.matching)
            .finish()
    }
}

/// `needle` occurs in `haystack` with no alphanumeric neighbour on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
