//! One request/response cycle: classify, gate on confidence, resolve, dispatch.
//!
//! Confident classifications are routed through a fixed intent → keyword
//! table. Anything else falls back to scanning the raw utterance for a
//! registry keyword. A dispatched stop command moves the orchestrator to
//! [`RunState::Stopped`], after which [`Orchestrator::handle`] refuses input.

use std::path::Path;

use serde::Serialize;

use crate::config::AssistantConfig;
use crate::error::OrchestratorError;
use crate::nlu::{
    CLARIFICATION, ClassificationResult, ConversationContext, IntentEngine, PatternStore,
};
use crate::plugin::builtin::default_plugins;
use crate::plugin::{CommandRegistry, DispatchOutcome, ResolvedCommand};

/// Canonical registry keyword for each intent that maps to a command.
const INTENT_KEYWORDS: &[(&str, &str)] = &[
    ("refactor", "refactor"),
    ("sync", "sync"),
    ("stop", "stop"),
    ("help", "help"),
    ("status", "status"),
];

/// Keyword for `intent`, if it has one.
pub fn intent_keyword(intent: &str) -> Option<&'static str> {
    INTENT_KEYWORDS
        .iter()
        .find(|(i, _)| *i == intent)
        .map(|(_, k)| *k)
}

/// Lifecycle of the orchestrator. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Stopped,
}

/// Telemetry status of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Success,
    Failed,
    Warning,
}

impl std::fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// How the command for a turn was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Confident intent mapped to its canonical keyword.
    Intent,
    /// Registry keyword found in the raw utterance.
    Keyword,
    /// Confident intent answered by its template alone.
    Reply,
    /// Nothing matched.
    Unresolved,
}

/// Outcome of one utterance.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Messages to speak, in order.
    pub segments: Vec<String>,
    /// False once a stop command has been dispatched.
    pub keep_running: bool,
    pub status: TurnStatus,
    pub route: RouteKind,
    pub classification: ClassificationResult,
    pub command: Option<ResolvedCommand>,
}

impl Turn {
    /// All segments joined with newlines.
    pub fn response(&self) -> String {
        self.segments.join("\n")
    }
}

/// Fire-and-forget notification about a finished turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnEvent {
    pub utterance: String,
    pub status: TurnStatus,
}

/// Receives turn notifications. Return values are never consulted.
pub trait TurnObserver: Send + Sync {
    fn notify(&self, event: &TurnEvent);
}

/// Reports turns through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TurnObserver for TracingObserver {
    fn notify(&self, event: &TurnEvent) {
        match event.status {
            TurnStatus::Failed => {
                tracing::warn!(utterance = %event.utterance, status = %event.status, "turn")
            }
            _ => tracing::info!(utterance = %event.utterance, status = %event.status, "turn"),
        }
    }
}

/// Composes the intent engine, command registry, and context window.
pub struct Orchestrator {
    engine: IntentEngine,
    registry: CommandRegistry,
    context: ConversationContext,
    observers: Vec<Box<dyn TurnObserver>>,
    threshold: f64,
    state: RunState,
}

impl Orchestrator {
    /// Assemble an orchestrator using `config` for threshold and context size.
    pub fn new(engine: IntentEngine, registry: CommandRegistry, config: &AssistantConfig) -> Self {
        Self {
            engine,
            registry,
            context: ConversationContext::new(config.context_capacity),
            observers: Vec::new(),
            threshold: config.confidence_threshold,
            state: RunState::Running,
        }
    }

    /// The standard assembly: patterns from `patterns_path`, the built-in
    /// plugins, and a [`TracingObserver`].
    pub fn from_config(config: &AssistantConfig, patterns_path: &Path) -> Self {
        let engine = IntentEngine::with_store(PatternStore::new(patterns_path), config.response_seed);
        let registry = CommandRegistry::from_plugins(default_plugins(config), config.keyword_matching);
        Self::new(engine, registry, config).with_observer(Box::new(TracingObserver))
    }

    /// Add a turn observer.
    pub fn with_observer(mut self, observer: Box<dyn TurnObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Process one utterance.
    ///
    /// Every collaborator failure is folded into the returned [`Turn`]; the
    /// only error is calling this after the orchestrator has stopped.
    pub fn handle(&mut self, text: &str) -> Result<Turn, OrchestratorError> {
        if self.state == RunState::Stopped {
            return Err(OrchestratorError::Stopped);
        }

        let text = text.trim();
        let classification = self.engine.analyze(text);

        let mut turn = match self.route_by_intent(&classification) {
            Some(IntentRoute::Command(command)) => {
                self.run_command(text, command, RouteKind::Intent, &classification)
            }
            Some(IntentRoute::Reply) => Turn {
                segments: vec![classification.response.clone()],
                keep_running: true,
                status: TurnStatus::Success,
                route: RouteKind::Reply,
                classification: classification.clone(),
                command: None,
            },
            None => match self.registry.resolve(text) {
                Some(command) => {
                    self.run_command(text, command, RouteKind::Keyword, &classification)
                }
                None => Turn {
                    segments: vec![CLARIFICATION.to_string()],
                    keep_running: true,
                    status: TurnStatus::Failed,
                    route: RouteKind::Unresolved,
                    classification: classification.clone(),
                    command: None,
                },
            },
        };

        if !turn.keep_running {
            self.state = RunState::Stopped;
        }
        turn.classification = classification;
        self.context.append(text);

        let event = TurnEvent {
            utterance: text.to_string(),
            status: turn.status,
        };
        for observer in &self.observers {
            observer.notify(&event);
        }
        Ok(turn)
    }

    /// Confident intent → command through its canonical keyword, or a plain
    /// reply when the intent has no keyword. `None` means use the raw-text path.
    fn route_by_intent(&self, classification: &ClassificationResult) -> Option<IntentRoute> {
        if classification.confidence <= self.threshold {
            return None;
        }
        let intent = classification.intent.as_deref()?;
        let Some(keyword) = intent_keyword(intent) else {
            return Some(IntentRoute::Reply);
        };
        match self.registry.resolve(keyword) {
            Some(command) => Some(IntentRoute::Command(command)),
            None => {
                tracing::debug!(intent, keyword, "intent keyword not registered, using raw text");
                None
            }
        }
    }

    fn run_command(
        &self,
        text: &str,
        command: ResolvedCommand,
        route: RouteKind,
        classification: &ClassificationResult,
    ) -> Turn {
        let outcome = self
            .registry
            .dispatch(&command.plugin_id, &command.command_id, text);
        let stop = self
            .registry
            .is_stop_command(&command.plugin_id, &command.command_id);

        let mut segments = Vec::with_capacity(2);
        if route == RouteKind::Intent {
            segments.push(classification.response.clone());
        }
        if segments.last().map(String::as_str) != Some(outcome.response()) {
            segments.push(outcome.response().to_string());
        }

        let status = match (&outcome, route) {
            (DispatchOutcome::Completed(_), RouteKind::Intent) => TurnStatus::Success,
            (DispatchOutcome::Completed(_), _) => TurnStatus::Warning,
            _ => TurnStatus::Failed,
        };

        tracing::debug!(
            plugin = %command.plugin_id,
            command = %command.command_id,
            keyword = %command.keyword,
            ?route,
            %status,
            "dispatched"
        );

        Turn {
            segments,
            keep_running: !stop,
            status,
            route,
            classification: classification.clone(),
            command: Some(command),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Recent utterances, oldest first.
    pub fn context_snapshot(&self) -> Vec<String> {
        self.context.snapshot()
    }

    /// The intent engine, e.g. for `learn`.
    pub fn engine_mut(&mut self) -> &mut IntentEngine {
        &mut self.engine
    }

    /// The command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engine", &self.engine)
            .field("registry", &self.registry)
            .field("threshold", &self.threshold)
            .field("state", &self.state)
            .finish()
    }
}

enum IntentRoute {
    Command(ResolvedCommand),
    Reply,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::{PluginError, PluginResult};
    use crate::nlu::IntentTable;
    use crate::plugin::builtin::SystemPlugin;
    use crate::plugin::{CommandSpec, KeywordMatching, Plugin};

    fn orchestrator() -> Orchestrator {
        let config = AssistantConfig::default();
        let engine = IntentEngine::new(IntentTable::defaults(), Some(3));
        let registry = CommandRegistry::from_plugins(default_plugins(&config), config.keyword_matching);
        Orchestrator::new(engine, registry, &config)
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<TurnEvent>>>);

    impl TurnObserver for Recorder {
        fn notify(&self, event: &TurnEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn every_intent_keyword_resolves_to_a_builtin() {
        let orch = orchestrator();
        for (intent, keyword) in INTENT_KEYWORDS {
            let hit = orch.registry().resolve(keyword).unwrap();
            assert_eq!(&hit.command_id, intent);
        }
    }

    #[test]
    fn greeting_is_answered_by_template() {
        let mut orch = orchestrator();
        let turn = orch.handle("hello").unwrap();
        assert_eq!(turn.route, RouteKind::Reply);
        assert_eq!(turn.status, TurnStatus::Success);
        assert_eq!(turn.segments.len(), 1);
        assert!(turn.command.is_none());
    }

    #[test]
    fn low_confidence_uses_keyword_fallback() {
        let mut orch = orchestrator();
        // "상태" matches only as part of a longer word: bonus-only confidence.
        let turn = orch.handle("상태는?").unwrap();
        assert!(turn.classification.confidence <= 0.5);
        assert_eq!(turn.route, RouteKind::Keyword);
        assert_eq!(turn.status, TurnStatus::Warning);
        assert_eq!(turn.command.unwrap().command_id, "status");
        assert_eq!(turn.segments.len(), 1);
    }

    #[test]
    fn observers_receive_every_turn() {
        let recorder = Recorder::default();
        let mut orch = orchestrator().with_observer(Box::new(recorder.clone()));
        orch.handle("hello").unwrap();
        orch.handle("xyzzy").unwrap();
        let events = recorder.0.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, TurnStatus::Success);
        assert_eq!(events[1].status, TurnStatus::Failed);
        assert_eq!(events[1].utterance, "xyzzy");
    }

    #[test]
    fn context_records_trimmed_utterances() {
        let mut orch = orchestrator();
        orch.handle("  hello  ").unwrap();
        assert_eq!(orch.context_snapshot(), vec!["hello".to_string()]);
    }

    struct EchoPlugin;

    impl Plugin for EchoPlugin {
        fn id(&self) -> &str {
            "Echo"
        }
        fn description(&self) -> &str {
            "repeats the help template"
        }
        fn commands(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("help", &["help"])]
        }
        fn execute(&self, _command: &str, _text: &str) -> PluginResult<String> {
            Ok("코드 정리, 동기화, 상태 확인 같은 일을 도와드릴 수 있어요.".into())
        }
    }

    #[test]
    fn identical_plugin_reply_is_not_repeated() {
        let config = AssistantConfig::default();
        let engine = IntentEngine::new(IntentTable::defaults(), Some(0));
        let registry = CommandRegistry::from_plugins(
            [Box::new(EchoPlugin) as Box<dyn Plugin>],
            KeywordMatching::Substring,
        );
        let mut orch = Orchestrator::new(engine, registry, &config);
        let turn = orch.handle("help").unwrap();
        assert_eq!(turn.route, RouteKind::Intent);
        assert_eq!(turn.segments.len(), 1);
    }

    struct FailingStop;

    impl Plugin for FailingStop {
        fn id(&self) -> &str {
            "FailingStop"
        }
        fn description(&self) -> &str {
            "a stop command that fails"
        }
        fn commands(&self) -> Vec<CommandSpec> {
            vec![CommandSpec::new("stop", &["stop"])]
        }
        fn execute(&self, command: &str, _text: &str) -> PluginResult<String> {
            Err(PluginError::execution("FailingStop", command, "cleanup failed"))
        }
        fn is_stop_command(&self, command: &str) -> bool {
            command == "stop"
        }
    }

    #[test]
    fn failing_stop_command_still_stops() {
        let config = AssistantConfig::default();
        let engine = IntentEngine::new(IntentTable::defaults(), Some(0));
        let registry = CommandRegistry::from_plugins(
            [
                Box::new(SystemPlugin::new()) as Box<dyn Plugin>,
                Box::new(FailingStop),
            ],
            KeywordMatching::Substring,
        );
        let mut orch = Orchestrator::new(engine, registry, &config);
        let turn = orch.handle("stop").unwrap();
        assert_eq!(turn.status, TurnStatus::Failed);
        assert!(!turn.keep_running);
        assert_eq!(orch.state(), RunState::Stopped);
    }
}
