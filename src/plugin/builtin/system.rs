//! Assistant lifecycle commands: stop, status, help.

use std::time::Instant;

use crate::error::{PluginError, PluginResult};
use crate::plugin::{CommandSpec, Plugin};

pub const PLUGIN_ID: &str = "System";

/// Stop the assistant, report uptime, list capabilities.
#[derive(Debug)]
pub struct SystemPlugin {
    started_at: Instant,
}

impl SystemPlugin {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Default for SystemPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SystemPlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn description(&self) -> &str {
        "Assistant lifecycle: stop, status, help"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("stop", &["stop", "exit", "quit", "종료", "그만"]),
            CommandSpec::new("status", &["status", "상태"]),
            CommandSpec::new("help", &["help", "도움"]),
        ]
    }

    fn execute(&self, command: &str, _text: &str) -> PluginResult<String> {
        match command {
            "stop" => Ok("프로그램을 종료합니다. 다음에 또 만나요!".into()),
            "status" => {
                let secs = self.started_at.elapsed().as_secs();
                Ok(format!(
                    "모든 시스템이 정상 작동 중이에요. 가동 시간 {}분 {}초.",
                    secs / 60,
                    secs % 60
                ))
            }
            "help" => Ok(
                "'코드 정리해줘', '동기화해줘', '상태 알려줘', '그만'처럼 말씀해 주세요.".into(),
            ),
            other => Err(PluginError::UnknownCommand {
                plugin: PLUGIN_ID.into(),
                command: other.into(),
            }),
        }
    }

    fn is_stop_command(&self, command: &str) -> bool {
        command == "stop"
    }
}
