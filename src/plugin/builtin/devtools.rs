//! Developer commands over a project directory: refactor survey and sync summary.

use std::path::{Path, PathBuf};

use crate::error::{PluginError, PluginResult};
use crate::nlu::entities::{self, EntityValue, SOURCE_EXTENSIONS};
use crate::plugin::{CommandSpec, Plugin};

pub const PLUGIN_ID: &str = "DevTools";

/// Inspects source files under a project root.
#[derive(Debug, Clone)]
pub struct DevToolsPlugin {
    root: PathBuf,
}

impl DevToolsPlugin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project directory this plugin works in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Summarise each file named in `text`: line count and how many
    /// definitions of the requested target kind it holds.
    fn refactor(&self, text: &str) -> PluginResult<String> {
        let extracted = entities::extract(text, Some("refactor"));
        let files = match extracted.get("files") {
            Some(EntityValue::List(files)) => files.clone(),
            _ => return Ok("정리할 파일 이름을 함께 말씀해 주세요. 예: 'main.py 정리해줘'".into()),
        };
        let target = match extracted.get("target") {
            Some(EntityValue::Text(t)) if t == "class" => "class",
            _ => "function",
        };

        let mut lines = Vec::with_capacity(files.len());
        for name in &files {
            let path = self.root.join(name);
            let content = std::fs::read_to_string(&path).map_err(|e| {
                PluginError::execution(
                    PLUGIN_ID,
                    "refactor",
                    format!("{name} 파일을 읽을 수 없어요 ({e})"),
                )
            })?;
            let definitions = count_definitions(&content, target);
            let label = if target == "class" { "클래스" } else { "함수" };
            lines.push(format!(
                "{name}: {}줄, {label} {definitions}개",
                content.lines().count()
            ));
        }
        Ok(format!("리팩토링 대상을 확인했어요. {}", lines.join(", ")))
    }

    /// Count the source files directly under the root.
    fn sync(&self) -> PluginResult<String> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            PluginError::execution(
                PLUGIN_ID,
                "sync",
                format!("{} 디렉터리를 열 수 없어요 ({e})", self.root.display()),
            )
        })?;
        let count = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            })
            .count();
        Ok(format!("소스 파일 {count}개를 확인했어요. 동기화 준비가 끝났어요."))
    }
}

impl Plugin for DevToolsPlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn description(&self) -> &str {
        "Developer tools: refactor survey and sync summary"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("refactor", &["refactor", "리팩토링", "정리"]),
            CommandSpec::new("sync", &["sync", "동기화"]),
        ]
    }

    fn execute(&self, command: &str, text: &str) -> PluginResult<String> {
        match command {
            "refactor" => self.refactor(text),
            "sync" => self.sync(),
            other => Err(PluginError::UnknownCommand {
                plugin: PLUGIN_ID.into(),
                command: other.into(),
            }),
        }
    }
}

/// Lines that open a definition of `target` ("class" or "function").
fn count_definitions(content: &str, target: &str) -> usize {
    let openers: &[&str] = if target == "class" {
        &["class "]
    } else {
        &["def ", "async def ", "function ", "async function "]
    };
    content
        .lines()
        .map(str::trim_start)
        .filter(|line| openers.iter().any(|o| line.starts_with(o)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("main.py"),
            "class App:\n    def run(self):\n        pass\n\ndef main():\n    App().run()\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.md"), "# notes\n").unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8; 4]).unwrap();
        dir
    }

    #[test]
    fn refactor_counts_functions() {
        let dir = project();
        let plugin = DevToolsPlugin::new(dir.path());
        let reply = plugin.execute("refactor", "main.py 정리해줘").unwrap();
        assert!(reply.contains("main.py: 6줄, 함수 2개"), "{reply}");
    }

    #[test]
    fn refactor_counts_classes_when_asked() {
        let dir = project();
        let plugin = DevToolsPlugin::new(dir.path());
        let reply = plugin.execute("refactor", "main.py 클래스 정리").unwrap();
        assert!(reply.contains("클래스 1개"), "{reply}");
    }

    #[test]
    fn refactor_without_files_asks_for_one() {
        let plugin = DevToolsPlugin::new(".");
        let reply = plugin.execute("refactor", "코드를 정리해줘").unwrap();
        assert!(reply.contains("파일 이름"));
    }

    #[test]
    fn refactor_missing_file_fails() {
        let dir = project();
        let plugin = DevToolsPlugin::new(dir.path());
        let err = plugin.execute("refactor", "ghost.py 정리").unwrap_err();
        assert!(matches!(err, PluginError::Execution { .. }));
        assert!(err.to_string().contains("ghost.py"));
    }

    #[test]
    fn sync_counts_source_files_only() {
        let dir = project();
        let plugin = DevToolsPlugin::new(dir.path());
        let reply = plugin.execute("sync", "동기화").unwrap();
        assert!(reply.contains("2개"), "{reply}");
    }

    #[test]
    fn sync_on_missing_root_fails() {
        let plugin = DevToolsPlugin::new("/nonexistent/voxroute-project");
        assert!(plugin.execute("sync", "sync").is_err());
    }
}
