//! Built-in plugins and the startup registration list.

pub mod devtools;
pub mod system;

use crate::config::AssistantConfig;

use super::Plugin;

pub use devtools::DevToolsPlugin;
pub use system::SystemPlugin;

/// Plugins registered at startup, in registration order.
pub fn default_plugins(config: &AssistantConfig) -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(SystemPlugin::new()),
        Box::new(DevToolsPlugin::new(config.project_root.clone())),
    ]
}
