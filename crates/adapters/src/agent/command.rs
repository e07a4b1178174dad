// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent commands and the explicit handler table
//!
//! Handlers are registered by tag while the agent is assembled; there is no
//! discovery at runtime.

use lifecycle_core::{CorrelationId, EntityId, ResourceKind, WorkKind};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Command types understood by an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandTag {
    CreateResource,
    PrepareResource,
    StartResource,
    StopResource,
    DeleteResource,
    RestoreResource,
    PurgeResource,
}

impl CommandTag {
    pub const ALL: [CommandTag; 7] = [
        CommandTag::CreateResource,
        CommandTag::PrepareResource,
        CommandTag::StartResource,
        CommandTag::StopResource,
        CommandTag::DeleteResource,
        CommandTag::RestoreResource,
        CommandTag::PurgeResource,
    ];

    /// The command that carries out `work`
    pub fn for_work(work: WorkKind) -> Self {
        match work {
            WorkKind::Deploy => CommandTag::CreateResource,
            WorkKind::Initialize => CommandTag::PrepareResource,
            WorkKind::Start => CommandTag::StartResource,
            WorkKind::Stop => CommandTag::StopResource,
            WorkKind::Destroy => CommandTag::DeleteResource,
            WorkKind::Recover => CommandTag::RestoreResource,
            WorkKind::Expunge => CommandTag::PurgeResource,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandTag::CreateResource => "create_resource",
            CommandTag::PrepareResource => "prepare_resource",
            CommandTag::StartResource => "start_resource",
            CommandTag::StopResource => "stop_resource",
            CommandTag::DeleteResource => "delete_resource",
            CommandTag::RestoreResource => "restore_resource",
            CommandTag::PurgeResource => "purge_resource",
        }
    }
}

impl std::fmt::Display for CommandTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A command addressed to an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    pub tag: CommandTag,
    pub correlation_id: CorrelationId,
    pub entity: EntityId,
    pub kind: ResourceKind,
    pub params: BTreeMap<String, String>,
}

/// Errors from executing a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unsupported command: {0}")]
    Unsupported(CommandTag),
    #[error("{tag} failed: {message}")]
    Failed { tag: CommandTag, message: String },
}

/// Handler invoked for one command tag
pub type CommandHandler = Arc<dyn Fn(&AgentCommand) -> Result<(), String> + Send + Sync>;

/// Map from command tag to handler
#[derive(Clone, Default)]
pub struct CommandTable {
    handlers: HashMap<CommandTag, CommandHandler>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CommandTable::register`]
    pub fn with<F>(mut self, tag: CommandTag, handler: F) -> Self
    where
        F: Fn(&AgentCommand) -> Result<(), String> + Send + Sync + 'static,
    {
        self.register(tag, handler);
        self
    }

    /// Install the handler for `tag`, replacing any previous one
    pub fn register<F>(&mut self, tag: CommandTag, handler: F)
    where
        F: Fn(&AgentCommand) -> Result<(), String> + Send + Sync + 'static,
    {
        if self.handlers.insert(tag, Arc::new(handler)).is_some() {
            tracing::warn!(%tag, "replaced command handler");
        }
    }

    pub fn supports(&self, tag: CommandTag) -> bool {
        self.handlers.contains_key(&tag)
    }

    pub fn tags(&self) -> Vec<CommandTag> {
        let mut tags: Vec<_> = self.handlers.keys().copied().collect();
        tags.sort();
        tags
    }

    /// Run the handler registered for the command's tag
    pub fn execute(&self, command: &AgentCommand) -> Result<(), CommandError> {
        let handler = self
            .handlers
            .get(&command.tag)
            .ok_or(CommandError::Unsupported(command.tag))?;
        handler(command).map_err(|message| CommandError::Failed {
            tag: command.tag,
            message,
        })
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
