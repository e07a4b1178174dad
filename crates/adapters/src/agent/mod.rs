// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch of lifecycle work to remote agents
//!
//! [`AgentAdapter`] turns a work request into an [`AgentCommand`] and hands
//! it to an [`AgentTransport`]. The transport returns as soon as the command
//! is on its way; the agent later reports the outcome to a completion sink
//! under the command's correlation id.

mod command;
mod local;

pub use command::{AgentCommand, CommandError, CommandHandler, CommandTable, CommandTag};
pub use local::LocalAgent;

use crate::adapter::{AdapterError, AdapterOutcome, LifecycleAdapter, WorkRequest};
use async_trait::async_trait;
use lifecycle_core::WorkKind;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from handing a command to an agent
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("agent disconnected: {0}")]
    Disconnected(String),
    #[error("agent rejected {tag}: {reason}")]
    Rejected { tag: CommandTag, reason: String },
}

/// Channel to an agent
#[async_trait]
pub trait AgentTransport: Send + Sync + 'static {
    /// Hand off `command`; returns once the agent has accepted it
    async fn send(&self, command: AgentCommand) -> Result<(), TransportError>;
}

/// Adapter that performs work by sending commands to an agent
pub struct AgentAdapter<T> {
    transport: T,
    works: BTreeSet<WorkKind>,
}

impl<T: AgentTransport> AgentAdapter<T> {
    /// An adapter that sends commands for the listed work kinds
    pub fn new(transport: T, works: impl IntoIterator<Item = WorkKind>) -> Self {
        Self {
            transport,
            works: works.into_iter().collect(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: AgentTransport> LifecycleAdapter for AgentAdapter<T> {
    fn handles(&self, work: WorkKind) -> bool {
        self.works.contains(&work)
    }

    async fn perform(&self, request: WorkRequest) -> Result<AdapterOutcome, AdapterError> {
        if !self.handles(request.work) {
            return Err(AdapterError::Unsupported(request.work));
        }

        let command = AgentCommand {
            tag: CommandTag::for_work(request.work),
            correlation_id: request.correlation_id,
            entity: request.entity.id,
            kind: request.entity.kind,
            params: request.context.params().clone(),
        };
        tracing::debug!(
            tag = %command.tag,
            correlation_id = %command.correlation_id,
            "sending agent command"
        );
        self.transport.send(command).await?;
        Ok(AdapterOutcome::Pending)
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
