// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process agent

use super::{AgentCommand, AgentTransport, CommandTable, TransportError};
use async_trait::async_trait;
use lifecycle_core::{CompletionSink, OperationResult};
use std::sync::Arc;

/// Agent that runs its command table on the local runtime
///
/// Accepted commands execute on a spawned task; the outcome is delivered to
/// the completion sink under the command's correlation id. A panicking
/// handler is reported as a failure.
#[derive(Clone)]
pub struct LocalAgent {
    table: Arc<CommandTable>,
    sink: Arc<dyn CompletionSink>,
}

impl LocalAgent {
    pub fn new(table: CommandTable, sink: Arc<dyn CompletionSink>) -> Self {
        Self {
            table: Arc::new(table),
            sink,
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }
}

#[async_trait]
impl AgentTransport for LocalAgent {
    async fn send(&self, command: AgentCommand) -> Result<(), TransportError> {
        if !self.table.supports(command.tag) {
            return Err(TransportError::Rejected {
                tag: command.tag,
                reason: "no handler registered".to_string(),
            });
        }

        let table = Arc::clone(&self.table);
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let handled = {
                let command = command.clone();
                tokio::spawn(async move { table.execute(&command) }).await
            };
            let result = match handled {
                Ok(outcome) => OperationResult::from(outcome),
                Err(_) => OperationResult::failed(format!("{} handler panicked", command.tag)),
            };
            tracing::debug!(
                tag = %command.tag,
                correlation_id = %command.correlation_id,
                success = result.is_success(),
                "agent command finished"
            );
            if !sink.complete(&command.correlation_id, result) {
                tracing::warn!(
                    correlation_id = %command.correlation_id,
                    "completion had no pending operation"
                );
            }
        });
        Ok(())
    }
}
