// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::adapter::WorkContext;
use lifecycle_core::{
    CompletionSink, CorrelationId, Entity, LifecycleEvent, OperationResult, ResourceState,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Sink that forwards completions to a channel
struct ChannelSink {
    tx: mpsc::UnboundedSender<(CorrelationId, OperationResult)>,
}

impl CompletionSink for ChannelSink {
    fn complete(&self, id: &CorrelationId, result: OperationResult) -> bool {
        self.tx.send((id.clone(), result)).is_ok()
    }
}

/// Transport that only records what it was given
#[derive(Clone, Default)]
struct RecordingTransport {
    sent: Arc<Mutex<Vec<AgentCommand>>>,
}

#[async_trait]
impl AgentTransport for RecordingTransport {
    async fn send(&self, command: AgentCommand) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(command);
        Ok(())
    }
}

fn request(work: WorkKind, id: &str) -> WorkRequest {
    WorkRequest {
        entity: Entity::new("h-1", "host", ResourceState::Deploying),
        event: LifecycleEvent::DeployRequested,
        work,
        correlation_id: CorrelationId::new(id),
        context: WorkContext::new().with("zone", "z1"),
    }
}

#[tokio::test]
async fn agent_adapter_sends_command_and_returns_pending() {
    let transport = RecordingTransport::default();
    let adapter = AgentAdapter::new(transport.clone(), [WorkKind::Deploy]);

    let outcome = adapter
        .perform(request(WorkKind::Deploy, "op-1"))
        .await
        .unwrap();
    assert_eq!(outcome, AdapterOutcome::Pending);

    let sent = transport.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tag, CommandTag::CreateResource);
    assert_eq!(sent[0].correlation_id, CorrelationId::new("op-1"));
    assert_eq!(sent[0].params.get("zone").map(String::as_str), Some("z1"));
}

#[tokio::test]
async fn agent_adapter_refuses_work_it_does_not_handle() {
    let transport = RecordingTransport::default();
    let adapter = AgentAdapter::new(transport.clone(), [WorkKind::Deploy]);

    assert!(!adapter.handles(WorkKind::Stop));
    let err = adapter
        .perform(request(WorkKind::Stop, "op-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Unsupported(WorkKind::Stop)));
    assert!(transport.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn local_agent_reports_results_to_sink() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let table = CommandTable::new()
        .with(CommandTag::CreateResource, |_| Ok(()))
        .with(CommandTag::StopResource, |_| Err("still mounted".to_string()));
    let agent = LocalAgent::new(table, Arc::new(ChannelSink { tx }));
    let adapter = AgentAdapter::new(agent, [WorkKind::Deploy, WorkKind::Stop]);

    adapter
        .perform(request(WorkKind::Deploy, "op-1"))
        .await
        .unwrap();
    let (id, result) = rx.recv().await.unwrap();
    assert_eq!(id, CorrelationId::new("op-1"));
    assert!(result.is_success());

    adapter
        .perform(request(WorkKind::Stop, "op-2"))
        .await
        .unwrap();
    let (id, result) = rx.recv().await.unwrap();
    assert_eq!(id, CorrelationId::new("op-2"));
    assert!(result.reason().unwrap().contains("still mounted"));
}

#[tokio::test]
async fn local_agent_rejects_commands_without_handler() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let agent = LocalAgent::new(CommandTable::new(), Arc::new(ChannelSink { tx }));
    let adapter = AgentAdapter::new(agent, [WorkKind::Expunge]);

    let err = adapter
        .perform(request(WorkKind::Expunge, "op-1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Transport(TransportError::Rejected {
            tag: CommandTag::PurgeResource,
            ..
        })
    ));
}

#[tokio::test]
async fn local_agent_reports_handler_panic_as_failure() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let table = CommandTable::new().with(CommandTag::CreateResource, |_| panic!("agent crashed"));
    let agent = LocalAgent::new(table, Arc::new(ChannelSink { tx }));
    let adapter = AgentAdapter::new(agent, [WorkKind::Deploy]);

    adapter
        .perform(request(WorkKind::Deploy, "op-1"))
        .await
        .unwrap();
    let (id, result) = rx.recv().await.unwrap();
    assert_eq!(id, CorrelationId::new("op-1"));
    assert!(!result.is_success());
    assert!(result.reason().unwrap().contains("panicked"));
}
