// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle states, events and the work they request
//!
//! States split into *stable* states, where a resource rests, and
//! *transitional* states, where work is in flight. A transitional state is
//! only ever left through [`LifecycleEvent::OperationSucceeded`] or
//! [`LifecycleEvent::OperationFailed`].

use serde::{Deserialize, Serialize};

/// State of a lifecycle-governed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceState {
    Allocated,
    Deploying,
    Deployed,
    Initializing,
    Ready,
    Stopping,
    Stopped,
    Starting,
    Destroyed,
    Expunging,
    Expunged,
}

impl ResourceState {
    pub const ALL: [ResourceState; 11] = [
        ResourceState::Allocated,
        ResourceState::Deploying,
        ResourceState::Deployed,
        ResourceState::Initializing,
        ResourceState::Ready,
        ResourceState::Stopping,
        ResourceState::Stopped,
        ResourceState::Starting,
        ResourceState::Destroyed,
        ResourceState::Expunging,
        ResourceState::Expunged,
    ];

    /// Whether work is in flight while in this state
    pub fn is_transitional(self) -> bool {
        matches!(
            self,
            ResourceState::Deploying
                | ResourceState::Initializing
                | ResourceState::Stopping
                | ResourceState::Starting
                | ResourceState::Expunging
        )
    }

    pub fn is_stable(self) -> bool {
        !self.is_transitional()
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceState::Allocated => "allocated",
            ResourceState::Deploying => "deploying",
            ResourceState::Deployed => "deployed",
            ResourceState::Initializing => "initializing",
            ResourceState::Ready => "ready",
            ResourceState::Stopping => "stopping",
            ResourceState::Stopped => "stopped",
            ResourceState::Starting => "starting",
            ResourceState::Destroyed => "destroyed",
            ResourceState::Expunging => "expunging",
            ResourceState::Expunged => "expunged",
        }
    }
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Events that drive resource transitions
///
/// `*Requested` events ask for a lifecycle change; the two report events
/// resolve a transitional state once the requested work has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecycleEvent {
    DeployRequested,
    InitializeRequested,
    StartRequested,
    StopRequested,
    DestroyRequested,
    RecoverRequested,
    ExpungeRequested,
    OperationSucceeded,
    OperationFailed,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 9] = [
        LifecycleEvent::DeployRequested,
        LifecycleEvent::InitializeRequested,
        LifecycleEvent::StartRequested,
        LifecycleEvent::StopRequested,
        LifecycleEvent::DestroyRequested,
        LifecycleEvent::RecoverRequested,
        LifecycleEvent::ExpungeRequested,
        LifecycleEvent::OperationSucceeded,
        LifecycleEvent::OperationFailed,
    ];

    /// Whether this event reports the outcome of work rather than requesting it
    pub fn is_report(self) -> bool {
        matches!(
            self,
            LifecycleEvent::OperationSucceeded | LifecycleEvent::OperationFailed
        )
    }

    /// The unit of work a request event asks for; `None` for report events
    pub fn work(self) -> Option<WorkKind> {
        match self {
            LifecycleEvent::DeployRequested => Some(WorkKind::Deploy),
            LifecycleEvent::InitializeRequested => Some(WorkKind::Initialize),
            LifecycleEvent::StartRequested => Some(WorkKind::Start),
            LifecycleEvent::StopRequested => Some(WorkKind::Stop),
            LifecycleEvent::DestroyRequested => Some(WorkKind::Destroy),
            LifecycleEvent::RecoverRequested => Some(WorkKind::Recover),
            LifecycleEvent::ExpungeRequested => Some(WorkKind::Expunge),
            LifecycleEvent::OperationSucceeded | LifecycleEvent::OperationFailed => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LifecycleEvent::DeployRequested => "deploy_requested",
            LifecycleEvent::InitializeRequested => "initialize_requested",
            LifecycleEvent::StartRequested => "start_requested",
            LifecycleEvent::StopRequested => "stop_requested",
            LifecycleEvent::DestroyRequested => "destroy_requested",
            LifecycleEvent::RecoverRequested => "recover_requested",
            LifecycleEvent::ExpungeRequested => "expunge_requested",
            LifecycleEvent::OperationSucceeded => "operation_succeeded",
            LifecycleEvent::OperationFailed => "operation_failed",
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Work an adapter performs on behalf of a request event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkKind {
    Deploy,
    Initialize,
    Start,
    Stop,
    Destroy,
    Recover,
    Expunge,
}

impl WorkKind {
    pub fn name(self) -> &'static str {
        match self {
            WorkKind::Deploy => "deploy",
            WorkKind::Initialize => "initialize",
            WorkKind::Start => "start",
            WorkKind::Stop => "stop",
            WorkKind::Destroy => "destroy",
            WorkKind::Recover => "recover",
            WorkKind::Expunge => "expunge",
        }
    }
}

impl std::fmt::Display for WorkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
