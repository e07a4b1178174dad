// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn command(tag: CommandTag) -> AgentCommand {
    AgentCommand {
        tag,
        correlation_id: CorrelationId::new("op-1"),
        entity: EntityId::new("h-1"),
        kind: ResourceKind::new("host"),
        params: BTreeMap::new(),
    }
}

#[test]
fn every_work_kind_maps_to_a_distinct_tag() {
    let works = [
        WorkKind::Deploy,
        WorkKind::Initialize,
        WorkKind::Start,
        WorkKind::Stop,
        WorkKind::Destroy,
        WorkKind::Recover,
        WorkKind::Expunge,
    ];
    let mut tags: Vec<_> = works.iter().map(|w| CommandTag::for_work(*w)).collect();
    tags.sort();
    assert_eq!(tags, CommandTag::ALL.to_vec());
}

#[test]
fn execute_dispatches_by_tag() {
    let table = CommandTable::new()
        .with(CommandTag::CreateResource, |_| Ok(()))
        .with(CommandTag::StopResource, |cmd| {
            Err(format!("{} is busy", cmd.entity))
        });

    assert!(table.execute(&command(CommandTag::CreateResource)).is_ok());
    assert_eq!(
        table.execute(&command(CommandTag::StopResource)),
        Err(CommandError::Failed {
            tag: CommandTag::StopResource,
            message: "h-1 is busy".to_string(),
        })
    );
}

#[test]
fn unregistered_tags_are_unsupported() {
    let table = CommandTable::new().with(CommandTag::CreateResource, |_| Ok(()));

    assert!(!table.supports(CommandTag::PurgeResource));
    assert_eq!(
        table.execute(&command(CommandTag::PurgeResource)),
        Err(CommandError::Unsupported(CommandTag::PurgeResource))
    );
    assert_eq!(table.tags(), vec![CommandTag::CreateResource]);
}

#[test]
fn handlers_see_command_params() {
    let table = CommandTable::new().with(CommandTag::CreateResource, |cmd| {
        match cmd.params.get("size_gb").map(String::as_str) {
            Some("100") => Ok(()),
            other => Err(format!("unexpected size {other:?}")),
        }
    });

    let mut cmd = command(CommandTag::CreateResource);
    cmd.params.insert("size_gb".to_string(), "100".to_string());
    assert!(table.execute(&cmd).is_ok());
}
