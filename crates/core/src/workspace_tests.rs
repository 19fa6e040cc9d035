// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn workspace_mode_serializes_snake_case() {
    assert_eq!(
        serde_json::to_string(&WorkspaceMode::GitWorktree).unwrap(),
        "\"git_worktree\""
    );
    assert_eq!(
        serde_json::to_string(&WorkspaceMode::Ephemeral).unwrap(),
        "\"ephemeral\""
    );
}

#[test]
fn workspace_status_round_trips() {
    for status in [
        WorkspaceStatus::Preparing,
        WorkspaceStatus::Ready,
        WorkspaceStatus::Released,
        WorkspaceStatus::Discarded,
    ] {
        let json = serde_json::to_string(&status).unwrap();
        let back: WorkspaceStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }
}
