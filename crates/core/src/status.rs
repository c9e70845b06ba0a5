// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle status shared by builds, jobs and steps, plus the per-transition
//! timestamp record.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a build, job or step.
///
/// Transitions are monotone: once a finished status is reached the status
/// never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Waiting for dependencies and a capable runner
    Queued,
    /// Handed to a runner, not yet executing
    Submitted,
    /// Executing
    Running,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed,
    /// Finished by cancellation
    Canceled,
}

crate::simple_display! {
    Status {
        Queued => "queued",
        Submitted => "submitted",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Canceled => "canceled",
    }
}

impl Status {
    /// Whether this is a terminal status.
    pub fn is_finished(self) -> bool {
        matches!(self, Status::Succeeded | Status::Failed | Status::Canceled)
    }

    /// Whether this is a terminal status other than success.
    pub fn has_failed(self) -> bool {
        matches!(self, Status::Failed | Status::Canceled)
    }

    fn rank(self) -> u8 {
        match self {
            Status::Queued => 0,
            Status::Submitted => 1,
            Status::Running => 2,
            Status::Succeeded | Status::Failed | Status::Canceled => 3,
        }
    }

    /// Whether moving to `next` preserves monotonicity.
    ///
    /// Finished statuses accept no transition; otherwise a status may move
    /// to itself or anything later in the lifecycle. A queued job may fail
    /// directly (no capable runner, timeout) without passing through the
    /// intermediate statuses.
    pub fn can_transition_to(self, next: Status) -> bool {
        if self.is_finished() {
            return false;
        }
        next.rank() >= self.rank()
    }
}

/// Timestamps stamped as a build, job or step moves through its lifecycle.
///
/// Each field is written exactly once, on the first transition into the
/// matching status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTimings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_at_ms: Option<u64>,
}

impl WorkflowTimings {
    /// Stamp the timing field for a transition into `status`, if not already set.
    pub fn stamp(&mut self, status: Status, now_ms: u64) {
        let slot = match status {
            Status::Queued => &mut self.queued_at_ms,
            Status::Submitted => &mut self.submitted_at_ms,
            Status::Running => &mut self.running_at_ms,
            Status::Succeeded | Status::Failed => &mut self.finished_at_ms,
            Status::Canceled => {
                if self.finished_at_ms.is_none() {
                    self.finished_at_ms = Some(now_ms);
                }
                &mut self.canceled_at_ms
            }
        };
        if slot.is_none() {
            *slot = Some(now_ms);
        }
    }

    /// Stamp every slot at once (failed-skeleton builds).
    pub fn stamp_all(&mut self, now_ms: u64) {
        for status in [Status::Queued, Status::Submitted, Status::Running, Status::Failed] {
            self.stamp(status, now_ms);
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
