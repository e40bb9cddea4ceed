//! Measurement planning
//!
//! Decides, from the trigger that started the run, which compiler revisions get measured
//! and in what order. The subject revision always comes first because every other
//! measurement in the report is compared against it.

use serde::Deserialize;
use thiserror::Error;

/// Commit id git uses for "no previous commit"
pub const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

/// Label of the optional trunk measurement
pub const BASELINE_LABEL: &str = "Baseline";

/// Planning errors. All of them abort the run before anything is built.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Trigger would run untrusted code with a privileged token
    #[error(
        "This action executes untrusted code from the pull request and must never be used \
         with the `{event}` trigger. See \
         https://securitylab.github.com/research/github-actions-preventing-pwn-requests/ \
         for details."
    )]
    ForbiddenTrigger {
        /// Event name
        event: String,
    },

    /// Trigger kind the planner does not know how to compare
    #[error("Unsupported event type {event:?}.")]
    UnsupportedTrigger {
        /// Event name
        event: String,
    },

    /// A field the trigger kind needs was not provided
    #[error("{event} trigger is missing {field}")]
    MissingField {
        /// Event name
        event: String,
        /// Missing field
        field: &'static str,
    },
}

/// Kind of event that started the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKind {
    /// `pull_request`
    PullRequest,
    /// `pull_request_target`, refused
    PullRequestTarget,
    /// `push`
    Push,
    /// Anything else, refused
    Other(String),
}

impl TriggerKind {
    /// Parse a GitHub event name
    pub fn parse(event_name: &str) -> Self {
        match event_name {
            "pull_request" => Self::PullRequest,
            "pull_request_target" => Self::PullRequestTarget,
            "push" => Self::Push,
            other => Self::Other(other.to_string()),
        }
    }

    /// Event name as GitHub spells it
    pub fn as_str(&self) -> &str {
        match self {
            Self::PullRequest => "pull_request",
            Self::PullRequestTarget => "pull_request_target",
            Self::Push => "push",
            Self::Other(name) => name,
        }
    }
}

/// Pull request part of the event payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PullRequestInfo {
    /// Web URL of the pull request
    pub html_url: String,
}

/// Subset of the webhook payload the planner reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    /// Previous tip of the pushed ref
    pub before: String,
    /// New tip of the pushed ref
    pub after: String,
    /// Compare URL of a push
    pub compare: String,
    /// Pull request details
    pub pull_request: Option<PullRequestInfo>,
}

/// Everything the planner knows about the trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    /// Event kind
    pub kind: TriggerKind,
    /// Commit the workflow runs on
    pub commit: String,
    /// Full ref the workflow runs on (`refs/heads/...`)
    pub git_ref: String,
    /// Pull request source branch
    pub head_ref: String,
    /// Pull request destination branch
    pub base_ref: String,
    /// Parsed webhook payload
    pub event: EventPayload,
}

/// One revision to measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementRequest {
    /// Human-readable row label
    pub label: String,
    /// Branch, tag or commit passed to `git checkout`
    pub revision: String,
}

impl MeasurementRequest {
    fn new(label: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            revision: revision.into(),
        }
    }
}

/// Outcome of planning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasurementPlan {
    /// Revisions to measure, subject first
    Compare {
        /// Pull request or compare URL
        trigger_url: String,
        /// Ordered requests, never empty
        requests: Vec<MeasurementRequest>,
    },
    /// The trigger carries nothing to compare; not an error
    NothingToCompare {
        /// Why planning produced nothing
        reason: String,
    },
}

impl MeasurementPlan {
    /// Planned requests (empty for [`MeasurementPlan::NothingToCompare`])
    pub fn requests(&self) -> &[MeasurementRequest] {
        match self {
            Self::Compare { requests, .. } => requests,
            Self::NothingToCompare { .. } => &[],
        }
    }

    /// Whether there is nothing to measure
    pub fn is_empty(&self) -> bool {
        self.requests().is_empty()
    }
}

/// Turns a trigger into an ordered list of revisions
///
/// # Examples
///
/// ```
/// use output_size::plan::{EventPayload, MeasurementPlanner, TriggerContext, TriggerKind};
///
/// let trigger = TriggerContext {
///     kind: TriggerKind::PullRequest,
///     commit: "abc123".to_string(),
///     git_ref: "refs/pull/7/merge".to_string(),
///     head_ref: "smaller-runtime".to_string(),
///     base_ref: "master".to_string(),
///     event: EventPayload::default(),
/// };
///
/// let plan = MeasurementPlanner::new("master").plan(&trigger).unwrap();
/// let revisions: Vec<_> = plan.requests().iter().map(|r| r.revision.as_str()).collect();
/// assert_eq!(revisions, ["abc123", "master"]);
/// ```
#[derive(Debug, Clone)]
pub struct MeasurementPlanner {
    baseline_branch: String,
}

impl MeasurementPlanner {
    /// Create a planner using `baseline_branch` as the trunk reference
    pub fn new(baseline_branch: impl Into<String>) -> Self {
        Self {
            baseline_branch: baseline_branch.into(),
        }
    }

    /// Trunk branch name
    pub fn baseline_branch(&self) -> &str {
        &self.baseline_branch
    }

    /// Produce the measurement plan for `trigger`
    pub fn plan(&self, trigger: &TriggerContext) -> Result<MeasurementPlan, PlanError> {
        match &trigger.kind {
            TriggerKind::PullRequest => self.plan_pull_request(trigger),
            TriggerKind::Push => self.plan_push(trigger),
            TriggerKind::PullRequestTarget => Err(PlanError::ForbiddenTrigger {
                event: trigger.kind.as_str().to_string(),
            }),
            TriggerKind::Other(event) => Err(PlanError::UnsupportedTrigger {
                event: event.clone(),
            }),
        }
    }

    fn plan_pull_request(&self, trigger: &TriggerContext) -> Result<MeasurementPlan, PlanError> {
        let event = trigger.kind.as_str();
        let head = required(event, "head ref", &trigger.head_ref)?;
        let base = required(event, "base ref", &trigger.base_ref)?;
        let commit = required(event, "commit", &trigger.commit)?;

        let mut requests = vec![
            MeasurementRequest::new(format!("Pull request ({})", head), commit),
            MeasurementRequest::new(format!("Target branch ({})", base), base),
        ];
        self.push_baseline(base, &mut requests);

        let trigger_url = trigger
            .event
            .pull_request
            .as_ref()
            .map(|pr| pr.html_url.clone())
            .unwrap_or_default();

        Ok(MeasurementPlan::Compare {
            trigger_url,
            requests,
        })
    }

    fn plan_push(&self, trigger: &TriggerContext) -> Result<MeasurementPlan, PlanError> {
        let event = trigger.kind.as_str();
        let Some(branch) = trigger.git_ref.strip_prefix("refs/heads/") else {
            return Ok(MeasurementPlan::NothingToCompare {
                reason: format!("{:?} is not a branch", trigger.git_ref),
            });
        };

        let before = required(event, "before commit", &trigger.event.before)?;
        if before == ZERO_SHA {
            return Ok(MeasurementPlan::NothingToCompare {
                reason: format!("branch {} was just created", branch),
            });
        }

        let after = if trigger.event.after.is_empty() {
            required(event, "commit", &trigger.commit)?
        } else {
            trigger.event.after.as_str()
        };

        let mut requests = vec![
            MeasurementRequest::new(format!("Push ({})", branch), after),
            MeasurementRequest::new(format!("Previous tip ({})", short(before)), before),
        ];
        self.push_baseline(branch, &mut requests);

        Ok(MeasurementPlan::Compare {
            trigger_url: trigger.event.compare.clone(),
            requests,
        })
    }

    fn push_baseline(&self, destination: &str, requests: &mut Vec<MeasurementRequest>) {
        if destination != self.baseline_branch {
            requests.push(MeasurementRequest::new(
                BASELINE_LABEL,
                self.baseline_branch.clone(),
            ));
        }
    }
}

fn required<'a>(event: &str, field: &'static str, value: &'a str) -> Result<&'a str, PlanError> {
    if value.is_empty() {
        return Err(PlanError::MissingField {
            event: event.to_string(),
            field,
        });
    }
    Ok(value)
}

fn short(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}
