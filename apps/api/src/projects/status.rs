//! Project status state machine.
//!
//! The transition table below is the only authority on which status changes
//! are legal, and for whom. Handlers validate every change against it before
//! touching the database.

use thiserror::Error;

use crate::models::project::ProjectStatus;
use crate::models::project::ProjectStatus::{Completed, InProgress, OnHold, Planning, Review};
use crate::models::user::Role;

#[derive(Debug, PartialEq)]
pub struct Transition {
    pub from: ProjectStatus,
    pub to: ProjectStatus,
    pub roles: &'static [Role],
    /// Name of the user-facing action.
    pub action: &'static str,
}

const BOTH: &[Role] = &[Role::Manager, Role::Employee];
const MANAGER: &[Role] = &[Role::Manager];

pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: Planning,
        to: InProgress,
        roles: BOTH,
        action: "start",
    },
    Transition {
        from: Planning,
        to: OnHold,
        roles: MANAGER,
        action: "hold",
    },
    Transition {
        from: InProgress,
        to: Review,
        roles: BOTH,
        action: "request_review",
    },
    Transition {
        from: InProgress,
        to: OnHold,
        roles: MANAGER,
        action: "hold",
    },
    Transition {
        from: Review,
        to: Completed,
        roles: MANAGER,
        action: "approve",
    },
    Transition {
        from: Review,
        to: InProgress,
        roles: MANAGER,
        action: "request_changes",
    },
    Transition {
        from: Review,
        to: OnHold,
        roles: MANAGER,
        action: "hold",
    },
    Transition {
        from: OnHold,
        to: InProgress,
        roles: MANAGER,
        action: "resume",
    },
];

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("project is already {0}")]
    Unchanged(ProjectStatus),

    #[error("project is completed; no further status changes are allowed")]
    Terminal,

    #[error("cannot move from {from} to {to}; allowed next states: {allowed}")]
    Illegal {
        from: ProjectStatus,
        to: ProjectStatus,
        allowed: String,
    },

    #[error("a {role} cannot move a project from {from} to {to}")]
    RoleNotPermitted {
        role: Role,
        from: ProjectStatus,
        to: ProjectStatus,
    },
}

fn find(from: ProjectStatus, to: ProjectStatus) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}

/// Next states `role` may move a project in `from` to, in table order.
pub fn allowed_next(from: ProjectStatus, role: Role) -> Vec<ProjectStatus> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == from && t.roles.contains(&role))
        .map(|t| t.to)
        .collect()
}

pub fn is_terminal(status: ProjectStatus) -> bool {
    !TRANSITIONS.iter().any(|t| t.from == status)
}

/// Validates one status change. Returns the matching table row.
pub fn check_transition(
    from: ProjectStatus,
    to: ProjectStatus,
    role: Role,
) -> Result<&'static Transition, TransitionError> {
    if from == to {
        return Err(TransitionError::Unchanged(from));
    }
    if is_terminal(from) {
        return Err(TransitionError::Terminal);
    }
    let Some(transition) = find(from, to) else {
        let allowed: Vec<&str> = allowed_next(from, role)
            .iter()
            .map(|s| s.as_str())
            .collect();
        return Err(TransitionError::Illegal {
            from,
            to,
            allowed: if allowed.is_empty() {
                "none".to_string()
            } else {
                allowed.join(", ")
            },
        });
    };
    if !transition.roles.contains(&role) {
        return Err(TransitionError::RoleNotPermitted { role, from, to });
    }
    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_planning_to_completed() {
        assert!(check_transition(Planning, InProgress, Role::Employee).is_ok());
        assert!(check_transition(InProgress, Review, Role::Employee).is_ok());
        let t = check_transition(Review, Completed, Role::Manager).unwrap();
        assert_eq!(t.action, "approve");
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(is_terminal(Completed));
        for to in ProjectStatus::ALL.into_iter().filter(|s| *s != Completed) {
            assert_eq!(
                check_transition(Completed, to, Role::Manager),
                Err(TransitionError::Terminal)
            );
        }
        assert!(allowed_next(Completed, Role::Manager).is_empty());
    }

    #[test]
    fn test_on_hold_reachable_from_every_non_completed_state() {
        for from in [Planning, InProgress, Review] {
            assert!(
                check_transition(from, OnHold, Role::Manager).is_ok(),
                "{from} -> on-hold should be legal"
            );
        }
    }

    #[test]
    fn test_in_progress_reachable_from_on_hold_and_review() {
        assert!(check_transition(OnHold, InProgress, Role::Manager).is_ok());
        assert_eq!(
            check_transition(Review, InProgress, Role::Manager).unwrap().action,
            "request_changes"
        );
    }

    #[test]
    fn test_employee_cannot_approve_or_hold() {
        assert!(matches!(
            check_transition(Review, Completed, Role::Employee),
            Err(TransitionError::RoleNotPermitted { .. })
        ));
        assert!(matches!(
            check_transition(InProgress, OnHold, Role::Employee),
            Err(TransitionError::RoleNotPermitted { .. })
        ));
    }

    #[test]
    fn test_skipping_review_is_illegal() {
        let err = check_transition(InProgress, Completed, Role::Manager).unwrap_err();
        match err {
            TransitionError::Illegal { allowed, .. } => {
                assert_eq!(allowed, "review, on-hold");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_same_status_is_rejected() {
        assert_eq!(
            check_transition(Review, Review, Role::Manager),
            Err(TransitionError::Unchanged(Review))
        );
    }

    #[test]
    fn test_allowed_next_filters_by_role() {
        assert_eq!(allowed_next(Review, Role::Employee), Vec::<ProjectStatus>::new());
        assert_eq!(
            allowed_next(Review, Role::Manager),
            vec![Completed, InProgress, OnHold]
        );
        assert_eq!(allowed_next(Planning, Role::Employee), vec![InProgress]);
    }

    #[test]
    fn test_only_completed_is_terminal() {
        let terminal: Vec<_> = ProjectStatus::ALL
            .into_iter()
            .filter(|s| is_terminal(*s))
            .collect();
        assert_eq!(terminal, vec![Completed]);
    }
}
