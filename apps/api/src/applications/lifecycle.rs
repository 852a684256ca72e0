//! The application state machine.
//!
//! One authoritative transition table over closed enums replaces the
//! per-endpoint status literals of the legacy portal. Every decision
//! endpoint resolves its target status here; nothing else is allowed to
//! compute "what comes next".
//!
//! ```text
//! pending|qualified|pending_review --accept--> interview_scheduled
//! pending|qualified|pending_review --reject--> rejected               [terminal]
//! interview_scheduled --complete------------> interview_completed
//! interview_scheduled --no_show-------------> interview_completed    (interview_status = no_show)
//! interview_completed --hire----------------> hired                  [terminal]
//! interview_completed --reject--------------> rejected               [terminal]
//! ```
//!
//! Acceptance IS interview scheduling; there is no separate pre-interview
//! "accepted" step. Screening (`qualified`, `pending_review`) is a
//! query-time filter, never a decision.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::application::{ApplicationStatus, InterviewMode};

/// The six decisions a job owner can take on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
    CompleteInterview,
    MarkNoShow,
    Hire,
    RejectAfterInterview,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
            Decision::CompleteInterview => "complete the interview of",
            Decision::MarkNoShow => "mark a no-show on",
            Decision::Hire => "hire",
            Decision::RejectAfterInterview => "reject",
        }
    }
}

/// Resolves the status a decision leads to from `current`.
///
/// Terminal states (`rejected`, `hired`) refuse every decision with
/// `FinalizedState`; other invalid pairs refuse with `InvalidState`.
pub fn next_status(
    current: ApplicationStatus,
    decision: Decision,
) -> Result<ApplicationStatus, AppError> {
    use crate::models::application::ApplicationStatus as S;

    if current.is_terminal() {
        return Err(AppError::FinalizedState(format!(
            "application is already {}",
            current.as_str()
        )));
    }

    let next = match (current, decision) {
        (S::Pending | S::Qualified | S::PendingReview, Decision::Accept) => S::InterviewScheduled,
        (S::Pending | S::Qualified | S::PendingReview, Decision::Reject) => S::Rejected,
        (S::InterviewScheduled, Decision::CompleteInterview | Decision::MarkNoShow) => {
            S::InterviewCompleted
        }
        (S::InterviewCompleted, Decision::Hire) => S::Hired,
        (S::InterviewCompleted, Decision::RejectAfterInterview) => S::Rejected,
        (current, decision) => {
            return Err(AppError::InvalidState {
                reason: format!(
                    "cannot {} an application in status {}",
                    decision.as_str(),
                    current.as_str()
                ),
            })
        }
    };

    Ok(next)
}

/// Interview details as submitted with an accept decision.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewRequest {
    pub date: DateTime<Utc>,
    pub mode: InterviewMode,
    pub location: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
}

/// A validated interview: exactly one of location/link is set, matching the
/// mode.
#[derive(Debug, Clone)]
pub struct InterviewPlan {
    pub date: DateTime<Utc>,
    pub mode: InterviewMode,
    pub location: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
}

/// Checks the mode-to-field mapping: onsite ⇒ location populated and link
/// absent; online ⇒ an http(s) link populated and location absent. Never
/// both, never neither.
pub fn validate_interview(request: InterviewRequest) -> Result<InterviewPlan, AppError> {
    let location = request
        .location
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let link = request
        .link
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (location, link) = match request.mode {
        InterviewMode::Onsite => {
            if link.is_some() {
                return Err(AppError::Validation(
                    "onsite interviews take a location, not a link".to_string(),
                ));
            }
            let location = location.ok_or_else(|| {
                AppError::Validation("onsite interviews require a location".to_string())
            })?;
            (Some(location.to_string()), None)
        }
        InterviewMode::Online => {
            if location.is_some() {
                return Err(AppError::Validation(
                    "online interviews take a link, not a location".to_string(),
                ));
            }
            let link = link.ok_or_else(|| {
                AppError::Validation("online interviews require a meeting link".to_string())
            })?;
            if !link.starts_with("http://") && !link.starts_with("https://") {
                return Err(AppError::Validation(
                    "interview link must be an http(s) URI".to_string(),
                ));
            }
            (None, Some(link.to_string()))
        }
    };

    Ok(InterviewPlan {
        date: request.date,
        mode: request.mode,
        location,
        link,
        notes: request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus as S;

    const ALL_DECISIONS: [Decision; 6] = [
        Decision::Accept,
        Decision::Reject,
        Decision::CompleteInterview,
        Decision::MarkNoShow,
        Decision::Hire,
        Decision::RejectAfterInterview,
    ];

    #[test]
    fn test_accept_schedules_interview_from_any_pre_interview_state() {
        for from in [S::Pending, S::Qualified, S::PendingReview] {
            assert_eq!(
                next_status(from, Decision::Accept).unwrap(),
                S::InterviewScheduled
            );
        }
    }

    #[test]
    fn test_reject_is_allowed_from_any_pre_interview_state() {
        for from in [S::Pending, S::Qualified, S::PendingReview] {
            assert_eq!(next_status(from, Decision::Reject).unwrap(), S::Rejected);
        }
    }

    #[test]
    fn test_no_show_lands_on_interview_completed() {
        assert_eq!(
            next_status(S::InterviewScheduled, Decision::MarkNoShow).unwrap(),
            S::InterviewCompleted
        );
        assert_eq!(
            next_status(S::InterviewScheduled, Decision::CompleteInterview).unwrap(),
            S::InterviewCompleted
        );
    }

    #[test]
    fn test_hire_requires_completed_interview() {
        assert_eq!(
            next_status(S::InterviewCompleted, Decision::Hire).unwrap(),
            S::Hired
        );
        for from in [S::Pending, S::Qualified, S::PendingReview, S::InterviewScheduled] {
            assert!(matches!(
                next_status(from, Decision::Hire),
                Err(AppError::InvalidState { .. })
            ));
        }
    }

    #[test]
    fn test_post_interview_reject() {
        assert_eq!(
            next_status(S::InterviewCompleted, Decision::RejectAfterInterview).unwrap(),
            S::Rejected
        );
    }

    #[test]
    fn test_terminal_states_refuse_every_decision() {
        for terminal in [S::Rejected, S::Hired] {
            for decision in ALL_DECISIONS {
                assert!(
                    matches!(
                        next_status(terminal, decision),
                        Err(AppError::FinalizedState(_))
                    ),
                    "{terminal:?} accepted {decision:?}"
                );
            }
        }
    }

    #[test]
    fn test_accepted_status_is_a_dead_end() {
        // No decision produces or leaves `accepted`; acceptance is interview
        // scheduling. Rows holding it refuse every decision short of the
        // terminal error.
        for decision in ALL_DECISIONS {
            assert!(matches!(
                next_status(S::Accepted, decision),
                Err(AppError::InvalidState { .. })
            ));
        }
    }

    #[test]
    fn test_completed_interview_cannot_be_completed_again() {
        assert!(matches!(
            next_status(S::InterviewCompleted, Decision::CompleteInterview),
            Err(AppError::InvalidState { .. })
        ));
    }

    fn interview(mode: InterviewMode, location: Option<&str>, link: Option<&str>) -> InterviewRequest {
        InterviewRequest {
            date: Utc::now(),
            mode,
            location: location.map(String::from),
            link: link.map(String::from),
            notes: None,
        }
    }

    #[test]
    fn test_onsite_interview_requires_location() {
        let plan = validate_interview(interview(InterviewMode::Onsite, Some("Room 4"), None)).unwrap();
        assert_eq!(plan.location.as_deref(), Some("Room 4"));
        assert!(plan.link.is_none());

        assert!(validate_interview(interview(InterviewMode::Onsite, None, None)).is_err());
        assert!(validate_interview(interview(InterviewMode::Onsite, Some("  "), None)).is_err());
    }

    #[test]
    fn test_onsite_interview_rejects_link() {
        assert!(validate_interview(interview(
            InterviewMode::Onsite,
            Some("Room 4"),
            Some("https://meet.example.com/x")
        ))
        .is_err());
    }

    #[test]
    fn test_online_interview_requires_http_link() {
        let plan = validate_interview(interview(
            InterviewMode::Online,
            None,
            Some("https://meet.example.com/x"),
        ))
        .unwrap();
        assert_eq!(plan.link.as_deref(), Some("https://meet.example.com/x"));
        assert!(plan.location.is_none());

        assert!(validate_interview(interview(InterviewMode::Online, None, None)).is_err());
        assert!(
            validate_interview(interview(InterviewMode::Online, None, Some("meet.example.com")))
                .is_err()
        );
    }

    #[test]
    fn test_online_interview_rejects_location() {
        assert!(validate_interview(interview(
            InterviewMode::Online,
            Some("Room 4"),
            Some("https://meet.example.com/x")
        ))
        .is_err());
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let mut req = interview(InterviewMode::Onsite, Some("Room 4"), None);
        req.notes = Some("   ".to_string());
        assert!(validate_interview(req).unwrap().notes.is_none());
    }
}
