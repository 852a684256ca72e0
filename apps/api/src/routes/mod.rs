pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::employment::handlers as employment;
use crate::invitations::handlers as invitations;
use crate::notifications::handlers as notifications;
use crate::ratings::handlers as ratings;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Invitations
        .route(
            "/api/v1/invitations",
            post(invitations::handle_issue).get(invitations::handle_list),
        )
        .route(
            "/api/v1/invitations/:token",
            get(invitations::handle_validate),
        )
        .route(
            "/api/v1/invitations/:token/consume",
            post(invitations::handle_consume),
        )
        // Applications
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(applications::handle_apply).get(applications::handle_list),
        )
        .route("/api/v1/applications/:id", get(applications::handle_get))
        .route(
            "/api/v1/applications/:id/accept",
            post(applications::handle_accept),
        )
        .route(
            "/api/v1/applications/:id/reject",
            post(applications::handle_reject),
        )
        .route(
            "/api/v1/applications/:id/interview/complete",
            post(applications::handle_complete_interview),
        )
        .route(
            "/api/v1/applications/:id/interview/no-show",
            post(applications::handle_no_show),
        )
        .route(
            "/api/v1/applications/:id/hire",
            post(applications::handle_hire),
        )
        .route(
            "/api/v1/applications/:id/post-interview-reject",
            post(applications::handle_post_interview_reject),
        )
        // Ratings
        .route("/api/v1/ratings", post(ratings::handle_submit))
        .route(
            "/api/v1/ratings/:ratee_type/:ratee_id",
            get(ratings::handle_detail),
        )
        // Employment
        .route("/api/v1/employment", get(employment::handle_list))
        .route(
            "/api/v1/employment/:id/end",
            post(employment::handle_end_contract),
        )
        // Notifications
        .route("/api/v1/notifications", get(notifications::handle_list))
        .route(
            "/api/v1/notifications/:id/read",
            post(notifications::handle_mark_read),
        )
        .with_state(state)
}
