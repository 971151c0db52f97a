pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::profile::handlers as profile;
use crate::resume::{education, links, projects, skills, work};
use crate::search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Profile aggregate
        .route(
            "/profile",
            get(profile::handle_get)
                .post(profile::handle_create)
                .put(profile::handle_update)
                .delete(profile::handle_delete),
        )
        // Education
        .route(
            "/education",
            get(education::handle_list).post(education::handle_create),
        )
        .route(
            "/education/:id",
            put(education::handle_update).delete(education::handle_delete),
        )
        // Work experience
        .route(
            "/work-experience",
            get(work::handle_list).post(work::handle_create),
        )
        .route(
            "/work-experience/:id",
            put(work::handle_update).delete(work::handle_delete),
        )
        // Projects
        .route(
            "/projects",
            get(projects::handle_list).post(projects::handle_create),
        )
        .route(
            "/projects/:id",
            get(projects::handle_get)
                .put(projects::handle_update)
                .delete(projects::handle_delete),
        )
        // Skills
        .route(
            "/skills",
            get(skills::handle_list).post(skills::handle_create),
        )
        .route("/skills/top", get(skills::handle_top))
        .route(
            "/skills/:id",
            put(skills::handle_update).delete(skills::handle_delete),
        )
        // Social links
        .route(
            "/social-links",
            get(links::handle_list).post(links::handle_create),
        )
        .route(
            "/social-links/:id",
            put(links::handle_update).delete(links::handle_delete),
        )
        // Search
        .route("/search", get(search::handle_search))
        .with_state(state)
}
