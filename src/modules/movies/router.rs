use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    routing::{get, patch, post},
};
use reelvault_core::permissions;

use crate::middleware::authorize::require_permission;
use crate::modules::movies::controller::{
    create_movie, delete_movie, list_movies, show_movie, update_movie,
};
use crate::state::AppState;

/// Read routes carry `movies:read`; write routes carry `movies:write`.
pub fn init_movies_router(state: AppState) -> Router<AppState> {
    let read_gate = middleware::from_fn_with_state(
        state.clone(),
        |state: State<AppState>, req: Request, next: Next| {
            require_permission(state, req, next, permissions::MOVIES_READ)
        },
    );
    let write_gate = middleware::from_fn_with_state(
        state,
        |state: State<AppState>, req: Request, next: Next| {
            require_permission(state, req, next, permissions::MOVIES_WRITE)
        },
    );

    Router::new()
        .route(
            "/",
            get(list_movies)
                .route_layer(read_gate.clone())
                .merge(post(create_movie).route_layer(write_gate.clone())),
        )
        .route(
            "/{id}",
            get(show_movie).route_layer(read_gate).merge(
                patch(update_movie)
                    .delete(delete_movie)
                    .route_layer(write_gate),
            ),
        )
}
