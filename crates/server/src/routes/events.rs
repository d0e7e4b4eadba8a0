use std::{convert::Infallible, time::Duration};

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::{deployment::Deployment, error::ApiError, extract::CurrentUser};

/// GET /api/events
/// Server-sent `change` events for the signed-in user's collections. The stream
/// ends when the server shuts down.
pub async fn stream_events(
    State(deployment): State<Deployment>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    debug!(user_id = %user_id, "Change stream opened");
    let stream = deployment
        .events()
        .subscribe(&user_id)
        .take_until(deployment.shutdown().clone().cancelled_owned())
        .filter_map(|change| async move {
            match Event::default().event("change").json_data(&change) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!(error = %e, "Could not encode change event");
                    None
                }
            }
        });
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

pub fn router(_deployment: &Deployment) -> Router<Deployment> {
    Router::new().route("/events", get(stream_events))
}
