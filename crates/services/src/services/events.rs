//! Change notifications for clients that want live updates.
//!
//! Every successful mutation publishes a [`ChangeEvent`]; subscribers receive
//! only the events of the user they subscribed for.

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tokio::sync::broadcast;
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use tracing::warn;
use ts_rs::TS;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Profile,
    RoutineTasks,
    FocusRoutines,
    LongTermGoals,
    JournalEntries,
    FamilyEvents,
    ConnectionTasks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChangeOp {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ChangeEvent {
    pub user_id: String,
    pub collection: Collection,
    pub record_id: String,
    pub op: ChangeOp,
}

impl ChangeEvent {
    pub fn new(
        user_id: &str,
        collection: Collection,
        record_id: impl ToString,
        op: ChangeOp,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            collection,
            record_id: record_id.to_string(),
            op,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventService {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for EventService {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventService {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    /// Events for `user_id` from now on. A lagging subscriber skips what it missed.
    pub fn subscribe(&self, user_id: &str) -> impl Stream<Item = ChangeEvent> + Send + use<> {
        let user_id = user_id.to_string();
        BroadcastStream::new(self.sender.subscribe()).filter_map(move |received| match received {
            Ok(event) if event.user_id == user_id => Some(event),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(user_id = %user_id, skipped, "Change subscriber lagged");
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_only_see_their_own_events() {
        let events = EventService::default();
        let mut alice = Box::pin(events.subscribe("alice"));

        events.publish(ChangeEvent::new("bob", Collection::JournalEntries, "1", ChangeOp::Created));
        events.publish(ChangeEvent::new("alice", Collection::LongTermGoals, "2", ChangeOp::Deleted));

        let received = alice.next().await.unwrap();
        assert_eq!(received.collection, Collection::LongTermGoals);
        assert_eq!(received.record_id, "2");
        assert_eq!(received.op, ChangeOp::Deleted);
    }

    #[tokio::test]
    async fn stream_outlives_the_service_and_user_id_borrows() {
        let events = EventService::default();
        let mut stream = {
            let service = events.clone();
            let user_id = String::from("alice");
            Box::pin(service.subscribe(&user_id))
        };

        events.publish(ChangeEvent::new("alice", Collection::Profile, "alice", ChangeOp::Updated));
        let received = stream.next().await.unwrap();
        assert_eq!(received.collection, Collection::Profile);
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let events = EventService::new(4);
        events.publish(ChangeEvent::new("alice", Collection::Profile, "alice", ChangeOp::Updated));
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(Collection::FocusRoutines.to_string(), "focus_routines");
        assert_eq!(ChangeOp::Created.to_string(), "created");
    }
}
