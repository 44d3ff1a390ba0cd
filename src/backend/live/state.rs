//! In-memory registry of live streams.
//!
//! Streams exist only while their host is live; nothing is persisted. Media
//! never passes through the server, so a stream is just a title, a host and
//! the users currently watching.
//!
//! A viewer may watch from several connections at once (two tabs, phone and
//! laptop). Each connection joins and leaves separately, so viewers are
//! counted per connection and a user stops being a viewer when their last
//! connection leaves. The reported count is distinct users.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::shared::social::{LiveStreamResponse, UserSummary};

/// An active live stream
#[derive(Debug, Clone)]
pub struct LiveStream {
    pub id: Uuid,
    pub host: UserSummary,
    pub title: String,
    pub started_at: DateTime<Utc>,
    /// Open connections per watching user
    viewers: HashMap<Uuid, usize>,
}

impl LiveStream {
    /// Host or current viewer
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.host.id == user_id || self.viewers.contains_key(&user_id)
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    pub fn to_response(&self) -> LiveStreamResponse {
        LiveStreamResponse {
            id: self.id,
            host: self.host.clone(),
            title: self.title.clone(),
            started_at: self.started_at,
            viewers: self.viewer_count(),
        }
    }
}

/// Shared registry of active streams
#[derive(Clone, Default)]
pub struct LiveRegistry {
    streams: Arc<RwLock<HashMap<Uuid, LiveStream>>>,
}

impl LiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stream for `host`
    ///
    /// # Errors
    ///
    /// * `Conflict` - the host already has a live stream
    pub async fn start(&self, host: UserSummary, title: String) -> Result<LiveStream, BackendError> {
        let mut streams = self.streams.write().await;
        if streams.values().any(|s| s.host.id == host.id) {
            return Err(BackendError::conflict("You already have a live stream"));
        }

        let stream = LiveStream {
            id: Uuid::new_v4(),
            host,
            title,
            started_at: Utc::now(),
            viewers: HashMap::new(),
        };
        streams.insert(stream.id, stream.clone());
        tracing::info!("[Live] Stream {} started by {}", stream.id, stream.host.username);
        Ok(stream)
    }

    /// End a stream; only its host may do this
    pub async fn end(&self, stream_id: Uuid, host_id: Uuid) -> Result<LiveStream, BackendError> {
        let mut streams = self.streams.write().await;
        match streams.get(&stream_id) {
            None => Err(BackendError::not_found("Live stream not found")),
            Some(stream) if stream.host.id != host_id => {
                Err(BackendError::forbidden("Only the host can end this stream"))
            }
            Some(_) => {
                let stream = streams
                    .remove(&stream_id)
                    .ok_or_else(|| BackendError::not_found("Live stream not found"))?;
                tracing::info!("[Live] Stream {} ended", stream_id);
                Ok(stream)
            }
        }
    }

    pub async fn get(&self, stream_id: Uuid) -> Option<LiveStream> {
        self.streams.read().await.get(&stream_id).cloned()
    }

    /// Active streams, most viewers first, newest first among equals
    pub async fn list(&self) -> Vec<LiveStream> {
        let mut streams: Vec<LiveStream> = self.streams.read().await.values().cloned().collect();
        streams.sort_by(|a, b| {
            b.viewer_count()
                .cmp(&a.viewer_count())
                .then_with(|| b.started_at.cmp(&a.started_at))
        });
        streams
    }

    /// Register one viewing connection, returning the new count, or `None` if
    /// the stream is not live
    pub async fn add_viewer(&self, stream_id: Uuid, user_id: Uuid) -> Option<usize> {
        let mut streams = self.streams.write().await;
        let stream = streams.get_mut(&stream_id)?;
        if stream.host.id != user_id {
            *stream.viewers.entry(user_id).or_insert(0) += 1;
        }
        Some(stream.viewer_count())
    }

    /// Release one viewing connection, returning the new count, or `None` if
    /// the stream is gone
    pub async fn remove_viewer(&self, stream_id: Uuid, user_id: Uuid) -> Option<usize> {
        let mut streams = self.streams.write().await;
        let stream = streams.get_mut(&stream_id)?;
        if let Some(connections) = stream.viewers.get_mut(&user_id) {
            *connections -= 1;
            if *connections == 0 {
                stream.viewers.remove(&user_id);
            }
        }
        Some(stream.viewer_count())
    }

    pub async fn viewer_count(&self, stream_id: Uuid) -> usize {
        self.streams
            .read()
            .await
            .get(&stream_id)
            .map(LiveStream::viewer_count)
            .unwrap_or(0)
    }

    pub async fn is_participant(&self, stream_id: Uuid, user_id: Uuid) -> bool {
        self.streams
            .read()
            .await
            .get(&stream_id)
            .map(|s| s.is_participant(user_id))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn host(name: &str) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            username: name.to_string(),
            display_name: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_one_stream_per_host() {
        let registry = LiveRegistry::new();
        let alice = host("alice");

        registry.start(alice.clone(), "first".into()).await.unwrap();
        let err = registry.start(alice, "second".into()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_end_requires_host() {
        let registry = LiveRegistry::new();
        let alice = host("alice");
        let stream = registry.start(alice.clone(), "show".into()).await.unwrap();

        let err = registry.end(stream.id, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        registry.end(stream.id, alice.id).await.unwrap();
        assert!(registry.get(stream.id).await.is_none());

        let err = registry.end(stream.id, alice.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_viewers() {
        let registry = LiveRegistry::new();
        let alice = host("alice");
        let stream = registry.start(alice.clone(), "show".into()).await.unwrap();
        let bob = Uuid::new_v4();

        assert_eq!(registry.add_viewer(stream.id, bob).await, Some(1));
        // the host is not counted as a viewer
        assert_eq!(registry.add_viewer(stream.id, alice.id).await, Some(1));
        assert!(registry.is_participant(stream.id, alice.id).await);
        assert!(registry.is_participant(stream.id, bob).await);

        assert_eq!(registry.remove_viewer(stream.id, bob).await, Some(0));
        assert!(!registry.is_participant(stream.id, bob).await);
        assert_eq!(registry.remove_viewer(stream.id, bob).await, Some(0));
        assert_eq!(registry.add_viewer(Uuid::new_v4(), bob).await, None);
    }

    #[tokio::test]
    async fn test_viewer_with_two_connections() {
        let registry = LiveRegistry::new();
        let stream = registry.start(host("alice"), "show".into()).await.unwrap();
        let bob = Uuid::new_v4();

        assert_eq!(registry.add_viewer(stream.id, bob).await, Some(1));
        assert_eq!(registry.add_viewer(stream.id, bob).await, Some(1));

        // closing one tab keeps bob watching from the other
        assert_eq!(registry.remove_viewer(stream.id, bob).await, Some(1));
        assert!(registry.is_participant(stream.id, bob).await);

        assert_eq!(registry.remove_viewer(stream.id, bob).await, Some(0));
        assert!(!registry.is_participant(stream.id, bob).await);
    }

    #[tokio::test]
    async fn test_list_orders_by_viewers() {
        let registry = LiveRegistry::new();
        let quiet = registry.start(host("quiet"), "a".into()).await.unwrap();
        let busy = registry.start(host("busy"), "b".into()).await.unwrap();
        registry.add_viewer(busy.id, Uuid::new_v4()).await;
        registry.add_viewer(busy.id, Uuid::new_v4()).await;

        let ids: Vec<Uuid> = registry.list().await.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![busy.id, quiet.id]);
        assert_eq!(registry.viewer_count(busy.id).await, 2);
    }
}
