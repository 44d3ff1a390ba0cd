/**
 * Room Registry
 *
 * Rooms are named broadcast channels. Every room owns one
 * `tokio::sync::broadcast` sender; connections subscribe to the rooms they
 * have joined and receive a copy of each event published afterwards.
 *
 * # Room Names
 *
 * - `user:<id>` - personal room of a user (notifications, signaling)
 * - `stream:<id>` - audience of a live stream
 * - `chat:<a>:<b>` - direct chat between two users, ids in ascending order
 *
 * # Delivery
 *
 * There is no replay: a connection only sees events published while it is
 * subscribed. Channels without receivers are dropped by `cleanup_inactive`,
 * which the server calls periodically.
 */

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::{RealtimeEvent, SharedError};

/// A broadcast room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    /// Personal room of a user
    User(Uuid),
    /// Audience of a live stream
    Stream(Uuid),
    /// Direct chat; always stored with the smaller id first
    Chat(Uuid, Uuid),
}

impl Room {
    /// Direct chat room between two users, independent of argument order
    pub fn chat(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Room::Chat(a, b)
        } else {
            Room::Chat(b, a)
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::User(id) => write!(f, "user:{}", id),
            Room::Stream(id) => write!(f, "stream:{}", id),
            Room::Chat(a, b) => write!(f, "chat:{}:{}", a, b),
        }
    }
}

impl FromStr for Room {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_id = |raw: &str| {
            Uuid::parse_str(raw).map_err(|_| SharedError::validation("room", format!("invalid id '{}'", raw)))
        };

        let mut parts = s.split(':');
        let room = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("user"), Some(id), None, None) => Room::User(parse_id(id)?),
            (Some("stream"), Some(id), None, None) => Room::Stream(parse_id(id)?),
            (Some("chat"), Some(a), Some(b), None) => {
                let (a, b) = (parse_id(a)?, parse_id(b)?);
                if a == b {
                    return Err(SharedError::validation("room", "chat needs two distinct users"));
                }
                Room::chat(a, b)
            }
            _ => return Err(SharedError::validation("room", format!("unknown room '{}'", s))),
        };
        Ok(room)
    }
}

/// Registry of room broadcast channels
///
/// Cheap to clone; all clones share the same channels.
#[derive(Clone)]
pub struct RoomRegistry {
    channels: Arc<Mutex<HashMap<Room, broadcast::Sender<RealtimeEvent>>>>,
    capacity: usize,
}

impl RoomRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    // A panic while holding the lock leaves the map itself consistent.
    fn channels(&self) -> MutexGuard<'_, HashMap<Room, broadcast::Sender<RealtimeEvent>>> {
        self.channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get or create the sender of a room
    pub fn sender(&self, room: Room) -> broadcast::Sender<RealtimeEvent> {
        let capacity = self.capacity;
        self.channels()
            .entry(room)
            .or_insert_with(|| broadcast::channel(capacity).0)
            .clone()
    }

    /// Subscribe to a room, creating it when needed
    pub fn subscribe(&self, room: Room) -> broadcast::Receiver<RealtimeEvent> {
        self.sender(room).subscribe()
    }

    /// Publish an event to a room
    ///
    /// Returns the number of receivers that got the event. Publishing to a
    /// room nobody has joined is not an error and returns 0.
    pub fn publish(&self, room: Room, event: RealtimeEvent) -> usize {
        let sender = self.channels().get(&room).cloned();
        match sender.map(|tx| tx.send(event)) {
            Some(Ok(receivers)) => {
                tracing::debug!("[Realtime] Event published to {} ({} receivers)", room, receivers);
                receivers
            }
            _ => {
                tracing::debug!("[Realtime] No receivers in {}", room);
                0
            }
        }
    }

    /// Number of receivers currently subscribed to a room
    pub fn receiver_count(&self, room: Room) -> usize {
        self.channels()
            .get(&room)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Number of rooms with a channel
    pub fn room_count(&self) -> usize {
        self.channels().len()
    }

    /// Drop channels without receivers, returning how many were removed
    pub fn cleanup_inactive(&self) -> usize {
        let mut channels = self.channels();
        let before = channels.len();
        channels.retain(|_, tx| tx.receiver_count() > 0);
        before - channels.len()
    }
}
