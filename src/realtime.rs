//! Periodic user-list publisher.
//!
//! A process-wide singleton task that snapshots the user table on a fixed
//! interval and fans it out to every subscriber of a broadcast channel. The
//! task is launched lazily by the first subscriber and runs until process
//! exit; a compare-and-swap on the `started` flag guarantees that concurrent
//! first connections launch exactly one loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::db::{Store, User};

/// Wire representation of a user: `{id, username, email, status, role}`.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub status: bool,
    pub role: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            status: user.status,
            role: user.role,
        }
    }
}

/// Event carried on the feed channel.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    UserList(Vec<UserDto>),
}

pub struct Broadcaster {
    store: Store,
    bus: broadcast::Sender<FeedEvent>,
    period: Duration,
    started: AtomicBool,
}

impl Broadcaster {
    #[must_use]
    pub fn new(store: Store, period: Duration, capacity: usize) -> Arc<Self> {
        let (bus, _) = broadcast::channel(capacity);
        Arc::new(Self {
            store,
            bus,
            period,
            started: AtomicBool::new(false),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.bus.subscribe()
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Launch the periodic publisher unless a previous call already did.
    /// Returns whether this call was the one that launched it.
    pub fn ensure_started(self: &Arc<Self>) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        info!("Starting user-list publisher (every {:?})", self.period);

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run().await;
        });

        true
    }

    /// The publish loop. The first tick of `interval` fires immediately, so
    /// the initial snapshot goes out as soon as the loop starts. The list is
    /// re-queried on every tick rather than captured once at start. No tick
    /// failure is fatal; the loop logs and keeps going.
    async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.period);

        loop {
            ticker.tick().await;

            match self.store.list_users().await {
                Ok(users) => {
                    let payload: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
                    // Send only fails when nobody is subscribed.
                    if let Err(e) = self.bus.send(FeedEvent::UserList(payload)) {
                        debug!("No feed subscribers, skipping publish: {}", e);
                    }
                }
                Err(e) => {
                    warn!("User-list snapshot failed, skipping tick: {}", e);
                }
            }
        }
    }
}
