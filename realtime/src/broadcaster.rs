use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{
    enums::Role,
    error::{AppError, Res},
};
use dashmap::DashMap;
use futures::{StreamExt, stream::BoxStream};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

/// Buffered messages per tenant before slow subscribers start lagging.
const MEMORY_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub role: Role,
    pub latitude: f64,
    pub longitude: f64,
    pub at: DateTime<Utc>,
}

pub fn channel_name(company_id: Uuid) -> String {
    format!("locations:{}", company_id)
}

/// Fan-out of field locations to the tenant's dashboards. Redis spreads the
/// updates across instances; memory only reaches this process.
#[derive(Clone)]
pub enum Broadcaster {
    Redis {
        pool: deadpool_redis::Pool,
        client: redis::Client,
    },
    Memory(Arc<DashMap<Uuid, broadcast::Sender<String>>>),
}

impl Broadcaster {
    pub fn memory() -> Self {
        Broadcaster::Memory(Arc::new(DashMap::new()))
    }

    /// Redis when a URL is configured, memory otherwise.
    pub fn from_url(redis_url: &str) -> Res<Self> {
        if redis_url.trim().is_empty() {
            log::warn!("REDIS_URL not set, locations are only broadcast within this instance");
            return Ok(Broadcaster::memory());
        }

        let pool = deadpool_redis::Config::from_url(redis_url)
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| AppError::Internal(format!("Failed to create Redis pool: {}", e)))?;
        let client = redis::Client::open(redis_url)?;
        Ok(Broadcaster::Redis { pool, client })
    }

    pub async fn publish(&self, update: &LocationUpdate) -> Res<()> {
        let payload = serde_json::to_string(update)
            .map_err(|e| AppError::Internal(format!("Failed to encode location: {}", e)))?;

        match self {
            Broadcaster::Redis { pool, .. } => {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|e| AppError::Internal(format!("Redis pool error: {}", e)))?;
                let _: i64 = conn.publish(channel_name(update.company_id), payload).await?;
            }
            Broadcaster::Memory(channels) => {
                if let Some(sender) = channels.get(&update.company_id) {
                    // No receivers simply means nobody is watching.
                    let _ = sender.send(payload);
                }
            }
        }
        Ok(())
    }

    /// JSON payloads published for `company_id` from now on.
    pub async fn subscribe(&self, company_id: Uuid) -> Res<BoxStream<'static, String>> {
        match self {
            Broadcaster::Redis { client, .. } => {
                let mut pubsub = client.get_async_pubsub().await?;
                pubsub.subscribe(channel_name(company_id)).await?;
                let stream = pubsub
                    .into_on_message()
                    .filter_map(|msg| async move { msg.get_payload::<String>().ok() });
                Ok(stream.boxed())
            }
            Broadcaster::Memory(channels) => {
                let receiver = channels
                    .entry(company_id)
                    .or_insert_with(|| broadcast::channel(MEMORY_CHANNEL_CAPACITY).0)
                    .subscribe();
                Ok(receiver_stream(receiver).boxed())
            }
        }
    }
}

fn receiver_stream(
    receiver: broadcast::Receiver<String>,
) -> impl futures::Stream<Item = String> + Send + 'static {
    futures::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(payload) => return Some((payload, receiver)),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Location subscriber lagged, {} updates dropped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn update(company_id: Uuid, latitude: f64) -> LocationUpdate {
        LocationUpdate {
            user_id: Uuid::new_v4(),
            company_id,
            name: "Carlos Pérez".to_string(),
            role: Role::Delivery,
            latitude,
            longitude: -76.53,
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn memory_subscriber_receives_tenant_updates() {
        let broadcaster = Broadcaster::memory();
        let company = Uuid::new_v4();
        let mut stream = broadcaster.subscribe(company).await.unwrap();

        let sent = update(company, 3.45);
        broadcaster.publish(&sent).await.unwrap();

        let payload = stream.next().await.unwrap();
        let received: LocationUpdate = serde_json::from_str(&payload).unwrap();
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn memory_updates_do_not_cross_tenants() {
        let broadcaster = Broadcaster::memory();
        let watched = Uuid::new_v4();
        let mut stream = broadcaster.subscribe(watched).await.unwrap();

        broadcaster.publish(&update(Uuid::new_v4(), 4.6)).await.unwrap();

        let next = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(next.is_err(), "foreign update leaked into the stream");
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_fine() {
        let broadcaster = Broadcaster::memory();
        assert!(broadcaster.publish(&update(Uuid::new_v4(), 6.2)).await.is_ok());
    }

    #[test]
    fn empty_url_selects_memory() {
        assert!(matches!(Broadcaster::from_url("  ").unwrap(), Broadcaster::Memory(_)));
    }

    #[test]
    fn channel_is_per_company() {
        let company = Uuid::new_v4();
        assert_eq!(channel_name(company), format!("locations:{}", company));
    }
}
