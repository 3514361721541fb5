use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use std::time::Duration;

use crate::dbs::mongo::models::{to_bson_datetime, MongoRateWindow};
use crate::error::Result;
use crate::rate_limit::RateWindowStore;

const RATE_WINDOWS_COLLECTION: &str = "rate_windows";

#[derive(Clone)]
pub struct MongoRateWindowStore {
    collection: Collection<MongoRateWindow>,
}

impl MongoRateWindowStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(RATE_WINDOWS_COLLECTION),
        }
    }

    /// TTL index so MongoDB drops windows once `expires_at` passes
    pub async fn ensure_indexes(&self) -> Result<()> {
        let ttl = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(Duration::from_secs(0))
                    .build(),
            )
            .build();
        self.collection.create_index(ttl).await?;
        Ok(())
    }
}

#[async_trait]
impl RateWindowStore for MongoRateWindowStore {
    async fn timestamps(&self, key: &str, now: DateTime<Utc>) -> Result<Vec<i64>> {
        // TTL sweeps run about once a minute; filter expired windows here too
        let found = self
            .collection
            .find_one(doc! { "_id": key, "expires_at": { "$gt": to_bson_datetime(now) } })
            .await?;
        Ok(found.map(|w| w.timestamps).unwrap_or_default())
    }

    async fn store(
        &self,
        key: &str,
        timestamps: Vec<i64>,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": key },
                doc! { "$set": {
                    "timestamps": timestamps,
                    "expires_at": to_bson_datetime(expires_at),
                } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }
}
