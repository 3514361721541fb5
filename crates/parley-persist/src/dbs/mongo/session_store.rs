use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::{Client, Collection, Database};
use parley_llm::Message;

use crate::dbs::mongo::models::{to_bson_datetime, MongoSession};
use crate::error::{PersistError, Result};
use crate::models::{cap_history, Session, SessionOwner, SessionStats};
use crate::store::SessionStore;

const SESSIONS_COLLECTION: &str = "sessions";

#[derive(Clone)]
pub struct MongoSessionStore {
    collection: Collection<MongoSession>,
}

impl MongoSessionStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(SESSIONS_COLLECTION),
        }
    }

    /// Connect to MongoDB and open the sessions collection
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        Ok(Self::new(&client.database(database)))
    }

    /// Index backing reaper scans and stats
    pub async fn ensure_indexes(&self) -> Result<()> {
        let by_activity = mongodb::IndexModel::builder()
            .keys(doc! { "last_active": 1 })
            .build();
        let by_user = mongodb::IndexModel::builder()
            .keys(doc! { "user_id": 1, "last_active": -1 })
            .build();
        self.collection.create_index(by_activity).await?;
        self.collection.create_index(by_user).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn load(&self, session_id: &str) -> Result<Vec<Message>> {
        let found = self
            .collection
            .find_one(doc! { "_id": session_id })
            .await?;
        Ok(found.map(|doc| doc.decode_history()).unwrap_or_default())
    }

    async fn save(
        &self,
        session_id: &str,
        history: Vec<Message>,
        owner: Option<&SessionOwner>,
    ) -> Result<()> {
        let now = to_bson_datetime(Utc::now());
        let history = bson::to_bson(&cap_history(history))?;
        let owner = owner.cloned().unwrap_or_default();

        self.collection
            .update_one(
                doc! { "_id": session_id },
                doc! {
                    "$set": { "history": history, "last_active": now },
                    "$setOnInsert": {
                        "user_id": owner.user_id,
                        "bot_name": owner.bot_name,
                        "created_at": now,
                    },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let found = self
            .collection
            .find_one(doc! { "_id": session_id })
            .await?;
        Ok(found.map(Session::from))
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": session_id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_stale_before(&self, threshold: DateTime<Utc>) -> Result<Vec<String>> {
        let ids: Vec<Document> = self
            .collection
            .clone_with_type::<Document>()
            .find(doc! { "last_active": { "$lt": to_bson_datetime(threshold) } })
            .projection(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(ids
            .iter()
            .filter_map(|d| d.get_str("_id").ok().map(str::to_string))
            .collect())
    }

    async fn purge_inactive_since(&self, threshold: DateTime<Utc>) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "last_active": { "$lt": to_bson_datetime(threshold) } })
            .await?;
        Ok(result.deleted_count)
    }

    async fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<Session>> {
        let docs: Vec<MongoSession> = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "last_active": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;
        Ok(docs.into_iter().map(Session::from).collect())
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<SessionStats> {
        let day_ago = to_bson_datetime(now - chrono::Duration::days(1));
        let week_ago = to_bson_datetime(now - chrono::Duration::days(7));

        let total_sessions = self.collection.count_documents(doc! {}).await?;
        let active_last_day = self
            .collection
            .count_documents(doc! { "last_active": { "$gt": day_ago } })
            .await?;
        let active_last_week = self
            .collection
            .count_documents(doc! { "last_active": { "$gt": week_ago } })
            .await?;

        let pipeline = vec![doc! {
            "$group": {
                "_id": null,
                "total": { "$sum": {
                    "$cond": [{ "$isArray": "$history" }, { "$size": "$history" }, 0]
                } },
            }
        }];
        let totals: Vec<Document> = self.collection.aggregate(pipeline).await?.try_collect().await?;
        let total_messages = totals
            .first()
            .and_then(|d| {
                d.get_i64("total")
                    .ok()
                    .or_else(|| d.get_i32("total").ok().map(i64::from))
            })
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0);

        Ok(SessionStats {
            total_sessions,
            active_last_day,
            active_last_week,
            total_messages,
        })
    }
}
