use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database, IndexModel};

use crate::backend::{SearchBackend, SearchHit};
use crate::error::Result;

pub const DEFAULT_CONTENT_COLLECTION: &str = "content_index";

/// `$text` search over the content index collection
///
/// Documents are written by the site indexer with `post_id`, `post_type`,
/// `title`, `content` and `url` fields.
#[derive(Clone)]
pub struct MongoContentIndex {
    collection: Collection<Document>,
}

impl MongoContentIndex {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }

    /// Text index over title and content; `$text` queries fail without it
    pub async fn ensure_text_index(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "title": "text", "content": "text" })
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for MongoContentIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let docs: Vec<Document> = self
            .collection
            .find(doc! { "$text": { "$search": query } })
            .projection(doc! {
                "post_id": 1,
                "post_type": 1,
                "title": 1,
                "content": 1,
                "url": 1,
                "relevance": { "$meta": "textScore" },
            })
            .sort(doc! { "relevance": { "$meta": "textScore" } })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;

        Ok(docs.iter().map(hit_from_document).collect())
    }
}

fn hit_from_document(doc: &Document) -> SearchHit {
    let text = |key: &str| doc.get_str(key).unwrap_or_default().to_string();
    let post_id = doc
        .get_i64("post_id")
        .ok()
        .or_else(|| doc.get_i32("post_id").ok().map(i64::from))
        .unwrap_or_default();

    SearchHit {
        id: doc
            .get_object_id("_id")
            .map(|oid| oid.to_hex())
            .unwrap_or_else(|_| text("_id")),
        post_id,
        post_type: text("post_type"),
        title: text("title"),
        content: text("content"),
        url: text("url"),
        relevance: doc.get_f64("relevance").unwrap_or_default(),
    }
}
