//! Document store: accounts, follows and district geometry.
//!
//! Backed by MongoDB. Uniqueness lives in the database (unique index on
//! account email, compound unique index per follow collection) so
//! concurrent writers cannot race past an application-level check; the
//! duplicate-key error maps to [`DocError::Duplicate`].

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use serde::{Deserialize, Serialize};

/// Errors from the document store.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// A unique index rejected the write.
    #[error("duplicate document")]
    Duplicate,
    #[error("document store error: {0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for DocError {
    fn from(error: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};
        if let ErrorKind::Write(WriteFailure::WriteError(ref we)) = *error.kind {
            // 11000: duplicate key
            if we.code == 11000 {
                return Self::Duplicate;
            }
        }
        Self::Backend(error.to_string())
    }
}

/// What kind of entity a follow points at. Each kind is its own
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowKind {
    Legislator,
    Bill,
    Nomination,
    Committee,
}

impl FollowKind {
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Legislator => "follow_legislators",
            Self::Bill => "follow_bills",
            Self::Nomination => "follow_nominations",
            Self::Committee => "follow_committees",
        }
    }
}

/// An account document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDoc {
    /// Hex form of the document id.
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// A congressional district's stored geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictShape {
    pub name: String,
    /// GeoJSON geometry, passed through to clients untouched.
    pub geometry: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FollowRecord {
    #[serde(rename = "userID")]
    user_id: String,
    #[serde(rename = "followingID")]
    following_id: String,
}

#[derive(Debug, Deserialize)]
struct DistrictRecord {
    name: String,
    geometry: mongodb::bson::Bson,
}

/// Trait for document store operations.
#[async_trait]
pub trait DocStore: Send + Sync {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<String, DocError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<UserDoc>, DocError>;

    async fn user_by_id(&self, id: &str) -> Result<Option<UserDoc>, DocError>;

    async fn create_follow(
        &self,
        kind: FollowKind,
        user_id: &str,
        following_id: &str,
    ) -> Result<(), DocError>;

    /// Returns whether a follow existed and was removed.
    async fn delete_follow(
        &self,
        kind: FollowKind,
        user_id: &str,
        following_id: &str,
    ) -> Result<bool, DocError>;

    async fn follow_exists(
        &self,
        kind: FollowKind,
        user_id: &str,
        following_id: &str,
    ) -> Result<bool, DocError>;

    /// Ids of everything of `kind` the account follows.
    async fn follows_for_user(
        &self,
        kind: FollowKind,
        user_id: &str,
    ) -> Result<Vec<String>, DocError>;

    /// Names of the districts whose geometry contains the point.
    async fn districts_containing(&self, lng: f64, lat: f64) -> Result<Vec<String>, DocError>;

    async fn district_shape(&self, name: &str) -> Result<Option<DistrictShape>, DocError>;
}

/// MongoDB-backed implementation of [`DocStore`].
#[derive(Clone)]
pub struct MongoDocStore {
    db: Database,
}

impl MongoDocStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create the indexes the store relies on. Index creation is
    /// idempotent, so this runs unconditionally at startup.
    ///
    /// # Errors
    ///
    /// Propagates the driver error.
    pub async fn ensure_indexes(&self) -> Result<(), DocError> {
        let unique = IndexOptions::builder().unique(true).build();

        self.db
            .collection::<UserRecord>("users")
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await?;

        for kind in [
            FollowKind::Legislator,
            FollowKind::Bill,
            FollowKind::Nomination,
            FollowKind::Committee,
        ] {
            self.db
                .collection::<FollowRecord>(kind.collection())
                .create_index(
                    IndexModel::builder()
                        .keys(doc! { "userID": 1, "followingID": 1 })
                        .options(unique.clone())
                        .build(),
                )
                .await?;
        }

        self.db
            .collection::<Document>("districts")
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "geometry": "2dsphere" })
                    .build(),
            )
            .await?;

        Ok(())
    }

    fn users(&self) -> mongodb::Collection<UserRecord> {
        self.db.collection("users")
    }

    fn follows(&self, kind: FollowKind) -> mongodb::Collection<FollowRecord> {
        self.db.collection(kind.collection())
    }
}

fn to_user(record: UserRecord) -> UserDoc {
    UserDoc {
        id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
        name: record.name,
        email: record.email,
        password_hash: record.password,
    }
}

#[async_trait]
impl DocStore for MongoDocStore {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<String, DocError> {
        let record = UserRecord {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
        };
        let result = self.users().insert_one(record).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .map(|id| id.to_hex())
            .unwrap_or_default();
        Ok(id)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserDoc>, DocError> {
        let record = self.users().find_one(doc! { "email": email }).await?;
        Ok(record.map(to_user))
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<UserDoc>, DocError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let record = self.users().find_one(doc! { "_id": oid }).await?;
        Ok(record.map(to_user))
    }

    async fn create_follow(
        &self,
        kind: FollowKind,
        user_id: &str,
        following_id: &str,
    ) -> Result<(), DocError> {
        let record = FollowRecord {
            user_id: user_id.to_string(),
            following_id: following_id.to_string(),
        };
        self.follows(kind).insert_one(record).await?;
        Ok(())
    }

    async fn delete_follow(
        &self,
        kind: FollowKind,
        user_id: &str,
        following_id: &str,
    ) -> Result<bool, DocError> {
        let result = self
            .follows(kind)
            .delete_one(doc! { "userID": user_id, "followingID": following_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn follow_exists(
        &self,
        kind: FollowKind,
        user_id: &str,
        following_id: &str,
    ) -> Result<bool, DocError> {
        let found = self
            .follows(kind)
            .find_one(doc! { "userID": user_id, "followingID": following_id })
            .await?;
        Ok(found.is_some())
    }

    async fn follows_for_user(
        &self,
        kind: FollowKind,
        user_id: &str,
    ) -> Result<Vec<String>, DocError> {
        use futures::TryStreamExt;

        let cursor = self.follows(kind).find(doc! { "userID": user_id }).await?;
        let records: Vec<FollowRecord> = cursor.try_collect().await?;
        Ok(records.into_iter().map(|r| r.following_id).collect())
    }

    async fn districts_containing(&self, lng: f64, lat: f64) -> Result<Vec<String>, DocError> {
        use futures::TryStreamExt;

        let filter = doc! {
            "geometry": {
                "$geoIntersects": {
                    "$geometry": {
                        "type": "Point",
                        "coordinates": [lng, lat],
                    }
                }
            }
        };
        let cursor = self
            .db
            .collection::<DistrictRecord>("districts")
            .find(filter)
            .await?;
        let records: Vec<DistrictRecord> = cursor.try_collect().await?;
        Ok(records.into_iter().map(|r| r.name).collect())
    }

    async fn district_shape(&self, name: &str) -> Result<Option<DistrictShape>, DocError> {
        let record = self
            .db
            .collection::<DistrictRecord>("districts")
            .find_one(doc! { "name": name })
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        let geometry = record
            .geometry
            .into_relaxed_extjson();
        Ok(Some(DistrictShape {
            name: record.name,
            geometry,
        }))
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::must_use_candidate)]
pub mod mock {
    //! In-memory document store for tests.

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{DistrictShape, DocError, DocStore, FollowKind, UserDoc};

    #[derive(Default)]
    pub struct MockDocStore {
        users: Mutex<Vec<UserDoc>>,
        follows: Mutex<Vec<(FollowKind, String, String)>>,
        districts: Mutex<Vec<DistrictShape>>,
        point_hits: Mutex<Vec<String>>,
        next_id: AtomicU32,
    }

    impl MockDocStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_district(&self, shape: DistrictShape) {
            self.districts.lock().unwrap().push(shape);
        }

        /// District names returned for any point lookup.
        pub fn set_point_hits(&self, names: &[&str]) {
            *self.point_hits.lock().unwrap() =
                names.iter().map(ToString::to_string).collect();
        }
    }

    #[async_trait]
    impl DocStore for MockDocStore {
        async fn create_user(
            &self,
            name: &str,
            email: &str,
            password_hash: &str,
        ) -> Result<String, DocError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == email) {
                return Err(DocError::Duplicate);
            }
            let id = format!("{:024x}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            users.push(UserDoc {
                id: id.clone(),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            });
            Ok(id)
        }

        async fn user_by_email(&self, email: &str) -> Result<Option<UserDoc>, DocError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn user_by_id(&self, id: &str) -> Result<Option<UserDoc>, DocError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }

        async fn create_follow(
            &self,
            kind: FollowKind,
            user_id: &str,
            following_id: &str,
        ) -> Result<(), DocError> {
            let mut follows = self.follows.lock().unwrap();
            let entry = (kind, user_id.to_string(), following_id.to_string());
            if follows.contains(&entry) {
                return Err(DocError::Duplicate);
            }
            follows.push(entry);
            Ok(())
        }

        async fn delete_follow(
            &self,
            kind: FollowKind,
            user_id: &str,
            following_id: &str,
        ) -> Result<bool, DocError> {
            let mut follows = self.follows.lock().unwrap();
            let entry = (kind, user_id.to_string(), following_id.to_string());
            let before = follows.len();
            follows.retain(|f| f != &entry);
            Ok(follows.len() < before)
        }

        async fn follow_exists(
            &self,
            kind: FollowKind,
            user_id: &str,
            following_id: &str,
        ) -> Result<bool, DocError> {
            let entry = (kind, user_id.to_string(), following_id.to_string());
            Ok(self.follows.lock().unwrap().contains(&entry))
        }

        async fn follows_for_user(
            &self,
            kind: FollowKind,
            user_id: &str,
        ) -> Result<Vec<String>, DocError> {
            Ok(self
                .follows
                .lock()
                .unwrap()
                .iter()
                .filter(|(k, u, _)| *k == kind && u == user_id)
                .map(|(_, _, f)| f.clone())
                .collect())
        }

        async fn districts_containing(
            &self,
            _lng: f64,
            _lat: f64,
        ) -> Result<Vec<String>, DocError> {
            Ok(self.point_hits.lock().unwrap().clone())
        }

        async fn district_shape(&self, name: &str) -> Result<Option<DistrictShape>, DocError> {
            Ok(self
                .districts
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.name == name)
                .cloned())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::mock::MockDocStore;
    use super::*;

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MockDocStore::new();
        store.create_user("Ada", "ada@example.com", "hash").await.unwrap();
        let result = store.create_user("Ada2", "ada@example.com", "hash2").await;
        assert!(matches!(result, Err(DocError::Duplicate)));
    }

    #[tokio::test]
    async fn follow_lifecycle() {
        let store = MockDocStore::new();
        store
            .create_follow(FollowKind::Bill, "u1", "HR1234")
            .await
            .unwrap();

        assert!(store.follow_exists(FollowKind::Bill, "u1", "HR1234").await.unwrap());
        assert!(!store.follow_exists(FollowKind::Nomination, "u1", "HR1234").await.unwrap());

        let dup = store.create_follow(FollowKind::Bill, "u1", "HR1234").await;
        assert!(matches!(dup, Err(DocError::Duplicate)));

        assert!(store.delete_follow(FollowKind::Bill, "u1", "HR1234").await.unwrap());
        assert!(!store.delete_follow(FollowKind::Bill, "u1", "HR1234").await.unwrap());
    }

    #[test]
    fn follow_kinds_map_to_collections() {
        assert_eq!(FollowKind::Legislator.collection(), "follow_legislators");
        assert_eq!(FollowKind::Committee.collection(), "follow_committees");
    }
}
