//! Document repositories backed by the Firestore REST API.

use gloo_net::http::Request;
use ironlog_domain as domain;
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::bearer,
    firebase::Firebase,
    http::{HttpError, SendRequest, fetch, fetch_no_content},
};

pub mod model;
pub mod value;

pub use model::{FromDocument, ToFields, from_documents};
pub use value::{Document, Fields, ModelError, Value};

pub const USERS: &str = "users";
pub const MACHINES: &str = "machines";
pub const EXERCISES: &str = "exercises";
pub const CATEGORIES: &str = "categories";
pub const ASSIGNED_TABLES: &str = "assignedTables";
pub const WORKOUTS: &str = "workouts";
pub const NOTIFICATIONS: &str = "notifications";
pub const SUGGESTIONS: &str = "suggestions";
pub const POSTS: &str = "posts";
pub const CONFIG: &str = "config";

const CONFIG_DOCUMENT: &str = "app";
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    None,
    Exists,
    Missing,
}

impl Precondition {
    fn query(self) -> &'static str {
        match self {
            Precondition::None => "",
            Precondition::Exists => "currentDocument.exists=true",
            Precondition::Missing => "currentDocument.exists=false",
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct QueryResult {
    document: Option<Document>,
}

/// Body of a `:runQuery` request selecting all documents whose field equals the value.
#[must_use]
pub fn equality_query(collection: &str, field: &str, value: &Value) -> serde_json::Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": value,
                }
            }
        }
    })
}

/// Body of a `:commit` request. `database` is the resource name of the documents root.
#[must_use]
pub fn commit_request(database: &str, writes: &[domain::Write]) -> serde_json::Value {
    let name = |collection: &str, id: &str| format!("{database}/{collection}/{id}");
    let writes = writes
        .iter()
        .map(|write| match write {
            domain::Write::SetAssignedTable(table) => json!({
                "update": {
                    "name": name(ASSIGNED_TABLES, &table.id),
                    "fields": table.to_fields(),
                }
            }),
            domain::Write::DeleteAssignedTable(id) => {
                json!({ "delete": name(ASSIGNED_TABLES, id) })
            }
            domain::Write::DeleteMachine(id) => json!({ "delete": name(MACHINES, id) }),
            domain::Write::DeleteExercise(id) => json!({ "delete": name(EXERCISES, id) }),
        })
        .collect::<Vec<_>>();
    json!({ "writes": writes })
}

/// Query string of a `PATCH` request that only changes the given fields.
#[must_use]
pub fn update_mask(fields: &Fields) -> String {
    fields
        .keys()
        .into_iter()
        .map(|key| format!("updateMask.fieldPaths={}", urlencoding::encode(key)))
        .collect::<Vec<_>>()
        .join("&")
}

impl<S: SendRequest> Firebase<S> {
    /// Resource name of the documents root, e.g. `projects/p/databases/(default)/documents`.
    #[must_use]
    pub fn database(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.config.project_id
        )
    }

    fn documents_url(&self) -> String {
        format!("{}/{}", self.config.firestore_url, self.database())
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{collection}/{}",
            self.documents_url(),
            urlencoding::encode(id)
        )
    }

    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, HttpError> {
        let token = self.id_token().await?;
        let mut documents = vec![];
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/{collection}?pageSize={PAGE_SIZE}", self.documents_url());
            if let Some(page_token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(&urlencoding::encode(page_token));
            }
            let response: ListResponse = fetch(
                &self.sender,
                Request::get(&url)
                    .header("Authorization", &bearer(&token))
                    .build(),
            )
            .await?;
            documents.extend(response.documents);
            match response.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(documents)
    }

    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Document, HttpError> {
        let token = self.id_token().await?;
        fetch(
            &self.sender,
            Request::get(&self.document_url(collection, id))
                .header("Authorization", &bearer(&token))
                .build(),
        )
        .await
    }

    pub async fn query_documents(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, HttpError> {
        let token = self.id_token().await?;
        let results: Vec<QueryResult> = fetch(
            &self.sender,
            Request::post(&format!("{}:runQuery", self.documents_url()))
                .header("Authorization", &bearer(&token))
                .json(&equality_query(collection, field, value)),
        )
        .await?;
        Ok(results
            .into_iter()
            .filter_map(|result| result.document)
            .collect())
    }

    /// Writes all fields of a document, replacing any previous content.
    pub async fn write_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        precondition: Precondition,
    ) -> Result<Document, HttpError> {
        let token = self.id_token().await?;
        let mut url = self.document_url(collection, id);
        if precondition != Precondition::None {
            url.push('?');
            url.push_str(precondition.query());
        }
        fetch(
            &self.sender,
            Request::patch(&url)
                .header("Authorization", &bearer(&token))
                .json(&Document {
                    fields,
                    ..Document::default()
                }),
        )
        .await
    }

    /// Changes the given fields of an existing document.
    pub async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, HttpError> {
        let token = self.id_token().await?;
        let url = format!(
            "{}?{}&{}",
            self.document_url(collection, id),
            update_mask(&fields),
            Precondition::Exists.query()
        );
        fetch(
            &self.sender,
            Request::patch(&url)
                .header("Authorization", &bearer(&token))
                .json(&Document {
                    fields,
                    ..Document::default()
                }),
        )
        .await
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), HttpError> {
        let token = self.id_token().await?;
        fetch_no_content(
            &self.sender,
            Request::delete(&self.document_url(collection, id))
                .header("Authorization", &bearer(&token))
                .build(),
        )
        .await
    }

    pub async fn commit_writes(&self, writes: &[domain::Write]) -> Result<(), HttpError> {
        if writes.is_empty() {
            return Ok(());
        }
        let token = self.id_token().await?;
        fetch::<_, serde_json::Value>(
            &self.sender,
            Request::post(&format!("{}:commit", self.documents_url()))
                .header("Authorization", &bearer(&token))
                .json(&commit_request(&self.database(), writes)),
        )
        .await
        .map(|_| ())
    }

    async fn read_all<T: FromDocument>(&self, collection: &str) -> Result<Vec<T>, domain::ReadError> {
        Ok(from_documents(&self.list_documents(collection).await?))
    }

    async fn read_one<T: FromDocument>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<T, domain::ReadError> {
        Ok(T::from_document(&self.get_document(collection, id).await?)?)
    }

    async fn read_where<T: FromDocument>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, domain::ReadError> {
        Ok(from_documents(
            &self
                .query_documents(collection, field, &Value::string(value))
                .await?,
        ))
    }

    async fn create<T: FromDocument + ToFields>(
        &self,
        collection: &str,
        id: &str,
        entity: &T,
    ) -> Result<T, domain::CreateError> {
        let document = self
            .write_document(collection, id, entity.to_fields(), Precondition::Missing)
            .await?;
        Ok(T::from_document(&document)?)
    }

    async fn replace<T: FromDocument + ToFields>(
        &self,
        collection: &str,
        id: &str,
        entity: &T,
    ) -> Result<T, domain::UpdateError> {
        let document = self
            .write_document(collection, id, entity.to_fields(), Precondition::Exists)
            .await?;
        Ok(T::from_document(&document)?)
    }
}

impl<S: SendRequest> domain::UserRepository for Firebase<S> {
    async fn read_users(&self) -> Result<Vec<domain::User>, domain::ReadError> {
        self.read_all(USERS).await
    }

    async fn read_user(&self, id: &domain::UserID) -> Result<domain::User, domain::ReadError> {
        self.read_one(USERS, id).await
    }

    async fn create_user(&self, user: domain::User) -> Result<domain::User, domain::CreateError> {
        self.create(USERS, &user.id, &user).await
    }

    async fn replace_user(&self, user: domain::User) -> Result<domain::User, domain::UpdateError> {
        self.replace(USERS, &user.id, &user).await
    }
}

impl<S: SendRequest> domain::MachineRepository for Firebase<S> {
    async fn read_machines(&self) -> Result<Vec<domain::Machine>, domain::ReadError> {
        self.read_all(MACHINES).await
    }

    async fn read_machine(
        &self,
        id: &domain::MachineID,
    ) -> Result<domain::Machine, domain::ReadError> {
        self.read_one(MACHINES, id).await
    }

    async fn create_machine(
        &self,
        machine: domain::Machine,
    ) -> Result<domain::Machine, domain::CreateError> {
        self.create(MACHINES, &machine.id, &machine).await
    }

    async fn replace_machine(
        &self,
        machine: domain::Machine,
    ) -> Result<domain::Machine, domain::UpdateError> {
        self.replace(MACHINES, &machine.id, &machine).await
    }
}

impl<S: SendRequest> domain::ExerciseRepository for Firebase<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        self.read_all(EXERCISES).await
    }

    async fn read_exercise(
        &self,
        id: &domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        self.read_one(EXERCISES, id).await
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        self.create(EXERCISES, &exercise.id, &exercise).await
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        self.replace(EXERCISES, &exercise.id, &exercise).await
    }
}

impl<S: SendRequest> domain::CategoryRepository for Firebase<S> {
    async fn read_categories(&self) -> Result<Vec<domain::Category>, domain::ReadError> {
        self.read_all(CATEGORIES).await
    }

    async fn create_category(
        &self,
        category: domain::Category,
    ) -> Result<domain::Category, domain::CreateError> {
        self.create(CATEGORIES, &category.id, &category).await
    }

    async fn delete_category(
        &self,
        id: &domain::CategoryID,
    ) -> Result<domain::CategoryID, domain::DeleteError> {
        self.delete_document(CATEGORIES, id).await?;
        Ok(id.clone())
    }
}

impl<S: SendRequest> domain::AssignedTableRepository for Firebase<S> {
    async fn read_assigned_tables(&self) -> Result<Vec<domain::AssignedTable>, domain::ReadError> {
        self.read_all(ASSIGNED_TABLES).await
    }

    async fn read_assigned_tables_of(
        &self,
        user_id: &domain::UserID,
    ) -> Result<Vec<domain::AssignedTable>, domain::ReadError> {
        self.read_where(ASSIGNED_TABLES, "userId", user_id).await
    }
}

impl<S: SendRequest> domain::BatchRepository for Firebase<S> {
    async fn commit(&self, writes: Vec<domain::Write>) -> Result<(), domain::StorageError> {
        Ok(self.commit_writes(&writes).await?)
    }
}

impl<S: SendRequest> domain::WorkoutRepository for Firebase<S> {
    async fn read_workouts(
        &self,
        user_id: &domain::UserID,
    ) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        self.read_where(WORKOUTS, "userId", user_id).await
    }

    async fn create_workout(
        &self,
        workout: domain::WorkoutRecord,
    ) -> Result<domain::WorkoutRecord, domain::CreateError> {
        self.create(WORKOUTS, &workout.id, &workout).await
    }

    async fn modify_workout(
        &self,
        id: &domain::WorkoutID,
        sets: Option<domain::Sets>,
        reps: Option<domain::Reps>,
        weight: Option<domain::Weight>,
    ) -> Result<domain::WorkoutRecord, domain::UpdateError> {
        let mut fields = Fields::new();
        if let Some(sets) = sets {
            fields = fields.with("sets", Value::Integer(i64::from(u32::from(sets))));
        }
        if let Some(reps) = reps {
            fields = fields.with("reps", Value::Integer(i64::from(u32::from(reps))));
        }
        if let Some(weight) = weight {
            fields = fields.with("weight", Value::Double(f64::from(f32::from(weight))));
        }
        if fields.keys().is_empty() {
            return self.read_one(WORKOUTS, id).await.map_err(Into::into);
        }
        let document = self.update_fields(WORKOUTS, id, fields).await?;
        Ok(domain::WorkoutRecord::from_document(&document)?)
    }

    async fn delete_workout(
        &self,
        id: &domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        self.delete_document(WORKOUTS, id).await?;
        Ok(id.clone())
    }
}

impl<S: SendRequest> domain::FeedbackRepository for Firebase<S> {
    async fn read_notifications(&self) -> Result<Vec<domain::Notification>, domain::ReadError> {
        self.read_all(NOTIFICATIONS).await
    }

    async fn create_notification(
        &self,
        notification: domain::Notification,
    ) -> Result<domain::Notification, domain::CreateError> {
        self.create(NOTIFICATIONS, &notification.id, &notification)
            .await
    }

    async fn mark_notification_read(
        &self,
        id: &domain::NotificationID,
    ) -> Result<domain::NotificationID, domain::UpdateError> {
        self.update_fields(NOTIFICATIONS, id, Fields::new().with("read", Value::Boolean(true)))
            .await?;
        Ok(id.clone())
    }

    async fn delete_notification(
        &self,
        id: &domain::NotificationID,
    ) -> Result<domain::NotificationID, domain::DeleteError> {
        self.delete_document(NOTIFICATIONS, id).await?;
        Ok(id.clone())
    }

    async fn read_suggestions(&self) -> Result<Vec<domain::Suggestion>, domain::ReadError> {
        self.read_all(SUGGESTIONS).await
    }

    async fn create_suggestion(
        &self,
        suggestion: domain::Suggestion,
    ) -> Result<domain::Suggestion, domain::CreateError> {
        self.create(SUGGESTIONS, &suggestion.id, &suggestion).await
    }

    async fn mark_suggestion_reviewed(
        &self,
        id: &domain::SuggestionID,
    ) -> Result<domain::SuggestionID, domain::UpdateError> {
        self.update_fields(
            SUGGESTIONS,
            id,
            Fields::new().with(
                "status",
                Value::string(domain::SuggestionStatus::Reviewed.as_str()),
            ),
        )
        .await?;
        Ok(id.clone())
    }

    async fn delete_suggestion(
        &self,
        id: &domain::SuggestionID,
    ) -> Result<domain::SuggestionID, domain::DeleteError> {
        self.delete_document(SUGGESTIONS, id).await?;
        Ok(id.clone())
    }
}

impl<S: SendRequest> domain::PostRepository for Firebase<S> {
    async fn read_posts(&self) -> Result<Vec<domain::Post>, domain::ReadError> {
        self.read_all(POSTS).await
    }

    async fn create_post(&self, post: domain::Post) -> Result<domain::Post, domain::CreateError> {
        self.create(POSTS, &post.id, &post).await
    }

    async fn delete_post(&self, id: &domain::PostID) -> Result<domain::PostID, domain::DeleteError> {
        self.delete_document(POSTS, id).await?;
        Ok(id.clone())
    }
}

impl<S: SendRequest> domain::ConfigRepository for Firebase<S> {
    async fn read_config(&self) -> Result<domain::Config, domain::ReadError> {
        self.read_one(CONFIG, CONFIG_DOCUMENT).await
    }

    async fn replace_config(
        &self,
        config: domain::Config,
    ) -> Result<domain::Config, domain::UpdateError> {
        let document = self
            .write_document(CONFIG, CONFIG_DOCUMENT, config.to_fields(), Precondition::None)
            .await?;
        Ok(domain::Config::from_document(&document)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tests::data::ASSIGNED_TABLE;

    #[test]
    fn test_equality_query() {
        assert_eq!(
            equality_query(WORKOUTS, "userId", &Value::string("u1")),
            json!({
                "structuredQuery": {
                    "from": [{"collectionId": "workouts"}],
                    "where": {
                        "fieldFilter": {
                            "field": {"fieldPath": "userId"},
                            "op": "EQUAL",
                            "value": {"stringValue": "u1"}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_commit_request() {
        let database = "projects/demo/databases/(default)/documents";
        let request = commit_request(
            database,
            &[
                domain::Write::DeleteMachine("m1".into()),
                domain::Write::DeleteExercise("e1".into()),
                domain::Write::SetAssignedTable(ASSIGNED_TABLE.clone()),
                domain::Write::DeleteAssignedTable("t2".into()),
            ],
        );

        assert_eq!(
            request["writes"][0],
            json!({"delete": "projects/demo/databases/(default)/documents/machines/m1"})
        );
        assert_eq!(
            request["writes"][1],
            json!({"delete": "projects/demo/databases/(default)/documents/exercises/e1"})
        );
        assert_eq!(
            request["writes"][2]["update"]["name"],
            json!("projects/demo/databases/(default)/documents/assignedTables/t1")
        );
        assert_eq!(
            request["writes"][2]["update"]["fields"]["status"],
            json!({"stringValue": "COMPLETED"})
        );
        assert_eq!(
            request["writes"][3],
            json!({"delete": "projects/demo/databases/(default)/documents/assignedTables/t2"})
        );
    }

    #[test]
    fn test_update_mask() {
        let fields = Fields::new()
            .with("weight", Value::Double(50.0))
            .with("reps", Value::Integer(8));

        assert_eq!(
            update_mask(&fields),
            "updateMask.fieldPaths=reps&updateMask.fieldPaths=weight"
        );
    }
}
