//! Cached Firebase
//!
//! Firestore is the authoritative data source. The catalog (machines, exercises and categories)
//! changes rarely and is read on most pages, so its documents are kept in local storage for an
//! hour. Every write through this client drops the affected cache entry, signing out drops all.

use chrono::Utc;
use ironlog_domain as domain;
use ironlog_web_app::cache::{CacheEntry, CacheRepository};
use log::warn;

use crate::{
    firebase::Firebase,
    firestore::{CATEGORIES, Document, EXERCISES, FromDocument, MACHINES, from_documents},
    http::{GlooNetSendRequest, SendRequest},
    local_storage::{LocalStorage, cache_key},
};

macro_rules! invalidating {
    ($self: ident, $collection: expr, $call: expr) => {{
        let result = $call.await;
        if result.is_ok() {
            $self.invalidate($collection);
        }
        result
    }};
}

#[derive(Clone)]
pub struct CachedFirebase<S: SendRequest> {
    pub firebase: Firebase<S>,
}

impl CachedFirebase<GlooNetSendRequest> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            firebase: Firebase::new(),
        }
    }
}

impl Default for CachedFirebase<GlooNetSendRequest> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SendRequest> CachedFirebase<S> {
    async fn read_cached<T: FromDocument>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, domain::ReadError> {
        let key = cache_key(collection);
        let now = Utc::now();

        match LocalStorage.read_cache_entry::<Vec<Document>>(&key) {
            Ok(Some(entry)) => {
                if let Some(documents) = entry.into_fresh(now) {
                    return Ok(from_documents(&documents));
                }
            }
            Ok(None) => {}
            Err(err) => warn!("failed to read {collection} from cache: {err}"),
        }

        let documents = self.firebase.list_documents(collection).await?;
        if let Err(err) = LocalStorage.write_cache_entry(&key, &CacheEntry::new(&documents, now)) {
            warn!("failed to write {collection} into cache: {err}");
        }

        Ok(from_documents(&documents))
    }

    fn invalidate(&self, collection: &str) {
        if let Err(err) = LocalStorage.remove_cache_entry(&cache_key(collection)) {
            warn!("failed to remove {collection} from cache: {err}");
        }
    }

    fn clear(&self) {
        match LocalStorage.cache_keys() {
            Ok(keys) => {
                for key in keys {
                    if let Err(err) = LocalStorage.remove_cache_entry(&key) {
                        warn!("failed to remove {key} from cache: {err}");
                    }
                }
            }
            Err(err) => warn!("failed to clear cache: {err}"),
        }
    }
}

impl<S: SendRequest> domain::SessionRepository for CachedFirebase<S> {
    async fn sign_in(
        &self,
        email: domain::Email,
        password: domain::Password,
    ) -> Result<domain::Session, domain::ReadError> {
        self.firebase.sign_in(email, password).await
    }

    async fn initialize_session(&self) -> Result<domain::Session, domain::ReadError> {
        self.firebase.initialize_session().await
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        self.clear();
        self.firebase.delete_session().await
    }

    async fn send_password_reset(&self, email: domain::Email) -> Result<(), domain::UpdateError> {
        self.firebase.send_password_reset(email).await
    }

    async fn create_account(
        &self,
        email: domain::Email,
        password: domain::Password,
    ) -> Result<domain::UserID, domain::CreateError> {
        self.firebase.create_account(email, password).await
    }
}

impl<S: SendRequest> domain::UserRepository for CachedFirebase<S> {
    async fn read_users(&self) -> Result<Vec<domain::User>, domain::ReadError> {
        self.firebase.read_users().await
    }

    async fn read_user(&self, id: &domain::UserID) -> Result<domain::User, domain::ReadError> {
        self.firebase.read_user(id).await
    }

    async fn create_user(&self, user: domain::User) -> Result<domain::User, domain::CreateError> {
        self.firebase.create_user(user).await
    }

    async fn replace_user(&self, user: domain::User) -> Result<domain::User, domain::UpdateError> {
        self.firebase.replace_user(user).await
    }
}

impl<S: SendRequest> domain::MachineRepository for CachedFirebase<S> {
    async fn read_machines(&self) -> Result<Vec<domain::Machine>, domain::ReadError> {
        self.read_cached(MACHINES).await
    }

    async fn read_machine(
        &self,
        id: &domain::MachineID,
    ) -> Result<domain::Machine, domain::ReadError> {
        self.read_machines()
            .await?
            .into_iter()
            .find(|machine| machine.id == *id)
            .ok_or(domain::ReadError::NotFound)
    }

    async fn create_machine(
        &self,
        machine: domain::Machine,
    ) -> Result<domain::Machine, domain::CreateError> {
        invalidating!(self, MACHINES, self.firebase.create_machine(machine))
    }

    async fn replace_machine(
        &self,
        machine: domain::Machine,
    ) -> Result<domain::Machine, domain::UpdateError> {
        invalidating!(self, MACHINES, self.firebase.replace_machine(machine))
    }
}

impl<S: SendRequest> domain::ExerciseRepository for CachedFirebase<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        self.read_cached(EXERCISES).await
    }

    async fn read_exercise(
        &self,
        id: &domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        self.read_exercises()
            .await?
            .into_iter()
            .find(|exercise| exercise.id == *id)
            .ok_or(domain::ReadError::NotFound)
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        invalidating!(self, EXERCISES, self.firebase.create_exercise(exercise))
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        invalidating!(self, EXERCISES, self.firebase.replace_exercise(exercise))
    }
}

impl<S: SendRequest> domain::CategoryRepository for CachedFirebase<S> {
    async fn read_categories(&self) -> Result<Vec<domain::Category>, domain::ReadError> {
        self.read_cached(CATEGORIES).await
    }

    async fn create_category(
        &self,
        category: domain::Category,
    ) -> Result<domain::Category, domain::CreateError> {
        invalidating!(self, CATEGORIES, self.firebase.create_category(category))
    }

    async fn delete_category(
        &self,
        id: &domain::CategoryID,
    ) -> Result<domain::CategoryID, domain::DeleteError> {
        invalidating!(self, CATEGORIES, self.firebase.delete_category(id))
    }
}

impl<S: SendRequest> domain::AssignedTableRepository for CachedFirebase<S> {
    async fn read_assigned_tables(&self) -> Result<Vec<domain::AssignedTable>, domain::ReadError> {
        self.firebase.read_assigned_tables().await
    }

    async fn read_assigned_tables_of(
        &self,
        user_id: &domain::UserID,
    ) -> Result<Vec<domain::AssignedTable>, domain::ReadError> {
        self.firebase.read_assigned_tables_of(user_id).await
    }
}

impl<S: SendRequest> domain::BatchRepository for CachedFirebase<S> {
    async fn commit(&self, writes: Vec<domain::Write>) -> Result<(), domain::StorageError> {
        let machines = writes
            .iter()
            .any(|write| matches!(write, domain::Write::DeleteMachine(_)));
        let exercises = writes
            .iter()
            .any(|write| matches!(write, domain::Write::DeleteExercise(_)));

        self.firebase.commit(writes).await?;

        if machines {
            self.invalidate(MACHINES);
        }
        if exercises {
            self.invalidate(EXERCISES);
        }
        Ok(())
    }
}

impl<S: SendRequest> domain::WorkoutRepository for CachedFirebase<S> {
    async fn read_workouts(
        &self,
        user_id: &domain::UserID,
    ) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        self.firebase.read_workouts(user_id).await
    }

    async fn create_workout(
        &self,
        workout: domain::WorkoutRecord,
    ) -> Result<domain::WorkoutRecord, domain::CreateError> {
        self.firebase.create_workout(workout).await
    }

    async fn modify_workout(
        &self,
        id: &domain::WorkoutID,
        sets: Option<domain::Sets>,
        reps: Option<domain::Reps>,
        weight: Option<domain::Weight>,
    ) -> Result<domain::WorkoutRecord, domain::UpdateError> {
        self.firebase.modify_workout(id, sets, reps, weight).await
    }

    async fn delete_workout(
        &self,
        id: &domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        self.firebase.delete_workout(id).await
    }
}

impl<S: SendRequest> domain::FeedbackRepository for CachedFirebase<S> {
    async fn read_notifications(&self) -> Result<Vec<domain::Notification>, domain::ReadError> {
        self.firebase.read_notifications().await
    }

    async fn create_notification(
        &self,
        notification: domain::Notification,
    ) -> Result<domain::Notification, domain::CreateError> {
        self.firebase.create_notification(notification).await
    }

    async fn mark_notification_read(
        &self,
        id: &domain::NotificationID,
    ) -> Result<domain::NotificationID, domain::UpdateError> {
        self.firebase.mark_notification_read(id).await
    }

    async fn delete_notification(
        &self,
        id: &domain::NotificationID,
    ) -> Result<domain::NotificationID, domain::DeleteError> {
        self.firebase.delete_notification(id).await
    }

    async fn read_suggestions(&self) -> Result<Vec<domain::Suggestion>, domain::ReadError> {
        self.firebase.read_suggestions().await
    }

    async fn create_suggestion(
        &self,
        suggestion: domain::Suggestion,
    ) -> Result<domain::Suggestion, domain::CreateError> {
        self.firebase.create_suggestion(suggestion).await
    }

    async fn mark_suggestion_reviewed(
        &self,
        id: &domain::SuggestionID,
    ) -> Result<domain::SuggestionID, domain::UpdateError> {
        self.firebase.mark_suggestion_reviewed(id).await
    }

    async fn delete_suggestion(
        &self,
        id: &domain::SuggestionID,
    ) -> Result<domain::SuggestionID, domain::DeleteError> {
        self.firebase.delete_suggestion(id).await
    }
}

impl<S: SendRequest> domain::PostRepository for CachedFirebase<S> {
    async fn read_posts(&self) -> Result<Vec<domain::Post>, domain::ReadError> {
        self.firebase.read_posts().await
    }

    async fn create_post(&self, post: domain::Post) -> Result<domain::Post, domain::CreateError> {
        self.firebase.create_post(post).await
    }

    async fn delete_post(&self, id: &domain::PostID) -> Result<domain::PostID, domain::DeleteError> {
        self.firebase.delete_post(id).await
    }
}

impl<S: SendRequest> domain::ConfigRepository for CachedFirebase<S> {
    async fn read_config(&self) -> Result<domain::Config, domain::ReadError> {
        self.firebase.read_config().await
    }

    async fn replace_config(
        &self,
        config: domain::Config,
    ) -> Result<domain::Config, domain::UpdateError> {
        self.firebase.replace_config(config).await
    }
}

impl<S: SendRequest> domain::FunctionsRepository for CachedFirebase<S> {
    async fn reset_user_password(
        &self,
        email: &domain::Email,
        new_password: &domain::Password,
    ) -> Result<(), domain::StorageError> {
        self.firebase.reset_user_password(email, new_password).await
    }

    async fn send_welcome_email(
        &self,
        email: domain::WelcomeEmail,
    ) -> Result<(), domain::StorageError> {
        self.firebase.send_welcome_email(email).await
    }
}

impl<S: SendRequest> domain::ObjectStorageRepository for CachedFirebase<S> {
    async fn upload_object(
        &self,
        path: &str,
        upload: &domain::Upload,
    ) -> Result<String, domain::CreateError> {
        self.firebase.upload_object(path, upload).await
    }

    async fn delete_object(&self, url: &str) -> Result<(), domain::DeleteError> {
        self.firebase.delete_object(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use std::cell::RefCell;
        use std::collections::VecDeque;

        use chrono::TimeDelta;
        use domain::{
            BatchRepository, ConfigRepository, MachineRepository, SessionRepository,
            WorkoutRepository,
        };
        use gloo_storage::Storage;
        use pretty_assertions::assert_eq;
        use serde_json::json;
        use wasm_bindgen_test::wasm_bindgen_test;

        use crate::auth::StoredSession;
        use crate::firebase::{FIREBASE_CONFIG, FirebaseConfig};
        use crate::firestore::ToFields;
        use crate::tests::data::{MACHINE, MACHINE_2, WORKOUT};

        use super::*;

        #[wasm_bindgen_test]
        async fn test_initialize_session_without_session() {
            reset();

            let firebase = cached_firebase(vec![]);

            assert!(matches!(
                firebase.initialize_session().await,
                Err(domain::ReadError::Storage(domain::StorageError::NoSession))
            ));
            assert!(firebase.firebase.sender.requests.borrow().is_empty());
        }

        #[wasm_bindgen_test]
        async fn test_sign_in() {
            reset();

            let firebase = cached_firebase(vec![ok(json!({
                "localId": "u1",
                "email": "alice@example.com",
                "idToken": "id-1",
                "refreshToken": "refresh-1",
                "expiresIn": "3600"
            }))]);

            let session = firebase
                .sign_in(
                    domain::Email::new("alice@example.com").unwrap(),
                    domain::Password::new("secret1").unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(session.user_id, domain::UserID::from("u1"));
            assert_eq!(session.id_token, "id-1");
            assert_eq!(
                firebase.initialize_session().await.unwrap(),
                session.clone()
            );
        }

        #[wasm_bindgen_test]
        async fn test_sign_in_invalid_credentials() {
            reset();

            let firebase = cached_firebase(vec![status(
                400,
                json!({"error": {"message": "INVALID_LOGIN_CREDENTIALS"}}),
            )]);

            assert!(matches!(
                firebase
                    .sign_in(
                        domain::Email::new("alice@example.com").unwrap(),
                        domain::Password::new("wrong1").unwrap(),
                    )
                    .await,
                Err(domain::ReadError::NotFound)
            ));
            assert_eq!(LocalStorage.read_session(), Ok(None));
        }

        #[wasm_bindgen_test]
        async fn test_expired_token_is_refreshed() {
            reset();
            LocalStorage
                .write_session(&StoredSession {
                    expires_at: Utc::now() + TimeDelta::seconds(10),
                    ..stored_session()
                })
                .unwrap();

            let firebase = cached_firebase(vec![
                ok(json!({
                    "id_token": "id-2",
                    "refresh_token": "refresh-2",
                    "expires_in": "3600",
                    "user_id": "u1"
                })),
                ok(json!({})),
            ]);

            assert_eq!(firebase.read_config().await.unwrap(), domain::Config::default());
            assert_eq!(
                LocalStorage.read_session().unwrap().unwrap().id_token,
                "id-2"
            );
            let requests = firebase.firebase.sender.requests.borrow();
            assert!(requests[0].url().starts_with("https://securetoken.test/v1/token"));
            assert_eq!(
                requests[1].headers().get("Authorization"),
                Some("Bearer id-2".to_string())
            );
        }

        #[wasm_bindgen_test]
        async fn test_rejected_refresh_token_ends_session() {
            reset();
            LocalStorage
                .write_session(&StoredSession {
                    expires_at: Utc::now(),
                    ..stored_session()
                })
                .unwrap();

            let firebase = cached_firebase(vec![status(
                400,
                json!({"error": {"message": "TOKEN_EXPIRED"}}),
            )]);

            assert!(matches!(
                firebase.initialize_session().await,
                Err(domain::ReadError::Storage(domain::StorageError::NoSession))
            ));
            assert_eq!(LocalStorage.read_session(), Ok(None));
        }

        #[wasm_bindgen_test]
        async fn test_read_machines_is_cached() {
            reset();
            sign_in();

            let firebase = cached_firebase(vec![ok(json!({
                "documents": [
                    document("machines", "m1", &*MACHINE),
                    document("machines", "m2", &*MACHINE_2),
                ]
            }))]);

            assert_eq!(
                firebase.read_machines().await.unwrap(),
                vec![MACHINE.clone(), MACHINE_2.clone()]
            );
            assert_eq!(
                firebase.read_machine(&MACHINE_2.id).await.unwrap(),
                MACHINE_2.clone()
            );
            assert!(matches!(
                firebase.read_machine(&domain::MachineID::from("m3")).await,
                Err(domain::ReadError::NotFound)
            ));
            assert_eq!(firebase.firebase.sender.requests.borrow().len(), 1);
        }

        #[wasm_bindgen_test]
        async fn test_read_machines_paginated() {
            reset();
            sign_in();

            let firebase = cached_firebase(vec![
                ok(json!({
                    "documents": [document("machines", "m1", &*MACHINE)],
                    "nextPageToken": "page 2"
                })),
                ok(json!({"documents": [document("machines", "m2", &*MACHINE_2)]})),
            ]);

            assert_eq!(firebase.read_machines().await.unwrap().len(), 2);
            let requests = firebase.firebase.sender.requests.borrow();
            assert!(requests[1].url().ends_with("&pageToken=page%202"));
        }

        #[wasm_bindgen_test]
        async fn test_replace_machine_invalidates_cache() {
            reset();
            sign_in();

            let firebase = cached_firebase(vec![
                ok(json!({"documents": [document("machines", "m1", &*MACHINE)]})),
                ok(document("machines", "m1", &*MACHINE)),
            ]);

            firebase.read_machines().await.unwrap();
            firebase.replace_machine(MACHINE.clone()).await.unwrap();

            assert!(matches!(
                firebase.read_machines().await,
                Err(domain::ReadError::Storage(domain::StorageError::NoConnection))
            ));
            let requests = firebase.firebase.sender.requests.borrow();
            assert_eq!(requests[1].method(), gloo_net::http::Method::PATCH);
            assert!(requests[1].url().ends_with("/machines/m1?currentDocument.exists=true"));
        }

        #[wasm_bindgen_test]
        async fn test_create_machine_conflict() {
            reset();
            sign_in();

            let firebase = cached_firebase(vec![status(
                409,
                json!({"error": {"message": "Document already exists"}}),
            )]);

            assert!(matches!(
                firebase.create_machine(MACHINE.clone()).await,
                Err(domain::CreateError::Conflict)
            ));
        }

        #[wasm_bindgen_test]
        async fn test_commit_invalidates_cache() {
            reset();
            sign_in();

            let firebase = cached_firebase(vec![
                ok(json!({"documents": [document("machines", "m1", &*MACHINE)]})),
                ok(json!({"writeResults": [{}]})),
            ]);

            firebase.read_machines().await.unwrap();
            firebase
                .commit(vec![domain::Write::DeleteMachine(MACHINE.id.clone())])
                .await
                .unwrap();

            assert_eq!(
                LocalStorage
                    .read_cache_entry::<Vec<Document>>(&cache_key(MACHINES))
                    .unwrap(),
                None
            );
            let requests = firebase.firebase.sender.requests.borrow();
            assert!(requests[1].url().ends_with("/documents:commit"));
        }

        #[wasm_bindgen_test]
        async fn test_delete_session_clears_cache() {
            reset();
            sign_in();

            let firebase = cached_firebase(vec![ok(
                json!({"documents": [document("machines", "m1", &*MACHINE)]}),
            )]);

            firebase.read_machines().await.unwrap();
            firebase.delete_session().await.unwrap();

            assert_eq!(LocalStorage.cache_keys().unwrap(), Vec::<String>::new());
            assert_eq!(LocalStorage.read_session(), Ok(None));
        }

        #[wasm_bindgen_test]
        async fn test_read_workouts() {
            reset();
            sign_in();

            let firebase = cached_firebase(vec![ok(json!([
                {"document": document("workouts", "w1", &*WORKOUT)},
                {"readTime": "2024-01-05T00:00:00Z"}
            ]))]);

            assert_eq!(
                firebase.read_workouts(&WORKOUT.user_id).await.unwrap(),
                vec![WORKOUT.clone()]
            );
            let requests = firebase.firebase.sender.requests.borrow();
            assert_eq!(requests[0].method(), gloo_net::http::Method::POST);
            assert!(requests[0].url().ends_with("/documents:runQuery"));
        }

        #[wasm_bindgen_test]
        async fn test_read_config_not_found() {
            reset();
            sign_in();

            let firebase = cached_firebase(vec![status(
                404,
                json!({"error": {"message": "NOT_FOUND"}}),
            )]);

            assert!(matches!(
                firebase.read_config().await,
                Err(domain::ReadError::NotFound)
            ));
        }

        fn reset() {
            gloo_storage::LocalStorage::clear();
        }

        fn stored_session() -> StoredSession {
            StoredSession {
                user_id: "u1".to_string(),
                email: "alice@example.com".to_string(),
                id_token: "id-1".to_string(),
                refresh_token: "refresh-1".to_string(),
                expires_at: Utc::now() + TimeDelta::days(365),
            }
        }

        fn sign_in() {
            LocalStorage.write_session(&stored_session()).unwrap();
        }

        fn document(collection: &str, id: &str, entity: &impl ToFields) -> serde_json::Value {
            json!({
                "name": format!(
                    "projects/demo-ironlog/databases/(default)/documents/{collection}/{id}"
                ),
                "fields": entity.to_fields(),
            })
        }

        fn ok(body: serde_json::Value) -> Result<gloo_net::http::Response, gloo_net::Error> {
            status(200, body)
        }

        fn status(
            status: u16,
            body: serde_json::Value,
        ) -> Result<gloo_net::http::Response, gloo_net::Error> {
            gloo_net::http::Response::builder()
                .status(status)
                .json(&body)
        }

        fn cached_firebase(
            responses: Vec<Result<gloo_net::http::Response, gloo_net::Error>>,
        ) -> CachedFirebase<MockSendRequest> {
            CachedFirebase {
                firebase: Firebase {
                    sender: MockSendRequest {
                        requests: RefCell::new(vec![]),
                        responses: RefCell::new(responses.into()),
                    },
                    config: FirebaseConfig {
                        secure_token_url: "https://securetoken.test/v1",
                        ..FIREBASE_CONFIG
                    },
                },
            }
        }

        struct MockSendRequest {
            requests: RefCell<Vec<gloo_net::http::Request>>,
            responses: RefCell<VecDeque<Result<gloo_net::http::Response, gloo_net::Error>>>,
        }

        impl SendRequest for MockSendRequest {
            async fn send_request(
                &self,
                request: gloo_net::http::Request,
            ) -> Result<gloo_net::http::Response, gloo_net::Error> {
                self.requests.borrow_mut().push(request);
                self.responses
                    .borrow_mut()
                    .pop_front()
                    .unwrap_or(Err(gloo_net::Error::GlooError("no response".to_string())))
            }
        }
    }
}
