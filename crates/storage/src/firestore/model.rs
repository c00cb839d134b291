//! Conversion between documents and domain entities.
//!
//! Field names follow the documents written by earlier clients of the same database, so some
//! fields are optional or typed loosely.

use chrono::NaiveDate;
use ironlog_domain as domain;
use log::warn;

use super::value::{Document, Fields, ModelError, Value};

pub trait FromDocument: Sized {
    fn from_document(document: &Document) -> Result<Self, ModelError>;
}

pub trait ToFields {
    fn to_fields(&self) -> Fields;
}

impl From<ModelError> for domain::ReadError {
    fn from(value: ModelError) -> Self {
        domain::ReadError::Other(Box::new(value))
    }
}

impl From<ModelError> for domain::CreateError {
    fn from(value: ModelError) -> Self {
        domain::CreateError::Other(Box::new(value))
    }
}

impl From<ModelError> for domain::UpdateError {
    fn from(value: ModelError) -> Self {
        domain::UpdateError::Other(Box::new(value))
    }
}

/// Decodes the documents of a collection. Documents that cannot be decoded are logged and skipped.
pub fn from_documents<T: FromDocument>(documents: &[Document]) -> Vec<T> {
    documents
        .iter()
        .filter_map(|document| match T::from_document(document) {
            Ok(entity) => Some(entity),
            Err(err) => {
                warn!("skipping document {}: {err}", document.name);
                None
            }
        })
        .collect()
}

fn name(fields: &Fields, key: &str) -> Result<domain::Name, ModelError> {
    domain::Name::new(&fields.string(key)?).map_err(|err| ModelError::invalid(key, err))
}

fn email(fields: &Fields, key: &str) -> Result<domain::Email, ModelError> {
    domain::Email::new(&fields.string(key)?).map_err(|err| ModelError::invalid(key, err))
}

fn unsigned(fields: &Fields, key: &str) -> Result<u32, ModelError> {
    u32::try_from(fields.integer(key)?).map_err(|err| ModelError::invalid(key, err))
}

fn sets(fields: &Fields) -> Result<domain::Sets, ModelError> {
    domain::Sets::new(unsigned(fields, "sets")?).map_err(|err| ModelError::invalid("sets", err))
}

fn reps(fields: &Fields) -> Result<domain::Reps, ModelError> {
    domain::Reps::new(unsigned(fields, "reps")?).map_err(|err| ModelError::invalid("reps", err))
}

/// Stored weights are rounded to the resolution of `Weight`.
fn weight(fields: &Fields) -> Result<domain::Weight, ModelError> {
    #[allow(clippy::cast_possible_truncation)]
    let value = ((fields.number("weight")? * 10.0).round() / 10.0) as f32;
    domain::Weight::new(value).map_err(|err| ModelError::invalid("weight", err))
}

/// Documents without owner are treated as global.
fn ownership(fields: &Fields) -> Result<domain::Ownership, ModelError> {
    let is_global = fields.boolean("isGlobal", false)?;
    Ok(match fields.non_empty_string("userId")? {
        Some(user_id) if !is_global => domain::Ownership::Personal(user_id.into()),
        _ => domain::Ownership::Global,
    })
}

fn with_ownership(fields: Fields, ownership: &domain::Ownership) -> Fields {
    let fields = fields.with("isGlobal", Value::Boolean(ownership.is_global()));
    match ownership.owner() {
        Some(user_id) => fields.with("userId", Value::string(user_id.as_str())),
        None => fields,
    }
}

impl FromDocument for domain::User {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        Ok(domain::User {
            id: document.id().into(),
            first_name: fields.optional_string("firstName")?.unwrap_or_default(),
            last_name: fields.optional_string("lastName")?.unwrap_or_default(),
            email: email(fields, "email")?,
            photo_url: fields.non_empty_string("photoURL")?,
            created_at: document.created_at()?,
        })
    }
}

impl ToFields for domain::User {
    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("firstName", Value::string(&self.first_name))
            .with("lastName", Value::string(&self.last_name))
            .with("email", Value::string(self.email.as_str()))
            .with("photoURL", Value::optional_string(self.photo_url.as_deref()))
            .with("createdAt", Value::timestamp(self.created_at))
    }
}

impl FromDocument for domain::Machine {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        Ok(domain::Machine {
            id: document.id().into(),
            name: name(fields, "name")?,
            number: fields
                .optional_integer("number")?
                .and_then(|number| u32::try_from(number).ok())
                .and_then(|number| domain::MachineNumber::new(number).ok()),
            category: fields
                .non_empty_string("category")?
                .map(|category| category.trim().to_string()),
            description: fields.optional_string("description")?.unwrap_or_default(),
            media_url: fields.non_empty_string("mediaURL")?,
            ownership: ownership(fields)?,
            created_at: document.created_at()?,
        })
    }
}

impl ToFields for domain::Machine {
    fn to_fields(&self) -> Fields {
        let fields = Fields::new()
            .with("name", Value::string(self.name.as_str()))
            .with(
                "number",
                self.number.map_or(Value::Null(()), |number| {
                    Value::Integer(i64::from(u32::from(number)))
                }),
            )
            .with("category", Value::optional_string(self.category.as_deref()))
            .with("description", Value::string(&self.description))
            .with("mediaURL", Value::optional_string(self.media_url.as_deref()))
            .with("createdAt", Value::timestamp(self.created_at));
        with_ownership(fields, &self.ownership)
    }
}

impl FromDocument for domain::Exercise {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        let media = match fields.non_empty_string("mediaURL")? {
            Some(url) => {
                let kind = match fields.non_empty_string("mediaType")? {
                    Some(kind) => domain::MediaKind::try_from(kind.as_str())
                        .map_err(|err| ModelError::invalid("mediaType", err))?,
                    None => domain::MediaKind::detect("", url.split('?').next().unwrap_or(&url))
                        .unwrap_or(domain::MediaKind::Image),
                };
                Some(domain::Media { url, kind })
            }
            None => None,
        };
        Ok(domain::Exercise {
            id: document.id().into(),
            name: name(fields, "name")?,
            machine_id: fields.string("machineId")?.into(),
            description: fields.optional_string("description")?.unwrap_or_default(),
            media,
            ownership: ownership(fields)?,
            created_at: document.created_at()?,
        })
    }
}

impl ToFields for domain::Exercise {
    fn to_fields(&self) -> Fields {
        let fields = Fields::new()
            .with("name", Value::string(self.name.as_str()))
            .with("machineId", Value::string(self.machine_id.as_str()))
            .with("description", Value::string(&self.description))
            .with(
                "mediaURL",
                Value::optional_string(self.media.as_ref().map(|m| m.url.as_str())),
            )
            .with(
                "mediaType",
                Value::optional_string(self.media.as_ref().map(|m| m.kind.as_str())),
            )
            .with("createdAt", Value::timestamp(self.created_at));
        with_ownership(fields, &self.ownership)
    }
}

impl FromDocument for domain::Category {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        Ok(domain::Category {
            id: document.id().into(),
            name: name(&document.fields, "name")?,
        })
    }
}

impl ToFields for domain::Category {
    fn to_fields(&self) -> Fields {
        Fields::new().with("name", Value::string(self.name.as_str()))
    }
}

impl FromDocument for domain::TableEntry {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        Ok(domain::TableEntry {
            machine_id: fields.string("machineId")?.into(),
            machine_name: fields.optional_string("machineName")?.unwrap_or_default(),
            exercise_id: fields.non_empty_string("exerciseId")?.map(Into::into),
            exercise_name: fields.optional_string("exerciseName")?.unwrap_or_default(),
            sets: sets(fields)?,
            reps: reps(fields)?,
            weight: weight(fields)?,
            notes: fields.optional_string("notes")?.unwrap_or_default(),
        })
    }
}

impl ToFields for domain::TableEntry {
    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("machineId", Value::string(self.machine_id.as_str()))
            .with("machineName", Value::string(&self.machine_name))
            .with(
                "exerciseId",
                Value::optional_string(self.exercise_id.as_ref().map(|id| id.as_str())),
            )
            .with("exerciseName", Value::string(&self.exercise_name))
            .with("sets", Value::Integer(i64::from(u32::from(self.sets))))
            .with("reps", Value::Integer(i64::from(u32::from(self.reps))))
            .with("weight", Value::Double(f64::from(f32::from(self.weight))))
            .with("notes", Value::string(&self.notes))
    }
}

impl FromDocument for domain::AssignedTable {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        let entries = fields
            .array("exercises")?
            .iter()
            .map(|value| match value {
                Value::Map(map) => domain::TableEntry::from_document(&Document {
                    fields: map.fields.clone(),
                    ..Document::default()
                }),
                _ => Err(ModelError::invalid("exercises", "expected map values")),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let status = fields.string("status")?;
        Ok(domain::AssignedTable {
            id: document.id().into(),
            user_id: fields.string("userId")?.into(),
            name: fields.non_empty_string("name")?,
            entries,
            assigned_by: fields.optional_string("assignedBy")?.unwrap_or_default().into(),
            status: domain::TableStatus::try_from(status.as_str())
                .map_err(|err| ModelError::invalid("status", err))?,
            created_at: document.created_at()?,
            completed_at: fields.optional_timestamp("completedAt")?,
        })
    }
}

impl ToFields for domain::AssignedTable {
    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("userId", Value::string(self.user_id.as_str()))
            .with("name", Value::optional_string(self.name.as_deref()))
            .with(
                "exercises",
                Value::array(
                    self.entries
                        .iter()
                        .map(|entry| Value::map(entry.to_fields()))
                        .collect(),
                ),
            )
            .with("assignedBy", Value::string(self.assigned_by.as_str()))
            .with("status", Value::string(self.status.as_str()))
            .with("createdAt", Value::timestamp(self.created_at))
            .with("completedAt", Value::optional_timestamp(self.completed_at))
    }
}

impl FromDocument for domain::WorkoutRecord {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        let date = fields.string("date")?;
        Ok(domain::WorkoutRecord {
            id: document.id().into(),
            user_id: fields.string("userId")?.into(),
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|err| ModelError::invalid("date", err))?,
            machine_id: fields.string("machineId")?.into(),
            machine_name: fields.optional_string("machineName")?.unwrap_or_default(),
            sets: sets(fields)?,
            reps: reps(fields)?,
            weight: weight(fields)?,
            created_at: document.created_at()?,
        })
    }
}

impl ToFields for domain::WorkoutRecord {
    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("userId", Value::string(self.user_id.as_str()))
            .with("date", Value::string(self.date.format("%Y-%m-%d").to_string()))
            .with("machineId", Value::string(self.machine_id.as_str()))
            .with("machineName", Value::string(&self.machine_name))
            .with("sets", Value::Integer(i64::from(u32::from(self.sets))))
            .with("reps", Value::Integer(i64::from(u32::from(self.reps))))
            .with("weight", Value::Double(f64::from(f32::from(self.weight))))
            .with("createdAt", Value::timestamp(self.created_at))
    }
}

impl FromDocument for domain::Notification {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        Ok(domain::Notification {
            id: document.id().into(),
            user_id: fields.optional_string("userId")?.unwrap_or_default().into(),
            user_name: fields.optional_string("userName")?.unwrap_or_default(),
            message: fields.string("message")?,
            read: fields.boolean("read", false)?,
            created_at: document.created_at()?,
        })
    }
}

impl ToFields for domain::Notification {
    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("userId", Value::string(self.user_id.as_str()))
            .with("userName", Value::string(&self.user_name))
            .with("message", Value::string(&self.message))
            .with("read", Value::Boolean(self.read))
            .with("createdAt", Value::timestamp(self.created_at))
    }
}

impl FromDocument for domain::Suggestion {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        let status = fields
            .non_empty_string("status")?
            .unwrap_or_else(|| domain::SuggestionStatus::Pending.as_str().to_string());
        Ok(domain::Suggestion {
            id: document.id().into(),
            user_id: fields.optional_string("userId")?.unwrap_or_default().into(),
            user_name: fields.optional_string("userName")?.unwrap_or_default(),
            text: fields.string("text")?,
            status: domain::SuggestionStatus::try_from(status.as_str())
                .map_err(|err| ModelError::invalid("status", err))?,
            created_at: document.created_at()?,
        })
    }
}

impl ToFields for domain::Suggestion {
    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("userId", Value::string(self.user_id.as_str()))
            .with("userName", Value::string(&self.user_name))
            .with("text", Value::string(&self.text))
            .with("status", Value::string(self.status.as_str()))
            .with("createdAt", Value::timestamp(self.created_at))
    }
}

impl FromDocument for domain::Post {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        Ok(domain::Post {
            id: document.id().into(),
            title: name(fields, "title")?,
            content: fields.optional_string("content")?.unwrap_or_default(),
            author_id: fields.optional_string("authorId")?.unwrap_or_default().into(),
            created_at: document.created_at()?,
        })
    }
}

impl ToFields for domain::Post {
    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("title", Value::string(self.title.as_str()))
            .with("content", Value::string(&self.content))
            .with("authorId", Value::string(self.author_id.as_str()))
            .with("createdAt", Value::timestamp(self.created_at))
    }
}

impl FromDocument for domain::Config {
    fn from_document(document: &Document) -> Result<Self, ModelError> {
        let fields = &document.fields;
        Ok(domain::Config {
            gym_name: fields
                .non_empty_string("gymName")?
                .unwrap_or_else(|| domain::DEFAULT_GYM_NAME.to_string()),
            contact_email: fields
                .non_empty_string("contactEmail")?
                .map(|email| domain::Email::new(&email))
                .transpose()
                .map_err(|err| ModelError::invalid("contactEmail", err))?,
        })
    }
}

impl ToFields for domain::Config {
    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("gymName", Value::string(&self.gym_name))
            .with(
                "contactEmail",
                Value::optional_string(self.contact_email.as_ref().map(domain::Email::as_str)),
            )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::tests::data::{ASSIGNED_TABLE, EXERCISE, MACHINE, USER, WORKOUT};

    fn document(id: &str, fields: serde_json::Value) -> Document {
        Document {
            name: format!("projects/demo/databases/(default)/documents/test/{id}"),
            fields: serde_json::from_value(fields).unwrap(),
            ..Document::default()
        }
    }

    #[rstest]
    #[case(json!({"isGlobal": {"booleanValue": true}}), domain::Ownership::Global)]
    #[case(
        json!({"isGlobal": {"booleanValue": false}, "userId": {"stringValue": "u1"}}),
        domain::Ownership::Personal("u1".into())
    )]
    #[case(json!({"userId": {"stringValue": "u1"}}), domain::Ownership::Personal("u1".into()))]
    #[case(json!({}), domain::Ownership::Global)]
    #[case(
        json!({"isGlobal": {"booleanValue": true}, "userId": {"stringValue": "admin"}}),
        domain::Ownership::Global
    )]
    fn test_ownership(#[case] fields: serde_json::Value, #[case] expected: domain::Ownership) {
        let fields: Fields = serde_json::from_value(fields).unwrap();
        assert_eq!(ownership(&fields), Ok(expected));
    }

    #[test]
    fn test_user_round_trip() {
        let document = Document {
            name: "projects/demo/databases/(default)/documents/users/u1".to_string(),
            fields: USER.to_fields(),
            ..Document::default()
        };

        assert_eq!(domain::User::from_document(&document), Ok(USER.clone()));
    }

    #[test]
    fn test_machine_from_document() {
        let machine = domain::Machine::from_document(&document(
            "m1",
            json!({
                "name": {"stringValue": "Leg Press "},
                "number": {"integerValue": "12"},
                "category": {"stringValue": " Legs"},
                "isGlobal": {"booleanValue": true},
                "createdAt": {"timestampValue": "2024-01-01T00:00:00Z"}
            }),
        ))
        .unwrap();

        assert_eq!(machine.id, domain::MachineID::from("m1"));
        assert_eq!(machine.label(), "12 · Leg Press");
        assert_eq!(machine.category, Some("Legs".to_string()));
        assert_eq!(machine.description, "");
        assert_eq!(machine.media_url, None);
    }

    #[test]
    fn test_machine_round_trip() {
        let document = Document {
            name: format!("projects/demo/databases/(default)/documents/machines/{}", MACHINE.id),
            fields: MACHINE.to_fields(),
            ..Document::default()
        };
        assert_eq!(domain::Machine::from_document(&document), Ok(MACHINE.clone()));
    }

    #[test]
    fn test_assigned_table_round_trip() {
        let document = Document {
            name: format!("projects/demo/databases/(default)/documents/assignedTables/{}", ASSIGNED_TABLE.id),
            fields: ASSIGNED_TABLE.to_fields(),
            ..Document::default()
        };
        assert_eq!(
            domain::AssignedTable::from_document(&document),
            Ok(ASSIGNED_TABLE.clone())
        );
    }

    #[rstest]
    #[case(Some("video"), "https://host/o/exercises%2Fe1%2F1_squat.mp4?alt=media", domain::MediaKind::Video)]
    #[case(None, "https://host/o/exercises%2Fe1%2F1_squat.mp4?alt=media", domain::MediaKind::Video)]
    #[case(None, "https://host/o/exercises%2Fe1%2F1_squat?alt=media", domain::MediaKind::Image)]
    fn test_exercise_media(
        #[case] media_type: Option<&str>,
        #[case] url: &str,
        #[case] expected: domain::MediaKind,
    ) {
        let mut fields = EXERCISE.to_fields().with("mediaURL", Value::string(url));
        fields = fields.with("mediaType", Value::optional_string(media_type));
        let exercise = domain::Exercise::from_document(&Document {
            name: "exercises/e1".to_string(),
            fields,
            ..Document::default()
        })
        .unwrap();

        assert_eq!(
            exercise.media,
            Some(domain::Media {
                url: url.to_string(),
                kind: expected
            })
        );
    }

    #[test]
    fn test_workout_from_document_with_integer_weight() {
        let workout = domain::WorkoutRecord::from_document(&document(
            "w1",
            json!({
                "userId": {"stringValue": "u1"},
                "date": {"stringValue": "2024-01-01"},
                "machineId": {"stringValue": "m1"},
                "machineName": {"stringValue": "Leg Press"},
                "sets": {"integerValue": "3"},
                "reps": {"integerValue": "10"},
                "weight": {"integerValue": "50"},
                "createdAt": {"timestampValue": "2024-01-01T10:00:00Z"}
            }),
        ))
        .unwrap();

        assert_eq!(f32::from(workout.weight), 50.0);
        assert_eq!(workout.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_workout_with_invalid_sets() {
        let fields = WORKOUT.to_fields().with("sets", Value::Integer(0));

        assert_eq!(
            domain::WorkoutRecord::from_document(&Document {
                name: "workouts/w1".to_string(),
                fields,
                ..Document::default()
            }),
            Err(ModelError::invalid("sets", "Sets must be in the range 1 to 99"))
        );
    }

    fn workout_document(id: &str, weight: serde_json::Value) -> Document {
        document(
            id,
            json!({
                "userId": {"stringValue": "u1"},
                "date": {"stringValue": "2024-01-01"},
                "machineId": {"stringValue": "m1"},
                "machineName": {"stringValue": "Leg Press"},
                "sets": {"integerValue": "3"},
                "reps": {"integerValue": "10"},
                "weight": weight,
                "createdAt": {"timestampValue": "2024-01-01T10:00:00Z"}
            }),
        )
    }

    #[rstest]
    #[case(json!({"doubleValue": 2.25}), 2.3)]
    #[case(json!({"doubleValue": 20.04}), 20.0)]
    #[case(json!({"integerValue": "20"}), 20.0)]
    fn test_workout_weight_rounded(#[case] weight: serde_json::Value, #[case] expected: f32) {
        let workout = domain::WorkoutRecord::from_document(&workout_document("w1", weight)).unwrap();

        assert_eq!(workout.weight, domain::Weight::new(expected).unwrap());
    }

    #[test]
    fn test_from_documents_skips_invalid_documents() {
        let mut zero_reps = workout_document("w3", json!({"doubleValue": 40.0}));
        zero_reps.fields = zero_reps.fields.with("reps", Value::Integer(0));
        let mut no_date = workout_document("w4", json!({"doubleValue": 40.0}));
        no_date.fields = no_date.fields.with("date", Value::string("yesterday"));

        let workouts = from_documents::<domain::WorkoutRecord>(&[
            workout_document("w1", json!({"doubleValue": 20.0})),
            workout_document("w2", json!({"doubleValue": 2.25})),
            zero_reps,
            no_date,
            workout_document("w5", json!({"doubleValue": 1200.0})),
        ]);

        assert_eq!(
            workouts.iter().map(|w| w.id.to_string()).collect::<Vec<_>>(),
            vec!["w1", "w2"]
        );
    }

    #[test]
    fn test_from_documents_skips_machine_with_long_name() {
        let valid = document(
            "m1",
            json!({
                "name": {"stringValue": "Leg Press"},
                "createdAt": {"timestampValue": "2024-01-01T00:00:00Z"}
            }),
        );
        let invalid = document(
            "m2",
            json!({
                "name": {"stringValue": "x".repeat(200)},
                "createdAt": {"timestampValue": "2024-01-01T00:00:00Z"}
            }),
        );

        let machines = from_documents::<domain::Machine>(&[invalid, valid]);

        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].id, domain::MachineID::from("m1"));
    }

    #[test]
    fn test_config_defaults() {
        assert_eq!(
            domain::Config::from_document(&document("app", json!({}))),
            Ok(domain::Config::default())
        );
    }
}
