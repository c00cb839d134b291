use chrono::{DateTime, Utc};

use crate::{
    CreateError, DeleteError, MachineID, Media, Name, Ownership, ReadError, UpdateError, Upload,
    ValidationError,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(&self, exercise: NewExercise) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    /// Deletes the exercise and removes it from all assigned tables.
    async fn delete_exercise(&self, id: &ExerciseID) -> Result<ExerciseID, DeleteError>;
    async fn set_exercise_media(
        &self,
        id: &ExerciseID,
        upload: Upload,
    ) -> Result<Exercise, UpdateError>;

    async fn get_exercises_for_machine(
        &self,
        machine_id: &MachineID,
    ) -> Result<Vec<Exercise>, ReadError> {
        Ok(self
            .get_exercises()
            .await?
            .into_iter()
            .filter(|e| e.machine_id == *machine_id)
            .collect())
    }

    async fn validate_exercise_name(
        &self,
        name: &str,
        machine_id: &MachineID,
        id: &ExerciseID,
    ) -> Result<Name, ValidationError> {
        let name = Name::new(name).map_err(|err| ValidationError::Other(err.into()))?;
        let exercises = self.get_exercises_for_machine(machine_id).await?;
        if exercises
            .iter()
            .all(|e| e.id == *id || !e.name.as_str().eq_ignore_ascii_case(name.as_str()))
        {
            Ok(name)
        } else {
            Err(ValidationError::Conflict("Exercise".to_string()))
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercise(&self, id: &ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
}

document_id!(ExerciseID);

/// A named movement performed on a machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub machine_id: MachineID,
    pub description: String,
    pub media: Option<Media>,
    pub ownership: Ownership,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub name: Name,
    pub machine_id: MachineID,
    pub description: String,
    pub global: bool,
}

#[must_use]
pub fn sort_exercises(mut exercises: Vec<Exercise>) -> Vec<Exercise> {
    exercises.sort_by(|a, b| {
        a.name
            .as_str()
            .to_lowercase()
            .cmp(&b.name.as_str().to_lowercase())
    });
    exercises
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sort_exercises() {
        let exercise = |id: &str, name: &str| Exercise {
            id: ExerciseID::from(id),
            name: Name::new(name).unwrap(),
            machine_id: MachineID::from("m1"),
            description: String::new(),
            media: None,
            ownership: Ownership::Global,
            created_at: DateTime::default(),
        };

        assert_eq!(
            sort_exercises(vec![
                exercise("1", "squat"),
                exercise("2", "Calf Raise"),
                exercise("3", "Leg Press"),
            ])
            .iter()
            .map(|e| e.id.to_string())
            .collect::<Vec<_>>(),
            vec!["2", "3", "1"]
        );
    }
}
