use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::{
    CreateError, DeleteError, MachineID, ReadError, Reps, Sets, UpdateError, UserID,
    ValidationError, Weight,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    /// Workouts of the current user, newest first.
    async fn get_workouts(&self) -> Result<Vec<WorkoutRecord>, ReadError>;
    async fn log_workout(&self, workout: NewWorkout) -> Result<WorkoutRecord, CreateError>;
    async fn modify_workout(
        &self,
        id: &WorkoutID,
        sets: Option<Sets>,
        reps: Option<Reps>,
        weight: Option<Weight>,
    ) -> Result<WorkoutRecord, UpdateError>;
    async fn delete_workout(&self, id: &WorkoutID) -> Result<WorkoutID, DeleteError>;

    fn validate_workout_date(&self, date: &str) -> Result<NaiveDate, ValidationError> {
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(parsed_date) => {
                if parsed_date <= Local::now().date_naive() {
                    Ok(parsed_date)
                } else {
                    Err(ValidationError::Other(
                        "Date must not be in the future".into(),
                    ))
                }
            }
            Err(_) => Err(ValidationError::Other("Invalid date".into())),
        }
    }

    fn validate_workout_sets(&self, sets: &str) -> Result<Sets, ValidationError> {
        Sets::try_from(sets).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_workout_reps(&self, reps: &str) -> Result<Reps, ValidationError> {
        Reps::try_from(reps).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_workout_weight(&self, weight: &str) -> Result<Weight, ValidationError> {
        Weight::try_from(weight).map_err(|err| ValidationError::Other(err.into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_workouts(&self, user_id: &UserID) -> Result<Vec<WorkoutRecord>, ReadError>;
    async fn create_workout(&self, workout: WorkoutRecord) -> Result<WorkoutRecord, CreateError>;
    async fn modify_workout(
        &self,
        id: &WorkoutID,
        sets: Option<Sets>,
        reps: Option<Reps>,
        weight: Option<Weight>,
    ) -> Result<WorkoutRecord, UpdateError>;
    async fn delete_workout(&self, id: &WorkoutID) -> Result<WorkoutID, DeleteError>;
}

document_id!(WorkoutID);

/// A logged exercise on a machine.
///
/// The machine name is copied into the record so that history stays readable after the machine
/// has been renamed or deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutRecord {
    pub id: WorkoutID,
    pub user_id: UserID,
    pub date: NaiveDate,
    pub machine_id: MachineID,
    pub machine_name: String,
    pub sets: Sets,
    pub reps: Reps,
    pub weight: Weight,
    pub created_at: DateTime<Utc>,
}

impl WorkoutRecord {
    #[must_use]
    pub fn volume(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let reps = (u32::from(self.sets) * u32::from(self.reps)) as f32;
        reps * f32::from(self.weight)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub date: NaiveDate,
    pub machine_id: MachineID,
    pub sets: Sets,
    pub reps: Reps,
    pub weight: Weight,
}

#[must_use]
pub fn sort_workouts(mut workouts: Vec<WorkoutRecord>) -> Vec<WorkoutRecord> {
    workouts.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    workouts
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(id: &str, date: (i32, u32, u32), created: u32) -> WorkoutRecord {
        WorkoutRecord {
            id: WorkoutID::from(id),
            user_id: UserID::from("u1"),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            machine_id: MachineID::from("m1"),
            machine_name: "Leg Press".to_string(),
            sets: Sets::new(3).unwrap(),
            reps: Reps::new(10).unwrap(),
            weight: Weight::new(52.5).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, created, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_sort_workouts() {
        let workouts = vec![
            record("1", (2024, 1, 1), 8),
            record("2", (2024, 1, 2), 7),
            record("3", (2024, 1, 1), 9),
        ];

        assert_eq!(
            sort_workouts(workouts)
                .iter()
                .map(|w| w.id.to_string())
                .collect::<Vec<_>>(),
            vec!["2", "3", "1"]
        );
    }

    #[test]
    fn test_volume() {
        assert_approx_eq!(record("1", (2024, 1, 1), 8).volume(), 1575.0);
    }
}
