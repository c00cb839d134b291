use chrono::Utc;
use log::{debug, error, warn};

use crate::{
    AssignedTable, AssignedTableID, AssignedTableRepository, AssignedTableService,
    BatchRepository, Category, CategoryID, CategoryRepository, CategoryService, Config,
    ConfigRepository, ConfigService, CreateError, DeleteError, Email, Exercise, ExerciseID,
    ExerciseRepository, ExerciseService, FeedbackRepository, FeedbackService, FeedbackText,
    FunctionsRepository, Machine, MachineID, MachineRepository, MachineService, Media, MediaKind,
    MediaOwner, Name, NewAssignedTable, NewExercise, NewMachine, NewMember, NewWorkout,
    Notification, NotificationID, ObjectStorageRepository, Ownership, Password, Post, PostID,
    PostRepository, PostService, ReadError, Reps, Session, SessionRepository, SessionService,
    Sets, StorageError, Suggestion, SuggestionID, SuggestionStatus, UpdateError, Upload, User,
    UserID, UserRepository, UserService, Weight, WelcomeEmail, WorkoutID, WorkoutRecord,
    WorkoutRepository, WorkoutService, Write, derive_categories, newest_first, plan_assignment,
    plan_completion, plan_exercise_deletion, plan_machine_deletion, sort_exercises,
    sort_workouts, storage_path, visible_machines,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: SessionRepository> Service<R> {
    async fn session(&self) -> Result<Session, StorageError> {
        match self.repository.initialize_session().await {
            Ok(session) => Ok(session),
            Err(ReadError::Storage(err)) => Err(err),
            Err(_) => Err(StorageError::NoSession),
        }
    }

    async fn admin_session(&self) -> Result<Session, StorageError> {
        let session = self.session().await?;
        if session.is_admin() {
            Ok(session)
        } else {
            Err(StorageError::PermissionDenied)
        }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

/// Uploads a file and removes the object it replaces.
async fn replace_object<R: ObjectStorageRepository>(
    repository: &R,
    owner: &MediaOwner,
    upload: &Upload,
    previous_url: Option<&str>,
) -> Result<String, UpdateError> {
    let path = storage_path(owner, Utc::now().timestamp_millis(), &upload.file_name);
    let url = repository.upload_object(&path, upload).await?;
    if let Some(previous_url) = previous_url {
        if let Err(err) = repository.delete_object(previous_url).await {
            warn!("failed to delete replaced object {previous_url}: {err}");
        }
    }
    Ok(url)
}

async fn delete_object<R: ObjectStorageRepository>(repository: &R, url: Option<&str>) {
    if let Some(url) = url {
        if let Err(err) = repository.delete_object(url).await {
            warn!("failed to delete object {url}: {err}");
        }
    }
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn sign_in(&self, email: Email, password: Password) -> Result<Session, ReadError> {
        log_on_error!(
            self.repository.sign_in(email, password),
            ReadError,
            "sign in",
            "user"
        )
    }

    async fn get_session(&self) -> Result<Session, ReadError> {
        log_on_error!(
            self.repository.initialize_session(),
            ReadError,
            "get",
            "session"
        )
    }

    async fn sign_out(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_session(),
            DeleteError,
            "delete",
            "session"
        )
    }

    async fn reset_password(&self, email: Email) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.send_password_reset(email),
            UpdateError,
            "reset",
            "password"
        )
    }
}

impl<R> UserService for Service<R>
where
    R: SessionRepository + UserRepository + FunctionsRepository + ObjectStorageRepository,
{
    async fn get_users(&self) -> Result<Vec<User>, ReadError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                let mut users = self.repository.read_users().await?;
                users.sort_by_key(|u| u.display_name().to_lowercase());
                Ok::<_, ReadError>(users)
            },
            ReadError,
            "get",
            "users"
        )
    }

    async fn get_user(&self, id: &UserID) -> Result<User, ReadError> {
        log_on_error!(self.repository.read_user(id), ReadError, "get", "user")
    }

    async fn get_or_create_profile(&self) -> Result<User, ReadError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                match self.repository.read_user(&session.user_id).await {
                    Err(ReadError::NotFound) => {
                        let user = User {
                            id: session.user_id,
                            first_name: String::new(),
                            last_name: String::new(),
                            email: session.email,
                            photo_url: None,
                            created_at: Utc::now(),
                        };
                        Ok::<_, ReadError>(self.repository.create_user(user).await?)
                    }
                    result => result,
                }
            },
            ReadError,
            "get",
            "profile"
        )
    }

    async fn replace_user(&self, user: User) -> Result<User, UpdateError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                if !session.may_modify(Some(&user.id)) {
                    return Err(UpdateError::Storage(StorageError::PermissionDenied));
                }
                self.repository.replace_user(user).await
            },
            UpdateError,
            "replace",
            "user"
        )
    }

    async fn create_member(&self, member: NewMember) -> Result<User, CreateError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                let id = self
                    .repository
                    .create_account(member.email.clone(), member.password.clone())
                    .await?;
                let user = self
                    .repository
                    .create_user(User {
                        id,
                        first_name: member.first_name.to_string(),
                        last_name: member.last_name.to_string(),
                        email: member.email.clone(),
                        photo_url: None,
                        created_at: Utc::now(),
                    })
                    .await?;
                if let Err(err) = self
                    .repository
                    .send_welcome_email(WelcomeEmail {
                        email: member.email,
                        name: user.display_name(),
                        password: Some(member.password.as_str().to_string()),
                    })
                    .await
                {
                    warn!("failed to send welcome e-mail to {}: {err}", user.email);
                }
                Ok::<_, CreateError>(user)
            },
            CreateError,
            "create",
            "member"
        )
    }

    async fn reset_member_password(&self, email: Email, password: &str) -> Result<(), UpdateError> {
        let password =
            Password::new(password).map_err(|err| UpdateError::Other(Box::new(err)))?;
        log_on_error!(
            async {
                self.repository
                    .reset_user_password(&email, &password)
                    .await
                    .map_err(UpdateError::Storage)
            },
            UpdateError,
            "reset",
            "member password"
        )
    }

    async fn set_profile_photo(&self, upload: Upload) -> Result<User, UpdateError> {
        log_on_error!(
            async {
                if upload.media_kind() != Some(MediaKind::Image) {
                    return Err(UpdateError::Other("Profile photo must be an image".into()));
                }
                let session = self.session().await?;
                let user = self.repository.read_user(&session.user_id).await?;
                let url = replace_object(
                    &self.repository,
                    &MediaOwner::ProfilePhoto(user.id.clone()),
                    &upload,
                    user.photo_url.as_deref(),
                )
                .await?;
                self.repository
                    .replace_user(User {
                        photo_url: Some(url),
                        ..user
                    })
                    .await
            },
            UpdateError,
            "set",
            "profile photo"
        )
    }
}

impl<R> Service<R>
where
    R: SessionRepository + AssignedTableRepository,
{
    /// Tables that may reference entities of the current user.
    async fn tables_in_scope(&self, session: &Session) -> Result<Vec<AssignedTable>, ReadError> {
        if session.is_admin() {
            self.repository.read_assigned_tables().await
        } else {
            self.repository
                .read_assigned_tables_of(&session.user_id)
                .await
        }
    }
}

impl<R> MachineService for Service<R>
where
    R: SessionRepository
        + MachineRepository
        + ExerciseRepository
        + AssignedTableRepository
        + BatchRepository
        + ObjectStorageRepository,
{
    async fn get_machines(&self) -> Result<Vec<Machine>, ReadError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                let machines = self.repository.read_machines().await?;
                Ok::<_, ReadError>(visible_machines(machines, &session))
            },
            ReadError,
            "get",
            "machines"
        )
    }

    async fn create_machine(&self, machine: NewMachine) -> Result<Machine, CreateError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                if machine.global && !session.is_admin() {
                    return Err(CreateError::Storage(StorageError::PermissionDenied));
                }
                let machine =
                    machine.into_machine(MachineID::generate(), &session.user_id, Utc::now());
                self.repository.create_machine(machine).await
            },
            CreateError,
            "create",
            "machine"
        )
    }

    async fn replace_machine(&self, machine: Machine) -> Result<Machine, UpdateError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                let existing = self.repository.read_machine(&machine.id).await?;
                if !session.may_modify(existing.ownership.owner())
                    || !session.may_modify(machine.ownership.owner())
                {
                    return Err(UpdateError::Storage(StorageError::PermissionDenied));
                }
                self.repository.replace_machine(machine).await
            },
            UpdateError,
            "replace",
            "machine"
        )
    }

    async fn delete_machine(&self, id: &MachineID) -> Result<MachineID, DeleteError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                let machine = self.repository.read_machine(id).await?;
                if !session.may_modify(machine.ownership.owner()) {
                    return Err(DeleteError::Storage(StorageError::PermissionDenied));
                }
                let exercises = self.repository.read_exercises().await?;
                let tables = self.tables_in_scope(&session).await?;
                self.repository
                    .commit(plan_machine_deletion(id, &exercises, &tables))
                    .await?;
                delete_object(&self.repository, machine.media_url.as_deref()).await;
                for exercise in exercises.iter().filter(|e| e.machine_id == *id) {
                    delete_object(
                        &self.repository,
                        exercise.media.as_ref().map(|m| m.url.as_str()),
                    )
                    .await;
                }
                Ok::<_, DeleteError>(id.clone())
            },
            DeleteError,
            "delete",
            "machine"
        )
    }

    async fn set_machine_media(
        &self,
        id: &MachineID,
        upload: Upload,
    ) -> Result<Machine, UpdateError> {
        log_on_error!(
            async {
                if upload.media_kind() != Some(MediaKind::Image) {
                    return Err(UpdateError::Other("Machine photo must be an image".into()));
                }
                let session = self.session().await?;
                let machine = self.repository.read_machine(id).await?;
                if !session.may_modify(machine.ownership.owner()) {
                    return Err(UpdateError::Storage(StorageError::PermissionDenied));
                }
                let url = replace_object(
                    &self.repository,
                    &MediaOwner::Machine(id.clone()),
                    &upload,
                    machine.media_url.as_deref(),
                )
                .await?;
                self.repository
                    .replace_machine(Machine {
                        media_url: Some(url),
                        ..machine
                    })
                    .await
            },
            UpdateError,
            "set",
            "machine media"
        )
    }
}

impl<R> ExerciseService for Service<R>
where
    R: SessionRepository
        + ExerciseRepository
        + AssignedTableRepository
        + BatchRepository
        + ObjectStorageRepository,
{
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                let exercises = self
                    .repository
                    .read_exercises()
                    .await?
                    .into_iter()
                    .filter(|e| e.ownership.is_visible_to(&session.user_id))
                    .collect();
                Ok::<_, ReadError>(sort_exercises(exercises))
            },
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn create_exercise(&self, exercise: NewExercise) -> Result<Exercise, CreateError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                if exercise.global && !session.is_admin() {
                    return Err(CreateError::Storage(StorageError::PermissionDenied));
                }
                self.repository
                    .create_exercise(Exercise {
                        id: ExerciseID::generate(),
                        name: exercise.name,
                        machine_id: exercise.machine_id,
                        description: exercise.description.trim().to_string(),
                        media: None,
                        ownership: if exercise.global {
                            Ownership::Global
                        } else {
                            Ownership::Personal(session.user_id)
                        },
                        created_at: Utc::now(),
                    })
                    .await
            },
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                let existing = self.repository.read_exercise(&exercise.id).await?;
                if !session.may_modify(existing.ownership.owner())
                    || !session.may_modify(exercise.ownership.owner())
                {
                    return Err(UpdateError::Storage(StorageError::PermissionDenied));
                }
                self.repository.replace_exercise(exercise).await
            },
            UpdateError,
            "replace",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: &ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                let exercise = self.repository.read_exercise(id).await?;
                if !session.may_modify(exercise.ownership.owner()) {
                    return Err(DeleteError::Storage(StorageError::PermissionDenied));
                }
                let tables = self.tables_in_scope(&session).await?;
                self.repository
                    .commit(plan_exercise_deletion(id, &tables))
                    .await?;
                delete_object(
                    &self.repository,
                    exercise.media.as_ref().map(|m| m.url.as_str()),
                )
                .await;
                Ok::<_, DeleteError>(id.clone())
            },
            DeleteError,
            "delete",
            "exercise"
        )
    }

    async fn set_exercise_media(
        &self,
        id: &ExerciseID,
        upload: Upload,
    ) -> Result<Exercise, UpdateError> {
        log_on_error!(
            async {
                let Some(kind) = upload.media_kind() else {
                    return Err(UpdateError::Other(
                        "Exercise media must be an image or a video".into(),
                    ));
                };
                let session = self.session().await?;
                let exercise = self.repository.read_exercise(id).await?;
                if !session.may_modify(exercise.ownership.owner()) {
                    return Err(UpdateError::Storage(StorageError::PermissionDenied));
                }
                let url = replace_object(
                    &self.repository,
                    &MediaOwner::Exercise(id.clone()),
                    &upload,
                    exercise.media.as_ref().map(|m| m.url.as_str()),
                )
                .await?;
                self.repository
                    .replace_exercise(Exercise {
                        media: Some(Media { url, kind }),
                        ..exercise
                    })
                    .await
            },
            UpdateError,
            "set",
            "exercise media"
        )
    }
}

impl<R> CategoryService for Service<R>
where
    R: SessionRepository + CategoryRepository + MachineRepository,
{
    async fn get_categories(&self) -> Result<Vec<String>, ReadError> {
        log_on_error!(
            async {
                let categories = self.repository.read_categories().await?;
                let machines = if categories.is_empty() {
                    self.repository.read_machines().await?
                } else {
                    vec![]
                };
                Ok::<_, ReadError>(derive_categories(&categories, &machines))
            },
            ReadError,
            "get",
            "categories"
        )
    }

    async fn get_category_documents(&self) -> Result<Vec<Category>, ReadError> {
        log_on_error!(
            async {
                let mut categories = self.repository.read_categories().await?;
                categories.sort_by(|a, b| a.name.cmp(&b.name));
                Ok::<_, ReadError>(categories)
            },
            ReadError,
            "get",
            "category documents"
        )
    }

    async fn create_category(&self, name: Name) -> Result<Category, CreateError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                let categories = self.repository.read_categories().await?;
                if categories
                    .iter()
                    .any(|c| c.name.as_str().eq_ignore_ascii_case(name.as_str()))
                {
                    return Err(CreateError::Conflict);
                }
                self.repository
                    .create_category(Category {
                        id: CategoryID::generate(),
                        name,
                    })
                    .await
            },
            CreateError,
            "create",
            "category"
        )
    }

    async fn delete_category(&self, id: &CategoryID) -> Result<CategoryID, DeleteError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                self.repository.delete_category(id).await
            },
            DeleteError,
            "delete",
            "category"
        )
    }
}

impl<R> AssignedTableService for Service<R>
where
    R: SessionRepository + AssignedTableRepository + BatchRepository,
{
    async fn get_assigned_tables(&self) -> Result<Vec<AssignedTable>, ReadError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                Ok::<_, ReadError>(newest_first(self.repository.read_assigned_tables().await?))
            },
            ReadError,
            "get",
            "assigned tables"
        )
    }

    async fn get_active_table(&self, user_id: &UserID) -> Result<Option<AssignedTable>, ReadError> {
        log_on_error!(
            async {
                let tables = self.repository.read_assigned_tables_of(user_id).await?;
                Ok::<_, ReadError>(newest_first(tables).into_iter().find(AssignedTable::is_active))
            },
            ReadError,
            "get",
            "active table"
        )
    }

    async fn get_table_history(&self, user_id: &UserID) -> Result<Vec<AssignedTable>, ReadError> {
        log_on_error!(
            async {
                let tables = self.repository.read_assigned_tables_of(user_id).await?;
                Ok::<_, ReadError>(newest_first(tables))
            },
            ReadError,
            "get",
            "table history"
        )
    }

    async fn assign_table(&self, table: NewAssignedTable) -> Result<AssignedTable, CreateError> {
        log_on_error!(
            async {
                let session = self.admin_session().await?;
                let existing = self
                    .repository
                    .read_assigned_tables_of(&table.user_id)
                    .await?;
                let id = AssignedTableID::generate();
                let writes = plan_assignment(&existing, table, id.clone(), &session.user_id, Utc::now());
                let assigned = writes
                    .iter()
                    .find_map(|w| match w {
                        Write::SetAssignedTable(t) if t.id == id => Some(t.clone()),
                        _ => None,
                    })
                    .ok_or_else(|| CreateError::Other("assigned table missing in batch".into()))?;
                self.repository.commit(writes).await?;
                Ok::<_, CreateError>(assigned)
            },
            CreateError,
            "assign",
            "table"
        )
    }

    async fn complete_table(&self, id: &AssignedTableID) -> Result<AssignedTable, UpdateError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                let table = self
                    .repository
                    .read_assigned_tables()
                    .await?
                    .into_iter()
                    .find(|t| t.id == *id)
                    .ok_or(UpdateError::NotFound)?;
                let now = Utc::now();
                let writes = plan_completion(&table, now);
                if writes.is_empty() {
                    return Ok(table);
                }
                self.repository.commit(writes).await?;
                Ok::<_, UpdateError>(table.completed(now))
            },
            UpdateError,
            "complete",
            "table"
        )
    }

    async fn delete_assigned_table(
        &self,
        id: &AssignedTableID,
    ) -> Result<AssignedTableID, DeleteError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                self.repository
                    .commit(vec![Write::DeleteAssignedTable(id.clone())])
                    .await?;
                Ok::<_, DeleteError>(id.clone())
            },
            DeleteError,
            "delete",
            "assigned table"
        )
    }
}

impl<R> Service<R>
where
    R: SessionRepository + WorkoutRepository,
{
    /// Workouts can only be changed by the user who logged them.
    async fn ensure_own_workout(&self, id: &WorkoutID) -> Result<(), ReadError> {
        let session = self.session().await?;
        let workouts = self.repository.read_workouts(&session.user_id).await?;
        if workouts.iter().any(|workout| workout.id == *id) {
            Ok(())
        } else {
            Err(ReadError::Storage(StorageError::PermissionDenied))
        }
    }
}

impl<R> WorkoutService for Service<R>
where
    R: SessionRepository + WorkoutRepository + MachineRepository,
{
    async fn get_workouts(&self) -> Result<Vec<WorkoutRecord>, ReadError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                let workouts = self.repository.read_workouts(&session.user_id).await?;
                Ok::<_, ReadError>(sort_workouts(workouts))
            },
            ReadError,
            "get",
            "workouts"
        )
    }

    async fn log_workout(&self, workout: NewWorkout) -> Result<WorkoutRecord, CreateError> {
        log_on_error!(
            async {
                let session = self.session().await?;
                let machine = self.repository.read_machine(&workout.machine_id).await?;
                self.repository
                    .create_workout(WorkoutRecord {
                        id: WorkoutID::generate(),
                        user_id: session.user_id,
                        date: workout.date,
                        machine_id: workout.machine_id,
                        machine_name: machine.name.to_string(),
                        sets: workout.sets,
                        reps: workout.reps,
                        weight: workout.weight,
                        created_at: Utc::now(),
                    })
                    .await
            },
            CreateError,
            "log",
            "workout"
        )
    }

    async fn modify_workout(
        &self,
        id: &WorkoutID,
        sets: Option<Sets>,
        reps: Option<Reps>,
        weight: Option<Weight>,
    ) -> Result<WorkoutRecord, UpdateError> {
        log_on_error!(
            async {
                self.ensure_own_workout(id).await?;
                self.repository.modify_workout(id, sets, reps, weight).await
            },
            UpdateError,
            "modify",
            "workout"
        )
    }

    async fn delete_workout(&self, id: &WorkoutID) -> Result<WorkoutID, DeleteError> {
        log_on_error!(
            async {
                self.ensure_own_workout(id).await?;
                self.repository.delete_workout(id).await
            },
            DeleteError,
            "delete",
            "workout"
        )
    }
}

impl<R> Service<R>
where
    R: SessionRepository + UserRepository,
{
    async fn sender(&self) -> Result<(Session, String), StorageError> {
        let session = self.session().await?;
        let name = match self.repository.read_user(&session.user_id).await {
            Ok(user) => user.display_name(),
            Err(err) => {
                debug!("failed to read profile of {}: {err}", session.email);
                session.email.to_string()
            }
        };
        Ok((session, name))
    }
}

impl<R> FeedbackService for Service<R>
where
    R: SessionRepository + UserRepository + FeedbackRepository,
{
    async fn send_notification(&self, message: FeedbackText) -> Result<Notification, CreateError> {
        log_on_error!(
            async {
                let (session, user_name) = self.sender().await?;
                self.repository
                    .create_notification(Notification {
                        id: NotificationID::generate(),
                        user_id: session.user_id,
                        user_name,
                        message: message.to_string(),
                        read: false,
                        created_at: Utc::now(),
                    })
                    .await
            },
            CreateError,
            "send",
            "notification"
        )
    }

    async fn send_suggestion(&self, text: FeedbackText) -> Result<Suggestion, CreateError> {
        log_on_error!(
            async {
                let (session, user_name) = self.sender().await?;
                self.repository
                    .create_suggestion(Suggestion {
                        id: SuggestionID::generate(),
                        user_id: session.user_id,
                        user_name,
                        text: text.to_string(),
                        status: SuggestionStatus::Pending,
                        created_at: Utc::now(),
                    })
                    .await
            },
            CreateError,
            "send",
            "suggestion"
        )
    }

    async fn get_notifications(&self) -> Result<Vec<Notification>, ReadError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                let mut notifications = self.repository.read_notifications().await?;
                notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok::<_, ReadError>(notifications)
            },
            ReadError,
            "get",
            "notifications"
        )
    }

    async fn get_suggestions(&self) -> Result<Vec<Suggestion>, ReadError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                let mut suggestions = self.repository.read_suggestions().await?;
                suggestions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok::<_, ReadError>(suggestions)
            },
            ReadError,
            "get",
            "suggestions"
        )
    }

    async fn mark_notification_read(
        &self,
        id: &NotificationID,
    ) -> Result<NotificationID, UpdateError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                self.repository.mark_notification_read(id).await
            },
            UpdateError,
            "mark",
            "notification"
        )
    }

    async fn mark_suggestion_reviewed(
        &self,
        id: &SuggestionID,
    ) -> Result<SuggestionID, UpdateError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                self.repository.mark_suggestion_reviewed(id).await
            },
            UpdateError,
            "mark",
            "suggestion"
        )
    }

    async fn delete_notification(
        &self,
        id: &NotificationID,
    ) -> Result<NotificationID, DeleteError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                self.repository.delete_notification(id).await
            },
            DeleteError,
            "delete",
            "notification"
        )
    }

    async fn delete_suggestion(&self, id: &SuggestionID) -> Result<SuggestionID, DeleteError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                self.repository.delete_suggestion(id).await
            },
            DeleteError,
            "delete",
            "suggestion"
        )
    }
}

impl<R> PostService for Service<R>
where
    R: SessionRepository + PostRepository,
{
    async fn get_posts(&self) -> Result<Vec<Post>, ReadError> {
        log_on_error!(
            async {
                let mut posts = self.repository.read_posts().await?;
                posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok::<_, ReadError>(posts)
            },
            ReadError,
            "get",
            "posts"
        )
    }

    async fn create_post(&self, title: Name, content: String) -> Result<Post, CreateError> {
        log_on_error!(
            async {
                let session = self.admin_session().await?;
                self.repository
                    .create_post(Post {
                        id: PostID::generate(),
                        title,
                        content,
                        author_id: session.user_id,
                        created_at: Utc::now(),
                    })
                    .await
            },
            CreateError,
            "create",
            "post"
        )
    }

    async fn delete_post(&self, id: &PostID) -> Result<PostID, DeleteError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                self.repository.delete_post(id).await
            },
            DeleteError,
            "delete",
            "post"
        )
    }
}

impl<R> ConfigService for Service<R>
where
    R: SessionRepository + ConfigRepository,
{
    async fn get_config(&self) -> Result<Config, ReadError> {
        log_on_error!(
            async {
                match self.repository.read_config().await {
                    Err(ReadError::NotFound) => Ok(Config::default()),
                    result => result,
                }
            },
            ReadError,
            "get",
            "config"
        )
    }

    async fn replace_config(&self, config: Config) -> Result<Config, UpdateError> {
        log_on_error!(
            async {
                self.admin_session().await?;
                self.repository.replace_config(config).await
            },
            UpdateError,
            "replace",
            "config"
        )
    }
}
