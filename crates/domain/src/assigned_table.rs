use chrono::{DateTime, Utc};

use crate::{
    CreateError, DeleteError, ExerciseID, MachineID, ReadError, Reps, Sets, UpdateError, UserID,
    Weight, Write,
};

#[allow(async_fn_in_trait)]
pub trait AssignedTableService {
    /// All tables of all users, newest first.
    async fn get_assigned_tables(&self) -> Result<Vec<AssignedTable>, ReadError>;
    async fn get_active_table(&self, user_id: &UserID) -> Result<Option<AssignedTable>, ReadError>;
    /// All tables of the user, newest first.
    async fn get_table_history(&self, user_id: &UserID) -> Result<Vec<AssignedTable>, ReadError>;
    /// Stores a new active table and completes all previously active tables of the user.
    async fn assign_table(&self, table: NewAssignedTable) -> Result<AssignedTable, CreateError>;
    async fn complete_table(&self, id: &AssignedTableID) -> Result<AssignedTable, UpdateError>;
    async fn delete_assigned_table(
        &self,
        id: &AssignedTableID,
    ) -> Result<AssignedTableID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait AssignedTableRepository {
    async fn read_assigned_tables(&self) -> Result<Vec<AssignedTable>, ReadError>;
    async fn read_assigned_tables_of(
        &self,
        user_id: &UserID,
    ) -> Result<Vec<AssignedTable>, ReadError>;
}

document_id!(AssignedTableID);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Completed,
}

impl TableStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TableStatus::Active => "ACTIVE",
            TableStatus::Completed => "COMPLETED",
        }
    }
}

impl TryFrom<&str> for TableStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "ACTIVE" => Ok(TableStatus::Active),
            "COMPLETED" => Ok(TableStatus::Completed),
            _ => Err(format!("unknown table status: {value}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub machine_id: MachineID,
    pub machine_name: String,
    pub exercise_id: Option<ExerciseID>,
    pub exercise_name: String,
    pub sets: Sets,
    pub reps: Reps,
    pub weight: Weight,
    pub notes: String,
}

impl TableEntry {
    #[must_use]
    pub fn references_machine(&self, machine_id: &MachineID) -> bool {
        self.machine_id == *machine_id
    }

    #[must_use]
    pub fn references_exercise(&self, exercise_id: &ExerciseID) -> bool {
        self.exercise_id.as_ref() == Some(exercise_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignedTable {
    pub id: AssignedTableID,
    pub user_id: UserID,
    pub name: Option<String>,
    pub entries: Vec<TableEntry>,
    pub assigned_by: UserID,
    pub status: TableStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AssignedTable {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TableStatus::Active
    }

    #[must_use]
    pub fn completed(&self, now: DateTime<Utc>) -> AssignedTable {
        AssignedTable {
            status: TableStatus::Completed,
            completed_at: Some(now),
            ..self.clone()
        }
    }

    /// Returns a copy without the matching entries, or `None` if no entry matches.
    #[must_use]
    pub fn without_entries(&self, matches: impl Fn(&TableEntry) -> bool) -> Option<AssignedTable> {
        if !self.entries.iter().any(&matches) {
            return None;
        }
        Some(AssignedTable {
            entries: self
                .entries
                .iter()
                .filter(|&e| !matches(e))
                .cloned()
                .collect(),
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignedTable {
    pub user_id: UserID,
    pub name: Option<String>,
    pub entries: Vec<TableEntry>,
}

/// Plans the batch that makes `table` the only active table of its user.
#[must_use]
pub fn plan_assignment(
    existing: &[AssignedTable],
    table: NewAssignedTable,
    id: AssignedTableID,
    assigned_by: &UserID,
    now: DateTime<Utc>,
) -> Vec<Write> {
    let mut writes = existing
        .iter()
        .filter(|t| t.user_id == table.user_id && t.is_active())
        .map(|t| Write::SetAssignedTable(t.completed(now)))
        .collect::<Vec<_>>();
    writes.push(Write::SetAssignedTable(AssignedTable {
        id,
        user_id: table.user_id,
        name: table.name.filter(|n| !n.trim().is_empty()),
        entries: table.entries,
        assigned_by: assigned_by.clone(),
        status: TableStatus::Active,
        created_at: now,
        completed_at: None,
    }));
    writes
}

#[must_use]
pub fn plan_completion(table: &AssignedTable, now: DateTime<Utc>) -> Vec<Write> {
    if table.is_active() {
        vec![Write::SetAssignedTable(table.completed(now))]
    } else {
        vec![]
    }
}

#[must_use]
pub fn newest_first(mut tables: Vec<AssignedTable>) -> Vec<AssignedTable> {
    tables.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tables
}
