use crate::{
    AssignedTable, AssignedTableID, Exercise, ExerciseID, MachineID, StorageError, TableEntry,
};

/// A document write that is part of an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    SetAssignedTable(AssignedTable),
    DeleteAssignedTable(AssignedTableID),
    DeleteMachine(MachineID),
    DeleteExercise(ExerciseID),
}

#[allow(async_fn_in_trait)]
pub trait BatchRepository {
    /// Applies all writes or none of them.
    async fn commit(&self, writes: Vec<Write>) -> Result<(), StorageError>;
}

/// Plans the deletion of a machine, its exercises and all table entries referring to them.
#[must_use]
pub fn plan_machine_deletion(
    machine_id: &MachineID,
    exercises: &[Exercise],
    tables: &[AssignedTable],
) -> Vec<Write> {
    let exercise_ids = exercises
        .iter()
        .filter(|e| e.machine_id == *machine_id)
        .map(|e| e.id.clone())
        .collect::<Vec<_>>();
    let references = |entry: &TableEntry| {
        entry.references_machine(machine_id)
            || exercise_ids.iter().any(|id| entry.references_exercise(id))
    };

    let mut writes = vec![Write::DeleteMachine(machine_id.clone())];
    writes.extend(exercise_ids.iter().cloned().map(Write::DeleteExercise));
    writes.extend(
        tables
            .iter()
            .filter_map(|t| t.without_entries(references))
            .map(Write::SetAssignedTable),
    );
    writes
}

/// Plans the deletion of an exercise and all table entries referring to it.
#[must_use]
pub fn plan_exercise_deletion(exercise_id: &ExerciseID, tables: &[AssignedTable]) -> Vec<Write> {
    let mut writes = vec![Write::DeleteExercise(exercise_id.clone())];
    writes.extend(
        tables
            .iter()
            .filter_map(|t| t.without_entries(|e| e.references_exercise(exercise_id)))
            .map(Write::SetAssignedTable),
    );
    writes
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Name, Ownership, Reps, Sets, TableStatus, UserID, Weight};

    fn entry(machine_id: &str, exercise_id: Option<&str>) -> TableEntry {
        TableEntry {
            machine_id: MachineID::from(machine_id),
            machine_name: machine_id.to_string(),
            exercise_id: exercise_id.map(ExerciseID::from),
            exercise_name: String::new(),
            sets: Sets::new(3).unwrap(),
            reps: Reps::new(8).unwrap(),
            weight: Weight::new(40.0).unwrap(),
            notes: String::new(),
        }
    }

    fn table(id: &str, entries: Vec<TableEntry>) -> AssignedTable {
        AssignedTable {
            id: AssignedTableID::from(id),
            user_id: UserID::from(id),
            name: None,
            entries,
            assigned_by: UserID::from("admin"),
            status: TableStatus::Active,
            created_at: DateTime::default(),
            completed_at: None,
        }
    }

    fn exercise(id: &str, machine_id: &str) -> Exercise {
        Exercise {
            id: ExerciseID::from(id),
            name: Name::new(id).unwrap(),
            machine_id: MachineID::from(machine_id),
            description: String::new(),
            media: None,
            ownership: Ownership::Global,
            created_at: DateTime::default(),
        }
    }

    fn machine_ids(table: &AssignedTable) -> Vec<String> {
        table.entries.iter().map(|e| e.machine_id.to_string()).collect()
    }

    #[test]
    fn test_plan_machine_deletion() {
        let tables = vec![
            table("t1", vec![entry("a", None), entry("x", None), entry("a", None)]),
            table("t2", vec![entry("y", None)]),
            table("t3", vec![entry("z", None), entry("a", Some("e1"))]),
            table("t4", vec![entry("w", Some("e1"))]),
        ];
        let exercises = vec![exercise("e1", "a"), exercise("e2", "b")];

        let writes = plan_machine_deletion(&MachineID::from("a"), &exercises, &tables);

        assert_eq!(writes[0], Write::DeleteMachine(MachineID::from("a")));
        assert_eq!(writes[1], Write::DeleteExercise(ExerciseID::from("e1")));

        let rewritten = writes
            .iter()
            .filter_map(|w| match w {
                Write::SetAssignedTable(t) => Some((t.id.to_string(), machine_ids(t))),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            rewritten,
            vec![
                ("t1".to_string(), vec!["x".to_string()]),
                ("t3".to_string(), vec!["z".to_string()]),
                ("t4".to_string(), vec![]),
            ]
        );
        assert_eq!(writes.len(), 5);
    }

    #[test]
    fn test_plan_machine_deletion_without_references() {
        let tables = vec![table("t1", vec![entry("x", None)])];

        assert_eq!(
            plan_machine_deletion(&MachineID::from("a"), &[], &tables),
            vec![Write::DeleteMachine(MachineID::from("a"))]
        );
    }

    #[test]
    fn test_plan_exercise_deletion() {
        let tables = vec![
            table("t1", vec![entry("a", Some("e1")), entry("a", Some("e2"))]),
            table("t2", vec![entry("a", None)]),
        ];

        let writes = plan_exercise_deletion(&ExerciseID::from("e1"), &tables);

        assert_eq!(
            writes,
            vec![
                Write::DeleteExercise(ExerciseID::from("e1")),
                Write::SetAssignedTable(table("t1", vec![entry("a", Some("e2"))])),
            ]
        );
    }
}
