use chrono::{NaiveDate, TimeZone, Utc};
use ironlog_domain as domain;

pub static USER: std::sync::LazyLock<domain::User> = std::sync::LazyLock::new(|| domain::User {
    id: "u1".into(),
    first_name: "Alice".to_string(),
    last_name: "Smith".to_string(),
    email: domain::Email::new("alice@example.com").unwrap(),
    photo_url: None,
    created_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
});

pub static MACHINE: std::sync::LazyLock<domain::Machine> =
    std::sync::LazyLock::new(|| domain::Machine {
        id: "m1".into(),
        name: domain::Name::new("Leg Press").unwrap(),
        number: Some(domain::MachineNumber::new(12).unwrap()),
        category: Some("Legs".to_string()),
        description: "Seat in position 4".to_string(),
        media_url: Some("https://storage.example/o/machines%2Fm1%2F1_press.jpg?alt=media".to_string()),
        ownership: domain::Ownership::Global,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    });

pub static MACHINE_2: std::sync::LazyLock<domain::Machine> =
    std::sync::LazyLock::new(|| domain::Machine {
        id: "m2".into(),
        name: domain::Name::new("Rowing").unwrap(),
        number: None,
        category: None,
        description: String::new(),
        media_url: None,
        ownership: domain::Ownership::Personal("u1".into()),
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
    });

pub static EXERCISE: std::sync::LazyLock<domain::Exercise> =
    std::sync::LazyLock::new(|| domain::Exercise {
        id: "e1".into(),
        name: domain::Name::new("Narrow Stance").unwrap(),
        machine_id: "m1".into(),
        description: String::new(),
        media: None,
        ownership: domain::Ownership::Global,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
    });

pub static ASSIGNED_TABLE: std::sync::LazyLock<domain::AssignedTable> =
    std::sync::LazyLock::new(|| domain::AssignedTable {
        id: "t1".into(),
        user_id: "u1".into(),
        name: Some("Week 1".to_string()),
        entries: vec![
            domain::TableEntry {
                machine_id: "m1".into(),
                machine_name: "Leg Press".to_string(),
                exercise_id: Some("e1".into()),
                exercise_name: "Narrow Stance".to_string(),
                sets: domain::Sets::new(3).unwrap(),
                reps: domain::Reps::new(12).unwrap(),
                weight: domain::Weight::new(80.5).unwrap(),
                notes: "slow".to_string(),
            },
            domain::TableEntry {
                machine_id: "m2".into(),
                machine_name: "Rowing".to_string(),
                exercise_id: None,
                exercise_name: String::new(),
                sets: domain::Sets::new(4).unwrap(),
                reps: domain::Reps::new(10).unwrap(),
                weight: domain::Weight::new(0.0).unwrap(),
                notes: String::new(),
            },
        ],
        assigned_by: "admin".into(),
        status: domain::TableStatus::Completed,
        created_at: Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap(),
        completed_at: Some(Utc.with_ymd_and_hms(2024, 2, 3, 9, 0, 0).unwrap()),
    });

pub static WORKOUT: std::sync::LazyLock<domain::WorkoutRecord> =
    std::sync::LazyLock::new(|| domain::WorkoutRecord {
        id: "w1".into(),
        user_id: "u1".into(),
        date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        machine_id: "m1".into(),
        machine_name: "Leg Press".to_string(),
        sets: domain::Sets::new(3).unwrap(),
        reps: domain::Reps::new(12).unwrap(),
        weight: domain::Weight::new(80.5).unwrap(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 4, 18, 0, 0).unwrap(),
    });
