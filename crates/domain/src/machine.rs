use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::{
    CreateError, DeleteError, MachineNumber, Name, ReadError, Session, UpdateError, Upload,
    UserID, ValidationError,
};

#[allow(async_fn_in_trait)]
pub trait MachineService {
    /// Global machines and the personal machines of the current user.
    async fn get_machines(&self) -> Result<Vec<Machine>, ReadError>;
    async fn create_machine(&self, machine: NewMachine) -> Result<Machine, CreateError>;
    async fn replace_machine(&self, machine: Machine) -> Result<Machine, UpdateError>;
    /// Deletes the machine together with its exercises and removes it from all assigned tables.
    async fn delete_machine(&self, id: &MachineID) -> Result<MachineID, DeleteError>;
    async fn set_machine_media(&self, id: &MachineID, upload: Upload)
    -> Result<Machine, UpdateError>;

    async fn validate_machine_name(
        &self,
        name: &str,
        id: &MachineID,
    ) -> Result<Name, ValidationError> {
        let name = Name::new(name).map_err(|err| ValidationError::Other(err.into()))?;
        let machines = self.get_machines().await?;
        if machines
            .iter()
            .all(|m| m.id == *id || !m.name.as_str().eq_ignore_ascii_case(name.as_str()))
        {
            Ok(name)
        } else {
            Err(ValidationError::Conflict("Machine".to_string()))
        }
    }

    fn validate_machine_number(
        &self,
        number: &str,
    ) -> Result<Option<MachineNumber>, ValidationError> {
        if number.trim().is_empty() {
            return Ok(None);
        }
        MachineNumber::try_from(number)
            .map(Some)
            .map_err(|err| ValidationError::Other(err.into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait MachineRepository {
    async fn read_machines(&self) -> Result<Vec<Machine>, ReadError>;
    async fn read_machine(&self, id: &MachineID) -> Result<Machine, ReadError>;
    async fn create_machine(&self, machine: Machine) -> Result<Machine, CreateError>;
    async fn replace_machine(&self, machine: Machine) -> Result<Machine, UpdateError>;
}

document_id!(MachineID);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    Global,
    Personal(UserID),
}

impl Ownership {
    #[must_use]
    pub fn owner(&self) -> Option<&UserID> {
        match self {
            Ownership::Global => None,
            Ownership::Personal(user_id) => Some(user_id),
        }
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Ownership::Global)
    }

    #[must_use]
    pub fn is_visible_to(&self, user_id: &UserID) -> bool {
        match self {
            Ownership::Global => true,
            Ownership::Personal(owner) => owner == user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    pub id: MachineID,
    pub name: Name,
    pub number: Option<MachineNumber>,
    pub category: Option<String>,
    pub description: String,
    pub media_url: Option<String>,
    pub ownership: Ownership,
    pub created_at: DateTime<Utc>,
}

impl Machine {
    #[must_use]
    pub fn label(&self) -> String {
        match self.number {
            Some(number) => format!("{number} · {}", self.name),
            None => self.name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMachine {
    pub name: Name,
    pub number: Option<MachineNumber>,
    pub category: Option<String>,
    pub description: String,
    pub global: bool,
}

impl NewMachine {
    #[must_use]
    pub fn into_machine(self, id: MachineID, owner: &UserID, created_at: DateTime<Utc>) -> Machine {
        Machine {
            id,
            name: self.name,
            number: self.number,
            category: self
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            description: self.description.trim().to_string(),
            media_url: None,
            ownership: if self.global {
                Ownership::Global
            } else {
                Ownership::Personal(owner.clone())
            },
            created_at,
        }
    }
}

/// Machines without a number are listed after all numbered machines.
#[must_use]
pub fn compare_machines(a: &Machine, b: &Machine) -> Ordering {
    match (a.number, b.number) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.name.as_str().to_lowercase().cmp(&b.name.as_str().to_lowercase()))
}

#[must_use]
pub fn visible_machines(machines: Vec<Machine>, session: &Session) -> Vec<Machine> {
    let mut machines = machines
        .into_iter()
        .filter(|m| m.ownership.is_visible_to(&session.user_id))
        .collect::<Vec<_>>();
    machines.sort_by(compare_machines);
    machines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Email;

    fn machine(id: &str, name: &str, number: Option<u32>, ownership: Ownership) -> Machine {
        Machine {
            id: MachineID::from(id),
            name: Name::new(name).unwrap(),
            number: number.map(|n| MachineNumber::new(n).unwrap()),
            category: None,
            description: String::new(),
            media_url: None,
            ownership,
            created_at: DateTime::default(),
        }
    }

    fn session(user_id: &str, email: &str) -> Session {
        Session {
            user_id: UserID::from(user_id),
            email: Email::new(email).unwrap(),
            id_token: String::new(),
        }
    }

    #[test]
    fn test_visible_machines() {
        let machines = vec![
            machine("1", "Row", None, Ownership::Global),
            machine("2", "Press", Some(3), Ownership::Personal(UserID::from("u1"))),
            machine("3", "Curl", Some(1), Ownership::Global),
            machine("4", "Fly", Some(2), Ownership::Personal(UserID::from("u2"))),
            machine("5", "Bench", None, Ownership::Global),
        ];

        assert_eq!(
            visible_machines(machines, &session("u1", "member@ironlog.app"))
                .iter()
                .map(|m| m.id.to_string())
                .collect::<Vec<_>>(),
            vec!["3", "2", "5", "1"]
        );
    }

    #[test]
    fn test_new_machine_into_machine() {
        let owner = UserID::from("u1");
        let new_machine = NewMachine {
            name: Name::new("Leg Press").unwrap(),
            number: None,
            category: Some("  ".to_string()),
            description: " Seat at 4 ".to_string(),
            global: false,
        };

        let machine = new_machine.into_machine(MachineID::from("m1"), &owner, DateTime::default());

        assert_eq!(machine.category, None);
        assert_eq!(machine.description, "Seat at 4");
        assert_eq!(machine.ownership, Ownership::Personal(owner));
    }

    #[test]
    fn test_machine_label() {
        assert_eq!(machine("1", "Row", Some(12), Ownership::Global).label(), "12 · Row");
        assert_eq!(machine("1", "Row", None, Ownership::Global).label(), "Row");
    }
}
