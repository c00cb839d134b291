use std::collections::BTreeSet;

use crate::{CreateError, DeleteError, Machine, Name, ReadError};

#[allow(async_fn_in_trait)]
pub trait CategoryService {
    /// Explicit category documents, or the categories used by machines if there are none.
    async fn get_categories(&self) -> Result<Vec<String>, ReadError>;
    /// The stored category documents, sorted by name.
    async fn get_category_documents(&self) -> Result<Vec<Category>, ReadError>;
    async fn create_category(&self, name: Name) -> Result<Category, CreateError>;
    async fn delete_category(&self, id: &CategoryID) -> Result<CategoryID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait CategoryRepository {
    async fn read_categories(&self) -> Result<Vec<Category>, ReadError>;
    async fn create_category(&self, category: Category) -> Result<Category, CreateError>;
    async fn delete_category(&self, id: &CategoryID) -> Result<CategoryID, DeleteError>;
}

document_id!(CategoryID);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryID,
    pub name: Name,
}

#[must_use]
pub fn derive_categories(categories: &[Category], machines: &[Machine]) -> Vec<String> {
    let explicit = categories
        .iter()
        .map(|c| c.name.to_string())
        .collect::<BTreeSet<_>>();

    if !explicit.is_empty() {
        return explicit.into_iter().collect();
    }

    machines
        .iter()
        .filter_map(|m| m.category.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{MachineID, Ownership};

    fn machine(category: Option<&str>) -> Machine {
        Machine {
            id: MachineID::generate(),
            name: Name::new("Machine").unwrap(),
            number: None,
            category: category.map(ToString::to_string),
            description: String::new(),
            media_url: None,
            ownership: Ownership::Global,
            created_at: DateTime::default(),
        }
    }

    fn category(name: &str) -> Category {
        Category {
            id: CategoryID::generate(),
            name: Name::new(name).unwrap(),
        }
    }

    #[test]
    fn test_derive_categories_from_machines() {
        let machines = [
            machine(Some("Legs")),
            machine(Some("Back")),
            machine(None),
            machine(Some("")),
            machine(Some("Legs")),
            machine(Some(" Arms ")),
        ];

        assert_eq!(derive_categories(&[], &machines), vec!["Arms", "Back", "Legs"]);
    }

    #[test]
    fn test_derive_categories_prefers_documents() {
        let machines = [machine(Some("Legs")), machine(Some("Back"))];
        let categories = [category("Core"), category("Cardio"), category("Core")];

        assert_eq!(
            derive_categories(&categories, &machines),
            vec!["Cardio", "Core"]
        );
    }

    #[test]
    fn test_derive_categories_empty() {
        assert!(derive_categories(&[], &[]).is_empty());
    }
}
