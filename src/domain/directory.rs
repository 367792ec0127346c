// Client-side join of weak user references to display names
use crate::domain::records::User;
use std::collections::HashMap;

pub const UNASSIGNED: &str = "Unassigned";
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<String, String>,
    departments: HashMap<String, String>,
}

impl UserDirectory {
    pub fn new(users: &[User]) -> Self {
        let mut names = HashMap::with_capacity(users.len());
        let mut departments = HashMap::new();
        for user in users {
            names.insert(user.id.clone(), user.name.clone());
            if let Some(department) = &user.department {
                departments.insert(user.id.clone(), department.clone());
            }
        }
        Self { names, departments }
    }

    /// Display name for a reference. References are not validated
    /// upstream, so a dangling id resolves to "Unknown".
    pub fn resolve(&self, user_id: Option<&str>) -> String {
        match user_id {
            None => UNASSIGNED.to_string(),
            Some(id) => self
                .names
                .get(id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.names.contains_key(user_id)
    }

    pub fn department_of(&self, user_id: &str) -> Option<&str> {
        self.departments.get(user_id).map(String::as_str)
    }
}
