use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub created_at: String,
    pub role: Role,
}

impl User {
    // Права администратора определяются только по имени роли
    pub fn is_admin(&self) -> bool {
        self.role.name == "admin"
    }
}

/// Тело `POST /authentication/token`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Тело `POST /authentication/user`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_flag_comes_from_role_name() {
        let mut user: User = serde_json::from_str(
            r#"{"id":1,"username":"kate","email":"k@x.io","created_at":"2025-01-01","role":{"id":2,"name":"admin","level":3}}"#,
        )
        .unwrap();
        assert!(user.is_admin());
        user.role.name = "user".to_string();
        assert!(!user.is_admin());
    }
}
