use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "isAdmin")]
    pub is_admin: bool,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_accepts_access_token_alias() {
        let json = r#"{"access_token":"t0k","user":{"id":1,"name":"Ama","email":"ama@example.com","isAdmin":true}}"#;
        let resp: LoginResponse = serde_json::from_str(json).expect("parses");
        assert_eq!(resp.token, "t0k");
        assert!(resp.user.is_admin);
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User {
            id: 1,
            name: " ".to_string(),
            email: "kofi@example.com".to_string(),
            phone: None,
            is_admin: false,
        };
        assert_eq!(user.display_name(), "kofi@example.com");
    }
}
