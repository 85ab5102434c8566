//! `users` namespace

use serde_json::{json, Value};

use mgrts_common::error::Result;

use crate::client::ApiClient;
use crate::namespace::pluck_strings;

pub struct Users<'a> {
    client: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Logins of all users visible to the session.
    pub async fn list_logins(&self) -> Result<Vec<String>> {
        let result = self.client.call("users.listUsers", json!({})).await?;
        Ok(pluck_strings(&result, "login"))
    }

    pub async fn create(
        &self,
        login: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<()> {
        self.client
            .call(
                "users.create",
                json!({
                    "login": login,
                    "password": password,
                    "firstName": first_name,
                    "lastName": last_name,
                    "email": email,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, login: &str) -> Result<()> {
        self.client
            .call("users.delete", json!({ "login": login }))
            .await?;
        Ok(())
    }

    pub async fn add_role(&self, login: &str, role: &str) -> Result<()> {
        self.client
            .call("users.addRole", json!({ "login": login, "role": role }))
            .await?;
        Ok(())
    }

    /// Roles granted to one user.
    pub async fn list_roles(&self, login: &str) -> Result<Vec<String>> {
        let result = self
            .client
            .call("users.listRoles", json!({ "login": login }))
            .await?;
        Ok(result
            .as_array()
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default())
    }
}
