//! `activationkeys` namespace

use serde_json::json;

use mgrts_common::error::Result;

use crate::client::ApiClient;
use crate::namespace::pluck_strings;

pub struct ActivationKeys<'a> {
    client: &'a ApiClient,
}

impl<'a> ActivationKeys<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Create a key; the server prefixes it with the organization id and
    /// returns the full key name.
    pub async fn create(
        &self,
        key: &str,
        description: &str,
        base_channel_label: &str,
    ) -> Result<String> {
        let result = self
            .client
            .call(
                "activationkeys.create",
                json!({
                    "key": key,
                    "description": description,
                    "baseChannelLabel": base_channel_label,
                    "unlimitedUsageLimit": true,
                }),
            )
            .await?;
        Ok(result.as_str().unwrap_or(key).to_string())
    }

    /// Key names of every activation key.
    pub async fn list(&self) -> Result<Vec<String>> {
        let result = self
            .client
            .call("activationkeys.listActivationKeys", json!({}))
            .await?;
        Ok(pluck_strings(&result, "key"))
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.list().await?.iter().any(|k| k == key))
    }

    pub async fn add_child_channels(&self, key: &str, labels: &[&str]) -> Result<()> {
        self.client
            .call(
                "activationkeys.addChildChannels",
                json!({ "key": key, "childChannelLabels": labels }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .call("activationkeys.delete", json!({ "key": key }))
            .await?;
        Ok(())
    }
}
