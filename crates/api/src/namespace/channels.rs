//! `channels` namespace

use serde_json::json;

use mgrts_common::error::Result;

use crate::client::ApiClient;
use crate::namespace::pluck_strings;

pub struct Channels<'a> {
    client: &'a ApiClient,
}

impl<'a> Channels<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Labels of every software channel on the server.
    pub async fn list_labels(&self) -> Result<Vec<String>> {
        let result = self
            .client
            .call("channels.listSoftwareChannels", json!({}))
            .await?;
        Ok(pluck_strings(&result, "label"))
    }

    pub async fn exists(&self, label: &str) -> Result<bool> {
        Ok(self.list_labels().await?.iter().any(|l| l == label))
    }

    pub async fn create_repo(&self, label: &str, url: &str) -> Result<()> {
        self.client
            .call(
                "channels.software.createRepo",
                json!({ "label": label, "type": "yum", "url": url }),
            )
            .await?;
        Ok(())
    }

    pub async fn associate_repo(&self, channel_label: &str, repo_label: &str) -> Result<()> {
        self.client
            .call(
                "channels.software.associateRepo",
                json!({ "channelLabel": channel_label, "repoLabel": repo_label }),
            )
            .await?;
        Ok(())
    }

    /// Kick off a repository synchronization for one channel.
    pub async fn sync_repo(&self, channel_label: &str) -> Result<()> {
        self.client
            .call(
                "channels.software.syncRepo",
                json!({ "channelLabel": channel_label }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, label: &str) -> Result<()> {
        self.client
            .call("channels.software.delete", json!({ "channelLabel": label }))
            .await?;
        Ok(())
    }
}
