//! `schedule` namespace
//!
//! The UI wait helpers poll these lists to decide whether a scheduled action
//! (onboarding, highstate, channel sync) has finished.

use serde::Deserialize;
use serde_json::json;

use mgrts_common::error::Result;

use crate::client::ApiClient;

/// One scheduled action, as reported by the action lists.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ActionSummary {
    pub id: i64,
    pub name: String,
}

pub struct Schedules<'a> {
    client: &'a ApiClient,
}

impl<'a> Schedules<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_in_progress(&self) -> Result<Vec<ActionSummary>> {
        self.list("schedule.listInProgressActions").await
    }

    pub async fn list_completed(&self) -> Result<Vec<ActionSummary>> {
        self.list("schedule.listCompletedActions").await
    }

    pub async fn list_failed(&self) -> Result<Vec<ActionSummary>> {
        self.list("schedule.listFailedActions").await
    }

    /// Cancel pending actions, e.g. when cleaning up after a scenario.
    pub async fn cancel(&self, action_ids: &[i64]) -> Result<()> {
        self.client
            .call("schedule.cancelActions", json!({ "actionIds": action_ids }))
            .await?;
        Ok(())
    }

    async fn list(&self, call: &str) -> Result<Vec<ActionSummary>> {
        let result = self.client.call(call, json!({})).await?;
        Ok(serde_json::from_value(result).unwrap_or_default())
    }
}
