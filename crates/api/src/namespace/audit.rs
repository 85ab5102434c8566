//! `audit` namespace

use serde_json::json;

use mgrts_common::error::Result;

use crate::client::ApiClient;
use crate::namespace::pluck_strings;

pub struct Audit<'a> {
    client: &'a ApiClient,
}

impl<'a> Audit<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Names of systems affected by the given CVE.
    pub async fn list_systems_by_patch_status(&self, cve: &str) -> Result<Vec<String>> {
        let result = self
            .client
            .call(
                "audit.listSystemsByPatchStatus",
                json!({ "cveIdentifier": cve }),
            )
            .await?;
        Ok(pluck_strings(&result, "system_name"))
    }
}
