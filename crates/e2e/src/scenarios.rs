//! Built-in smoke scenarios
//!
//! These cover the plumbing every feature scenario relies on: the server's
//! services being up, the API session lifecycle, and reposync duration
//! telemetry. Feature-level scenarios live with the deployments that need
//! them and register through the same [`Scenario`] trait.

use async_trait::async_trait;

use mgrts_api::namespace::channels::Channels;
use mgrts_api::namespace::users::Users;
use mgrts_common::duration::{channel_sync_seconds, DurationRecord};
use mgrts_common::error::{Error, Result};
use mgrts_common::metrics::MetricsPusher;
use mgrts_common::retry::RetryOpts;
use mgrts_remote::RunOpts;

use crate::context::ScenarioContext;
use crate::runner::Scenario;

/// Core server services respond as active within the suite timeout.
pub struct ServerServicesUp;

#[async_trait]
impl Scenario for ServerServicesUp {
    fn name(&self) -> &str {
        "server_services_up"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<()> {
        let server = ctx.server()?;
        let retry = RetryOpts::new(ctx.config.default_timeout);
        for service in ["apache2", "taskomatic", "salt-master"] {
            server
                .run_until_ok(&format!("systemctl is-active {service}"), retry.clone())
                .await?;
        }
        Ok(())
    }
}

/// Login works, namespaces answer, logout invalidates the session.
pub struct ApiSmoke;

#[async_trait]
impl Scenario for ApiSmoke {
    fn name(&self) -> &str {
        "api_smoke"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<()> {
        ctx.login().await?;

        let logins = Users::new(&ctx.api).list_logins().await?;
        if !logins.iter().any(|l| l == &ctx.config.api_user) {
            return Err(Error::ApiCallFailed {
                call: "users.listUsers".to_string(),
                fault_code: -1,
                fault_message: format!("configured user {} not listed", ctx.config.api_user),
            });
        }

        // Channel list may legitimately be empty on a fresh server; the call
        // succeeding is the assertion.
        Channels::new(&ctx.api).list_labels().await?;

        ctx.api.logout().await
    }
}

/// Extract per-channel sync durations from the server's reposync logs and
/// push them to the gateway.
pub struct ReposyncTelemetry {
    pub channels: Vec<String>,
}

#[async_trait]
impl Scenario for ReposyncTelemetry {
    fn name(&self) -> &str {
        "reposync_telemetry"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<()> {
        let server = ctx.server()?;
        let log = server
            .run(
                "cat /var/log/rhn/reposync/*.log 2>/dev/null || cat /var/log/rhn/reposync.log",
                &RunOpts::unchecked(),
            )
            .await?
            .stdout;

        let targets: Vec<&str> = self.channels.iter().map(String::as_str).collect();
        let report = channel_sync_seconds(&log, &targets)?;

        if let Some(gateway) = &ctx.config.pushgateway_url {
            let pusher = MetricsPusher::new(gateway.clone());
            let record = DurationRecord {
                subject: self.channels.join(","),
                seconds: report.seconds,
                line: format!("{} match(es)", report.matches),
            };
            pusher.push_duration("mgrts", "reposync", &record).await;
        }
        Ok(())
    }
}

/// The default smoke set, in execution order.
pub fn smoke_scenarios() -> Vec<Box<dyn Scenario>> {
    vec![Box::new(ServerServicesUp), Box::new(ApiSmoke)]
}
