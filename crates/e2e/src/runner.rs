//! Suite runner: serial scenario execution and result reporting

use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use mgrts_common::config::SuiteConfig;
use mgrts_common::duration::DurationRecord;
use mgrts_common::error::Result;
use mgrts_common::metrics::MetricsPusher;

use crate::context::ScenarioContext;

/// One executable test case.
///
/// Steps execute serially inside `run`; the context is created fresh for the
/// scenario and dropped afterwards, so scenarios cannot leak state into each
/// other.
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, ctx: &mut ScenarioContext) -> Result<()>;
}

/// Outcome of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

/// Runs scenarios serially and reports results.
pub struct SuiteRunner {
    config: SuiteConfig,
    metrics: Option<MetricsPusher>,
    output_dir: PathBuf,
}

impl SuiteRunner {
    pub fn new(config: SuiteConfig) -> Self {
        let metrics = config.pushgateway_url.as_deref().map(MetricsPusher::new);
        Self {
            config,
            metrics,
            output_dir: PathBuf::from("test-results"),
        }
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Run the given scenarios in order, one context each.
    pub async fn run_all(&self, scenarios: &[Box<dyn Scenario>]) -> SuiteResult {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_one(scenario.as_ref()).await;
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    async fn run_one(&self, scenario: &dyn Scenario) -> ScenarioResult {
        let start = Instant::now();
        let outcome = match ScenarioContext::new(self.config.clone()) {
            Ok(mut ctx) => scenario.run(&mut ctx).await,
            Err(e) => Err(e),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = ScenarioResult {
            name: scenario.name().to_string(),
            success: outcome.is_ok(),
            duration_ms,
            error: outcome.err().map(|e| e.to_string()),
        };
        self.report_duration(&result).await;
        result
    }

    /// Push the scenario's wall-clock duration to the gateway, when one is
    /// configured. Metrics failures never fail the run.
    async fn report_duration(&self, result: &ScenarioResult) {
        if let Some(metrics) = &self.metrics {
            let record = DurationRecord {
                subject: result.name.clone(),
                seconds: result.duration_ms / 1000,
                line: String::new(),
            };
            metrics.push_duration("mgrts", "scenario", &record).await;
        }
    }

    /// Write the suite result as JSON into the output directory.
    pub fn write_results(&self, results: &SuiteResult) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join("suite-results.json");
        std::fs::write(&path, serde_json::to_string_pretty(results)?)?;
        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
