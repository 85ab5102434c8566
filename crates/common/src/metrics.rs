//! Prometheus pushgateway client
//!
//! Durations collected during a run (bootstrap, onboarding, channel sync) are
//! pushed as gauges in the textual exposition format via HTTP PUT to
//! `/metrics/job/<job>` on the configured gateway.

use tracing::{debug, warn};

use crate::duration::DurationRecord;

/// Client for pushing gauge metrics to a Prometheus pushgateway.
#[derive(Debug, Clone)]
pub struct MetricsPusher {
    gateway_url: String,
    client: reqwest::Client,
}

impl MetricsPusher {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Push a single gauge sample under the given job.
    ///
    /// A metrics outage must never fail a scenario, so every failure on this
    /// path, unreachable gateway included, is logged and swallowed.
    pub async fn push_gauge(&self, job: &str, name: &str, labels: &[(&str, &str)], value: f64) {
        let body = render_gauge(name, labels, value);
        let url = format!("{}/metrics/job/{}", self.gateway_url.trim_end_matches('/'), job);
        debug!(%url, %name, value, "pushing gauge");

        match self.client.put(&url).body(body).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), %url, "pushgateway rejected metric");
            }
            Ok(_) => {}
            Err(e) => warn!(%url, "pushgateway unreachable: {e}"),
        }
    }

    /// Report an extracted duration as `<name>_seconds` with the record's
    /// subject as a label.
    pub async fn push_duration(&self, job: &str, name: &str, record: &DurationRecord) {
        self.push_gauge(
            job,
            &format!("{name}_seconds"),
            &[("subject", &record.subject)],
            record.seconds as f64,
        )
        .await
    }
}

/// Render one gauge in exposition format, sanitizing label keys and escaping
/// label values.
fn render_gauge(name: &str, labels: &[(&str, &str)], value: f64) -> String {
    let mut body = format!("# TYPE {name} gauge\n{name}");
    if !labels.is_empty() {
        let rendered: Vec<String> = labels
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", sanitize_label_key(k), escape_label_value(v)))
            .collect();
        body.push('{');
        body.push_str(&rendered.join(","));
        body.push('}');
    }
    body.push_str(&format!(" {value}\n"));
    body
}

/// Label keys may only contain `[a-zA-Z0-9_]`; anything else becomes `_`.
fn sanitize_label_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Escape backslash, double quote and newline per the exposition format.
fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
