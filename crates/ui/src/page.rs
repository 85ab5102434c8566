//! Page-query primitives over Playwright
//!
//! A [`ScriptedPage`] owns one long-running `node` driver per scenario. The
//! driver launches the browser once, keeps a single page open, and then reads
//! JSON commands from stdin and answers each with a JSON verdict on stdout,
//! so navigation and click effects persist across calls: `refresh` is the
//! only operation that reloads, and queries observe the page as the previous
//! steps left it.
//!
//! A query that answers `false` is a normal outcome; only driver failures
//! (Playwright missing, navigation error, driver exit) become errors, which
//! keeps the retry-vs-abort distinction clean for the wait helpers.

use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::debug;

use mgrts_common::error::{Error, Result};

/// Browser engine used by the driver.
#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Page-query primitives the wait helpers are built on.
///
/// Implementations must tolerate repeated invocation: every method may be
/// called arbitrarily many times by a polling wait.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to a path relative to the base URL.
    async fn goto(&self, path: &str) -> Result<()>;

    /// Reload the current page.
    async fn refresh(&self) -> Result<()>;

    /// Whether an element matching the selector is currently visible.
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    /// Whether the page body currently contains the text.
    async fn has_text(&self, text: &str) -> Result<bool>;

    /// Click the first element matching the selector.
    async fn click(&self, selector: &str) -> Result<()>;
}

/// Configuration for [`ScriptedPage`].
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub base_url: String,
    pub browser: Browser,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost".to_string(),
            browser: Browser::Chromium,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

/// JSON verdict printed by the driver for every command.
#[derive(Debug, Deserialize)]
struct DriverVerdict {
    ok: bool,
    #[serde(default)]
    value: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Stdin/stdout channel to the running driver. One command in flight at a
/// time; the lock serializes concurrent waits on the same page.
struct DriverSession {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    _child: Child,
}

/// [`Page`] implementation backed by one persistent Playwright driver.
pub struct ScriptedPage {
    config: PageConfig,
    session: Mutex<DriverSession>,
    _script_dir: tempfile::TempDir,
}

impl ScriptedPage {
    pub fn new(config: PageConfig) -> Result<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, build_driver_script(&config))?;

        let mut child = Command::new("node")
            .arg(&script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| {
            Error::InvalidConfig("page driver has no stdin".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            Error::InvalidConfig("page driver has no stdout".to_string())
        })?;

        Ok(Self {
            config,
            session: Mutex::new(DriverSession {
                stdin,
                stdout: BufReader::new(stdout).lines(),
                _child: child,
            }),
            _script_dir: script_dir,
        })
    }

    fn check_playwright_installed() -> Result<()> {
        let status = std::process::Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(Error::InvalidConfig(
                "Playwright not found; install with `npx playwright install`".to_string(),
            )),
        }
    }

    /// Send one command to the driver and interpret its verdict.
    async fn request(&self, op: &str, arg: &str) -> Result<bool> {
        debug!(%op, %arg, "page driver command");
        let command = json!({ "op": op, "arg": arg }).to_string();

        let mut session = self.session.lock().await;
        session.stdin.write_all(command.as_bytes()).await?;
        session.stdin.write_all(b"\n").await?;
        session.stdin.flush().await?;

        // The driver answers every command with exactly one verdict line;
        // anything else on stdout (browser noise) is skipped.
        let verdict: DriverVerdict = loop {
            match session.stdout.next_line().await? {
                Some(line) => {
                    if let Ok(verdict) = serde_json::from_str(&line) {
                        break verdict;
                    }
                }
                None => {
                    return Err(Error::InvalidConfig(
                        "page driver exited unexpectedly".to_string(),
                    ))
                }
            }
        };

        if verdict.ok {
            Ok(verdict.value)
        } else {
            Err(Error::InvalidConfig(format!(
                "page driver failed on {op}: {}",
                verdict.error.unwrap_or_else(|| "unknown error".to_string())
            )))
        }
    }

    fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Page for ScriptedPage {
    async fn goto(&self, path: &str) -> Result<()> {
        self.request("goto", &self.absolute_url(path)).await?;
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.request("refresh", "").await?;
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.request("is_visible", selector).await
    }

    async fn has_text(&self, text: &str) -> Result<bool> {
        self.request("has_text", text).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.request("click", selector).await?;
        Ok(())
    }
}

/// Generate the driver program: browser and page are created once, then
/// commands are served line by line until stdin closes.
fn build_driver_script(config: &PageConfig) -> String {
    format!(
        r#"
const {{ chromium, firefox, webkit }} = require('playwright');
const readline = require('readline');

(async () => {{
  const browser = await {browser}.launch({{ headless: true }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }},
    ignoreHTTPSErrors: true
  }});
  const page = await context.newPage();
  const rl = readline.createInterface({{ input: process.stdin }});

  for await (const line of rl) {{
    let verdict;
    try {{
      const cmd = JSON.parse(line);
      let value = true;
      switch (cmd.op) {{
        case 'goto':
          await page.goto(cmd.arg, {{ waitUntil: 'networkidle' }});
          break;
        case 'refresh':
          await page.reload({{ waitUntil: 'networkidle' }});
          break;
        case 'is_visible':
          value = await page.isVisible(cmd.arg);
          break;
        case 'has_text':
          value = (await page.getByText(cmd.arg).count()) > 0;
          break;
        case 'click':
          await page.click(cmd.arg);
          break;
        default:
          throw new Error('unknown op: ' + cmd.op);
      }}
      verdict = {{ ok: true, value }};
    }} catch (error) {{
      verdict = {{ ok: false, error: error.message }};
    }}
    console.log(JSON.stringify(verdict));
  }}

  await browser.close();
}})();
"#,
        browser = config.browser.as_str(),
        width = config.viewport_width,
        height = config.viewport_height,
    )
}
