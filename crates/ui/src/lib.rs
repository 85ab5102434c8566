//! Browser-side helpers for mgr-testsuite
//!
//! [`page::Page`] is the small set of page-query primitives scenarios need
//! (navigate, refresh, visibility and text queries, click);
//! [`page::ScriptedPage`] implements it over one persistent Playwright
//! driver process, so page state carries across calls. The [`wait`] module
//! composes these primitives with the poll coordinator into the higher-level
//! waits
//! scenarios actually call ("wait until this text shows up after refreshes",
//! "wait until that scheduled action completes").

pub mod page;
pub mod wait;

pub use page::{Browser, Page, PageConfig, ScriptedPage};
