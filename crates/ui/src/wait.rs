//! Higher-level waits composing the poll coordinator with page and API queries
//!
//! Per-attempt side effects (page refreshes, repeated list calls) are the
//! predicate's business; the coordinator only bounds them in time. A query
//! error aborts the wait immediately, a `false` answer retries.

use mgrts_api::namespace::schedules::Schedules;
use mgrts_common::error::{Error, Result};
use mgrts_common::retry::{repeat_until_timeout, repeat_until_true, Poll, RetryOpts};

use crate::page::Page;

/// Wait until an element matching `selector` is visible.
pub async fn wait_until_visible(page: &dyn Page, selector: &str, opts: RetryOpts) -> Result<()> {
    let opts = opts.with_message(format!("element `{selector}` to become visible"));
    repeat_until_true(opts, move || page.is_visible(selector)).await
}

/// Wait until no element matching `selector` is visible anymore.
pub async fn wait_until_not_visible(page: &dyn Page, selector: &str, opts: RetryOpts) -> Result<()> {
    let opts = opts.with_message(format!("element `{selector}` to disappear"));
    repeat_until_true(opts, move || {
        let visible = page.is_visible(selector);
        async move { Ok(!visible.await?) }
    })
    .await
}

/// Wait until the page shows `text`, without reloading in between.
pub async fn wait_until_text(page: &dyn Page, text: &str, opts: RetryOpts) -> Result<()> {
    let opts = opts.with_message(format!("text `{text}` to appear"));
    repeat_until_true(opts, move || page.has_text(text)).await
}

/// Wait until the page shows `text`, reloading it before each query.
///
/// This is the idiom for pages the product only updates server-side, like the
/// event history of a system.
pub async fn wait_until_text_refreshing(page: &dyn Page, text: &str, opts: RetryOpts) -> Result<()> {
    let opts = opts.with_message(format!("text `{text}` to appear after refreshes"));
    repeat_until_true(opts, move || async move {
        page.refresh().await?;
        page.has_text(text).await
    })
    .await
}

/// Wait until the scheduled action with `action_id` completes.
///
/// An action showing up in the failed list is a fatal outcome, not a retry.
pub async fn wait_until_action_completed(
    schedules: &Schedules<'_>,
    action_id: i64,
    opts: RetryOpts,
) -> Result<()> {
    let opts = opts.with_message(format!("action {action_id} to complete"));
    repeat_until_timeout(opts, move || async move {
        if let Some(action) = schedules
            .list_failed()
            .await?
            .into_iter()
            .find(|a| a.id == action_id)
        {
            return Err(Error::ActionFailed {
                id: action.id,
                name: action.name,
            });
        }
        let completed = schedules
            .list_completed()
            .await?
            .into_iter()
            .any(|a| a.id == action_id);
        Ok(if completed { Poll::Ready(()) } else { Poll::Pending })
    })
    .await
}

/// Wait until onboarding of `system_name` has finished, i.e. a completed
/// action applying the onboarding states to that system exists.
pub async fn wait_until_onboarding_completed(
    schedules: &Schedules<'_>,
    system_name: &str,
    opts: RetryOpts,
) -> Result<()> {
    let opts = opts.with_message(format!("onboarding of {system_name} to complete"));
    repeat_until_timeout(opts, move || async move {
        let needle = "Apply states";
        if let Some(action) = schedules
            .list_failed()
            .await?
            .into_iter()
            .find(|a| a.name.contains(needle) && a.name.contains(system_name))
        {
            return Err(Error::ActionFailed {
                id: action.id,
                name: action.name,
            });
        }
        let done = schedules
            .list_completed()
            .await?
            .into_iter()
            .any(|a| a.name.contains(needle) && a.name.contains(system_name));
        Ok(if done { Poll::Ready(()) } else { Poll::Pending })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Page stub whose text query succeeds after a configured number of
    /// refreshes and counts every call.
    struct CountingPage {
        refreshes: AtomicU32,
        queries: AtomicU32,
        text_after_refreshes: u32,
    }

    impl CountingPage {
        fn new(text_after_refreshes: u32) -> Self {
            Self {
                refreshes: AtomicU32::new(0),
                queries: AtomicU32::new(0),
                text_after_refreshes,
            }
        }
    }

    #[async_trait]
    impl Page for CountingPage {
        async fn goto(&self, _path: &str) -> Result<()> {
            Ok(())
        }

        async fn refresh(&self) -> Result<()> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn is_visible(&self, _selector: &str) -> Result<bool> {
            Ok(false)
        }

        async fn has_text(&self, _text: &str) -> Result<bool> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.refreshes.load(Ordering::SeqCst) >= self.text_after_refreshes)
        }

        async fn click(&self, _selector: &str) -> Result<()> {
            Ok(())
        }
    }

    fn fast_opts() -> RetryOpts {
        RetryOpts::new(Duration::from_secs(5)).with_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn refreshing_wait_reloads_before_every_query() {
        let page = CountingPage::new(3);
        wait_until_text_refreshing(&page, "Events", fast_opts())
            .await
            .unwrap();
        assert_eq!(page.refreshes.load(Ordering::SeqCst), 3);
        assert_eq!(page.queries.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn plain_text_wait_never_refreshes() {
        let page = CountingPage::new(0);
        wait_until_text(&page, "Overview", fast_opts()).await.unwrap();
        assert_eq!(page.refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(page.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invisible_element_times_out_with_context() {
        let page = CountingPage::new(0);
        let err = wait_until_visible(
            &page,
            "#gone",
            RetryOpts::new(Duration::from_millis(20)).with_interval(Duration::from_millis(5)),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("#gone"));
        assert!(err.is_timeout());
    }
}
