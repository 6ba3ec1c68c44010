//! Remote mtime bumping (the `touch` verb)
//!
//! Updates each target's remote modification time to server-now,
//! throttled to 10 operations per second, recursing into folders under
//! `-r`.

use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tokio::time::Interval;
use tracing::warn;

use drivesync_core::domain::paths;

use crate::engine::Engine;

/// Touch throttle: 10 ops per second.
const THROTTLE: Duration = Duration::from_millis(100);

/// Outcome of touching one path.
#[derive(Debug)]
pub struct TouchOutcome {
    pub path: String,
    pub result: Result<DateTime<Utc>, String>,
}

impl Engine {
    /// Touches every source path; failures are recorded per path and do
    /// not stop the run.
    pub async fn touch(&self) -> Result<Vec<TouchOutcome>> {
        let mut throttle = tokio::time::interval(THROTTLE);
        let mut outcomes = Vec::new();
        for source in &self.opts.sources {
            throttle.tick().await;
            self.touch_path(source.clone(), &mut throttle, &mut outcomes)
                .await;
        }
        Ok(outcomes)
    }

    fn touch_path<'a>(
        &'a self,
        path: String,
        throttle: &'a mut Interval,
        outcomes: &'a mut Vec<TouchOutcome>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let entry = match self.remote.find_by_path(&path).await {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(%path, error = %err, "touch failed");
                    outcomes.push(TouchOutcome {
                        path,
                        result: Err(err.to_string()),
                    });
                    return;
                }
            };
            let id = entry.remote_id.clone().unwrap_or_default();

            match self.remote.touch(&id).await {
                Ok(touched) => outcomes.push(TouchOutcome {
                    path: path.clone(),
                    result: Ok(touched.mtime),
                }),
                Err(err) => {
                    warn!(%path, error = %err, "touch failed");
                    outcomes.push(TouchOutcome {
                        path: path.clone(),
                        result: Err(err.to_string()),
                    });
                    return;
                }
            }

            if self.opts.recursive && entry.is_dir {
                let mut rx = self.remote.list_children(&id, self.opts.hidden).await;
                while let Some(item) = rx.recv().await {
                    let Ok(child) = item else { break };
                    throttle.tick().await;
                    let child_path = paths::join_child(&path, &child.name);
                    self.touch_path(child_path, throttle, outcomes).await;
                }
            }
        })
    }

    /// First error across the outcomes, if any, for exit-status purposes.
    pub fn touch_failures(outcomes: &[TouchOutcome]) -> Result<()> {
        outcomes
            .iter()
            .find_map(|o| o.result.as_ref().err().map(|e| (o.path.clone(), e.clone())))
            .map_or(Ok(()), |(path, err)| {
                Err(anyhow::anyhow!(err)).context(path)
            })
    }
}
