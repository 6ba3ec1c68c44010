//! Sharing and publishing.

use anyhow::{Context as _, Result};
use tracing::warn;

use drivesync_core::ports::{AccountKind, PermissionRequest, Role};

use crate::engine::Engine;

/// What a `share` invocation grants.
#[derive(Debug, Clone)]
pub struct ShareSpec {
    /// Email or domain targets.
    pub targets: Vec<String>,
    pub role: Role,
    pub kind: AccountKind,
    /// Message for the notification email.
    pub message: Option<String>,
    pub notify: bool,
}

impl Engine {
    /// Publishes every source and returns (path, public URL) pairs.
    pub async fn publish(&self) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for source in &self.opts.sources {
            let entry = self
                .remote
                .find_by_path(source)
                .await
                .map_err(anyhow::Error::new)
                .with_context(|| source.clone())?;
            let id = entry.remote_id.as_deref().unwrap_or_default();
            let url = self
                .remote
                .publish(id)
                .await
                .with_context(|| source.clone())?;
            out.push((source.clone(), url));
        }
        Ok(out)
    }

    /// Revokes the public permission on every source.
    pub async fn unpublish(&self) -> Result<()> {
        for source in &self.opts.sources {
            let entry = self
                .remote
                .find_by_path(source)
                .await
                .map_err(anyhow::Error::new)
                .with_context(|| source.clone())?;
            let id = entry.remote_id.as_deref().unwrap_or_default();
            self.remote
                .unpublish(id)
                .await
                .with_context(|| source.clone())?;
        }
        Ok(())
    }

    /// Grants `spec` on every source path.
    pub async fn share(&self, spec: &ShareSpec) -> Result<()> {
        for source in &self.opts.sources {
            let entry = self
                .remote
                .find_by_path(source)
                .await
                .map_err(anyhow::Error::new)
                .with_context(|| source.clone())?;
            let id = entry.remote_id.clone().unwrap_or_default();

            if spec.targets.is_empty() {
                // No explicit targets: grant to anyone.
                let request = PermissionRequest {
                    file_id: id.clone(),
                    value: None,
                    role: spec.role,
                    kind: AccountKind::Anyone,
                    message: spec.message.clone(),
                    notify: spec.notify,
                };
                self.remote.insert_permission(&request).await?;
                continue;
            }

            for target in &spec.targets {
                let request = PermissionRequest {
                    file_id: id.clone(),
                    value: Some(target.clone()),
                    role: spec.role,
                    kind: spec.kind,
                    message: spec.message.clone(),
                    notify: spec.notify,
                };
                self.remote
                    .insert_permission(&request)
                    .await
                    .with_context(|| format!("sharing {source} with {target}"))?;
            }
        }
        Ok(())
    }

    /// Revokes the targets' permissions on every source path.
    pub async fn unshare(&self, targets: &[String]) -> Result<()> {
        for source in &self.opts.sources {
            let entry = self
                .remote
                .find_by_path(source)
                .await
                .map_err(anyhow::Error::new)
                .with_context(|| source.clone())?;
            let id = entry.remote_id.as_deref().unwrap_or_default();

            for target in targets {
                let permission_id = match self.remote.id_for_email(target).await {
                    Ok(pid) => pid,
                    Err(err) => {
                        warn!(%target, error = %err, "cannot resolve permission id");
                        continue;
                    }
                };
                self.remote
                    .delete_permission(id, &permission_id)
                    .await
                    .with_context(|| format!("unsharing {source} from {target}"))?;
            }
        }
        Ok(())
    }
}
