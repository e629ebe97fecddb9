// Admin credential lookup
use crate::infrastructure::config::{CredentialSettings, GrafanaSettings};
use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    /// Set in configuration or the environment
    Configured,
    /// Read from the cluster secret
    Secret,
    /// Secret lookup failed
    Fallback,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub user: String,
    pub password: String,
    pub origin: CredentialOrigin,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("origin", &self.origin)
            .finish()
    }
}

pub async fn resolve_admin_credentials(grafana: &GrafanaSettings, settings: &CredentialSettings) -> AdminCredentials {
    let (password, origin) = match &grafana.admin_password {
        Some(password) => (password.clone(), CredentialOrigin::Configured),
        None => match read_cluster_secret(settings).await {
            Ok(password) => (password, CredentialOrigin::Secret),
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(
                    secret = %settings.secret_name,
                    namespace = %settings.namespace,
                    error = %reason,
                    "admin secret unavailable, using fallback password"
                );
                (settings.fallback_password.clone(), CredentialOrigin::Fallback)
            }
        },
    };

    tracing::info!(user = %grafana.admin_user, ?origin, "resolved admin credentials");
    AdminCredentials {
        user: grafana.admin_user.clone(),
        password,
        origin,
    }
}

async fn read_cluster_secret(settings: &CredentialSettings) -> anyhow::Result<String> {
    let jsonpath = format!("jsonpath={{.data.{}}}", settings.secret_key);
    let output = Command::new("kubectl")
        .args([
            "get",
            "secret",
            "-n",
            settings.namespace.as_str(),
            settings.secret_name.as_str(),
            "-o",
            jsonpath.as_str(),
        ])
        .output()
        .await
        .context("failed to run kubectl")?;

    if !output.status.success() {
        bail!(
            "kubectl exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    decode_secret_value(&String::from_utf8_lossy(&output.stdout))
}

/// Secret data values are base64 encoded
pub fn decode_secret_value(encoded: &str) -> anyhow::Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .context("secret value is not valid base64")?;
    let value = String::from_utf8(bytes).context("secret value is not UTF-8")?;
    let value = value.trim();
    if value.is_empty() {
        bail!("secret value is empty");
    }
    Ok(value.to_string())
}
