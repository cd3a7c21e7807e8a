use anyhow::Context;
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Identité de l'utilisateur à l'origine des actions journalisées.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    pub user: String,
}

impl AuditContext {
    pub fn new<S: Into<String>>(user: S) -> Self {
        Self { user: user.into() }
    }
}

impl Default for AuditContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

/// Journal d'audit : une ligne par action, en ajout.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    /// Journal qui n'écrit que via `tracing`.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn to_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, ctx: &AuditContext, action: &str) -> anyhow::Result<()> {
        self.record_at(ctx, action, Local::now())
    }

    pub fn record_at(
        &self,
        ctx: &AuditContext,
        action: &str,
        at: DateTime<Local>,
    ) -> anyhow::Result<()> {
        info!(user = %ctx.user, action, "audit");
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening audit log {}", path.display()))?;
        writeln!(file, "{}", format_entry(ctx, action, at))
            .with_context(|| format!("writing audit log {}", path.display()))?;
        Ok(())
    }
}

/// `<horodatage> - User: <user> - <action>`
pub fn format_entry(ctx: &AuditContext, action: &str, at: DateTime<Local>) -> String {
    format!("{} - User: {} - {}", at.to_rfc3339(), ctx.user, action)
}
