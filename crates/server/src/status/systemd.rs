use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, trace};

use super::{StatusError, StatusProvider};

/// Status provider backed by the system manager's `systemctl` tool.
#[derive(Debug, Clone)]
pub struct SystemdStatus {
    systemctl: PathBuf,
}

impl SystemdStatus {
    /// Checks that the system manager answers over its bus by reading the
    /// manager's own `Version` property.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Connect`] when the manager can't be reached
    /// or reports no version.
    pub async fn connect(systemctl: impl Into<PathBuf>) -> Result<Self, StatusError> {
        let systemctl = systemctl.into();
        let output = Command::new(&systemctl)
            .args(["show", "--property=Version", "--value"])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(StatusError::connect)?;

        if !output.status.success() {
            return Err(StatusError::connect(failure_reason(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout.trim();
        if version.is_empty() {
            return Err(StatusError::connect("system manager reported no version"));
        }
        info!(systemctl = %systemctl.display(), version, "connected to system manager");

        Ok(Self { systemctl })
    }
}

#[async_trait]
impl StatusProvider for SystemdStatus {
    async fn is_service_active(&self, name: &str) -> Result<bool, StatusError> {
        validate_unit_name(name)?;
        let unit = format!("{name}.service");

        trace!(unit = %unit, "querying active state");
        let output = Command::new(&self.systemctl)
            .args(["show", "--property=ActiveState", "--value"])
            .arg(&unit)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| StatusError::query(&unit, e))?;

        if !output.status.success() {
            return Err(StatusError::query(&unit, failure_reason(&output)));
        }

        let active = is_active(&output.stdout);
        debug!(unit = %unit, active, "queried active state");
        Ok(active)
    }

    /// Every query runs its own `systemctl` process, so no connection
    /// outlives a request and there is nothing to release here.
    async fn disconnect(&self) {
        debug!("disconnected from system manager");
    }
}

/// `ActiveState` is `active` only while the unit runs; `activating`,
/// `reloading` and the rest all count as not running.
fn is_active(stdout: &[u8]) -> bool {
    String::from_utf8_lossy(stdout).trim() == "active"
}

fn validate_unit_name(name: &str) -> Result<(), StatusError> {
    let invalid = name.is_empty() || name.starts_with('-') || name.chars().any(|c| c == '/' || c.is_whitespace() || c.is_control());

    if invalid {
        return Err(StatusError::InvalidUnitName { name: name.to_owned() });
    }
    Ok(())
}

fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.trim() {
        "" => output.status.to_string(),
        message => message.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_state() {
        assert!(is_active(b"active\n"));
        assert!(is_active(b"active"));
        assert!(!is_active(b"inactive\n"));
        assert!(!is_active(b"activating\n"));
        assert!(!is_active(b"failed\n"));
        assert!(!is_active(b""));
    }

    #[test]
    fn unit_names() {
        for name in ["findseed", "gameserver01", "postgresql", "user@1000", "a.b_c-d"] {
            assert!(validate_unit_name(name).is_ok(), "{name}");
        }

        for name in ["", "-H", "../etc", "a b", "a\tb", "a\nb", "x\u{7f}"] {
            assert!(matches!(validate_unit_name(name), Err(StatusError::InvalidUnitName { .. })), "{name:?}");
        }
    }

    #[tokio::test]
    async fn connect_fails_without_tool() {
        let result = SystemdStatus::connect("/nonexistent/systemctl").await;
        assert!(matches!(result, Err(StatusError::Connect { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn connect_fails_when_manager_is_unreachable() {
        // exits non-zero like `systemctl` on a host not booted with systemd
        let result = SystemdStatus::connect("false").await;
        assert!(matches!(result, Err(StatusError::Connect { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn connect_requires_a_manager_version() {
        // succeeds on anything but never prints the manager version
        let result = SystemdStatus::connect("true").await;
        assert!(matches!(result, Err(StatusError::Connect { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn connect_accepts_a_reported_version() {
        // `echo` stands in for a manager that answers the property query
        let status = SystemdStatus::connect("echo").await.unwrap();
        assert_eq!(status.systemctl, PathBuf::from("echo"));
    }

    #[tokio::test]
    async fn invalid_name_is_rejected_before_spawning() {
        let status = SystemdStatus { systemctl: PathBuf::from("/nonexistent/systemctl") };
        let result = status.is_service_active("-H").await;
        assert!(matches!(result, Err(StatusError::InvalidUnitName { .. })));
    }

    #[tokio::test]
    async fn spawn_failure_is_a_query_error() {
        let status = SystemdStatus { systemctl: PathBuf::from("/nonexistent/systemctl") };
        match status.is_service_active("lobby").await {
            Err(StatusError::Query { unit, .. }) => assert_eq!(unit, "lobby.service"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unsuccessful_exit_is_a_query_error() {
        let status = SystemdStatus { systemctl: PathBuf::from("false") };
        assert!(matches!(status.is_service_active("tino").await, Err(StatusError::Query { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unexpected_output_is_inactive() {
        // `echo` prints its arguments back, which is never `active`
        let status = SystemdStatus { systemctl: PathBuf::from("echo") };
        assert!(!status.is_service_active("qotd").await.unwrap());
    }
}
