//! Process-mediated SSH sessions through the system `ssh` and `scp`.

use crate::application::ports::{CommandRunner, RemoteSession, SessionEvents};
use crate::domain::{RelayHop, SessionError, SessionTarget};
use crate::infra::keys::restrict_to_owner;

/// Exit status `ssh` reserves for its own failures.
const SSH_ERROR_STATUS: i32 = 255;

/// Opens an interactive `ssh` with inherited stdio, optionally copying the
/// key to the host first so the user can hop to a private relay host.
pub struct SystemSshSession<R: CommandRunner> {
    runner: R,
    relay_key_name: String,
}

impl<R: CommandRunner> SystemSshSession<R> {
    pub fn new(runner: R, relay_key_name: impl Into<String>) -> Self {
        Self {
            runner,
            relay_key_name: relay_key_name.into(),
        }
    }

    async fn copy_key_to_host(&self, target: &SessionTarget, key: &str) -> Result<(), SessionError> {
        let destination = format!(
            "{}@{}:~/.ssh/{}",
            target.username, target.host, self.relay_key_name
        );
        let output = self
            .runner
            .run(
                "scp",
                &["-i", key, "-o", "StrictHostKeyChecking=no", key, &destination],
            )
            .await
            .map_err(|e| SessionError::Relay(format!("{e:#}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SessionError::Relay(stderr.trim().to_string()));
        }
        Ok(())
    }
}

impl<R: CommandRunner> RemoteSession for SystemSshSession<R> {
    async fn open(
        &self,
        target: &SessionTarget,
        events: &impl SessionEvents,
    ) -> Result<(), SessionError> {
        restrict_to_owner(&target.key_path).map_err(|e| SessionError::Connection(format!("{e:#}")))?;
        let key = target.key_path.to_string_lossy();
        let login = format!("{}@{}", target.username, target.host);

        if let Some(relay) = &target.relay_host {
            self.copy_key_to_host(target, &key).await?;
            tracing::info!(host = %target.host, relay = %relay, "key copied for relay hop");
            let remote_key_path = format!("~/.ssh/{}", self.relay_key_name);
            events.relay_ready(&RelayHop {
                host: target.host.clone(),
                relay_host: relay.clone(),
                hop_command: format!("ssh -i {remote_key_path} {}@{relay}", target.username),
                remote_key_path,
            });
        }

        let status = self
            .runner
            .run_status("ssh", &["-i", &key, "-o", "StrictHostKeyChecking=no", &login])
            .await
            .map_err(|e| SessionError::Connection(format!("{e:#}")))?;

        match status.code() {
            Some(0) => Ok(()),
            Some(SSH_ERROR_STATUS) => Err(SessionError::Connection(format!(
                "ssh to {login} failed; check that the key is authorised and the host is reachable"
            ))),
            Some(code) => Err(SessionError::Execution(format!(
                "remote shell exited with status {code}"
            ))),
            None => Err(SessionError::Execution(
                "ssh terminated by a signal".to_string(),
            )),
        }
    }
}
