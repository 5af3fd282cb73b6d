//! Library-mediated SSH sessions over `ssh2`.
//!
//! All libssh2 calls block, so the whole session runs inside
//! `tokio::task::spawn_blocking`.

use std::io::{BufRead, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use ssh2::{Channel, Session};

use crate::application::ports::{RemoteSession, SessionEvents};
use crate::domain::{CommandOutput, SessionError, SessionTarget};

pub const SSH_PORT: u16 = 22;
pub const SSH_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Command run in `Command` mode when none is given.
pub const DEFAULT_COMMAND: &str = "whoami";

/// Pause between sending a line and collecting what the shell printed.
const OUTPUT_SETTLE: Duration = Duration::from_millis(300);

/// What to do once authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Run one command and print its output.
    Command(String),
    /// Line-driven shell until the exit keyword or EOF.
    Interactive,
}

pub struct LibSshSession {
    mode: SessionMode,
    exit_keyword: String,
    port: u16,
    connect_timeout: Duration,
}

impl LibSshSession {
    #[must_use]
    pub fn new(mode: SessionMode, exit_keyword: impl Into<String>) -> Self {
        Self {
            mode,
            exit_keyword: exit_keyword.into(),
            port: SSH_PORT,
            connect_timeout: SSH_CONNECT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl RemoteSession for LibSshSession {
    async fn open(
        &self,
        target: &SessionTarget,
        events: &impl SessionEvents,
    ) -> Result<(), SessionError> {
        let target = target.clone();
        let mode = self.mode.clone();
        let exit_keyword = self.exit_keyword.clone();
        let port = self.port;
        let timeout = self.connect_timeout;

        let output = tokio::task::spawn_blocking(move || {
            let session = connect(&target, port, timeout)?;
            tracing::info!(host = %target.host, user = %target.username, "authenticated");
            match mode {
                SessionMode::Command(cmd) => run_command(&session, &cmd).map(Some),
                SessionMode::Interactive => run_interactive(&session, &exit_keyword).map(|()| None),
            }
        })
        .await
        .map_err(|e| SessionError::Execution(format!("session task failed: {e}")))??;

        if let Some(output) = output {
            events.command_finished(&output);
        }
        Ok(())
    }
}

fn connect(target: &SessionTarget, port: u16, timeout: Duration) -> Result<Session, SessionError> {
    let address = format!("{}:{port}", target.host);
    let socket = address
        .to_socket_addrs()
        .map_err(|e| SessionError::Connection(format!("cannot resolve {address}: {e}")))?
        .next()
        .ok_or_else(|| SessionError::Connection(format!("no address for {address}")))?;

    let tcp = TcpStream::connect_timeout(&socket, timeout)
        .map_err(|e| SessionError::Connection(format!("{address}: {e}")))?;

    let mut session = Session::new()
        .map_err(|e| SessionError::Connection(format!("cannot initialise session: {e}")))?;
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| SessionError::Connection(format!("handshake with {address} failed: {e}")))?;

    session
        .userauth_pubkey_file(&target.username, None, &target.key_path, None)
        .map_err(|e| SessionError::Authentication(e.to_string()))?;
    if !session.authenticated() {
        return Err(SessionError::Authentication(
            "key rejected by the server".to_string(),
        ));
    }
    Ok(session)
}

fn execution(e: impl std::fmt::Display) -> SessionError {
    SessionError::Execution(e.to_string())
}

fn run_command(session: &Session, command: &str) -> Result<CommandOutput, SessionError> {
    let mut channel = session.channel_session().map_err(execution)?;
    channel.exec(command).map_err(execution)?;

    let mut stdout = String::new();
    channel.read_to_string(&mut stdout).map_err(execution)?;
    let mut stderr = String::new();
    channel
        .stderr()
        .read_to_string(&mut stderr)
        .map_err(execution)?;
    channel.wait_close().map_err(execution)?;

    let exit_status = channel.exit_status().map_err(execution)?;
    tracing::debug!(command, exit_status, "remote command finished");
    Ok(CommandOutput {
        command: command.to_string(),
        stdout: stdout.trim_end().to_string(),
        stderr: stderr.trim_end().to_string(),
        exit_status,
    })
}

fn run_interactive(session: &Session, exit_keyword: &str) -> Result<(), SessionError> {
    let mut channel = session.channel_session().map_err(execution)?;
    channel
        .request_pty("xterm", None, None)
        .map_err(execution)?;
    channel.shell().map_err(execution)?;

    let mut out = std::io::stdout();
    std::thread::sleep(OUTPUT_SETTLE);
    drain(session, &mut channel, &mut out)?;

    for line in std::io::stdin().lock().lines() {
        let line = line.map_err(execution)?;
        if line.trim() == exit_keyword {
            break;
        }
        channel
            .write_all(format!("{line}\n").as_bytes())
            .and_then(|()| channel.flush())
            .map_err(execution)?;
        std::thread::sleep(OUTPUT_SETTLE);
        drain(session, &mut channel, &mut out)?;
        if channel.eof() {
            break;
        }
    }

    let _ = channel.send_eof();
    let _ = channel.close();
    Ok(())
}

/// Copy whatever the channel has buffered to `out` without waiting for more.
fn drain(
    session: &Session,
    channel: &mut Channel,
    out: &mut impl Write,
) -> Result<(), SessionError> {
    session.set_blocking(false);
    let mut buf = [0u8; 4096];
    let result = loop {
        match channel.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => {
                if let Err(e) = out.write_all(&buf[..n]) {
                    break Err(e);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    session.set_blocking(true);
    result.and_then(|()| out.flush()).map_err(execution)
}
