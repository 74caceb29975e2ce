use super::types::{BackendError, BackendResult, CommandBackend, CommandSpec, ResponseEvent, Scope};
use crate::inventory::Device;
use crate::secret::SecretString;
use russh::client;
use russh::keys::PublicKey;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Connection parameters shared by every device in the fleet
#[derive(Debug, Clone)]
pub struct SshSettings {
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub connect_timeout: Duration,
}

struct Client;

impl client::Handler for Client {
    type Error = russh::Error;

    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        // Network gear ships with self-generated host keys; accept them
        let _ = server_public_key;
        async { Ok(true) }
    }
}

/// Result of one remote command
#[derive(Debug, Default)]
struct ExecOutput {
    stdout: String,
    stderr: String,
    exit_status: Option<u32>,
}

impl ExecOutput {
    fn succeeded(&self) -> bool {
        self.exit_status.map_or(true, |status| status == 0)
    }
}

/// One authenticated SSH session to a device
struct SshSession {
    handle: client::Handle<Client>,
}

impl SshSession {
    async fn connect(device: &Device, settings: &SshSettings) -> BackendResult<Self> {
        let config = Arc::new(client::Config::default());

        tracing::debug!(
            "Connecting to {}:{} as {}",
            device,
            settings.port,
            settings.username
        );

        let connect = client::connect(config, (device.as_str(), settings.port), Client);
        let mut handle = match timeout(settings.connect_timeout, connect).await {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => {
                return Err(BackendError::ConnectionFailed {
                    device: device.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => return Err(BackendError::Timeout),
        };

        let auth = handle
            .authenticate_password(settings.username.as_str(), settings.password.expose())
            .await
            .map_err(|e| BackendError::ConnectionFailed {
                device: device.to_string(),
                reason: e.to_string(),
            })?;

        if !auth.success() {
            return Err(BackendError::AuthenticationFailed(device.to_string()));
        }

        tracing::debug!("SSH authentication to {} successful", device);

        Ok(Self { handle })
    }

    async fn exec(&mut self, command: &str) -> BackendResult<ExecOutput> {
        tracing::debug!("Executing SSH command: {}", command);

        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| BackendError::CommandFailed(e.to_string()))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| BackendError::CommandFailed(e.to_string()))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_status = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                russh::ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                russh::ChannelMsg::ExtendedData { ref data, ext: 1 } => {
                    stderr.extend_from_slice(data)
                }
                russh::ChannelMsg::ExitStatus { exit_status: status } => {
                    exit_status = Some(status);
                }
                // Exit status may follow EOF, so only stop on close
                russh::ChannelMsg::Close => break,
                _ => {}
            }
        }

        // Some devices close the channel themselves after exec
        if let Err(e) = channel.close().await {
            tracing::debug!("Error closing SSH channel: {}", e);
        }

        let output = ExecOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_status,
        };

        tracing::debug!(
            "Command output: {} bytes, {} lines, exit status {:?}",
            output.stdout.len(),
            output.stdout.lines().count(),
            output.exit_status
        );

        Ok(output)
    }

    async fn close(self) -> BackendResult<()> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await?;
        Ok(())
    }
}

/// Runs commands on devices over SSH, one session per device per call.
pub struct SshBackend {
    settings: SshSettings,
}

impl SshBackend {
    pub fn new(settings: SshSettings) -> Self {
        Self { settings }
    }

    async fn run_on_device(
        &self,
        device: &Device,
        spec: &CommandSpec,
        events: &mut Vec<ResponseEvent>,
    ) -> BackendResult<()> {
        events.push(ResponseEvent::started(device));

        let mut session = SshSession::connect(device, &self.settings).await?;

        for (item, command) in spec.expand() {
            let output = session.exec(&command).await?;
            if output.succeeded() {
                events.push(ResponseEvent::output(device, item, &output.stdout));
            } else {
                tracing::warn!(
                    "Command {:?} failed on {} (exit status {:?}): {}",
                    command,
                    device,
                    output.exit_status,
                    output.stderr.trim()
                );
                events.push(ResponseEvent::failed(device, item));
            }
        }

        if let Err(e) = session.close().await {
            tracing::debug!("Error closing SSH session to {}: {}", device, e);
        }

        Ok(())
    }
}

impl CommandBackend for SshBackend {
    async fn execute(
        &mut self,
        scope: &Scope,
        spec: &CommandSpec,
    ) -> BackendResult<Vec<ResponseEvent>> {
        let mut events = Vec::new();
        for device in scope.devices() {
            self.run_on_device(device, spec, &mut events).await?;
        }
        Ok(events)
    }
}
