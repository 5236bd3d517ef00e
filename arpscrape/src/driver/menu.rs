//! Menu driver: walks the console menu and captures the diagnostic output.

use std::time::Instant;

use log::{debug, info, warn};

use super::capture::{Capture, MenuRun};
use super::script::{MenuScript, MenuState};
use crate::channel::{CancelToken, NullSink, OutputSink, PromptScanner, ScanConfig, StdoutSink};
use crate::error::{DriverError, Error, Result};
use crate::platform::DeviceProfile;
use crate::transport::{Connector, Session, Shell, SshConfig, SshConnector};

/// Driver that runs a device profile's navigation script.
///
/// The driver owns the session for the whole run:
/// - opens it through the [`Connector`]
/// - sends each step's input and waits for its marker
/// - closes it, also when a step fails
///
/// Transitions happen only on marker detection. Any deviation surfaces as an
/// error; nothing is retried.
pub struct MenuDriver<C: Connector = SshConnector> {
    /// Opens sessions.
    connector: C,

    /// SSH configuration.
    ssh_config: SshConfig,

    /// Device profile the script came from.
    profile: DeviceProfile,

    /// Navigation script.
    script: MenuScript,

    /// Prompt scanner shared by every step.
    scanner: PromptScanner,

    /// Where received chunks go in verbose mode.
    sink: Box<dyn OutputSink>,

    /// Whether chunks are streamed to the sink.
    verbose: bool,

    /// Current position in the state machine.
    state: MenuState,
}

impl<C: Connector> MenuDriver<C> {
    /// Create a driver running `profile`'s script.
    pub fn new(
        connector: C,
        ssh_config: SshConfig,
        profile: DeviceProfile,
        scan_config: ScanConfig,
    ) -> Self {
        let script = profile.script();
        Self {
            connector,
            ssh_config,
            profile,
            script,
            scanner: PromptScanner::new(scan_config),
            sink: Box::new(StdoutSink),
            verbose: false,
            state: MenuState::Disconnected,
        }
    }

    /// Replace the verbose-mode sink (stdout by default).
    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Abort pending waits when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.scanner = self.scanner.with_cancel(token);
        self
    }

    /// Stream received chunks to the sink.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Get the current state.
    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Get the device profile.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Get the navigation script.
    pub fn script(&self) -> &MenuScript {
        &self.script
    }

    /// Get the SSH configuration.
    pub fn ssh_config(&self) -> &SshConfig {
        &self.ssh_config
    }

    /// Run the script and return the text captured by its last step.
    pub async fn collect_raw_output(&mut self) -> Result<String> {
        self.run()
            .await?
            .into_final_output()
            .ok_or_else(|| DriverError::EmptyScript.into())
    }

    /// Run the script and return every step's capture.
    pub async fn run(&mut self) -> Result<MenuRun> {
        if self.script.is_empty() {
            return Err(DriverError::EmptyScript.into());
        }

        let start = Instant::now();
        info!(
            "connecting to {} as '{}' ({} profile)",
            self.ssh_config.socket_addr(),
            self.ssh_config.username,
            self.profile.name
        );

        let mut session = self.connector.open(&self.ssh_config).await?;
        self.transition(MenuState::Connected);

        let outcome = self.drive(&mut session).await;

        if let Err(e) = session.close().await {
            warn!("closing session to {} failed: {}", self.ssh_config.socket_addr(), e);
        }
        self.transition(MenuState::Disconnected);

        let captures = outcome?;
        let run = MenuRun::new(captures, start.elapsed());
        info!("menu script finished in {:?}", run.elapsed);
        Ok(run)
    }

    /// Walk the script on an open session.
    async fn drive(&mut self, session: &mut C::Session) -> Result<Vec<Capture>> {
        let mut shell = session.shell().await?;
        let mut captures = Vec::with_capacity(self.script.len());
        let mut quiet = NullSink;

        for (index, step) in self.script.steps().iter().enumerate() {
            let step_start = Instant::now();

            if let Some(input) = &step.input {
                debug!("step {}: sending {:?}", index, input);
                shell
                    .send(input.as_bytes())
                    .await
                    .map_err(|e| step_failed(index, self.state, e))?;
            }

            let sink: &mut dyn OutputSink = if self.verbose {
                &mut *self.sink
            } else {
                &mut quiet
            };

            let output = self
                .scanner
                .wait_for(&mut shell, &step.marker, sink)
                .await
                .map_err(|e| step_failed(index, self.state, e))?;

            self.state = step.reaches;
            debug!("step {}: reached {}", index, self.state);

            captures.push(Capture::new(
                step.input.clone(),
                step.marker.as_str(),
                step.reaches,
                output,
                step_start.elapsed(),
            ));
        }

        Ok(captures)
    }

    fn transition(&mut self, state: MenuState) {
        debug!("{} -> {}", self.state, state);
        self.state = state;
    }
}

fn step_failed(step: usize, state: MenuState, source: Error) -> Error {
    DriverError::StepFailed {
        step,
        state,
        source: Box::new(source),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use tokio_test::io::{Builder, Mock};

    use super::*;
    use crate::error::{ChannelError, TransportError};
    use crate::platform::pfsense;
    use crate::transport::StreamShell;

    struct OneShot {
        mock: std::sync::Mutex<Option<Mock>>,
        closed: Arc<AtomicBool>,
        refuse: bool,
        fail_close: bool,
    }

    struct OneShotSession {
        mock: Option<Mock>,
        closed: Arc<AtomicBool>,
        fail_close: bool,
    }

    impl Connector for OneShot {
        type Session = OneShotSession;

        async fn open(&self, _config: &SshConfig) -> Result<OneShotSession> {
            if self.refuse {
                return Err(TransportError::Disconnected.into());
            }
            let mock = self.mock.lock().unwrap().take();
            Ok(OneShotSession {
                mock,
                closed: self.closed.clone(),
                fail_close: self.fail_close,
            })
        }
    }

    impl Session for OneShotSession {
        type Shell = StreamShell<Mock>;

        async fn shell(&mut self) -> Result<StreamShell<Mock>> {
            self.mock
                .take()
                .map(StreamShell::new)
                .ok_or_else(|| ChannelError::ShellAlreadyTaken.into())
        }

        async fn close(self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            if self.fail_close {
                return Err(TransportError::Disconnected.into());
            }
            Ok(())
        }
    }

    fn driver(mock: Mock, refuse: bool) -> (MenuDriver<OneShot>, Arc<AtomicBool>) {
        driver_with(mock, refuse, false)
    }

    fn driver_with(
        mock: Mock,
        refuse: bool,
        fail_close: bool,
    ) -> (MenuDriver<OneShot>, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let connector = OneShot {
            mock: std::sync::Mutex::new(Some(mock)),
            closed: closed.clone(),
            refuse,
            fail_close,
        };
        let scan = ScanConfig {
            timeout: Duration::from_millis(50),
            ..ScanConfig::default()
        };
        let driver = MenuDriver::new(
            connector,
            SshConfig::new("127.0.0.1", "root"),
            pfsense::profile(pfsense::DEFAULT_SHELL_PROMPT),
            scan,
        );
        (driver, closed)
    }

    #[tokio::test]
    async fn test_session_closed_after_success() {
        let mock = Builder::new()
            .read(b"Enter an option: ")
            .write(b"8\n")
            .read(b"[root@pfSense.nrb.com]/root: ")
            .write(b"arp -a ; exit\n")
            .read(b"? (10.0.0.1) at 00:11:22:33:44:55 on em0\r\nEnter an option: ")
            .build();
        let (mut driver, closed) = driver(mock, false);

        let run = driver.run().await.unwrap();
        assert_eq!(run.captures.len(), 3);
        assert_eq!(run.captures[1].state, MenuState::AtShellPrompt);
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(driver.state(), MenuState::Disconnected);
    }

    #[tokio::test]
    async fn test_session_closed_after_failure() {
        // Device drops the connection instead of showing the shell prompt
        let mock = Builder::new()
            .read(b"Enter an option: ")
            .write(b"8\n")
            .read(b"*** Welcome ***\r\n")
            .build();
        let (mut driver, closed) = driver(mock, false);

        let err = driver.collect_raw_output().await.unwrap_err();
        match err {
            Error::Driver(DriverError::StepFailed { step, state, source }) => {
                assert_eq!(step, 1);
                assert_eq!(state, MenuState::AtTopMenu);
                assert!(matches!(*source, Error::Channel(ChannelError::Closed)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(driver.state(), MenuState::Disconnected);
    }

    #[tokio::test]
    async fn test_close_error_keeps_step_error() {
        let mock = Builder::new()
            .read(b"Enter an option: ")
            .write(b"8\n")
            .read(b"*** Welcome ***\r\n")
            .build();
        let (mut driver, closed) = driver_with(mock, false, true);

        let err = driver.collect_raw_output().await.unwrap_err();
        match err {
            Error::Driver(DriverError::StepFailed { step, source, .. }) => {
                assert_eq!(step, 1);
                assert!(matches!(*source, Error::Channel(ChannelError::Closed)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(driver.state(), MenuState::Disconnected);
    }

    #[tokio::test]
    async fn test_close_error_keeps_output() {
        let mock = Builder::new()
            .read(b"Enter an option: ")
            .write(b"8\n")
            .read(b"[root@pfSense.nrb.com]/root: ")
            .write(b"arp -a ; exit\n")
            .read(b"? (10.0.0.42) at 00:11:22:33:44:55 on em0\r\nEnter an option: ")
            .build();
        let (mut driver, closed) = driver_with(mock, false, true);

        let raw = driver.collect_raw_output().await.unwrap();
        assert_eq!(
            raw,
            "? (10.0.0.42) at 00:11:22:33:44:55 on em0\r\nEnter an option: "
        );
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_open_failure_is_transport_error() {
        let (mut driver, closed) = driver(Builder::new().build(), true);

        let err = driver.collect_raw_output().await.unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Disconnected)));
        assert_eq!(err.exit_code(), crate::error::EXIT_SESSION_FAILURE);
        assert!(!closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_verbose_streams_to_sink() {
        let mock = Builder::new()
            .read(b"Enter an option: ")
            .write(b"8\n")
            .read(b"pfSense.nrb.com: ")
            .write(b"arp -a ; exit\n")
            .read(b"Enter an option: ")
            .build();
        let (driver, _) = driver(mock, false);
        let sink = crate::channel::CaptureSink::new();
        let mut driver = driver.with_sink(sink.clone()).with_verbose(true);

        driver.collect_raw_output().await.unwrap();
        assert_eq!(
            sink.chunks(),
            vec!["Enter an option: ", "pfSense.nrb.com: ", "Enter an option: "]
        );
    }
}
