//! End-to-end: simulated pfSense console through extraction and storage.

use std::sync::Mutex;
use std::time::Duration;

use tokio_test::io::{Builder, Mock};

use arpscrape::error::{ChannelError, DriverError};
use arpscrape::store::{MemoryStore, RecordStore};
use arpscrape::transport::{Connector, Session, SshConfig, StreamShell};
use arpscrape::{Error, MenuDriver, MenuDriverBuilder, MenuState, cancel_pair, extract};

const MENU: &[u8] = b"\r\n 0) Logout (SSH only)                  9) pfTop\r\n \
8) Shell                              16) Restart PHP-FPM\r\n\r\nEnter an option: ";

const SHELL: &[u8] = b"8\r\n\r\n[2.4.5-RELEASE][root@pfSense.nrb.com]/root: ";

const TABLE: &[u8] = b"arp -a ; exit\r\n\
? (192.168.1.1) at 00:0c:29:aa:bb:01 on em1 permanent [ethernet]\r\n\
? (192.168.1.20) at 00:1b:21:3a:4f:10 on em1 expires in 1185 seconds [ethernet]\r\n\
? 192.168.1.77 garbage line\r\n\
? (192.168.1.105) at 3c:22:fb:11:22:33 on em1 expires in 402 seconds [ethernet]\r\n\
exit\r\n\r\n 8) Shell\r\n\r\nEnter an option: ";

/// Hands out one scripted stream as the session's shell.
struct ScriptedConsole {
    stream: Mutex<Option<Mock>>,
}

struct ScriptedSession {
    stream: Option<Mock>,
}

impl ScriptedConsole {
    fn new(stream: Mock) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
        }
    }
}

impl Connector for ScriptedConsole {
    type Session = ScriptedSession;

    async fn open(&self, _config: &SshConfig) -> Result<ScriptedSession, Error> {
        let stream = self.stream.lock().unwrap().take();
        Ok(ScriptedSession { stream })
    }
}

impl Session for ScriptedSession {
    type Shell = StreamShell<Mock>;

    async fn shell(&mut self) -> Result<StreamShell<Mock>, Error> {
        self.stream
            .take()
            .map(StreamShell::new)
            .ok_or_else(|| ChannelError::ShellAlreadyTaken.into())
    }

    async fn close(self) -> Result<(), Error> {
        Ok(())
    }
}

fn driver(stream: Mock) -> MenuDriver<ScriptedConsole> {
    MenuDriverBuilder::new("192.168.1.1")
        .username("root")
        .timeout(Duration::from_millis(200))
        .build_with(ScriptedConsole::new(stream))
        .unwrap()
}

#[tokio::test]
async fn sends_two_commands_and_returns_final_capture() {
    // The mock fails the test on any write other than these, in this order
    let stream = Builder::new()
        .read(MENU)
        .write(b"8\n")
        .read(SHELL)
        .write(b"arp -a ; exit\n")
        .read(TABLE)
        .build();
    let mut driver = driver(stream);

    let raw = driver.collect_raw_output().await.unwrap();
    assert_eq!(raw.as_bytes(), TABLE);
    assert_eq!(driver.state(), MenuState::Disconnected);
}

#[tokio::test]
async fn run_reports_every_step() {
    let stream = Builder::new()
        .read(MENU)
        .write(b"8\n")
        .read(SHELL)
        .write(b"arp -a ; exit\n")
        .read(TABLE)
        .build();
    let mut driver = driver(stream);

    let run = driver.run().await.unwrap();
    let states: Vec<_> = run.captures.iter().map(|c| c.state).collect();
    assert_eq!(
        states,
        vec![
            MenuState::AtTopMenu,
            MenuState::AtShellPrompt,
            MenuState::AtTopMenuFinal
        ]
    );
    assert_eq!(run.inputs().collect::<Vec<_>>(), vec!["8\n", "arp -a ; exit\n"]);
}

#[tokio::test]
async fn collected_table_is_extracted_and_stored() {
    let stream = Builder::new()
        .read(MENU)
        .write(b"8\n")
        .read(SHELL)
        .write(b"arp -a ; exit\n")
        .read(TABLE)
        .build();
    let mut driver = driver(stream);

    let raw = driver.collect_raw_output().await.unwrap();
    let extraction = extract::parse(&raw);

    assert_eq!(extraction.len(), 3);
    assert_eq!(extraction.skipped_count(), 1);

    let mut store = MemoryStore::new();
    store.upsert(&extraction.records).unwrap();
    let keys: Vec<_> = store.all().into_iter().map(|r| r.order_key).collect();
    assert_eq!(keys, vec!["001", "020", "105"]);
}

#[tokio::test]
async fn missing_shell_prompt_times_out() {
    let stream = Builder::new()
        .read(MENU)
        .write(b"8\n")
        .read(b"8\r\n\r\n[2.4.5-RELEASE][root@other.host]/root: ")
        .wait(Duration::from_secs(30))
        .build();
    let mut driver = driver(stream);

    let err = driver.collect_raw_output().await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
    match err {
        Error::Driver(DriverError::StepFailed { step, source, .. }) => {
            assert_eq!(step, 1);
            assert!(matches!(
                *source,
                Error::Channel(ChannelError::PromptNotObserved { .. })
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(driver.state(), MenuState::Disconnected);
}

#[tokio::test]
async fn cancelled_before_start() {
    let (handle, token) = cancel_pair();
    handle.cancel();

    let mut driver = MenuDriverBuilder::new("192.168.1.1")
        .username("root")
        .cancel_token(token)
        .build_with(ScriptedConsole::new(Builder::new().build()))
        .unwrap();

    let err = driver.collect_raw_output().await.unwrap_err();
    match err {
        Error::Driver(DriverError::StepFailed { step, source, .. }) => {
            assert_eq!(step, 0);
            assert!(matches!(*source, Error::Channel(ChannelError::Cancelled { .. })));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
