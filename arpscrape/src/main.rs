//! `arpscrape`: collect the pfSense ARP table and upsert it into a store.
//!
//! Exit status: 0 on success, 3 when the device session fails, 4 when the
//! store cannot be written. Usage errors exit with 2.
//!
//! # Usage
//!
//! ```bash
//! SSH_ADDRESS=192.168.1.1 SSH_USER=admin arpscrape --database arp.json
//! RUST_LOG=debug arpscrape --address 192.168.1.1 --password secret -v --dry-run --json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::{error, info, warn};

use arpscrape::store::{JsonFileStore, RecordStore};
use arpscrape::transport::{AuthMethod, HostKeyVerification};
use arpscrape::{Error, MenuDriverBuilder, cancel_pair, extract};

#[derive(Parser, Debug)]
#[command(version, about = "Collect the ARP table from a pfSense console over SSH")]
struct Args {
    /// Router address
    #[arg(long, env = "SSH_ADDRESS", default_value = "127.0.0.1")]
    address: String,

    /// SSH port
    #[arg(long, env = "SSH_PORT", default_value_t = 22)]
    port: u16,

    /// SSH user
    #[arg(long, env = "SSH_USER", default_value = "root")]
    user: String,

    /// Password (otherwise a private key is used)
    #[arg(long, env = "SSH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Private key; defaults to the first of ~/.ssh/id_ed25519, id_ecdsa, id_rsa
    #[arg(long, env = "SSH_KEY")]
    key: Option<PathBuf>,

    /// Passphrase for the private key
    #[arg(long, env = "SSH_KEY_PASSPHRASE", hide_env_values = true)]
    key_passphrase: Option<String>,

    /// known_hosts file holding the router's host key
    #[arg(long, env = "SSH_KNOWN_HOSTS")]
    known_hosts: Option<PathBuf>,

    /// Host key checking
    #[arg(long, value_enum, default_value_t = HostKeyMode::Strict)]
    host_key: HostKeyMode,

    /// Text identifying the router's shell prompt, usually its hostname
    #[arg(long, env = "SSH_SHELL_PROMPT", default_value = arpscrape::platform::pfsense::DEFAULT_SHELL_PROMPT)]
    shell_prompt: String,

    /// Seconds to wait for the connection and for each prompt
    #[arg(long, env = "SSH_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Record store
    #[arg(long, env = "DATABASE", default_value = "arp.json")]
    database: PathBuf,

    /// Echo everything the router sends
    #[arg(short, long)]
    verbose: bool,

    /// Do not write the store
    #[arg(long)]
    dry_run: bool,

    /// Print the collected records as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HostKeyMode {
    /// Host must already be in known_hosts
    Strict,
    /// Learn unknown hosts, reject changed keys
    AcceptNew,
    /// No checking (lab use)
    Off,
}

impl From<HostKeyMode> for HostKeyVerification {
    fn from(mode: HostKeyMode) -> Self {
        match mode {
            HostKeyMode::Strict => HostKeyVerification::Strict,
            HostKeyMode::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyMode::Off => HostKeyVerification::Disabled,
        }
    }
}

impl Args {
    fn auth(&self) -> AuthMethod {
        if let Some(password) = &self.password {
            return AuthMethod::Password(password.clone().into());
        }
        if let Some(path) = &self.key {
            return AuthMethod::PrivateKey {
                path: path.clone(),
                passphrase: None,
            };
        }
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".ssh"))
            .and_then(|dir| AuthMethod::discover_key(&dir))
            .unwrap_or_else(|| {
                warn!("no password or private key found, trying without authentication");
                AuthMethod::None
            })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let (cancel, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, abandoning session");
            cancel.cancel();
        }
    });

    let builder = MenuDriverBuilder::new(&args.address)
        .port(args.port)
        .username(&args.user);
    let mut builder = match (args.auth(), &args.key_passphrase) {
        (AuthMethod::PrivateKey { path, .. }, Some(passphrase)) => {
            builder.private_key_with_passphrase(path, passphrase.as_str())
        }
        (auth, _) => builder.auth(auth),
    };
    builder = builder
        .host_key_verification(args.host_key.into())
        .timeout(Duration::from_secs(args.timeout))
        .shell_marker(&args.shell_prompt)
        .verbose(args.verbose)
        .cancel_token(token);
    if let Some(path) = &args.known_hosts {
        builder = builder.known_hosts(path);
    }
    let mut driver = builder.build()?;

    let raw = driver.collect_raw_output().await?;
    let extraction = extract::parse(&raw);
    info!(
        "collected {} addresses ({} lines skipped)",
        extraction.len(),
        extraction.skipped_count()
    );
    for skipped in &extraction.skipped {
        warn!("skipped {:?}: {}", skipped.line, skipped.reason);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&extraction.sorted())
            .map_err(arpscrape::error::StoreError::from)?;
        println!("{json}");
    }

    if args.dry_run {
        info!("dry run, store not written");
        return Ok(());
    }

    let mut store = JsonFileStore::open(&args.database)?;
    let written = store.upsert(&extraction.records)?;
    info!(
        "wrote {} records to {} ({} total)",
        written,
        store.path().display(),
        store.len()
    );
    Ok(())
}
