//! bedgate: handshake envelope tooling
//!
//! Commands:
//!   keygen              - generate key files for the active codec
//!   encode              - build a handshake hostname carrying an identity payload
//!   decode <hostname>   - decode the payload from a hostname, print it as JSON
//!   version <text>      - print the envelope version declared by a string
//!   config show         - display current configuration
//!
//! Hostnames separate their components with NUL, which can't be passed as a
//! command-line argument; `encode` prints and `decode` accepts `\0` instead.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bedgate_core::{BedgateConfig, CodecKind, LogFormat};
use bedgate_crypto::{format, keys, FormatCodec};
use bedgate_handshake::{
    build_hostname, separate_hostname, BedrockData, Clock, DataSeeker, DeviceOs, InputMode,
    SeekResult, SystemClock, UiProfile,
};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "bedgate",
    version,
    about = "Bedrock handshake envelope tooling",
    long_about = "bedgate: generate keys for, build, and inspect the identity envelope carried in the Java handshake hostname"
)]
struct Cli {
    /// Path to bedgate.toml configuration file
    #[arg(long, short = 'c', env = "BEDGATE_CONFIG", default_value = "bedgate.toml")]
    config: PathBuf,

    /// Data codec (overrides crypto.codec): aes, ed25519 or rsa
    #[arg(long, global = true, env = "BEDGATE_CODEC")]
    codec: Option<CodecKind>,

    /// Key directory (overrides crypto.key_dir)
    #[arg(long, global = true, visible_alias = "dir", env = "BEDGATE_KEY_DIR")]
    key_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate key files for the active codec
    Keygen {
        /// Replace existing key files
        #[arg(long)]
        force: bool,
    },

    /// Build a handshake hostname carrying an identity payload
    Encode {
        /// Bedrock username
        #[arg(long)]
        username: String,
        /// Xbox user id
        #[arg(long)]
        xuid: u64,
        /// Hostname the player connected to
        #[arg(long, default_value = "localhost")]
        hostname: String,
        /// Client address
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,
        /// Bedrock game version
        #[arg(long = "game-version", default_value = "1.21.30")]
        game_version: String,
        #[arg(long, default_value = "en_US")]
        language: String,
        /// Device OS id (0-14)
        #[arg(long, default_value_t = 0)]
        device_os: i32,
        /// UI profile id (0 classic, 1 pocket)
        #[arg(long, default_value_t = 0)]
        ui_profile: i32,
        /// Input mode id (0-4)
        #[arg(long, default_value_t = 0)]
        input_mode: i32,
        /// Issue timestamp in Unix milliseconds (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
        /// Mark the payload as produced by a proxy
        #[arg(long)]
        from_proxy: bool,
    },

    /// Decode the identity payload from a hostname and print it as JSON
    Decode {
        /// The hostname, with `\0` between components
        hostname: String,
        /// Also apply the timestamp and replay checks a server would
        #[arg(long)]
        check: bool,
    },

    /// Print the envelope version declared by a string (-1 if none)
    Version { text: String },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = BedgateConfig::load(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;
    if let Some(codec) = cli.codec {
        config.crypto.codec = codec;
    }
    if let Some(dir) = cli.key_dir {
        config.crypto.key_dir = dir;
    }

    init_logging(&config.logging.level, config.logging.format);

    match cli.command {
        Commands::Keygen { force } => cmd_keygen(&config, force),
        Commands::Encode {
            username,
            xuid,
            hostname,
            ip,
            game_version,
            language,
            device_os,
            ui_profile,
            input_mode,
            timestamp,
            from_proxy,
        } => {
            let data = BedrockData {
                version: game_version,
                username,
                xuid,
                device_os: DeviceOs::from_id(device_os),
                language_code: language,
                ui_profile: UiProfile::from_id(ui_profile),
                input_mode: InputMode::from_id(input_mode),
                ip,
                linked_player: None,
                from_proxy,
                subscribe_id: 0,
                verify_code: "0".into(),
                timestamp: timestamp.unwrap_or_else(|| SystemClock.now_millis()),
            };
            cmd_encode(&config, &hostname, &data)
        }
        Commands::Decode { hostname, check } => cmd_decode(&config, &hostname, check),
        Commands::Version { text } => {
            println!("{}", format::version(&unescape_nul(&text)));
            Ok(())
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // stdout is for command output
    let layer = fmt::layer().with_writer(std::io::stderr);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
    }
}

fn load_codec(config: &BedgateConfig) -> Result<FormatCodec> {
    let crypto = &config.crypto;
    FormatCodec::from_key_dir(crypto.codec, &crypto.key_dir, false).with_context(|| {
        format!(
            "loading {} keys from {} (run `bedgate keygen` first?)",
            crypto.codec,
            crypto.key_dir.display()
        )
    })
}

// ── `bedgate keygen` ──────────────────────────────────────────────────────────

fn cmd_keygen(config: &BedgateConfig, force: bool) -> Result<()> {
    let kind = config.crypto.codec;
    let dir = &config.crypto.key_dir;

    let existing: Vec<PathBuf> = keys::key_files(kind)
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.exists())
        .collect();
    if !existing.is_empty() && !force {
        anyhow::bail!(
            "key files already exist: {} (use --force to replace them; every server and proxy needs the new keys)",
            existing
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating key directory: {}", dir.display()))?;
    let material = keys::produce(kind).with_context(|| format!("generating {kind} keys"))?;
    keys::encode_dir(&material, dir)
        .with_context(|| format!("writing keys to {}", dir.display()))?;

    for name in keys::key_files(kind) {
        println!("wrote {}", dir.join(name).display());
    }
    if kind.is_asymmetric() {
        println!(
            "keep {} on the proxy; servers only need {}",
            keys::PRIVATE_KEY_FILE,
            keys::PUBLIC_KEY_FILE
        );
    }
    Ok(())
}

// ── `bedgate encode` ──────────────────────────────────────────────────────────

fn cmd_encode(config: &BedgateConfig, hostname: &str, data: &BedrockData) -> Result<()> {
    let codec = load_codec(config)?;
    let combined = build_hostname(&codec, hostname, data).context("encoding identity payload")?;
    println!("{}", escape_nul(&combined));
    Ok(())
}

// ── `bedgate decode` ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DecodedHostname<'a> {
    /// Hostname to forward upstream
    hostname: &'a str,
    java_uuid: String,
    data: &'a BedrockData,
}

fn cmd_decode(config: &BedgateConfig, hostname: &str, check: bool) -> Result<()> {
    let hostname = unescape_nul(hostname);
    let codec = Arc::new(load_codec(config)?);

    let (data, forward) = if check {
        let seeker = DataSeeker::new(codec, &config.handshake);
        match seeker.seek(&hostname).context("handshake rejected")? {
            SeekResult::Floodgate { data, hostname } => (*data, hostname),
            SeekResult::NotFloodgate { .. } => anyhow::bail!("no envelope in hostname"),
        }
    } else {
        let separated = separate_hostname(&hostname);
        let envelope = separated
            .envelope
            .context("no envelope in hostname")?;
        let text = codec
            .decode_to_string(envelope.as_bytes())
            .context("decoding envelope")?;
        let data = BedrockData::from_text(&text).context("parsing identity payload")?;
        (data, separated.hostname)
    };

    let forward = escape_nul(&forward);
    let output = DecodedHostname {
        hostname: &forward,
        java_uuid: data.java_uuid().to_string(),
        data: &data,
    };
    let rendered = serde_json::to_string_pretty(&output).context("serializing payload to JSON")?;
    println!("{rendered}");
    Ok(())
}

// ── `bedgate config show` ─────────────────────────────────────────────────────

fn cmd_config_show(config: &BedgateConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── NUL escaping ──────────────────────────────────────────────────────────────

fn escape_nul(text: &str) -> String {
    text.replace('\0', "\\0")
}

fn unescape_nul(text: &str) -> String {
    text.replace("\\0", "\0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nul_escaping() {
        let hostname = "play.example.com\0^Floodgate^?abc";
        assert_eq!(escape_nul(hostname), "play.example.com\\0^Floodgate^?abc");
        assert_eq!(unescape_nul(&escape_nul(hostname)), hostname);
    }

    #[test]
    fn test_parse_keygen_with_overrides() {
        let cli = Cli::try_parse_from(["bedgate", "keygen", "--codec", "ED25519", "--dir", "/tmp/k"])
            .unwrap();
        assert_eq!(cli.codec, Some(CodecKind::Ed25519));
        assert_eq!(cli.key_dir, Some(PathBuf::from("/tmp/k")));
        assert!(matches!(cli.command, Commands::Keygen { force: false }));
    }

    #[test]
    fn test_parse_rejects_unknown_codec() {
        assert!(Cli::try_parse_from(["bedgate", "keygen", "--codec", "des"]).is_err());
    }

    #[test]
    fn test_keygen_refuses_to_overwrite() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = BedgateConfig::default();
        config.crypto.key_dir = tmp.path().to_path_buf();

        cmd_keygen(&config, false).unwrap();
        let before = std::fs::read(tmp.path().join(keys::SYMMETRIC_KEY_FILE)).unwrap();

        assert!(cmd_keygen(&config, false).is_err());
        assert_eq!(
            std::fs::read(tmp.path().join(keys::SYMMETRIC_KEY_FILE)).unwrap(),
            before
        );

        cmd_keygen(&config, true).unwrap();
        assert_ne!(
            std::fs::read(tmp.path().join(keys::SYMMETRIC_KEY_FILE)).unwrap(),
            before
        );
    }
}
