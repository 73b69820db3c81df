//! CLI command definitions and argument parsing

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use lpc_core::{
    CoreConfig, Keypair, Multiaddr, PeerIdentity, PeerRecord, PublicKey, Record, RecordError,
    SealedEnvelope, SemVerProtocol,
};

use crate::output::{EnvelopeView, MatchView, OutputFormat, OutputFormatter, ProtocolView, RecordView};
use crate::ExitCode;

/// LPC Inspect - look inside signed peer records and protocol strings
#[derive(Parser, Debug)]
#[command(name = "lpc-inspect")]
#[command(version, about = "Inspect sealed envelopes, peer records, and protocol strings")]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: table, json, quiet
    #[arg(long, default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file path
    #[arg(long, global = true, env = "LPC_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a protocol string such as /ipfs/ping/1.0.0
    Parse(ParseArgs),
    /// Check whether two protocol strings are compatible
    Match(MatchArgs),
    /// Sign a peer record with a seed-derived key
    Seal(SealArgs),
    /// Verify a hex-encoded envelope and print its record
    Open(OpenArgs),
    /// Decode a hex-encoded bare peer record
    DecodeRecord(DecodeRecordArgs),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    pub protocol: String,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    pub local: String,
    pub remote: String,
}

#[derive(Args, Debug)]
pub struct SealArgs {
    /// 32-byte Ed25519 seed, hex encoded
    #[arg(long)]
    pub seed: String,

    /// Sequence number; defaults to the current time in milliseconds
    #[arg(long)]
    pub seq: Option<u64>,

    /// Listen address (can be specified multiple times)
    #[arg(long = "addr")]
    pub addrs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Marshaled envelope, hex encoded
    pub envelope: String,

    /// Expected signer key: raw 32-byte Ed25519 or protobuf-encoded, hex
    #[arg(long)]
    pub public_key: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeRecordArgs {
    /// Marshaled peer record, hex encoded
    pub record: String,

    /// Require the record's peer id to derive from this key
    #[arg(long)]
    pub public_key: Option<String>,
}

impl Cli {
    /// Execute the CLI command with a pre-loaded configuration
    pub fn execute_with_config(self, config: CoreConfig) -> anyhow::Result<ExitCode> {
        let formatter = OutputFormatter::new(self.output);
        let command = self.command.name();
        debug!(command, format = %self.output, "executing command");

        let result = match &self.command {
            Commands::Parse(args) => args.execute(&formatter),
            Commands::Match(args) => args.execute(&formatter),
            Commands::Seal(args) => args.execute(&formatter),
            Commands::Open(args) => args.execute(&formatter, &config),
            Commands::DecodeRecord(args) => args.execute(&formatter),
        };

        match result {
            Ok(code) => Ok(code),
            Err(failure) => {
                if !formatter.is_quiet() {
                    let rendered = formatter.format_error(&failure.error, command);
                    if formatter.format() == OutputFormat::Json {
                        println!("{rendered}");
                    } else {
                        eprintln!("{rendered}");
                    }
                }
                Ok(failure.code)
            }
        }
    }
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Parse(_) => "parse",
            Commands::Match(_) => "match",
            Commands::Seal(_) => "seal",
            Commands::Open(_) => "open",
            Commands::DecodeRecord(_) => "decode-record",
        }
    }
}

/// A command error paired with the exit code it maps to.
#[derive(Debug)]
pub struct Failure {
    pub error: anyhow::Error,
    pub code: ExitCode,
}

impl Failure {
    fn invalid_input(error: anyhow::Error) -> Self {
        Self { error, code: ExitCode::InvalidInput }
    }
}

impl From<RecordError> for Failure {
    fn from(err: RecordError) -> Self {
        let code = match err {
            RecordError::InvalidSignature
            | RecordError::PublicKeyMismatch
            | RecordError::NoPublicKey => ExitCode::VerificationFailed,
            RecordError::EnvelopeTooLarge { .. }
            | RecordError::Decode(_)
            | RecordError::UnsupportedPayloadType(_)
            | RecordError::EmptyPayloadType
            | RecordError::AddressDecodeFailure { .. }
            | RecordError::InvalidPeerId(_)
            | RecordError::InvalidPublicKey(_) => ExitCode::InvalidInput,
            _ => ExitCode::GeneralError,
        };
        Self { error: err.into(), code }
    }
}

type CommandResult = Result<ExitCode, Failure>;

fn emit(formatter: &OutputFormatter, rendered: String) {
    if !formatter.is_quiet() {
        println!("{rendered}");
    }
}

fn decode_hex(label: &str, input: &str) -> Result<Vec<u8>, Failure> {
    hex::decode(input.trim())
        .with_context(|| format!("{label} is not valid hex"))
        .map_err(Failure::invalid_input)
}

/// Accept either a raw Ed25519 key or a protobuf `PublicKey` message.
pub fn parse_public_key(input: &str) -> Result<PublicKey, Failure> {
    let bytes = decode_hex("public key", input)?;
    let key = if bytes.len() == 32 {
        PublicKey::from_ed25519_bytes(&bytes)
    } else {
        PublicKey::unmarshal(&bytes)
    };
    key.context("public key is not a valid Ed25519 key").map_err(Failure::invalid_input)
}

fn parse_seed(input: &str) -> Result<[u8; 32], Failure> {
    let bytes = decode_hex("seed", input)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| Failure::invalid_input(anyhow!("seed must be 32 bytes, got {}", bytes.len())))
}

fn parse_protocol(input: &str) -> Result<SemVerProtocol, Failure> {
    input
        .parse::<SemVerProtocol>()
        .with_context(|| format!("cannot parse protocol {input:?}"))
        .map_err(Failure::invalid_input)
}

impl ParseArgs {
    fn execute(&self, formatter: &OutputFormatter) -> CommandResult {
        let proto = parse_protocol(&self.protocol)?;
        emit(formatter, formatter.format_protocol(&ProtocolView::from(&proto)));
        Ok(ExitCode::Success)
    }
}

impl MatchArgs {
    fn execute(&self, formatter: &OutputFormatter) -> CommandResult {
        let local = parse_protocol(&self.local)?;
        let remote = parse_protocol(&self.remote)?;
        let matches = local.matches(&remote);
        info!(local = %local, remote = %remote, matches, "compared protocols");

        let view = MatchView {
            local: ProtocolView::from(&local),
            remote: ProtocolView::from(&remote),
            matches,
        };
        emit(formatter, formatter.format_match(&view));
        Ok(if matches { ExitCode::Success } else { ExitCode::NoMatch })
    }
}

impl SealArgs {
    fn execute(&self, formatter: &OutputFormatter) -> CommandResult {
        let keypair = Keypair::from_seed(&parse_seed(&self.seed)?)
            .context("seed is not a valid Ed25519 private key")
            .map_err(Failure::invalid_input)?;
        let identity = PeerIdentity::from_keypair(keypair);
        let addresses = self
            .addrs
            .iter()
            .map(|a| {
                a.parse::<Multiaddr>()
                    .with_context(|| format!("invalid multiaddr {a:?}"))
                    .map_err(Failure::invalid_input)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let peer_id = identity.peer_id().clone();
        let record = match self.seq {
            Some(seq) => PeerRecord::new(peer_id, addresses, seq),
            None => PeerRecord::now(peer_id, addresses),
        };
        let envelope = record.seal(&identity)?;
        info!(peer = %record.peer_id(), seq = record.sequence_number(), "sealed peer record");

        emit(formatter, formatter.format_envelope(&EnvelopeView::new(&envelope, &record), "seal"));
        Ok(ExitCode::Success)
    }
}

impl OpenArgs {
    fn execute(&self, formatter: &OutputFormatter, config: &CoreConfig) -> CommandResult {
        let bytes = decode_hex("envelope", &self.envelope)?;
        let expected = self.public_key.as_deref().map(parse_public_key).transpose()?;

        let envelope = SealedEnvelope::open_with_config(&bytes, expected.as_ref(), &config.envelope)?;
        let record = envelope.peer_record()?;
        info!(peer = %record.peer_id(), seq = record.sequence_number(), "envelope verified");

        emit(formatter, formatter.format_envelope(&EnvelopeView::new(&envelope, record), "open"));
        Ok(ExitCode::Success)
    }
}

impl DecodeRecordArgs {
    fn execute(&self, formatter: &OutputFormatter) -> CommandResult {
        let bytes = decode_hex("record", &self.record)?;
        let record = match self.public_key.as_deref().map(parse_public_key).transpose()? {
            Some(key) => PeerRecord::from_bytes_with_public_key(&bytes, &key)?,
            None => PeerRecord::from_bytes(&bytes)?,
        };

        emit(formatter, formatter.format_record(&RecordView::from(&record)));
        Ok(ExitCode::Success)
    }
}
