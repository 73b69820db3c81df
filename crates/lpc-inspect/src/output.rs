//! Output formatting for CLI results
//!
//! Every command renders through [`OutputFormatter`] in one of three formats:
//! - Table: Human-readable property tables (default)
//! - JSON: Structured JSON for scripting
//! - Quiet: Nothing on stdout, exit codes only

use std::str::FromStr;

use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

use lpc_core::{PeerRecord, Record, SealedEnvelope, SemVerProtocol, VersionConstraint};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Quiet,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Quiet => write!(f, "quiet"),
        }
    }
}

/// Standard JSON response wrapper
#[derive(Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub command: String,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn success(data: T, command: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
        }
    }
}

impl JsonResponse<()> {
    pub fn error(message: &str, command: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
        }
    }
}

// JSON views of the core types

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProtocolView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<&'static str>,
}

impl From<&SemVerProtocol> for ProtocolView {
    fn from(proto: &SemVerProtocol) -> Self {
        Self {
            name: proto.name().to_string(),
            version: proto.version().map(|v| v.version().to_string()),
            constraint: proto.version().map(constraint_name),
        }
    }
}

fn constraint_name(constraint: &VersionConstraint) -> &'static str {
    match constraint {
        VersionConstraint::Exact(_) => "exact",
        VersionConstraint::From(_) => "from",
        VersionConstraint::UpToNextMinor(_) => "up-to-next-minor",
        VersionConstraint::UpToNextMajor(_) => "up-to-next-major",
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MatchView {
    pub local: ProtocolView,
    pub remote: ProtocolView,
    pub matches: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RecordView {
    pub peer_id: String,
    pub seq: u64,
    pub addresses: Vec<String>,
}

impl From<&PeerRecord> for RecordView {
    fn from(record: &PeerRecord) -> Self {
        Self {
            peer_id: record.peer_id().to_string(),
            seq: record.sequence_number(),
            addresses: record.addresses().iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EnvelopeView {
    pub signer: String,
    pub payload_type: String,
    pub signature: String,
    pub record: RecordView,
    /// Hex of the marshaled envelope
    pub envelope: String,
}

impl EnvelopeView {
    pub fn new(envelope: &SealedEnvelope, record: &PeerRecord) -> Self {
        Self {
            signer: envelope.public_key().to_peer_id().to_string(),
            payload_type: hex::encode(envelope.payload_type()),
            signature: hex::encode(envelope.signature()),
            record: RecordView::from(record),
            envelope: hex::encode(envelope.marshal()),
        }
    }
}

/// Output formatter for CLI results
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.format == OutputFormat::Quiet
    }

    pub fn format_protocol(&self, view: &ProtocolView) -> String {
        match self.format {
            OutputFormat::Table => self.protocol_table(view),
            OutputFormat::Json => self.to_json(view, "parse"),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_match(&self, view: &MatchView) -> String {
        match self.format {
            OutputFormat::Table => {
                let mut table = property_table();
                table.add_row(vec!["Local", &protocol_summary(&view.local)]);
                table.add_row(vec!["Remote", &protocol_summary(&view.remote)]);
                table.add_row(vec!["Compatible", if view.matches { "yes" } else { "no" }]);
                table.to_string()
            }
            OutputFormat::Json => self.to_json(view, "match"),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_record(&self, view: &RecordView) -> String {
        match self.format {
            OutputFormat::Table => self.record_table(view),
            OutputFormat::Json => self.to_json(view, "decode-record"),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_envelope(&self, view: &EnvelopeView, command: &str) -> String {
        match self.format {
            OutputFormat::Table => {
                let mut table = property_table();
                table.add_row(vec!["Signer", &view.signer]);
                table.add_row(vec!["Payload Type", &view.payload_type]);
                table.add_row(vec!["Signature", &view.signature]);
                table.add_row(vec!["Peer ID", &view.record.peer_id]);
                table.add_row(vec!["Sequence", &view.record.seq.to_string()]);
                table.add_row(vec!["Addresses", &addresses_cell(&view.record.addresses)]);
                table.add_row(vec!["Envelope", &view.envelope]);
                table.to_string()
            }
            OutputFormat::Json => self.to_json(view, command),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_error(&self, error: &anyhow::Error, command: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::<()>::error(&format!("{error:#}"), command);
                serde_json::to_string_pretty(&response)
                    .unwrap_or_else(|_| format!("{{\"success\":false,\"command\":\"{command}\"}}"))
            }
            _ => format!("Error: {error:#}"),
        }
    }

    fn to_json<T: Serialize>(&self, value: &T, command: &str) -> String {
        serde_json::to_string_pretty(&JsonResponse::success(value, command)).unwrap_or_else(|e| {
            let response = JsonResponse::<()>::error(&format!("Serialization error: {e}"), command);
            serde_json::to_string_pretty(&response).unwrap_or_default()
        })
    }

    fn protocol_table(&self, view: &ProtocolView) -> String {
        let mut table = property_table();
        table.add_row(vec!["Name", &view.name]);
        table.add_row(vec!["Version", view.version.as_deref().unwrap_or("-")]);
        table.add_row(vec!["Constraint", view.constraint.unwrap_or("-")]);
        table.to_string()
    }

    fn record_table(&self, view: &RecordView) -> String {
        let mut table = property_table();
        table.add_row(vec!["Peer ID", &view.peer_id]);
        table.add_row(vec!["Sequence", &view.seq.to_string()]);
        table.add_row(vec!["Addresses", &addresses_cell(&view.addresses)]);
        table.to_string()
    }
}

fn property_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Property", "Value"]);
    table
}

fn addresses_cell(addresses: &[String]) -> String {
    if addresses.is_empty() {
        "-".to_string()
    } else {
        addresses.join("\n")
    }
}

fn protocol_summary(view: &ProtocolView) -> String {
    match (&view.version, view.constraint) {
        (Some(v), Some(c)) => format!("{} {} ({c})", view.name, v),
        _ => view.name.clone(),
    }
}
