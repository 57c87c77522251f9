//! Clap derive structures for the `ontap-san` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use ontap_api::{OsType, Protocol};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ontap-san -- manage NetApp ONTAP SAN resources from the command line
#[derive(Debug, Parser)]
#[command(
    name = "ontap-san",
    version,
    about = "Manage NetApp ONTAP LUNs, igroups, and LUN maps from the command line",
    long_about = "Drives the ONTAP REST API to create, list, and delete SAN objects.\n\n\
        Connection settings come from flags, the HOST / USER / PASSWORD /\n\
        ONTAP_OAUTH_TOKEN environment variables, or a profile in the config file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Cluster or SVM management LIF (ip, fqdn, or full URL)
    #[arg(long, env = "HOST", global = true)]
    pub host: Option<String>,

    /// Username for Basic auth [default: profile username, then $USER]
    #[arg(long, short = 'u', global = true)]
    pub user: Option<String>,

    /// Password for Basic auth
    #[arg(long, env = "PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// OAuth 2.0 access token (takes precedence over user/password)
    #[arg(long, env = "ONTAP_OAUTH_TOKEN", global = true, hide_env_values = true)]
    pub oauth_token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "ONTAP_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Config profile to use
    #[arg(long, short = 'p', env = "ONTAP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "ONTAP_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a LUN
    LunCreate(LunCreateArgs),

    /// List LUNs (optionally filtered)
    LunList(LunListArgs),

    /// Delete a LUN by UUID
    LunDelete(LunDeleteArgs),

    /// Create an initiator group
    IgroupCreate(IgroupCreateArgs),

    /// Add initiators (IQN/WWPN) to an igroup
    IgroupAddInitiators(IgroupAddInitiatorsArgs),

    /// List initiator groups (optionally filtered)
    IgroupList(IgroupListArgs),

    /// Map a LUN to an igroup
    LunmapCreate(LunmapCreateArgs),

    /// List LUN maps
    LunmapList(LunmapListArgs),

    /// Remove the mapping between a LUN and an igroup
    LunmapDelete(LunmapDeleteArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LUNS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LunCreateArgs {
    /// SVM name
    #[arg(long)]
    pub svm: String,

    /// Volume name (must exist)
    #[arg(long)]
    pub volume: String,

    /// LUN name to create
    #[arg(long)]
    pub lun: String,

    /// Size with binary units (e.g. 100G, 20M, 4096)
    #[arg(long)]
    pub size: String,

    /// Host OS type (linux, windows, vmware, aix, ...)
    #[arg(long, default_value = "linux")]
    pub os_type: OsType,

    /// Enable space reservation
    #[arg(long)]
    pub space_reserve: bool,
}

#[derive(Debug, Args)]
pub struct LunListArgs {
    /// Filter by SVM name (svm.name)
    #[arg(long)]
    pub svm: Option<String>,

    /// Filter by volume name (location.volume.name)
    #[arg(long)]
    pub volume: Option<String>,

    /// Filter by LUN path (/vol/<volume>/<lun>)
    #[arg(long)]
    pub lun: Option<String>,

    /// Comma-separated field list to request via fields=...
    #[arg(long)]
    pub fields: Option<String>,

    /// Records per page requested from the cluster
    #[arg(long)]
    pub max_records: Option<u32>,
}

#[derive(Debug, Args)]
pub struct LunDeleteArgs {
    /// LUN UUID to delete
    #[arg(long)]
    pub uuid: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  IGROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IgroupCreateArgs {
    /// SVM name
    #[arg(long)]
    pub svm: String,

    /// Igroup name
    #[arg(long)]
    pub name: String,

    /// Host OS type (linux, windows, vmware, hyper_v, ...)
    pub os_type: OsType,

    /// Protocol the initiators speak
    #[arg(value_enum)]
    pub protocol: ProtocolArg,

    /// Initiators to seed the igroup with
    #[arg(long, num_args = 1..)]
    pub initiator: Vec<String>,

    /// Existing igroups to nest inside the new one
    #[arg(long, num_args = 1..)]
    pub igroup: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    Iscsi,
    Fcp,
    Mixed,
}

impl From<ProtocolArg> for Protocol {
    fn from(p: ProtocolArg) -> Self {
        match p {
            ProtocolArg::Iscsi => Self::Iscsi,
            ProtocolArg::Fcp => Self::Fcp,
            ProtocolArg::Mixed => Self::Mixed,
        }
    }
}

#[derive(Debug, Args)]
pub struct IgroupAddInitiatorsArgs {
    /// UUID of the igroup to modify
    #[arg(long)]
    pub igroup_uuid: String,

    /// One or more initiator names (e.g. iqn.1998-01.com.vmware:host-1)
    #[arg(long, required = true, num_args = 1..)]
    pub initiator: Vec<String>,
}

#[derive(Debug, Args)]
pub struct IgroupListArgs {
    /// Filter by field and value (e.g. --query-filter os_type linux)
    #[arg(long, num_args = 2, value_names = ["FIELD", "VALUE"])]
    pub query_filter: Option<Vec<String>>,

    /// Comma-separated field list to request via fields=...
    #[arg(long)]
    pub fields: Option<String>,

    /// Records per page requested from the cluster
    #[arg(long)]
    pub max_records: Option<u32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LUN MAPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LunmapCreateArgs {
    /// SVM name
    #[arg(long)]
    pub svm: String,

    /// Igroup name or UUID
    #[arg(long)]
    pub igroup: String,

    /// LUN path (e.g. /vol/vol1/lun1) or UUID
    #[arg(long)]
    pub lun_path: String,

    /// Request a specific logical unit number
    #[arg(long)]
    pub lun_id: Option<u32>,
}

#[derive(Debug, Args)]
pub struct LunmapListArgs {
    /// Filter by SVM name
    #[arg(long)]
    pub svm: Option<String>,

    /// Filter by igroup name or UUID
    #[arg(long)]
    pub igroup: Option<String>,

    /// Filter by LUN path or UUID
    #[arg(long)]
    pub lun_path: Option<String>,

    /// Records per page requested from the cluster
    #[arg(long)]
    pub max_records: Option<u32>,
}

#[derive(Debug, Args)]
pub struct LunmapDeleteArgs {
    /// LUN path or UUID
    #[arg(long)]
    pub lun: String,

    /// Igroup name or UUID
    #[arg(long)]
    pub igroup: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
