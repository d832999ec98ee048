//! Clap derive structures for the `sdnboard` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use sdnboard_core::{BalancingAlgorithm, RoutingAlgorithm};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sdnboard -- dashboard for SDN video-streaming testbeds
#[derive(Debug, Parser)]
#[command(
    name = "sdnboard",
    version,
    about = "Operate an SDN video-streaming testbed from the command line",
    long_about = "Inspect the emulated topology, manage links, start and stop\n\
        multicast video servers and clients, ping between hosts, and tune\n\
        the controller's balancing and routing algorithms.",
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
    /// Testbed profile to use
    #[arg(long, short = 'p', env = "SDNBOARD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "SDNBOARD_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Emulation agent URL (overrides profile)
    #[arg(long, short = 'a', env = "SDNBOARD_AGENT", global = true)]
    pub agent: Option<String>,

    /// Ryu REST URL (overrides profile)
    #[arg(long, env = "SDNBOARD_RYU", global = true)]
    pub ryu: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SDNBOARD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SDNBOARD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
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
    /// Inspect switches, hosts, and the controller state
    #[command(alias = "topo", alias = "t")]
    Topology(TopologyArgs),

    /// Manage inter-switch links
    #[command(alias = "l")]
    Links(LinksArgs),

    /// Manage multicast video servers
    #[command(alias = "srv")]
    Servers(ServersArgs),

    /// Manage video clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Ping between two hosts and show the computed route
    Ping(PingArgs),

    /// View and change balancing and routing algorithms
    #[command(alias = "algo")]
    Algorithms(AlgorithmsArgs),

    /// Query statistics and event logs
    Stats(StatsArgs),

    /// Manage OpenFlow rules
    Rules(RulesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TOPOLOGY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TopologyArgs {
    #[command(subcommand)]
    pub command: TopologyCommand,
}

#[derive(Debug, Subcommand)]
pub enum TopologyCommand {
    /// Summary: counts, controller state, viewport, render warnings
    Show,

    /// List switches with coordinates and connection state
    #[command(alias = "sw")]
    Switches,

    /// List hosts with their current role
    Hosts,

    /// Host names known to the backend
    Catalog,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LINKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LinksArgs {
    #[command(subcommand)]
    pub command: LinksCommand,
}

#[derive(Debug, Subcommand)]
pub enum LinksCommand {
    /// List links with their bandwidth tier
    #[command(alias = "ls")]
    List,

    /// Create a link between two switches
    Create {
        /// Source switch id
        source: i64,
        /// Destination switch id
        dest: i64,
        /// Bandwidth in Mbps
        bandwidth: u32,
    },

    /// Change a link's bandwidth
    Update {
        /// Source switch id
        source: i64,
        /// Destination switch id
        dest: i64,
        /// New bandwidth in Mbps
        bandwidth: u32,
    },

    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Source switch id
        source: i64,
        /// Destination switch id
        dest: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServersArgs {
    #[command(subcommand)]
    pub command: ServersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServersCommand {
    /// List active servers
    #[command(alias = "ls")]
    List,

    /// Start a video server on one or more hosts
    Start {
        /// Host names
        #[arg(required = true)]
        hosts: Vec<String>,

        /// Video file path on the host
        #[arg(long, required = true)]
        video: String,

        /// Weight used by weighted round robin
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        weight: u32,
    },

    /// Stop the server on a host
    Stop {
        /// Host name
        host: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List active clients
    #[command(alias = "ls")]
    List,

    /// Hosts that can start a client (not currently serving)
    Candidates,

    /// Start a player on a host; the backend picks the server
    Start {
        /// Host name
        host: String,
    },

    /// Stop the player on a host
    Stop {
        /// Host name
        host: String,

        /// Player process id, when known
        #[arg(long)]
        pid: Option<u32>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PingArgs {
    /// Source host (name or MAC)
    pub source: String,

    /// Destination host (name or MAC)
    pub destination: String,

    /// Push the computed route to Ryu (needs a Ryu URL)
    #[arg(long)]
    pub install_route: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALGORITHMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlgorithmsArgs {
    #[command(subcommand)]
    pub command: AlgorithmsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlgorithmsCommand {
    /// Show the active algorithms
    Show,

    /// Show past algorithm changes
    History,

    /// Set the load-balancing algorithm (RR, WRR)
    Balancing {
        /// Algorithm name
        algorithm: BalancingAlgorithm,
    },

    /// Set the routing algorithm (dijkstra, shortest_path)
    Routing {
        /// Algorithm name
        algorithm: RoutingAlgorithm,
    },

    /// Set server weights for weighted round robin
    Weights {
        /// Pairs of host=weight (e.g., h1=3 h2=1)
        #[arg(required = true, value_name = "HOST=WEIGHT")]
        pairs: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Event counts by type
    Summary,

    /// Recent events
    Logs {
        /// Show at most this many entries
        #[arg(long, short = 'l')]
        limit: Option<usize>,
    },

    /// Average RTT and jitter per routing algorithm
    Compare,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FLOW RULES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List flow rules
    #[command(alias = "ls")]
    List,

    /// Show one rule
    Get {
        /// Rule id
        id: i64,
    },

    /// Install a rule on a switch
    Create {
        /// Target datapath id (decimal)
        dpid: u64,

        /// Rule id (defaults to the next free id)
        #[arg(long)]
        rule_id: Option<i64>,

        #[command(flatten)]
        rule: FlowRuleArgs,
    },

    /// Replace a rule's match and actions
    Update {
        /// Rule id
        id: i64,

        #[command(flatten)]
        rule: FlowRuleArgs,
    },

    /// Delete a rule
    #[command(alias = "rm")]
    Delete {
        /// Rule id
        id: i64,
    },

    /// Rule change history
    Logs,

    /// Print the next free rule id
    NextId,
}

/// Match fields and actions of a flow rule.
#[derive(Debug, Args)]
pub struct FlowRuleArgs {
    /// Priority (0-65535)
    #[arg(long, default_value = "1")]
    pub priority: i64,

    /// Ethernet type (2048 = IPv4)
    #[arg(long, default_value = "2048")]
    pub eth_type: i64,

    /// IP protocol number
    #[arg(long)]
    pub ip_proto: Option<i64>,

    /// IPv4 source, optionally with a CIDR suffix
    #[arg(long)]
    pub ipv4_src: Option<String>,

    /// IPv4 destination, optionally with a CIDR suffix
    #[arg(long)]
    pub ipv4_dst: Option<String>,

    /// TCP source port
    #[arg(long)]
    pub tcp_src: Option<i64>,

    /// TCP destination port
    #[arg(long)]
    pub tcp_dst: Option<i64>,

    /// Ingress port
    #[arg(long)]
    pub in_port: Option<i64>,

    /// Actions as a JSON array (e.g., '[{"type":"OUTPUT","port":2}]')
    #[arg(long, required = true)]
    pub actions: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (e.g., backend_url, links_poll_secs)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
