//! Clap derive structures for the `reefdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs` for man pages, so it depends on clap only.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// reefdesk -- front-desk and reservation management for Hotel Pacific Reef
#[derive(Debug, Parser)]
#[command(
    name = "reefdesk",
    version,
    about = "Manage hotel rooms, reservations, and the front desk from the command line",
    long_about = "Book rooms, check guests in and out, record payments, and run\n\
        occupancy reports against a local reservation store.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "REEFDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Store directory (overrides profile)
    #[arg(long, env = "REEFDESK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REEFDESK_OUTPUT",
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

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoomTypeArg {
    Basic,
    Medium,
    Premium,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoomStatusArg {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Staff,
    Guest,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PaymentMethodArg {
    Cash,
    Card,
    Transfer,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register, sign in, and manage your own account
    #[command(alias = "acct")]
    Account(AccountArgs),

    /// Administer user accounts
    Users(UsersArgs),

    /// Manage room inventory and housekeeping status
    #[command(alias = "room")]
    Rooms(RoomsArgs),

    /// Book and manage reservations
    #[command(alias = "res", alias = "r")]
    Reservations(ReservationsArgs),

    /// Front-desk operations: check-in, check-out, payments
    Desk(DeskArgs),

    /// View the front-desk action log
    Logs(LogsArgs),

    /// Occupancy and revenue reports
    Reports(ReportsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Password taken from the flag or environment, else prompted for.
#[derive(Debug, Args)]
pub struct PasswordArg {
    /// Account password (prompted when omitted)
    #[arg(long, env = "REEFDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create a guest account
    Register {
        email: String,

        #[command(flatten)]
        password: PasswordArg,
    },

    /// Sign in and remember the session
    Login {
        email: String,

        #[command(flatten)]
        password: PasswordArg,
    },

    /// Forget the current session
    Logout,

    /// Show the signed-in account and its capabilities
    Whoami,

    /// Change the signed-in account's password
    ChangePassword {
        /// Current password (prompted when omitted)
        #[arg(long)]
        current: Option<String>,

        /// New password (prompted when omitted)
        #[arg(long)]
        new: Option<String>,
    },

    /// Delete the signed-in account and its reservations
    Delete,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List accounts
    #[command(alias = "ls")]
    List {
        /// Only staff and admin accounts
        #[arg(long)]
        staff: bool,
    },

    /// Update an account's profile, role, or password
    Update {
        email: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        role: Option<RoleArg>,

        #[arg(long)]
        phone: Option<String>,

        /// Front-desk shift, e.g. "morning"
        #[arg(long)]
        shift: Option<String>,

        /// New password
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete an account and its reservations
    #[command(alias = "rm")]
    Delete { email: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROOMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RoomsArgs {
    #[command(subcommand)]
    pub command: RoomsCommand,
}

/// Optional room attributes shared by create and update.
#[derive(Debug, Args)]
pub struct RoomFields {
    /// Maximum number of guests
    #[arg(long)]
    pub capacity: Option<u32>,

    /// Bed layout, e.g. "1 queen"
    #[arg(long)]
    pub beds: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Image URL (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,

    /// Amenity (repeatable)
    #[arg(long = "amenity")]
    pub amenities: Vec<String>,

    /// Housekeeping status
    #[arg(long)]
    pub status: Option<RoomStatusArg>,
}

#[derive(Debug, Subcommand)]
pub enum RoomsCommand {
    /// List every room
    #[command(alias = "ls")]
    List,

    /// Show room details
    Get { id: String },

    /// Add a room
    Create {
        #[arg(long)]
        name: String,

        #[arg(long = "type", value_name = "TYPE")]
        room_type: RoomTypeArg,

        /// Nightly price
        #[arg(long)]
        price: u64,

        #[command(flatten)]
        fields: RoomFields,
    },

    /// Change an existing room
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type", value_name = "TYPE")]
        room_type: Option<RoomTypeArg>,

        #[arg(long)]
        price: Option<u64>,

        #[command(flatten)]
        fields: RoomFields,
    },

    /// Remove a room (existing reservations keep their snapshot)
    #[command(alias = "rm")]
    Delete { id: String },

    /// Set housekeeping status
    Status { id: String, status: RoomStatusArg },

    /// Rooms free for a whole stay
    Available {
        /// Arrival date (YYYY-MM-DD)
        #[arg(long)]
        arrival: String,

        /// Departure date (YYYY-MM-DD)
        #[arg(long)]
        departure: String,

        #[arg(long = "type", value_name = "TYPE")]
        room_type: Option<RoomTypeArg>,

        /// Party size
        #[arg(long)]
        guests: Option<u32>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESERVATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReservationsArgs {
    #[command(subcommand)]
    pub command: ReservationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    /// List reservations, newest first
    #[command(alias = "ls")]
    List {
        /// Only reservations booked under this email
        #[arg(long, conflicts_with = "day")]
        email: Option<String>,

        /// Only reservations arriving or departing on this date
        #[arg(long)]
        day: Option<String>,
    },

    /// Show reservation details
    Get { id: String },

    /// Book a room
    Create {
        /// Room ID
        #[arg(long)]
        room: String,

        /// Arrival date (YYYY-MM-DD)
        #[arg(long)]
        arrival: String,

        /// Departure date (YYYY-MM-DD)
        #[arg(long)]
        departure: String,

        /// Book on behalf of this guest (staff only; defaults to you)
        #[arg(long)]
        email: Option<String>,

        /// Guest full name
        #[arg(long)]
        name: Option<String>,

        /// Guest phone
        #[arg(long)]
        phone: Option<String>,

        /// Guest identity document
        #[arg(long)]
        document: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Amount paid up front
        #[arg(long)]
        pay: Option<u64>,

        /// How the up-front amount was paid (default: cash)
        #[arg(long, requires = "pay")]
        method: Option<PaymentMethodArg>,
    },

    /// Move a reservation to new dates
    EditDates {
        id: String,

        #[arg(long)]
        arrival: String,

        #[arg(long)]
        departure: String,
    },

    /// Cancel a reservation
    #[command(alias = "rm")]
    Delete { id: String },

    /// Search by id, guest name, guest email, or room name
    Search { query: String },

    /// Print the reservation's QR payload
    Qr { id: String },

    /// Replace the QR payload and rendered image
    AttachQr {
        id: String,

        /// Payload text; must reference the reservation
        payload: String,

        /// Rendered image (data URL or path)
        #[arg(long)]
        image: Option<String>,
    },

    /// Issue a fresh QR payload for an unused code
    ReissueQr { id: String },

    /// Find the reservation behind a scanned payload
    Resolve { payload: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DESK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeskArgs {
    #[command(subcommand)]
    pub command: DeskCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeskCommand {
    /// Check a guest in by reservation ID or scanned QR payload
    CheckIn {
        /// Reservation ID
        #[arg(required_unless_present = "qr", conflicts_with = "qr")]
        id: Option<String>,

        /// Scanned QR payload
        #[arg(long)]
        qr: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Check a guest out
    CheckOut { id: String },

    /// Record a payment
    Pay {
        id: String,

        /// Total paid towards the stay so far
        amount: u64,

        #[arg(long, default_value = "cash")]
        method: PaymentMethodArg,
    },

    /// Arrivals still to check in
    Due {
        /// Date to check (defaults to today)
        #[arg(long)]
        day: Option<String>,
    },

    /// A room and the reservation arriving on it today
    Room { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// List log entries, newest first
    #[command(alias = "ls")]
    List {
        /// Only entries recorded by this staff email
        #[arg(long, conflicts_with = "reservation")]
        staff: Option<String>,

        /// Only entries for this reservation
        #[arg(long)]
        reservation: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPORTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// Revenue and bookings per arrival month
    Monthly,

    /// Most-booked rooms
    TopRooms {
        #[arg(long, short = 'l', default_value = "10")]
        limit: usize,
    },

    /// Today's arrivals that are not fully paid
    PendingPayments,

    /// Rooms with more than one pending arrival today
    Overbookings,

    /// Room count per housekeeping status
    RoomStatus,

    /// Pending arrivals in the coming days
    Upcoming {
        /// Window in days (defaults to the profile setting)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Arrivals on a day split into checked-in and pending
    CheckIns {
        /// Date (defaults to today)
        #[arg(long)]
        day: Option<String>,
    },

    /// Number of reservations arriving in a month
    Month {
        /// Month as YYYY-MM (defaults to the current month)
        month: Option<String>,
    },
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

    /// Print the config file location
    Path,

    /// Set a profile value
    Set {
        /// Key: data_dir, seed, admin_email, admin_password_env,
        /// staff_email, staff_password_env, upcoming_days
        key: String,

        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a seed password in the system keyring
    SetPassword {
        /// Store the front-desk password instead of the admin one
        #[arg(long)]
        staff: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
