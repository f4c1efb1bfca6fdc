use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bazaar", version, about = "Browse, buy and sell on the Bazaar marketplace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and keep the session for later commands
    Login {
        /// Account email; defaults to the last one used
        email: Option<String>,
        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in account
    Whoami,
    #[command(subcommand)]
    Ads(AdsCommand),
    #[command(subcommand)]
    Boost(BoostCommand),
    /// List conversations, or show and reply to one
    Messages {
        conversation: Option<i64>,
        /// Send this text to the conversation
        #[arg(long, requires = "conversation")]
        send: Option<String>,
    },
    /// Show the notification feed
    Notifications {
        /// Keep running and print the unread count as it changes
        #[arg(long)]
        watch: bool,
        /// Mark one notification as read
        #[arg(long, conflicts_with = "watch")]
        read: Option<i64>,
    },
    #[command(subcommand)]
    Books(BooksCommand),
    /// Show wallet balance and recent withdrawals
    Wallet,
    /// Request a payout from the wallet
    Withdraw {
        amount: f64,
        /// bank or mobile-money
        #[arg(long)]
        method: String,
        /// Bank account or mobile money number
        #[arg(long)]
        account: String,
    },
    #[command(subcommand)]
    News(NewsCommand),
    #[command(subcommand)]
    Newsletter(NewsletterCommand),
    /// Wallet, unread counts and library at a glance
    Overview,
}

#[derive(Debug, Subcommand)]
pub enum AdsCommand {
    /// Search the listing
    Search(SearchArgs),
    /// Show one ad
    Show { id: i64 },
    /// Title suggestions; reads keystrokes line by line from stdin when no text is given
    Suggest { text: Option<String> },
    /// Post a new ad
    Post {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        category: String,
        #[arg(long)]
        location: String,
    },
    /// Remove one of your ads
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub query: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub min_price: Option<f64>,
    #[arg(long)]
    pub max_price: Option<f64>,
    /// newest, price_asc, price_desc or views
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: u64,
}

#[derive(Debug, Subcommand)]
pub enum BoostCommand {
    /// Show promotion plans for an ad
    Pricing { ad_id: i64 },
    /// Buy a promotion plan
    Buy { ad_id: i64, plan_id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    /// Browse the book catalogue
    List,
    /// Download a purchased book
    Download {
        id: i64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Sell a book (PDF or EPUB, under 50 MiB)
    Upload {
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum NewsCommand {
    List,
    Publish { title: String, body: String },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum NewsletterCommand {
    Send { subject: String, body: String },
    Subscribers,
}
