//! Data models for marketplace entities.
//!
//! - `User`, `LoginResponse`: accounts and authentication payloads
//! - `Ad`, `AdQuery`, `AdDraft`: listings and search filters
//! - `BoostPricing`, `BoostPlan`: paid promotion of an ad
//! - `Conversation`, `Message`: buyer/seller messaging
//! - `Notification`: the bell-icon feed
//! - `Book`: digital books for sale
//! - `Wallet`, `Withdrawal`: seller balance and payouts
//! - `NewsItem`, `NewsletterDraft`: admin publishing

pub mod ad;
pub mod boost;
pub mod book;
pub mod message;
pub mod news;
pub mod notification;
pub mod user;
pub mod wallet;

pub use ad::{Ad, AdDraft, AdQuery, AdSort};
pub use boost::{BoostOrder, BoostPlan, BoostPricing};
pub use book::Book;
pub use message::{Conversation, Message};
pub use news::{NewsDraft, NewsItem, NewsletterDraft, NewsletterReceipt, Subscriber};
pub use notification::{AppNotification, UnreadCount};
pub use user::{LoginResponse, User};
pub use wallet::{PayoutMethod, Wallet, Withdrawal, WithdrawalRequest, WithdrawalStatus};
