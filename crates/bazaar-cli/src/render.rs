//! Plain-text views. Every function returns the text instead of printing it.

use bazaar_core::api::ListPage;
use bazaar_core::config::ApiConfig;
use bazaar_core::models::{
    Ad, AppNotification, Book, BoostPricing, Conversation, Message, NewsItem, User, Wallet, Withdrawal,
};
use bazaar_core::utils::{format_date, format_money, truncate_string};
use bazaar_core::InlineAlert;

const TITLE_WIDTH: usize = 40;

pub fn ad_card(ad: &Ad, config: &ApiConfig) -> String {
    let boosted = if ad.is_boosted { "  [BOOSTED]" } else { "" };
    let mut details = Vec::new();
    if let Some(location) = ad.location.as_deref() {
        details.push(location.to_string());
    }
    if let Some(category) = ad.category.as_deref() {
        details.push(category.to_string());
    }
    details.push(format!("{} views", ad.views));

    format!(
        "#{:<6}{:<width$}  {}{}\n       {}\n       {}\n",
        ad.id,
        truncate_string(&ad.title, TITLE_WIDTH),
        ad.price_display(),
        boosted,
        details.join(" | "),
        config.ad_link(ad.id),
        width = TITLE_WIDTH,
    )
}

/// One card per ad; the page footer only appears when there is another page.
pub fn ad_list(page: &ListPage<Ad>, config: &ApiConfig) -> String {
    if page.items.is_empty() {
        return "No ads match your search.\n".to_string();
    }
    let mut out: String = page.items.iter().map(|ad| ad_card(ad, config)).collect::<Vec<_>>().join("\n");
    if page.needs_pagination() {
        out.push_str(&format!(
            "\nPage {} of {} ({} ads){}\n",
            page.current_page,
            page.page_count(),
            page.total_count,
            if page.has_next() { " - next: --page N" } else { "" },
        ));
    }
    out
}

pub fn ad_detail(ad: &Ad, config: &ApiConfig) -> String {
    let mut out = ad_card(ad, config);
    if let Some(description) = ad.description.as_deref().filter(|d| !d.trim().is_empty()) {
        out.push('\n');
        out.push_str(description.trim());
        out.push('\n');
    }
    if ad.created_at.is_some() {
        out.push_str(&format!("\nPosted {}\n", format_date(ad.created_at.as_ref())));
    }
    out
}

pub fn alert(alert: &InlineAlert) -> String {
    format!("! {}\n", alert)
}

pub fn boost_pricing(pricing: &BoostPricing) -> String {
    if pricing.plans.is_empty() {
        return "No promotion plans are available for this ad.\n".to_string();
    }
    let cheapest = pricing.cheapest().map(|p| p.id);
    pricing
        .plans
        .iter()
        .map(|plan| {
            format!(
                "{:>4}  {:<16} {:>3} days  {}{}\n",
                plan.id,
                plan.name,
                plan.days,
                format_money(plan.price, pricing.currency.as_deref()),
                if Some(plan.id) == cheapest { "  (best value)" } else { "" },
            )
        })
        .collect()
}

pub fn conversations(items: &[Conversation]) -> String {
    if items.is_empty() {
        return "No conversations yet.\n".to_string();
    }
    items
        .iter()
        .map(|c| {
            let unread = if c.unread > 0 { format!(" ({} new)", c.unread) } else { String::new() };
            format!(
                "{:>5}  {}{}  {}\n",
                c.id,
                c.other_party,
                unread,
                truncate_string(c.last_message.as_deref().unwrap_or(""), 50),
            )
        })
        .collect()
}

pub fn messages(items: &[Message], me: Option<&User>) -> String {
    items
        .iter()
        .map(|m| {
            let who = match me {
                Some(user) if user.id == m.sender_id => "you".to_string(),
                _ => format!("#{}", m.sender_id),
            };
            format!("[{}] {}: {}\n", format_date(m.created_at.as_ref()), who, m.body)
        })
        .collect()
}

pub fn notifications(items: &[AppNotification]) -> String {
    if items.is_empty() {
        return "You're all caught up.\n".to_string();
    }
    items
        .iter()
        .map(|n| format!("{:>5} {} {}\n", n.id, if n.read { " " } else { "*" }, n.title))
        .collect()
}

pub fn books(items: &[Book]) -> String {
    if items.is_empty() {
        return "No books listed.\n".to_string();
    }
    items
        .iter()
        .map(|b| {
            let price = if b.is_free() { "free".to_string() } else { format_money(b.price, None) };
            let owned = if b.purchased { "  [owned]" } else { "" };
            format!(
                "{:>5}  {:<width$}  {:<20} {}{}\n",
                b.id,
                truncate_string(&b.title, TITLE_WIDTH),
                truncate_string(&b.author, 20),
                price,
                owned,
                width = TITLE_WIDTH,
            )
        })
        .collect()
}

pub fn wallet(wallet: &Wallet, withdrawals: &[Withdrawal]) -> String {
    let currency = wallet.currency.as_deref();
    let mut out = format!(
        "Balance: {}\nPending: {}\n",
        format_money(wallet.balance, currency),
        format_money(wallet.pending, currency)
    );
    if !withdrawals.is_empty() {
        out.push_str("\nWithdrawals:\n");
        for w in withdrawals {
            out.push_str(&format!(
                "{:>5}  {}  {:?}  {:?}  {}\n",
                w.id,
                format_money(w.amount, currency),
                w.method,
                w.status,
                format_date(w.created_at.as_ref()),
            ));
        }
    }
    out
}

pub fn news(items: &[NewsItem]) -> String {
    if items.is_empty() {
        return "No news.\n".to_string();
    }
    items
        .iter()
        .map(|n| format!("{:>5}  {}  {}\n", n.id, format_date(n.published_at.as_ref()), n.title))
        .collect()
}
