//! One handler per subcommand.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use bazaar_core::cache::Fetched;
use bazaar_core::models::{
    AdDraft, AdQuery, AdSort, NewsDraft, NewsletterDraft, PayoutMethod, WithdrawalRequest,
};
use bazaar_core::search::SuggestionDebouncer;
use bazaar_core::services::NotificationWatcher;
use bazaar_core::upload::{BookUpload, UploadStep};
use bazaar_core::utils::{format_bytes, format_money};
use bazaar_core::{ActionError, CancelToken, InlineAlert};

use crate::app::App;
use crate::cli::{AdsCommand, BooksCommand, BoostCommand, Command, NewsCommand, NewsletterCommand, SearchArgs};
use crate::render;

/// Buffer for keystrokes and suggestions in interactive suggest mode.
const SUGGEST_CHANNEL_SIZE: usize = 16;

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login { email, remember } => login(app, email, remember).await,
        Command::Logout => {
            app.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            let user = app.require_login().await?;
            println!("{} <{}>{}", user.display_name(), user.email, if user.is_admin { " (admin)" } else { "" });
            Ok(())
        }
        Command::Ads(cmd) => ads(app, cmd).await,
        Command::Boost(cmd) => boost(app, cmd).await,
        Command::Messages { conversation, send } => messages(app, conversation, send).await,
        Command::Notifications { watch, read } => notifications(app, watch, read).await,
        Command::Books(cmd) => books(app, cmd).await,
        Command::Wallet => {
            app.require_login().await?;
            let (wallet, withdrawals) = tokio::try_join!(app.market.wallet(), app.market.withdrawals())?;
            print!("{}", render::wallet(&wallet, &withdrawals));
            Ok(())
        }
        Command::Withdraw { amount, method, account } => withdraw(app, amount, &method, account).await,
        Command::News(cmd) => news(app, cmd).await,
        Command::Newsletter(cmd) => newsletter(app, cmd).await,
        Command::Overview => overview(app).await,
    }
}

async fn login(app: &mut App, email: Option<String>, remember: bool) -> Result<()> {
    let email = match email.or_else(|| app.config.last_username.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = match App::remembered_password(&email) {
        Some(password) if !remember => {
            debug!("Using remembered password");
            password
        }
        _ => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let user = app.login(&email, &password, remember).await?;
    println!("Signed in as {}.", user.display_name());
    Ok(())
}

async fn ads(app: &mut App, cmd: AdsCommand) -> Result<()> {
    match cmd {
        AdsCommand::Search(args) => search(app, args).await,
        AdsCommand::Show { id } => {
            let ad = app.market.ad(id).await?;
            print!("{}", render::ad_detail(&ad.value, app.market.config()));
            Ok(())
        }
        AdsCommand::Suggest { text: Some(text) } => {
            // Suggestions go through the quiet caller, so failures are reported here.
            let items = match app.market.suggestions(&text).await {
                Ok(items) => items,
                Err(e) => bail!("Suggestions unavailable: {}", e.user_message()),
            };
            for suggestion in items {
                println!("{}", suggestion);
            }
            Ok(())
        }
        AdsCommand::Suggest { text: None } => suggest_interactively(app).await,
        AdsCommand::Post {
            title,
            description,
            price,
            category,
            location,
        } => {
            app.require_login().await?;
            let draft = AdDraft {
                title,
                description,
                price,
                category,
                location,
            };
            let ad = app.market.create_ad(&draft).await?;
            println!("Posted ad #{}: {}", ad.id, app.market.config().ad_link(ad.id));
            Ok(())
        }
        AdsCommand::Delete { id } => {
            app.require_login().await?;
            app.market.delete_ad(id).await?;
            println!("Deleted ad #{}.", id);
            Ok(())
        }
    }
}

async fn search(app: &mut App, args: SearchArgs) -> Result<()> {
    let sort = match args.sort.as_deref() {
        Some(s) => AdSort::parse(s).with_context(|| format!("Unknown sort order: {}", s))?,
        None => AdSort::default(),
    };
    let query = AdQuery {
        search: args.query,
        category: args.category,
        location: args.location,
        min_price: args.min_price,
        max_price: args.max_price,
        sort,
        page: args.page,
        ..AdQuery::default()
    };

    match app.market.search_ads(&query).await {
        Ok(fetched) => {
            if fetched.is_stale_fallback() {
                print!("{}", render::alert(&InlineAlert::rate_limited()));
            }
            print!("{}", render::ad_list(&fetched.value, app.market.config()));
            Ok(())
        }
        // Throttling on the listing gets a banner, never a toast.
        Err(e) if e.is_rate_limited() => {
            print!("{}", render::alert(&InlineAlert::rate_limited()));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Each stdin line is one keystroke's worth of search-box text.
async fn suggest_interactively(app: &mut App) -> Result<()> {
    let (query_tx, query_rx) = mpsc::channel(SUGGEST_CHANNEL_SIZE);
    let (out_tx, mut out_rx) = mpsc::channel(SUGGEST_CHANNEL_SIZE);

    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if query_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    let market = &app.market;
    let debouncer = SuggestionDebouncer::default();
    let debounce = debouncer.run(query_rx, out_tx, |q| async move { market.suggestions(&q).await });
    let printer = async {
        while let Some(suggestions) = out_rx.recv().await {
            if suggestions.items.is_empty() {
                continue;
            }
            println!("{}:", suggestions.query);
            for item in suggestions.items {
                println!("  {}", item);
            }
        }
    };
    tokio::join!(debounce, printer);
    Ok(())
}

async fn boost(app: &mut App, cmd: BoostCommand) -> Result<()> {
    app.require_login().await?;
    match cmd {
        BoostCommand::Pricing { ad_id } => {
            let pricing = app.market.boost_pricing(ad_id).await?;
            print!("{}", render::boost_pricing(&pricing.value));
        }
        BoostCommand::Buy { ad_id, plan_id } => {
            let order = app.market.boost_ad(ad_id, plan_id).await?;
            match order.expires_at {
                Some(expires) => println!("Ad #{} boosted until {}.", order.ad_id, expires),
                None => println!("Ad #{} boosted.", order.ad_id),
            }
        }
    }
    Ok(())
}

async fn messages(app: &mut App, conversation: Option<i64>, send: Option<String>) -> Result<()> {
    let me = app.require_login().await?;
    let Some(id) = conversation else {
        print!("{}", render::conversations(&app.market.conversations().await?));
        return Ok(());
    };
    if let Some(text) = send {
        app.market.send_message(id, &text).await?;
    }
    print!("{}", render::messages(&app.market.messages(id).await?, Some(&me)));
    Ok(())
}

async fn notifications(app: &mut App, watch: bool, read: Option<i64>) -> Result<()> {
    app.require_login().await?;
    if let Some(id) = read {
        app.market.mark_read(id).await?;
        println!("Marked #{} as read.", id);
        return Ok(());
    }
    if !watch {
        print!("{}", render::notifications(&app.market.notifications().await?));
        return Ok(());
    }

    println!("Watching for notifications, Ctrl-C to stop.");
    let cancel = CancelToken::new();
    let watcher = NotificationWatcher::default();
    let mut last = None;
    let on_count = |count: bazaar_core::models::UnreadCount| {
        if last != Some(count.unread) {
            println!("{} unread", count.unread);
            last = Some(count.unread);
        }
    };
    tokio::select! {
        _ = watcher.run(&app.market, &cancel, on_count) => {
            println!("Session ended.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            cancel.cancel();
        }
    }
    Ok(())
}

async fn books(app: &mut App, cmd: BooksCommand) -> Result<()> {
    match cmd {
        BooksCommand::List => {
            let books = app.market.books().await?;
            print!("{}", render::books(&books.value));
        }
        BooksCommand::Download { id, output } => {
            app.require_login().await?;
            let dest = output.unwrap_or_else(|| PathBuf::from(format!("book-{}.pdf", id)));
            let size = app.market.download_book(id, &dest).await?;
            println!("Saved {} ({}).", dest.display(), format_bytes(size));
        }
        BooksCommand::Upload {
            file,
            title,
            author,
            price,
            description,
            category,
        } => {
            app.require_login().await?;
            let bytes = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "book".to_string());

            let mut upload = BookUpload::new();
            upload.title = title;
            upload.author = author;
            upload.price = price;
            upload.description = description;
            upload.category = category;
            upload.attach(filename, bytes);

            while upload.step() != UploadStep::Review {
                let step = upload.step();
                upload.advance().map_err(ActionError::from)?;
                debug!(step = step.title(), "Upload step complete");
            }
            println!("Uploading {}...", format_bytes(upload.file().map_or(0, |f| f.bytes.len() as u64)));
            let book = app.market.upload_book(upload).await?;
            println!("Listed \"{}\" as book #{}.", book.title, book.id);
        }
    }
    Ok(())
}

async fn withdraw(app: &mut App, amount: f64, method: &str, account: String) -> Result<()> {
    app.require_login().await?;
    let Some(method) = PayoutMethod::parse(method) else {
        bail!("Unknown payout method: {} (use bank or mobile-money)", method);
    };
    let wallet = app.market.wallet().await?;
    let request = WithdrawalRequest {
        amount,
        method,
        account,
    };
    let withdrawal = app.market.request_withdrawal(&wallet, &request).await?;
    println!(
        "Withdrawal #{} of {} requested.",
        withdrawal.id,
        format_money(withdrawal.amount, wallet.currency.as_deref())
    );
    Ok(())
}

async fn news(app: &mut App, cmd: NewsCommand) -> Result<()> {
    match cmd {
        NewsCommand::List => print!("{}", render::news(&app.market.news().await?)),
        NewsCommand::Publish { title, body } => {
            app.require_login().await?;
            let item = app.market.publish_news(&NewsDraft { title, body }).await?;
            println!("Published news #{}.", item.id);
        }
        NewsCommand::Delete { id } => {
            app.require_login().await?;
            app.market.delete_news(id).await?;
            println!("Deleted news #{}.", id);
        }
    }
    Ok(())
}

async fn newsletter(app: &mut App, cmd: NewsletterCommand) -> Result<()> {
    app.require_login().await?;
    match cmd {
        NewsletterCommand::Send { subject, body } => {
            let receipt = app.market.send_newsletter(&NewsletterDraft { subject, body }).await?;
            println!("Newsletter sent to {} subscribers.", receipt.sent);
        }
        NewsletterCommand::Subscribers => {
            for subscriber in app.market.newsletter_subscribers().await? {
                println!("{}", subscriber.email);
            }
        }
    }
    Ok(())
}

/// Independent panels load concurrently; one failing does not hide the rest.
async fn overview(app: &mut App) -> Result<()> {
    let user = app.require_login().await?;
    let market = &app.market;
    let (wallet, unread, conversations, books) = futures::join!(
        market.wallet(),
        market.unread_count(),
        market.conversations(),
        market.books(),
    );

    println!("Signed in as {}\n", user.display_name());
    match wallet {
        Ok(w) => println!("Wallet:         {}", format_money(w.balance, w.currency.as_deref())),
        Err(e) => println!("Wallet:         unavailable ({})", e.user_message()),
    }
    match unread {
        Ok(c) => println!("Notifications:  {} unread", c.unread),
        Err(e) => println!("Notifications:  unavailable ({})", e.user_message()),
    }
    match conversations {
        Ok(list) => {
            let unread: u32 = list.iter().map(|c| c.unread).sum();
            println!("Messages:       {} conversations, {} unread", list.len(), unread);
        }
        Err(e) => println!("Messages:       unavailable ({})", e.user_message()),
    }
    match books.map(|b: Fetched<_>| b.value) {
        Ok(list) => {
            let owned = list.iter().filter(|b| b.purchased).count();
            println!("Library:        {} books, {} owned", list.len(), owned);
        }
        Err(e) => println!("Library:        unavailable ({})", e.user_message()),
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("No email given");
    }
    Ok(value)
}
