//! Wiring shared by every command: config, persisted session and the
//! marketplace client.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info, warn};

use bazaar_core::auth::{CredentialStore, Session};
use bazaar_core::cache::{MemoryCacheStore, SystemClock};
use bazaar_core::models::User;
use bazaar_core::notify::{Level, Notification, Notifier};
use bazaar_core::{AuthContext, ClientFactory, Config, Marketplace};

/// Prints notifications to stderr, where they don't mix with command output.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Error => eprintln!("error: {}", notification.message),
            Level::Success => eprintln!("ok: {}", notification.message),
            Level::Info => eprintln!("{}", notification.message),
        }
    }
}

pub struct App {
    pub config: Config,
    pub session: Session,
    pub market: Marketplace,
    user: Option<User>,
}

impl App {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        Self::with_config(Config::load()?, cache_dir)
    }

    pub fn with_config(config: Config, cache_dir: PathBuf) -> Result<Self> {
        let mut session = Session::new(cache_dir);
        if let Err(e) = session.load() {
            warn!(error = %e, "Ignoring unreadable session file");
        }

        // A stored token is sent with every request from the start;
        // `current_user` still checks it once before account commands.
        let factory = ClientFactory::new(config.api_config(), AuthContext::new());
        session.apply_to(factory.auth());

        // Responses are cached for this run only, never across accounts.
        let store = MemoryCacheStore::new();
        // Plain error: the notifier never saw this one.
        let market = Marketplace::new(&factory, Arc::new(ConsoleNotifier), Arc::new(store), Arc::new(SystemClock))
            .map_err(|e| anyhow!("Failed to set up the API client: {}", e))?;
        debug!(api = %factory.config().base_url, "App initialized");

        Ok(Self {
            config,
            session,
            market,
            user: None,
        })
    }

    /// Validate the stored session once per run.
    pub async fn current_user(&mut self) -> Option<&User> {
        if self.user.is_none() {
            self.user = self.market.restore(&mut self.session).await;
        }
        self.user.as_ref()
    }

    pub async fn require_login(&mut self) -> Result<User> {
        match self.current_user().await {
            Some(user) => Ok(user.clone()),
            None => bail!("Not logged in. Run `bazaar login` first."),
        }
    }

    pub async fn login(&mut self, email: &str, password: &str, remember: bool) -> Result<User> {
        let data = self.market.login(email, password).await?;
        let user = data.user.clone();

        self.session.update(data);
        self.session.save().context("Failed to save session")?;

        self.config.last_username = Some(email.trim().to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        if remember {
            CredentialStore::store(email.trim(), password)?;
            info!("Password saved to keychain");
        }

        self.user = Some(user.clone());
        Ok(user)
    }

    pub async fn logout(&mut self) -> Result<()> {
        // Token must be live for the server-side logout call.
        self.session.apply_to(self.market.auth());
        self.market.logout().await;
        self.session.clear().context("Failed to remove session file")?;
        self.user = None;

        if let Some(email) = self.config.last_username.as_deref() {
            if let Err(e) = CredentialStore::delete(email) {
                warn!(error = %e, "Failed to forget remembered password");
            }
        }
        Ok(())
    }

    /// Keychain password for `email`, if one was saved with `--remember`.
    pub fn remembered_password(email: &str) -> Option<String> {
        CredentialStore::get_password(email).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    use bazaar_core::auth::SessionData;
    use serde_json::json;

    use super::*;
    use crate::cli::{BooksCommand, Command};
    use crate::commands;

    /// Answers one request with an empty JSON list and hands back its head.
    fn serve_once() -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("http://{}", listener.local_addr().expect("addr"));
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).expect("read") == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let mut stream = stream;
            stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]")
                .expect("write");
            tx.send(head).expect("send");
        });
        (url, rx)
    }

    fn config(api_url: String) -> Config {
        Config {
            api_url: Some(api_url),
            app_url: Some("http://app.test".to_string()),
            last_username: None,
        }
    }

    fn save_session(dir: &std::path::Path, token: &str) {
        let user: User =
            serde_json::from_value(json!({ "id": 7, "name": "Kofi", "email": "kofi@example.com" })).expect("user");
        let mut session = Session::new(dir.to_path_buf());
        session.update(SessionData::new(token.to_string(), user));
        session.save().expect("save session");
    }

    #[tokio::test]
    async fn test_stored_token_sent_on_anonymous_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        save_session(dir.path(), "stored-token");
        let (url, requests) = serve_once();

        let mut app = App::with_config(config(url), dir.path().to_path_buf()).expect("app");
        assert_eq!(app.market.auth().token().as_deref(), Some("stored-token"));

        commands::run(&mut app, Command::Books(BooksCommand::List)).await.expect("books list");

        let head = requests.recv().expect("request seen").to_lowercase();
        assert!(head.starts_with("get /books "));
        assert!(head.contains("authorization: bearer stored-token"));
    }

    #[tokio::test]
    async fn test_no_session_sends_no_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (url, requests) = serve_once();

        let mut app = App::with_config(config(url), dir.path().to_path_buf()).expect("app");
        commands::run(&mut app, Command::Books(BooksCommand::List)).await.expect("books list");

        let head = requests.recv().expect("request seen").to_lowercase();
        assert!(!head.contains("authorization"));
    }

    #[test]
    fn test_responses_are_not_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        App::with_config(config("http://api.test".to_string()), dir.path().to_path_buf()).expect("app");

        assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
    }
}
