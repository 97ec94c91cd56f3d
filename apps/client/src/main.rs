use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autointern::api_client::ApiClient;
use autointern::config::Config;
use autointern::i18n::LocalizationManager;
use autointern::session::{FileTokenStore, SessionManager, SessionStatus};
use autointern::state::AppState;
use autointern::view::{render_current, select_screen, Dashboard, LoginScreen, Screen};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so they don't interleave with the rendered screens.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Auto Intern client v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", config.api_url);

    let api = Arc::new(ApiClient::new(config.api_url.clone(), config.http_timeout)?);
    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));

    let session = SessionManager::new(store, api.clone());
    let i18n = LocalizationManager::new(api.clone(), &config.default_language, config.fetch_ordering);
    info!("Translation fetch ordering: {:?}", i18n.ordering());

    let state = AppState::builder()
        .auth_api(api.clone())
        .jobs_api(api)
        .session(session.clone())
        .localization(i18n.clone())
        .build()?;

    let mut login = LoginScreen::new(state.clone());
    let mut dashboard = Dashboard::new();
    let mut session_rx = session.subscribe();
    let mut i18n_rx = i18n.subscribe();

    // Show the loading screen while the stored token and first table resolve.
    println!("{}\n", render_current(&state, &login, &dashboard).render());
    state.start().await;

    let mut shown = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        // Everything up to now is about to be drawn.
        session_rx.borrow_and_update();
        i18n_rx.borrow_and_update();

        let screen = select_screen(session.current_session().status());
        if screen == Screen::MainShell && shown != Some(Screen::MainShell) {
            dashboard.load(&state).await;
        }
        shown = Some(screen);
        println!("{}", render_current(&state, &login, &dashboard).render());
        println!("{}", help_line(screen));

        tokio::select! {
            Ok(()) = session_rx.changed() => {}
            Ok(()) = i18n_rx.changed() => {}
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(&state, &mut login, &mut dashboard, screen, line.trim()).await {
                    break;
                }
            }
        }
    }

    info!("Client shutting down");
    Ok(())
}

/// Runs one typed command. Returns false when the user asked to quit.
async fn handle_command(
    state: &AppState,
    login: &mut LoginScreen,
    dashboard: &mut Dashboard,
    screen: Screen,
    line: &str,
) -> bool {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match (screen, parts.as_slice()) {
        (_, ["quit"] | ["exit"]) => return false,
        (_, ["lang", code]) => {
            tokio::spawn(state.i18n.set_language(code));
        }
        (Screen::Login, ["login", email, password]) => {
            login.submit(email, password).await;
        }
        (Screen::Login, ["signup", name, email, password]) => {
            login.signup(name, email, password).await;
        }
        (Screen::Login, ["github"]) => {
            if let Some(url) = login.github_login().await {
                println!("Open this URL to continue with GitHub:\n  {url}");
            }
        }
        (Screen::MainShell, ["logout"]) => state.session.sign_out().await,
        (Screen::MainShell, ["refresh"]) => dashboard.load(state).await,
        (_, []) => {}
        _ => println!("Unknown command: {line}"),
    }
    if state.session.current_session().status() == SessionStatus::Anonymous {
        *dashboard = Dashboard::new();
    }
    true
}

fn help_line(screen: Screen) -> &'static str {
    match screen {
        Screen::Loading => "",
        Screen::Login => "> login | signup | github | lang <code> | quit",
        Screen::MainShell => "> refresh | logout | lang <code> | quit",
    }
}
