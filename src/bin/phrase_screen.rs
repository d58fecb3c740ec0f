//! Terminal front end for the phrase-of-the-day screen.
//!
//! Commands: `p` previous day, `n` next day, `t` today, `e` explain,
//! `c` collapse/expand, `r` refresh, `l <en|vi|de>` language, `q` quit.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use daily_phrase::config::Config;
use daily_phrase::logging::init_tracing;
use daily_phrase::phrases::Lang;
use daily_phrase::screen::{NavigationCommand, PhraseNavigator, PhraseScreen, ScreenCommand, ScreenView};
use daily_phrase::services::explanation_client::HttpExplanationFetcher;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log);

    let resolver = match config.resolver() {
        Ok(resolver) => resolver,
        Err(err) => {
            tracing::error!(error = %err, "failed to load phrase data");
            std::process::exit(1);
        }
    };

    let navigator = match PhraseNavigator::new(resolver, config.target_lang) {
        Ok(navigator) => navigator,
        Err(err) => {
            tracing::error!(error = %err, "failed to resolve today's phrase");
            std::process::exit(1);
        }
    };
    let fetcher = Arc::new(HttpExplanationFetcher::new(&config.explain_base_url, config.explain_timeout));
    let (handle, task) = PhraseScreen::spawn(navigator, fetcher);

    let mut views = handle.subscribe();
    let mut notices = handle.notices();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    print_view(&views.borrow_and_update());
                }
                Ok(notice) = notices.recv() => {
                    if let Some(message) = notice.message {
                        println!("! {message}");
                    }
                }
            }
        }
    });

    print_view(&handle.current());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some("p") => ScreenCommand::Navigate(NavigationCommand::Previous),
            Some("n") => ScreenCommand::Navigate(NavigationCommand::Next),
            Some("t") => ScreenCommand::Navigate(NavigationCommand::Today),
            Some("e") => ScreenCommand::RequestExplanation,
            Some("c") => ScreenCommand::ToggleCollapsed,
            Some("r") => ScreenCommand::Refresh,
            Some("l") => match parts.next().map(str::parse::<Lang>) {
                Some(Ok(lang)) => ScreenCommand::SetTargetLang(lang),
                _ => {
                    println!("usage: l <en|vi|de>");
                    continue;
                }
            },
            Some("q") => ScreenCommand::Shutdown,
            _ => continue,
        };
        if handle.send(command).is_err() || command == ScreenCommand::Shutdown {
            break;
        }
    }

    let _ = handle.shutdown();
    match task.await {
        Ok(Err(err)) => tracing::error!(error = %err, "screen stopped"),
        Err(err) => tracing::error!(error = %err, "screen task panicked"),
        Ok(Ok(())) => {}
    }
}

fn print_view(view: &ScreenView) {
    let record = &view.record;
    println!();
    println!("{} ({:+} days)", view.date, view.offset_days);
    println!("  {}", record.phrase);
    println!("  {}", record.meaning);
    if let Some(translation) = record.translation(view.target_lang) {
        println!("  [{}] {translation}", view.target_lang);
    }
    println!("  e.g. {}", record.example);
    if view.loading {
        println!("  loading explanation...");
    } else if !view.collapsed {
        if let Some(text) = record.explanation_for(view.target_lang) {
            println!("  > {text}");
        }
    }
    if let Some(notice) = &view.notice {
        println!("  ! {notice}");
    }
}
