use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use super::navigator::{
    ExplanationOutcome, ExplanationTicket, NavigationCommand, PhraseNavigator, ScreenView,
};
use crate::phrases::{Lang, PhraseError};
use crate::services::explanation_client::{ExplanationFetcher, FetchError};

const NOTICE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCommand {
    Navigate(NavigationCommand),
    RequestExplanation,
    SetTargetLang(Lang),
    ToggleCollapsed,
    Refresh,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Applied,
    Discarded,
    Failed,
}

/// Reported to the display layer whenever a fetch settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenNotice {
    pub phrase: String,
    pub target_lang: Lang,
    pub kind: NoticeKind,
    pub message: Option<String>,
}

#[derive(Debug, Error)]
#[error("phrase screen has shut down")]
pub struct ScreenClosed;

/// Cloneable front end to a running `PhraseScreen`.
#[derive(Clone)]
pub struct ScreenHandle {
    commands: mpsc::UnboundedSender<ScreenCommand>,
    views: watch::Receiver<ScreenView>,
    notices: broadcast::Sender<ScreenNotice>,
}

impl ScreenHandle {
    pub fn send(&self, command: ScreenCommand) -> Result<(), ScreenClosed> {
        self.commands.send(command).map_err(|_| ScreenClosed)
    }

    pub fn navigate(&self, command: NavigationCommand) -> Result<(), ScreenClosed> {
        self.send(ScreenCommand::Navigate(command))
    }

    pub fn request_explanation(&self) -> Result<(), ScreenClosed> {
        self.send(ScreenCommand::RequestExplanation)
    }

    pub fn set_target_lang(&self, lang: Lang) -> Result<(), ScreenClosed> {
        self.send(ScreenCommand::SetTargetLang(lang))
    }

    pub fn toggle_collapsed(&self) -> Result<(), ScreenClosed> {
        self.send(ScreenCommand::ToggleCollapsed)
    }

    pub fn refresh(&self) -> Result<(), ScreenClosed> {
        self.send(ScreenCommand::Refresh)
    }

    pub fn shutdown(&self) -> Result<(), ScreenClosed> {
        self.send(ScreenCommand::Shutdown)
    }

    pub fn current(&self) -> ScreenView {
        self.views.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenView> {
        self.views.clone()
    }

    pub fn notices(&self) -> broadcast::Receiver<ScreenNotice> {
        self.notices.subscribe()
    }
}

type Completion = (ExplanationTicket, Result<String, FetchError>);

/// Event loop that owns a `PhraseNavigator`.
///
/// Commands and fetch completions are handled one at a time on a single
/// task; fetches run on their own tasks so navigation never waits on the
/// network.
pub struct PhraseScreen<F> {
    navigator: PhraseNavigator,
    fetcher: Arc<F>,
    commands: mpsc::UnboundedReceiver<ScreenCommand>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    views: watch::Sender<ScreenView>,
    notices: broadcast::Sender<ScreenNotice>,
}

impl<F> PhraseScreen<F>
where
    F: ExplanationFetcher + 'static,
{
    pub fn new(navigator: PhraseNavigator, fetcher: Arc<F>) -> (Self, ScreenHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (views, views_rx) = watch::channel(navigator.view());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        let handle = ScreenHandle {
            commands: commands_tx,
            views: views_rx,
            notices: notices.clone(),
        };
        let screen = Self {
            navigator,
            fetcher,
            commands,
            completions_tx,
            completions,
            views,
            notices,
        };
        (screen, handle)
    }

    pub fn spawn(
        navigator: PhraseNavigator,
        fetcher: Arc<F>,
    ) -> (ScreenHandle, JoinHandle<Result<(), PhraseError>>) {
        let (screen, handle) = Self::new(navigator, fetcher);
        (handle, tokio::spawn(screen.run()))
    }

    /// Runs until `Shutdown` or every handle is dropped. Catalog errors end
    /// the loop; fetch errors never do.
    pub async fn run(mut self) -> Result<(), PhraseError> {
        loop {
            let notice = tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(ScreenCommand::Shutdown) => break,
                    Some(command) => {
                        self.handle_command(command)?;
                        None
                    }
                },
                Some((ticket, result)) = self.completions.recv() => {
                    Some(self.handle_completion(ticket, result))
                }
            };

            self.views.send_replace(self.navigator.view());
            if let Some(notice) = notice {
                // no subscribers is fine
                let _ = self.notices.send(notice);
            }
        }
        tracing::debug!("phrase screen stopped");
        Ok(())
    }

    fn handle_command(&mut self, command: ScreenCommand) -> Result<(), PhraseError> {
        match command {
            ScreenCommand::Navigate(nav) => match self.navigator.navigate(nav) {
                Ok(true) => tracing::debug!(
                    offset_days = self.navigator.offset_days(),
                    phrase = %self.navigator.record().phrase,
                    "navigated"
                ),
                Ok(false) => {}
                Err(err) => reject(err)?,
            },
            ScreenCommand::RequestExplanation => {
                if let Some(ticket) = self.navigator.request_explanation() {
                    self.spawn_fetch(ticket);
                }
            }
            ScreenCommand::SetTargetLang(lang) => self.navigator.set_target_lang(lang),
            ScreenCommand::ToggleCollapsed => self.navigator.toggle_collapsed(),
            ScreenCommand::Refresh => {
                if let Err(err) = self.navigator.refresh() {
                    reject(err)?;
                }
            }
            ScreenCommand::Shutdown => {}
        }
        Ok(())
    }

    fn spawn_fetch(&self, ticket: ExplanationTicket) {
        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let request = ticket.request().clone();
            let fetch = tokio::spawn(async move { fetcher.fetch_explanation(&request).await });
            // a panicking fetcher still has to release the in-flight slot
            let result = match fetch.await {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        phrase = %ticket.request().phrase,
                        "explanation fetch aborted"
                    );
                    Err(FetchError::Aborted)
                }
            };
            // the receiver only goes away when the screen has stopped
            let _ = completions.send((ticket, result));
        });
    }

    fn handle_completion(
        &mut self,
        ticket: ExplanationTicket,
        result: Result<String, FetchError>,
    ) -> ScreenNotice {
        let phrase = ticket.request().phrase.clone();
        let target_lang = ticket.request().target_lang;

        let (kind, message) = match self.navigator.complete_explanation(ticket, result) {
            ExplanationOutcome::Applied => (NoticeKind::Applied, None),
            ExplanationOutcome::Stale => (NoticeKind::Discarded, None),
            ExplanationOutcome::Failed(err) => (NoticeKind::Failed, Some(err.user_notice().to_string())),
        };

        ScreenNotice {
            phrase,
            target_lang,
            kind,
            message,
        }
    }
}

/// Broken phrase data stops the screen; anything else is logged and ignored.
fn reject(err: PhraseError) -> Result<(), PhraseError> {
    if err.is_data_integrity() {
        tracing::error!(error = %err, "phrase data is broken");
        return Err(err);
    }
    tracing::warn!(error = %err, "screen command rejected");
    Ok(())
}
