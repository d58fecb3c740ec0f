pub mod driver;
pub mod navigator;

pub use driver::{NoticeKind, PhraseScreen, ScreenClosed, ScreenCommand, ScreenHandle, ScreenNotice};
pub use navigator::{
    ExplanationOutcome, ExplanationTicket, NavigationCommand, PhraseNavigator, ScreenView,
};
