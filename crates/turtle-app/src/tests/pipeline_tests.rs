//! Background service, page agent and toggle wired together over the bridge

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use turtle_config::Config;
use turtle_dom::Document;
use turtle_types::Badge;

use super::support::{answer_checker, type_word};
use crate::board::GameBoard;
use crate::bridge::background_channel;
use crate::events::event_loop;
use crate::page::Tab;
use crate::presenter::{MARKER_CLASS, MARKER_WORD_ATTRIBUTE};
use crate::state::AppState;
use crate::toggle::ActivationToggle;

#[tokio::test(start_paused = true)]
async fn typed_used_word_is_marked_through_the_background() {
    let state = Arc::new(AppState::new(Config::default()));
    let cancel = CancellationToken::new();
    let (background, requests) = background_channel(8);
    let service = tokio::spawn(event_loop(
        state.clone(),
        answer_checker(&["mango"]),
        requests,
        cancel.child_token(),
    ));

    let doc = Document::new();
    let mut board = GameBoard::new(&doc, "crane");
    let tab = Tab::new(
        "https://www.nytimes.com/games/wordle/index.html",
        doc.clone(),
        Config::default(),
        background,
        cancel.child_token(),
    );
    tab.inject().await.unwrap();

    let toggle = ActivationToggle::new(state.clone());
    assert_eq!(toggle.toggle(&tab).await, Badge::On);

    type_word(&mut board, "MANGO");
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let body = doc.body();
    assert!(doc.has_class(body, MARKER_CLASS));
    assert_eq!(
        doc.attribute(body, MARKER_WORD_ATTRIBUTE).as_deref(),
        Some("mango")
    );

    let checks = state.status.checks.read().await.clone();
    assert_eq!(checks.check_count, 1);
    assert_eq!(checks.used_count, 1);
    assert_eq!(checks.last_word.as_deref(), Some("mango"));

    tab.close().await;
    cancel.cancel();
    service.await.unwrap().unwrap();
}
