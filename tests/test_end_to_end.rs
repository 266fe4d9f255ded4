//! Full pipeline over captured posts on disk: source list → directory source
//! → cashtag filter → classifier → journal.

mod common;

use common::{ScriptedClassifier, FRIDAY};
use std::sync::Arc;
use tradejournal::application::dispatcher::DispatcherConfig;
use tradejournal::application::source_list::SourceList;
use tradejournal::domain::error::RunError;
use tradejournal::domain::values::clock::ReferenceClock;
use tradejournal::infrastructure::sources::directory::DirectoryPostSource;
use tradejournal::TradeJournal;

#[tokio::test]
async fn test_run_once_over_directory_source() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts");
    std::fs::create_dir(&posts).unwrap();
    std::fs::write(
        posts.join("RepAlpha.txt"),
        "Just bought $NVDA ahead of earnings\nThanks for coming to the town hall!\n",
    )
    .unwrap();
    std::fs::write(
        posts.join("SenBeta.json"),
        r#"[{"author":"Sen. Beta","text":"Sold my entire $XOM stake"}]"#,
    )
    .unwrap();
    let handles = dir.path().join("handles.txt");
    std::fs::write(&handles, "RepAlpha\n\nSenBeta\nGhostAccount\n").unwrap();

    let classifier = ScriptedClassifier::new(FRIDAY).reply(
        "Sold my entire $XOM stake",
        r#"```json
{"member_name":"Sen. Beta","company_traded":"$XOM","trade_direction":"bad","trade_magnitude":9}
```"#,
    );
    let app = TradeJournal::with_providers(
        &dir.path().join("congress_trades.json"),
        ReferenceClock::market(),
        Arc::new(DirectoryPostSource::new(&posts)),
        Arc::new(classifier),
        DispatcherConfig::default(),
    );

    let outcome = app.run_once(&SourceList::new(&handles), 5).await.unwrap();

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.errors[0].source_id, "GhostAccount");
    assert_eq!(outcome.posts_fetched, 3);
    assert_eq!(outcome.posts_classified, 2);
    assert_eq!(outcome.signals_recorded, 2);

    let journal = app.journal().unwrap();
    assert_eq!(journal.trading_sessions.len(), 1);
    let session = &journal.trading_sessions[0];
    assert_eq!(session.date.to_string(), "2026-10-16");
    let xom = session
        .analyses
        .iter()
        .find(|a| a.company_traded == "$XOM")
        .unwrap();
    assert_eq!(xom.trade_magnitude.value(), 9);
    assert_eq!(xom.tweet_text, "Sold my entire $XOM stake");
    assert_eq!(xom.timestamp, FRIDAY);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["signals_recorded"], 2);
}

#[tokio::test]
async fn test_run_once_without_sources_fails() {
    let dir = tempfile::tempdir().unwrap();
    let handles = dir.path().join("handles.txt");
    std::fs::write(&handles, "\n\n").unwrap();
    let app = TradeJournal::with_providers(
        &dir.path().join("journal.json"),
        ReferenceClock::market(),
        Arc::new(DirectoryPostSource::new(dir.path())),
        Arc::new(ScriptedClassifier::new(FRIDAY)),
        DispatcherConfig::default(),
    );

    let err = app.run_once(&SourceList::new(&handles), 5).await.unwrap_err();
    assert!(matches!(err, RunError::NoSources(_)));
    // The journal is still initialized.
    assert!(app.journal().unwrap().trading_sessions.is_empty());
    assert!(dir.path().join("journal.json").exists());
}
