mod common;

use chrono::NaiveDate;
use common::{signal, FRIDAY, MONDAY};
use std::sync::Arc;
use tradejournal::domain::ports::journal_store::JournalStore;
use tradejournal::domain::values::clock::ReferenceClock;
use tradejournal::infrastructure::journal::json_file::JsonFileJournal;

fn setup() -> (tempfile::TempDir, JsonFileJournal) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileJournal::open(dir.path().join("congress_trades.json"), ReferenceClock::market()).unwrap();
    (dir, store)
}

#[test]
fn test_same_day_signals_share_one_session() {
    let (_dir, store) = setup();

    store.append(signal("$AAPL", FRIDAY)).unwrap();
    store.append(signal("$MSFT", "Friday, October 16, 2026 03:59:00 PM EDT")).unwrap();

    let journal = store.load().unwrap();
    assert_eq!(journal.trading_sessions.len(), 1);
    let session = &journal.trading_sessions[0];
    assert_eq!(session.date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    let companies: Vec<&str> = session.analyses.iter().map(|a| a.company_traded.as_str()).collect();
    assert_eq!(companies, vec!["$AAPL", "$MSFT"]);
}

#[test]
fn test_new_day_opens_second_session_and_leaves_first_untouched() {
    let (_dir, store) = setup();

    store.append(signal("$AAPL", FRIDAY)).unwrap();
    store.append(signal("$MSFT", FRIDAY)).unwrap();
    let before = store.load().unwrap().trading_sessions[0].clone();

    store.append(signal("$NVDA", MONDAY)).unwrap();

    let journal = store.load().unwrap();
    assert_eq!(journal.trading_sessions.len(), 2);
    assert_eq!(journal.trading_sessions[0], before);
    let monday = &journal.trading_sessions[1];
    assert_eq!(monday.date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    assert_eq!(monday.analyses.len(), 1);
    assert_eq!(monday.analyses[0].company_traded, "$NVDA");
    assert!(!monday.market_open_time.is_empty());
}

#[test]
fn test_concurrent_appends_lose_nothing() {
    let (_dir, store) = setup();
    let store = Arc::new(store);
    const N: usize = 24;

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || store.append(signal(&format!("$T{i}"), FRIDAY)))
        })
        .collect();
    for h in handles {
        h.join().unwrap().unwrap();
    }

    let journal = store.load().unwrap();
    assert_eq!(journal.trading_sessions.len(), 1);
    let analyses = &journal.trading_sessions[0].analyses;
    assert_eq!(analyses.len(), N);
    for i in 0..N {
        let company = format!("$T{i}");
        assert_eq!(
            analyses.iter().filter(|a| a.company_traded == company).count(),
            1,
            "{company} missing or duplicated"
        );
    }
}

#[test]
fn test_file_is_valid_json_after_every_append() {
    let (dir, store) = setup();
    let path = dir.path().join("congress_trades.json");

    for i in 0..5 {
        store.append(signal(&format!("$S{i}"), FRIDAY)).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["trading_sessions"][0]["analyses"].as_array().unwrap().len(), i + 1);
    }
}

#[test]
fn test_reads_journal_written_by_hand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.json");
    std::fs::write(
        &path,
        r#"{
  "trading_sessions": [
    {
      "date": "2026-10-16",
      "market_open_time": "Friday, October 16, 2026 09:30:00 AM EDT",
      "analyses": [
        {
          "member_name": "Sen. Example",
          "company_traded": "$XOM",
          "trade_direction": "bad",
          "trade_magnitude": 8,
          "tweet_text": "Dumped $XOM",
          "timestamp": "Friday, October 16, 2026 09:30:00 AM EDT"
        }
      ]
    }
  ]
}"#,
    )
    .unwrap();

    let store = JsonFileJournal::open(&path, ReferenceClock::market()).unwrap();
    store.append(signal("$CVX", FRIDAY)).unwrap();

    let journal = store.load().unwrap();
    assert_eq!(journal.trading_sessions.len(), 1);
    assert_eq!(journal.trading_sessions[0].analyses.len(), 2);
    assert_eq!(journal.trading_sessions[0].analyses[0].trade_magnitude.value(), 8);
}
