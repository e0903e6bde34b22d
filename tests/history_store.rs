use std::path::PathBuf;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use zakatinator::prelude::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("zakatinator-test-{}", uuid::Uuid::new_v4().simple()))
        .join(name)
}

fn stamped_result() -> CalculationResult {
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let settings = ZakatSettings::new(Currency::Eur, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    let rates = ExchangeRates::eur_defaults();
    let prices = MetalPrices::new(60, 0.7).unwrap();
    let inventory = vec![
        InventoryItem::new("Savings", AssetType::Cash)
            .with_amount(20_000, Currency::Eur)
            .unwrap(),
    ];
    let snapshot = ZakatCalculator::new(&settings, &rates, &prices)
        .as_of(today)
        .calculate(&inventory, &[])
        .expect("Calculation failed");
    CalculationResult::stamp(snapshot)
}

#[test]
fn missing_file_loads_empty_history() {
    let store = HistoryStore::new(temp_path("history.json"));
    let history = store.load().expect("load");
    assert_eq!(history, ZakatHistory::default());
}

#[test]
fn save_and_reload_with_payments() {
    let path = temp_path("nested/dir/history.json");
    let store = HistoryStore::new(&path);

    let result = stamped_result();
    let id = result.id.clone();
    assert_eq!(result.snapshot.zakat_due, dec!(500.00));

    let mut history = store.load().unwrap();
    assert!(history.ensure_saved(result.clone()));
    assert!(!history.ensure_saved(result));
    history
        .add_payment(
            PaymentDraft::new(&id, 200, Currency::Eur)
                .unwrap()
                .paid_on(Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap())
                .with_notes("Local mosque"),
        )
        .unwrap();
    store.save(&history).expect("save");
    assert!(path.exists());

    let reloaded = store.load().expect("reload");
    assert_eq!(reloaded, history);
    assert_eq!(reloaded.calculations.len(), 1);
    assert_eq!(reloaded.total_paid(&id), dec!(200));
    assert_eq!(reloaded.outstanding(&id), Some(dec!(300)));

    let payment = reloaded.payments_for(&id).next().unwrap();
    assert_eq!(payment.notes, "Local mosque");
    assert_eq!(payment.paid_date, Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap());

    let _ = std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap().parent().unwrap());
}

#[test]
fn corrupt_file_is_storage_error() {
    let path = temp_path("history.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let err = HistoryStore::new(&path).load().unwrap_err();
    assert!(matches!(err, ZakatError::Storage(_)));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn stored_json_uses_camel_case_keys() {
    let path = temp_path("history.json");
    let store = HistoryStore::new(&path);

    let mut history = ZakatHistory::new();
    let result = stamped_result();
    let id = result.id.clone();
    history.ensure_saved(result);
    history.add_payment(PaymentDraft::new(&id, 10, Currency::Eur).unwrap()).unwrap();
    store.save(&history).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"calculationId\""));
    assert!(raw.contains("\"paidDate\""));
    assert!(raw.contains("\"zakatDue\""));
    assert!(raw.contains("\"dueDate\""));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
