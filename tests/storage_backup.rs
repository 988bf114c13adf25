// Load/save behaviour of the schedule file, its backup slot and config.json.
use daymark::StorageError;
use daymark::config::Config;
use daymark::context::{AppContext, TestContext};
use daymark::model::{DateTimeType, RawFields, Schedule, Temporal};
use daymark::storage::{BackupStatus, LocalStorage};
use serde_json::{Value, json};
use std::fs;

fn make(id: &str, token: &str, title: &str, memo: &str) -> Schedule {
    let mut s = Schedule::new(Temporal::parse(token).unwrap(), title, memo);
    s.id = id.to_string();
    s
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_load_without_file_is_empty() {
    let ctx = TestContext::new();
    let loaded = LocalStorage::load(&ctx).unwrap();
    assert!(loaded.is_empty());
    assert!(!ctx.get_schedule_path().unwrap().exists());
}

#[test]
fn test_save_then_load_round_trip() {
    let ctx = TestContext::new();
    let schedules = vec![
        make("bbb22222", "260219_1400~", "午後作業", "コーディング"),
        make("aaa11111", "~260219_0900", "朝会", ""),
    ];

    let outcome = LocalStorage::save(&ctx, &schedules).unwrap();
    assert_eq!(outcome.backup, BackupStatus::Skipped);

    let loaded = LocalStorage::load(&ctx).unwrap();
    assert_eq!(loaded, schedules);
    assert_eq!(loaded[0].kind(), DateTimeType::From);
    assert_eq!(loaded[1].kind(), DateTimeType::Until);
}

#[test]
fn test_saved_document_shape() {
    let ctx = TestContext::new();
    let mut s = make("abc12345", "~260219_1430", "会議", "メモ");
    s.created_at = Temporal::parse("260218_0900").unwrap().instant;
    LocalStorage::save(&ctx, &[s]).unwrap();

    let path = ctx.get_schedule_path().unwrap();
    assert_eq!(
        read_json(&path),
        json!({
            "schedules": [{
                "id": "abc12345",
                "date_time": "~260219_1430",
                "date_time_type": "until",
                "title": "会議",
                "memo": "メモ",
                "created_at": "260218_0900"
            }]
        })
    );

    let raw = fs::read_to_string(&path).unwrap();
    // Unicode is written as-is, fields in canonical order.
    assert!(raw.contains("会議"));
    assert!(!raw.contains("\\u"));
    let keys = [
        "\"id\"",
        "\"date_time\"",
        "\"date_time_type\"",
        "\"title\"",
        "\"memo\"",
        "\"created_at\"",
    ];
    let order: Vec<usize> = keys.iter().map(|k| raw.find(k).unwrap()).collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_two_saves_keep_exactly_one_previous_generation() {
    let ctx = TestContext::new();
    let path = ctx.get_schedule_path().unwrap();
    fs::write(&path, r#"{"schedules": []}"#).unwrap();

    let a = vec![make("first111", "260219_0900", "最初", "")];
    let b = vec![make("second22", "260219_1400", "次", "")];

    let first = LocalStorage::save(&ctx, &a).unwrap();
    assert!(matches!(first.backup, BackupStatus::Created(_)));
    let a_bytes = fs::read(&path).unwrap();

    let second = LocalStorage::save(&ctx, &b).unwrap();
    let bak = LocalStorage::backup_path(&path);
    assert_eq!(second.backup, BackupStatus::Created(bak.clone()));
    assert_eq!(bak.file_name().unwrap(), "schedules.json.bak");

    assert_eq!(fs::read(&bak).unwrap(), a_bytes);
    assert_eq!(LocalStorage::load_backup(&ctx).unwrap(), a);
    assert_eq!(LocalStorage::load(&ctx).unwrap(), b);
}

#[test]
fn test_restore_swaps_generations() {
    let ctx = TestContext::new();
    let a = vec![make("first111", "260219_0900", "A", "")];
    let b = vec![make("second22", "260219_1400", "B", "")];
    LocalStorage::save(&ctx, &a).unwrap();
    LocalStorage::save(&ctx, &b).unwrap();

    LocalStorage::restore_backup(&ctx).unwrap();
    assert_eq!(LocalStorage::load(&ctx).unwrap(), a);
    assert_eq!(LocalStorage::load_backup(&ctx).unwrap(), b);
}

#[test]
fn test_restore_without_backup_fails() {
    let ctx = TestContext::new();
    assert!(LocalStorage::restore_backup(&ctx).is_err());
}

#[test]
fn test_unknown_fields_are_dropped() {
    let ctx = TestContext::new();
    let path = ctx.get_schedule_path().unwrap();
    fs::write(
        &path,
        r#"{
            "schedules": [{
                "id": "abc12345",
                "date_time": "260219_1430",
                "date_time_type": "exact",
                "title": "会議",
                "memo": "",
                "created_at": "260218_0900",
                "color": "red",
                "priority": 3
            }],
            "generator": "someone else"
        }"#,
    )
    .unwrap();

    let loaded = LocalStorage::load(&ctx).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "会議");

    LocalStorage::save(&ctx, &loaded).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("color"));
    assert!(!raw.contains("generator"));
}

#[test]
fn test_missing_optional_fields_get_defaults() {
    let ctx = TestContext::new();
    let path = ctx.get_schedule_path().unwrap();
    fs::write(
        &path,
        r#"{"schedules": [{"id": "x1", "date_time": "~260219_1430", "title": "t"}]}"#,
    )
    .unwrap();

    let loaded = LocalStorage::load(&ctx).unwrap();
    assert_eq!(loaded[0].memo, "");
    assert_eq!(loaded[0].kind(), DateTimeType::Until);
    // No stored creation stamp: the record's own instant stands in, every load.
    assert_eq!(loaded[0].created_at, loaded[0].instant());
    assert_eq!(LocalStorage::load(&ctx).unwrap(), loaded);
}

#[test]
fn test_corrupt_file_is_an_error_not_empty() {
    let ctx = TestContext::new();
    let path = ctx.get_schedule_path().unwrap();

    for content in ["{not json", r#"{"schedules": {"id": 1}}"#, "42"] {
        fs::write(&path, content).unwrap();
        let err = LocalStorage::load(&ctx).unwrap_err();
        let storage_err = err.downcast_ref::<StorageError>().unwrap();
        assert!(storage_err.is_corrupt(), "{content} should be corrupt");
    }
}

#[test]
fn test_malformed_token_in_file_is_corrupt() {
    let ctx = TestContext::new();
    let path = ctx.get_schedule_path().unwrap();
    fs::write(
        &path,
        r#"{"schedules": [{"id": "bad1", "date_time": "2602_1430", "title": "t"}]}"#,
    )
    .unwrap();

    let err = LocalStorage::load(&ctx).unwrap_err();
    let storage_err = err.downcast_ref::<StorageError>().unwrap();
    assert!(storage_err.is_corrupt());
    assert!(storage_err.to_string().contains("bad1"));
}

#[test]
fn test_validated_input_survives_persistence() {
    let ctx = TestContext::new();
    let raw = RawFields {
        title: Some("Submit report".to_string()),
        date_time: Some("260220_1700".to_string()),
        date_time_type: Some("until".to_string()),
        memo: Some("PDF".to_string()),
    };
    let s = raw.into_schedule().unwrap();
    LocalStorage::save(&ctx, std::slice::from_ref(&s)).unwrap();

    let loaded = LocalStorage::load(&ctx).unwrap();
    assert_eq!(loaded, vec![s]);
    assert_eq!(loaded[0].date_time(), "~260220_1700");
}

#[test]
fn test_config_absent_means_empty() {
    let ctx = TestContext::new();
    assert!(Config::load(&ctx).unwrap().is_empty());
}

#[test]
fn test_config_round_trip_without_backup() {
    let ctx = TestContext::new();
    let mut config = Config::new();
    config.set("theme", "dark");
    config.set("language", "ja");
    config.save(&ctx).unwrap();

    config.set("theme", "light");
    config.save(&ctx).unwrap();

    let loaded = Config::load(&ctx).unwrap();
    assert_eq!(loaded.get_str("theme"), Some("light"));
    assert_eq!(loaded.len(), 2);

    let path = ctx.get_config_path().unwrap();
    assert!(!LocalStorage::backup_path(&path).exists());
    assert_eq!(path.parent(), ctx.get_schedule_path().unwrap().parent());
}

#[test]
fn test_config_not_an_object_is_an_error() {
    let ctx = TestContext::new();
    fs::write(ctx.get_config_path().unwrap(), "[1, 2]").unwrap();
    assert!(Config::load(&ctx).is_err());
}
