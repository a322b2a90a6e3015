//! 命令历史测试
//!
//! ## 测试覆盖
//! - 追加去重与上限截断
//! - 重命名合并
//! - 文件损坏与写入失败
//! - 游标浏览

use super::*;
use proptest::prelude::*;
use tempfile::TempDir;

fn temp_store() -> (TempDir, HistoryStore) {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(dir.path().join(HISTORY_FILE_NAME));
    (dir, store)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ========================================================================
// 存储测试
// ========================================================================

#[test]
fn test_load_missing_file_is_empty() {
    let (_dir, store) = temp_store();
    assert!(store.load("ESP32").is_empty());
    assert!(store.names().is_empty());
}

#[test]
fn test_append_skips_consecutive_duplicates_only() {
    let (_dir, store) = temp_store();
    store.append("ESP32", "LED ON");
    store.append("ESP32", "LED ON");
    store.append("ESP32", "LED OFF");
    let result = store.append("ESP32", "LED ON");

    assert_eq!(result, strings(&["LED ON", "LED OFF", "LED ON"]));
    assert_eq!(store.load("ESP32"), result);
}

#[test]
fn test_append_ignores_empty_name_and_blank_command() {
    let (dir, store) = temp_store();
    assert!(store.append("", "LED ON").is_empty());
    assert!(store.append("ESP32", "   ").is_empty());
    assert!(!dir.path().join(HISTORY_FILE_NAME).exists());
}

#[test]
fn test_append_trims_to_most_recent() {
    let (_dir, store) = temp_store();
    for i in 0..(MAX_HISTORY + 20) {
        store.append("ESP32", &format!("CMD {}", i));
    }
    let history = store.load("ESP32");
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history.first().unwrap(), "CMD 20");
    assert_eq!(history.last().unwrap(), &format!("CMD {}", MAX_HISTORY + 19));
}

#[test]
fn test_file_format_uses_two_space_indent() {
    let (dir, store) = temp_store();
    store.append("ESP32", "LED ON");
    let content = std::fs::read_to_string(dir.path().join(HISTORY_FILE_NAME)).unwrap();
    assert_eq!(content, "{\n  \"ESP32\": [\n    \"LED ON\"\n  ]\n}");
}

#[test]
fn test_corrupt_file_reads_as_empty() {
    let (dir, store) = temp_store();
    std::fs::write(dir.path().join(HISTORY_FILE_NAME), "{not json").unwrap();
    assert!(store.load("ESP32").is_empty());

    // 下一次写入会覆盖损坏的文件
    store.append("ESP32", "PING");
    assert_eq!(store.load("ESP32"), strings(&["PING"]));
}

#[test]
fn test_wrong_shape_reads_as_empty() {
    let (dir, store) = temp_store();
    std::fs::write(dir.path().join(HISTORY_FILE_NAME), r#"{"ESP32": "LED ON"}"#).unwrap();
    assert!(store.load("ESP32").is_empty());
}

#[test]
fn test_write_failure_is_swallowed() {
    let dir = TempDir::new().unwrap();
    // 路径指向一个目录，写入必然失败
    let store = HistoryStore::new(dir.path());
    let result = store.append("ESP32", "LED ON");
    assert_eq!(result, strings(&["LED ON"]));
    assert!(store.load("ESP32").is_empty());
}

#[test]
fn test_rename_merges_existing_then_migrated() {
    let (_dir, store) = temp_store();
    store.append("Board", "A");
    store.append("Board", "B");
    store.append("ESP32", "X");

    let merged = store.rename("Board", "ESP32");
    assert_eq!(merged, strings(&["X", "A", "B"]));
    assert_eq!(store.load("ESP32"), merged);
    assert!(store.load("Board").is_empty());
    assert_eq!(store.names(), strings(&["ESP32"]));
}

#[test]
fn test_rename_same_name_is_noop() {
    let (dir, store) = temp_store();
    store.append("ESP32", "A");
    let path = dir.path().join(HISTORY_FILE_NAME);
    let before = std::fs::read_to_string(&path).unwrap();

    assert_eq!(store.rename("ESP32", "ESP32"), strings(&["A"]));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_rename_with_empty_sides() {
    let (_dir, store) = temp_store();
    store.append("ESP32", "A");

    assert_eq!(store.rename("", "ESP32"), strings(&["A"]));
    assert!(store.rename("ESP32", "").is_empty());
    // 清空名称不会删除存储中的历史
    assert_eq!(store.load("ESP32"), strings(&["A"]));
}

#[test]
fn test_rename_trims_merged_sequence() {
    let (_dir, store) = temp_store();
    for i in 0..300 {
        store.append("new", &format!("N{}", i));
        store.append("old", &format!("O{}", i));
    }
    let merged = store.rename("old", "new");
    assert_eq!(merged.len(), MAX_HISTORY);
    assert_eq!(merged.first().unwrap(), "N100");
    assert_eq!(merged.last().unwrap(), "O299");
}

#[test]
fn test_names_sorted() {
    let (_dir, store) = temp_store();
    store.append("Sensor-1", "A");
    store.append("Arduino", "B");
    store.append("ESP32", "C");
    assert_eq!(store.names(), strings(&["Arduino", "ESP32", "Sensor-1"]));
}

#[test]
fn test_trim_to_cap_keeps_tail() {
    let mut entries: Vec<String> = (0..MAX_HISTORY + 3).map(|i| i.to_string()).collect();
    trim_to_cap(&mut entries);
    assert_eq!(entries.len(), MAX_HISTORY);
    assert_eq!(entries[0], "3");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_append_never_stores_consecutive_duplicates(
        commands in proptest::collection::vec("[A-C]{1,2}", 0..60)
    ) {
        let (_dir, store) = temp_store();
        for command in &commands {
            store.append("dev", command);
        }
        let history = store.load("dev");
        prop_assert!(history.len() <= MAX_HISTORY);
        for pair in history.windows(2) {
            prop_assert_ne!(&pair[0], &pair[1]);
        }
    }

    #[test]
    fn prop_rename_concatenates_and_clears_old(
        old in proptest::collection::vec("[A-Z]{1,4}", 0..20),
        existing in proptest::collection::vec("[a-z]{1,4}", 0..20),
    ) {
        let (_dir, store) = temp_store();
        for command in &old {
            store.append("old", command);
        }
        for command in &existing {
            store.append("new", command);
        }
        let before_old = store.load("old");
        let mut expected = store.load("new");
        expected.extend(before_old);
        trim_to_cap(&mut expected);

        prop_assert_eq!(store.rename("old", "new"), expected.clone());
        prop_assert_eq!(store.load("new"), expected);
        prop_assert!(store.load("old").is_empty());
    }
}

// ========================================================================
// 游标测试
// ========================================================================

#[test]
fn test_cursor_walks_history_and_restores_draft() {
    let history = strings(&["A", "B", "C"]);
    let mut cursor = HistoryCursor::new();

    let up = |c: &mut HistoryCursor| c.navigate(HistoryDirection::Up, &history, "D");
    assert_eq!(up(&mut cursor).as_deref(), Some("C"));
    assert_eq!(up(&mut cursor).as_deref(), Some("B"));
    assert_eq!(up(&mut cursor).as_deref(), Some("A"));
    assert_eq!(up(&mut cursor).as_deref(), Some("A"));
    assert_eq!(cursor.draft(), "D");

    let down = |c: &mut HistoryCursor| c.navigate(HistoryDirection::Down, &history, "A");
    assert_eq!(down(&mut cursor).as_deref(), Some("B"));
    assert_eq!(down(&mut cursor).as_deref(), Some("C"));
    assert_eq!(down(&mut cursor).as_deref(), Some("D"));
    assert!(!cursor.is_browsing());
}

#[test]
fn test_cursor_down_when_not_browsing_is_ignored() {
    let history = strings(&["A"]);
    let mut cursor = HistoryCursor::new();
    assert_eq!(cursor.navigate(HistoryDirection::Down, &history, "typed"), None);
    assert_eq!(cursor.index(), None);
}

#[test]
fn test_cursor_empty_history_is_ignored() {
    let mut cursor = HistoryCursor::new();
    assert_eq!(cursor.navigate(HistoryDirection::Up, &[], "typed"), None);
    assert!(!cursor.is_browsing());
}

#[test]
fn test_cursor_reset() {
    let history = strings(&["A", "B"]);
    let mut cursor = HistoryCursor::new();
    cursor.navigate(HistoryDirection::Up, &history, "draft");
    cursor.reset();
    assert_eq!(cursor, HistoryCursor::default());
}
