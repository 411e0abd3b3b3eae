use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Arc;
use std::thread;

use netcache_client::config::DiskCacheConfig;
use netcache_client::disk::DiskLruStore;
use tempfile::TempDir;

fn config(dir: &TempDir, max_size_bytes: u64) -> DiskCacheConfig {
    DiskCacheConfig {
        max_size_bytes,
        ..DiskCacheConfig::with_directory(dir.path())
    }
}

fn append_to_journal(dir: &TempDir, text: &str) {
    let mut journal = OpenOptions::new()
        .append(true)
        .open(dir.path().join("journal"))
        .expect("journal");
    journal.write_all(text.as_bytes()).expect("append");
}

#[test]
fn entries_survive_reopen() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 1024)).expect("open");
        store.put("a", "alpha").expect("put");
        store.put("b", "beta").expect("put");
        store.remove("b").expect("remove");
    }

    let store = DiskLruStore::open(&config(&dir, 1024)).expect("reopen");
    assert_eq!(store.get("a").expect("get").as_deref(), Some("alpha"));
    assert_eq!(store.get("b").expect("get"), None);
    assert_eq!(store.size(), 5);
    assert_eq!(store.len(), 1);
}

#[test]
fn recency_survives_reopen() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 12)).expect("open");
        store.put("a", "aaaa").expect("put");
        store.put("b", "bbbb").expect("put");
        store.put("c", "cccc").expect("put");
        store.get("a").expect("touch");
    }

    let store = DiskLruStore::open(&config(&dir, 12)).expect("reopen");
    store.put("d", "dddd").expect("put");
    assert!(store.contains("a"));
    assert!(!store.contains("b"));
    assert!(store.contains("c"));
    assert!(store.contains("d"));
}

#[test]
fn smaller_budget_on_reopen_evicts() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 100)).expect("open");
        store.put("a", "aaaa").expect("put");
        store.put("b", "bbbb").expect("put");
    }

    let store = DiskLruStore::open(&config(&dir, 4)).expect("reopen");
    assert!(!store.contains("a"));
    assert!(store.contains("b"));
    assert_eq!(store.size(), 4);
}

#[test]
fn uncommitted_edit_is_discarded() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 1024)).expect("open");
        store.put("a", "alpha").expect("put");
    }
    append_to_journal(&dir, "DIRTY b\n");
    fs::write(dir.path().join("b.0.tmp"), "partial").expect("staging file");

    let store = DiskLruStore::open(&config(&dir, 1024)).expect("reopen");
    assert_eq!(store.get("b").expect("get"), None);
    assert!(!dir.path().join("b.0.tmp").exists());
    assert_eq!(store.get("a").expect("get").as_deref(), Some("alpha"));
}

#[test]
fn interrupted_overwrite_drops_entry() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 1024)).expect("open");
        store.put("a", "alpha").expect("put");
    }
    append_to_journal(&dir, "DIRTY a\n");

    let store = DiskLruStore::open(&config(&dir, 1024)).expect("reopen");
    assert_eq!(store.get("a").expect("get"), None);
    assert!(!dir.path().join("a.0").exists());
    assert_eq!(store.size(), 0);
}

#[test]
fn truncated_journal_line_is_ignored() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 1024)).expect("open");
        store.put("a", "alpha").expect("put");
    }
    append_to_journal(&dir, "CLEAN b 1");

    let store = DiskLruStore::open(&config(&dir, 1024)).expect("reopen");
    assert_eq!(store.get("a").expect("get").as_deref(), Some("alpha"));
    assert!(!store.contains("b"));

    let journal = fs::read_to_string(dir.path().join("journal")).expect("journal");
    assert!(journal.ends_with('\n'));
}

#[test]
fn corrupt_journal_starts_empty() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 1024)).expect("open");
        store.put("a", "alpha").expect("put");
    }
    append_to_journal(&dir, "BOGUS line\n");

    let store = DiskLruStore::open(&config(&dir, 1024)).expect("reopen");
    assert!(store.is_empty());
    assert!(!dir.path().join("a.0").exists());
    store.put("a", "again").expect("put after reset");
}

#[test]
fn app_version_change_starts_empty() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 1024)).expect("open");
        store.put("a", "alpha").expect("put");
    }

    let upgraded = DiskCacheConfig {
        app_version: 2,
        ..config(&dir, 1024)
    };
    let store = DiskLruStore::open(&upgraded).expect("reopen");
    assert!(store.is_empty());
}

#[test]
fn backup_journal_is_restored() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store = DiskLruStore::open(&config(&dir, 1024)).expect("open");
        store.put("a", "alpha").expect("put");
    }
    fs::rename(dir.path().join("journal"), dir.path().join("journal.bkp")).expect("rename");

    let store = DiskLruStore::open(&config(&dir, 1024)).expect("reopen");
    assert_eq!(store.get("a").expect("get").as_deref(), Some("alpha"));
    assert!(!dir.path().join("journal.bkp").exists());
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let err = DiskLruStore::open(&config(&dir, 0)).unwrap_err();
    assert!(err.to_string().contains("max_size_bytes"));
}

#[test]
fn concurrent_writers_on_distinct_keys() {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(DiskLruStore::open(&config(&dir, 1024 * 1024)).expect("open"));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    let key = format!("w{worker}-{i}");
                    store.put(&key, &format!("value {worker} {i}")).expect("put");
                    assert!(store.get(&key).expect("get").is_some());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker");
    }

    assert_eq!(store.len(), 200);
    let expected: u64 = (0..8)
        .flat_map(|w| (0..25).map(move |i| format!("value {w} {i}").len() as u64))
        .sum();
    assert_eq!(store.size(), expected);
}

#[test]
fn size_never_exceeds_budget_after_puts() {
    let dir = TempDir::new().expect("temp dir");
    let store = DiskLruStore::open(&config(&dir, 64)).expect("open");
    for i in 0..50 {
        store.put(&format!("k{i}"), &"x".repeat(i % 20)).expect("put");
        assert!(store.size() <= store.max_size());
    }
    assert!(store.evictions() > 0);
}

#[test]
fn readers_never_see_a_partial_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(DiskLruStore::open(&config(&dir, 16 * 1024 * 1024)).expect("open"));
    let large = "a".repeat(100 * 1024);
    let small = "b".repeat(50 * 1024);
    store.put("shared", &large).expect("seed");

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let (large, small) = (large.clone(), small.clone());
            thread::spawn(move || {
                for _ in 0..300 {
                    let value = store.get("shared").expect("get").expect("present");
                    assert!(value == large || value == small, "mixed value of {} bytes", value.len());
                }
            })
        })
        .collect();

    for i in 0..300 {
        let value = if i % 2 == 0 { &small } else { &large };
        store.put("shared", value).expect("overwrite");
    }
    for reader in readers {
        reader.join().expect("reader");
    }
}
