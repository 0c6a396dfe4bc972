//! Common test utilities and helpers

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use trellis::component::Task;

/// Leaf that counts how often it ran
pub fn counting(name: &str, runs: &Arc<AtomicUsize>) -> Task {
    let runs = Arc::clone(runs);
    Task::new(name, move |_| {
        runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

/// Leaf that fails its first `failures` runs and succeeds afterwards
pub fn flaky(name: &str, failures: usize, runs: &Arc<AtomicUsize>) -> Task {
    let runs = Arc::clone(runs);
    Task::new(name, move |_| {
        let run = runs.fetch_add(1, Ordering::SeqCst) + 1;
        if run <= failures {
            anyhow::bail!("attempt {run} failed");
        }
        Ok(())
    })
}

/// Leaf that always fails
pub fn failing(name: &str) -> Task {
    Task::new(name, |_| anyhow::bail!("always fails"))
}

/// Leaf that raises `flag` when it runs
pub fn flag(name: &str, flag: &Arc<AtomicBool>) -> Task {
    let flag = Arc::clone(flag);
    Task::new(name, move |_| {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    })
}

/// Leaf that binds `key=value` in its scope
pub fn emit(name: &str, key: &'static str, value: &'static str) -> Task {
    Task::new(name, move |e| {
        e.emit(key, value);
        Ok(())
    })
}

/// Write a tree definition into a fresh temporary directory
pub fn write_tree(yaml: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.yml");
    std::fs::write(&path, yaml).unwrap();
    (dir, path)
}
