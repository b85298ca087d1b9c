//! Shared helpers for integration tests.

use host_selector::caller::{CallerEntry, CallerRegistry};

#[allow(dead_code)]
pub fn hosts(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Enabled entry whose note is its own pattern.
#[allow(dead_code)]
pub fn rule(ip: &str) -> CallerEntry {
    CallerEntry::new(ip).unwrap().enabled(true).with_note(ip)
}

#[allow(dead_code)]
pub fn initialized(entries: Vec<CallerEntry>) -> CallerRegistry {
    let mut registry = CallerRegistry::new(entries);
    registry.initialize().unwrap();
    registry
}

/// All orderings of `items`.
#[allow(dead_code)]
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}
