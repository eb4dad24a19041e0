//! In-memory capture of tracing output for the Logs tab.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

pub type SharedLogStore = Arc<Mutex<LogStore>>;

/// Ring buffer of formatted log lines; the oldest line is evicted first.
pub struct LogStore {
    lines: VecDeque<String>,
    capacity: usize,
    total: u64,
}

impl LogStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    pub fn shared(capacity: usize) -> SharedLogStore {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.trim().is_empty() {
            return;
        }
        self.lines.push_back(line);
        self.total += 1;
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines pushed since creation, including evicted ones.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Up to `max` lines ending `skip_from_end` lines before the newest, oldest first.
    pub fn window(&self, skip_from_end: usize, max: usize) -> Vec<String> {
        let end = self.lines.len().saturating_sub(skip_from_end);
        let start = end.saturating_sub(max);
        self.lines.range(start..end).cloned().collect()
    }
}

#[derive(Clone)]
pub struct LogMakeWriter {
    store: SharedLogStore,
}

impl LogMakeWriter {
    pub fn new(store: SharedLogStore) -> Self {
        Self { store }
    }
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            store: self.store.clone(),
            pending: String::new(),
        }
    }
}

/// Splits written bytes into lines; a trailing partial line is flushed on drop.
pub struct LogWriter {
    store: SharedLogStore,
    pending: String,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.push_str(&String::from_utf8_lossy(buf));
        while let Some(idx) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=idx).collect();
            self.store.lock().push_line(line.trim_end_matches(['\r', '\n']));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let rest = std::mem::take(&mut self.pending);
        self.store.lock().push_line(rest.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::{LogMakeWriter, LogStore};
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn store_evicts_oldest_lines() {
        let mut store = LogStore::new(2);
        store.push_line("a");
        store.push_line("   ");
        store.push_line("b");
        store.push_line("c");
        assert_eq!(store.len(), 2);
        assert_eq!(store.total(), 3);
        assert_eq!(store.window(0, 10), vec!["b", "c"]);
    }

    #[test]
    fn window_counts_back_from_newest() {
        let mut store = LogStore::new(10);
        for i in 0..5 {
            store.push_line(format!("line {i}"));
        }
        assert_eq!(store.window(0, 2), vec!["line 3", "line 4"]);
        assert_eq!(store.window(1, 2), vec!["line 2", "line 3"]);
        assert_eq!(store.window(10, 2), Vec::<String>::new());
    }

    #[test]
    fn writer_splits_lines_and_flushes_partial_on_drop() {
        let store = LogStore::shared(10);
        let make = LogMakeWriter::new(store.clone());
        {
            let mut writer = make.make_writer();
            writer.write_all(b"first\r\nsec").expect("write");
            writer.write_all(b"ond\nthird").expect("write");
            assert_eq!(store.lock().len(), 2);
        }
        assert_eq!(store.lock().window(0, 10), vec!["first", "second", "third"]);
    }
}
