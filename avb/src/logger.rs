// Boot log for verified boot diagnostics
//
// Backs the `log` facade with a fixed ring of formatted entries so failures
// during early boot can be shown once a console is up. Never allocates.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};
use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

const MAX_LOG_ENTRIES: usize = 64;
const MAX_ENTRY_LEN: usize = 120;

#[derive(Copy, Clone)]
pub struct LogEntry {
    level: Level,
    len: usize,
    text: [u8; MAX_ENTRY_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        level: Level::Trace,
        len: 0,
        text: [0; MAX_ENTRY_LEN],
    };

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        // Writer only ever stops on a char boundary
        core::str::from_utf8(&self.text[..self.len]).unwrap_or("<invalid utf-8>")
    }
}

/// Truncating writer into a single entry
struct EntryWriter<'a> {
    entry: &'a mut LogEntry,
}

impl Write for EntryWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = MAX_ENTRY_LEN - self.entry.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        let start = self.entry.len;
        self.entry.text[start..start + take].copy_from_slice(&s.as_bytes()[..take]);
        self.entry.len += take;
        Ok(())
    }
}

struct LogRing {
    entries: [LogEntry; MAX_LOG_ENTRIES],
    next: usize,
    count: usize,
}

impl LogRing {
    const fn new() -> Self {
        Self {
            entries: [LogEntry::EMPTY; MAX_LOG_ENTRIES],
            next: 0,
            count: 0,
        }
    }

    fn push(&mut self, level: Level, args: fmt::Arguments<'_>) {
        let slot = &mut self.entries[self.next];
        *slot = LogEntry::EMPTY;
        slot.level = level;
        let _ = EntryWriter { entry: slot }.write_fmt(args);

        self.next = (self.next + 1) % MAX_LOG_ENTRIES;
        self.count = (self.count + 1).min(MAX_LOG_ENTRIES);
    }

    fn oldest(&self) -> usize {
        (self.next + MAX_LOG_ENTRIES - self.count) % MAX_LOG_ENTRIES
    }
}

/// In-memory `log::Log` sink; the oldest entry is overwritten when full
pub struct BootLog {
    ring: Mutex<LogRing>,
}

impl BootLog {
    pub const fn new() -> Self {
        Self {
            ring: Mutex::new(LogRing::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit entries oldest first
    pub fn for_each_entry(&self, mut f: impl FnMut(&LogEntry)) {
        let ring = self.ring.lock();
        let start = ring.oldest();
        for i in 0..ring.count {
            f(&ring.entries[(start + i) % MAX_LOG_ENTRIES]);
        }
    }

    pub fn clear(&self) {
        let mut ring = self.ring.lock();
        ring.next = 0;
        ring.count = 0;
    }
}

impl Log for BootLog {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        // Level filtering happens in the facade (log::set_max_level)
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.ring.lock().push(record.level(), *record.args());
    }

    fn flush(&self) {}
}

static BOOT_LOG: BootLog = BootLog::new();
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install the boot log as the global logger. Later calls only adjust `level`.
pub fn init(level: LevelFilter) {
    if !INSTALLED.swap(true, Ordering::SeqCst) {
        // Fails only if another logger won the race; keep theirs
        let _ = log::set_logger(&BOOT_LOG);
    }
    log::set_max_level(level);
}

pub fn boot_log() -> &'static BootLog {
    &BOOT_LOG
}

pub fn log_count() -> usize {
    BOOT_LOG.len()
}
