use std::{
    sync::{Mutex, Once},
    thread::{self, ThreadId},
};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Remembers every record together with the thread that logged it, so tests
/// running in parallel only see their own output.
struct Capture {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((thread::current().id(), record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    records: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

pub fn install() {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).expect("no other logger in this test binary");
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Removes and returns the messages the current thread logged at `level`.
pub fn take(level: Level) -> Vec<String> {
    let me = thread::current().id();
    let mut records = CAPTURE.records.lock().expect("log capture poisoned");
    let (mine, rest): (Vec<_>, Vec<_>) = records
        .drain(..)
        .partition(|(thread, lvl, _)| *thread == me && *lvl == level);
    *records = rest;
    mine.into_iter().map(|(_, _, message)| message).collect()
}
