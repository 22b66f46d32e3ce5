//! Test helpers shared across modules.

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::logging::{Logger, LoggingSettings};

/// In-memory log sink.
#[derive(Clone, Default)]
pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .expect("capture lock poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Capture {
    /// `MakeWriter` handing out clones of this sink.
    pub(crate) fn make_writer(&self) -> impl Fn() -> Self + Send + Sync + 'static {
        let capture = self.clone();
        move || capture.clone()
    }

    /// Everything written so far.
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("capture lock poisoned").clone())
            .expect("log output is UTF-8")
    }

    /// Each written line parsed as JSON.
    pub(crate) fn json_lines(&self) -> Vec<Value> {
        self.contents()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("log line is JSON"))
            .collect()
    }

    /// A JSON logger at `debug` writing into this sink.
    pub(crate) fn logger(&self) -> Logger {
        let settings = LoggingSettings {
            level: Some("debug".to_owned()),
            service_name: Some("claims-api".to_owned()),
            service_version: Some("1.0.0".to_owned()),
            ..LoggingSettings::default()
        };
        Logger::with_writer(&settings, self.make_writer()).expect("logger builds")
    }
}
