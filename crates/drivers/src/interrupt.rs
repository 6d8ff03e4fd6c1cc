use std::io::{self, BufRead, IsTerminal};
use std::sync::mpsc;
use std::thread;

use log::debug;

/// Watches an input stream for a `q` line so a running scan or apply can be
/// stopped from the terminal.
pub struct CancelListener {
    requests: mpsc::Receiver<()>,
}

impl CancelListener {
    /// Listens on stdin when it is a terminal; otherwise never fires.
    pub fn stdin() -> Self {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            let (_, requests) = mpsc::channel();
            return Self { requests };
        }
        Self::from_reader(io::BufReader::new(stdin))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (request_tx, requests) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("cancel-listener".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let Ok(line) = line else {
                        return;
                    };
                    if is_cancel_request(&line) {
                        let _ = request_tx.send(());
                        return;
                    }
                }
            });
        if let Err(error) = spawned {
            debug!("cancel listener unavailable: {error}");
        }
        Self { requests }
    }

    pub fn requested(&self) -> bool {
        self.requests.try_recv().is_ok()
    }
}

fn is_cancel_request(line: &str) -> bool {
    matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "q" | "quit" | "cancel"
    )
}
