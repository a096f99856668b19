use crossbeam_channel::Sender;
use log::Level;

/// One line for the UI log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

/// Writes each notice to the `log` facade and forwards it to the UI.
#[derive(Clone)]
pub struct NoticeLog {
    tx: Sender<Notice>,
}

impl NoticeLog {
    pub fn new(tx: Sender<Notice>) -> Self {
        Self { tx }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Level::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(Level::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Level::Error, message.into());
    }

    fn emit(&self, level: Level, message: String) {
        log::log!(level, "{}", message);
        // The UI may already be gone during shutdown.
        let _ = self.tx.send(Notice { level, message });
    }
}
