use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// A captured log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// A [`Log`] implementation that forwards records into a crossbeam channel.
///
/// Records above the logger's maximum level are dropped. Records are also dropped once
/// the receiving end has been disconnected.
pub struct ChannelLogger {
    sender: Sender<LogRecord>,
    max_level: LevelFilter,
}

impl ChannelLogger {
    pub fn new(sender: Sender<LogRecord>, max_level: LevelFilter) -> Self {
        Self { sender, max_level }
    }

    /// Create a logger together with the receiving end of its channel.
    pub fn with_receiver(max_level: LevelFilter) -> (Self, Receiver<LogRecord>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender, max_level), receiver)
    }
}

impl Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = self.sender.try_send(LogRecord {
                level: record.level(),
                target: record.target().to_owned(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}

/// Install a [`ChannelLogger`] as the global logger.
///
/// Returns the receiving end of its channel.
///
/// # Errors
///
/// Fails if a global logger has already been installed.
pub fn install(max_level: LevelFilter) -> Result<Receiver<LogRecord>, SetLoggerError> {
    let (logger, receiver) = ChannelLogger::with_receiver(max_level);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(logger: &ChannelLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("potion::bus")
                .args(format_args!("{message}"))
                .build(),
        );
    }

    #[test]
    fn forwards_enabled_records() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Debug);

        // When
        record(&logger, Level::Warn, "skipping dropped receiver");

        // Then
        assert_eq!(
            receiver.try_recv().unwrap(),
            LogRecord {
                level: Level::Warn,
                target: "potion::bus".into(),
                message: "skipping dropped receiver".into(),
            }
        );
    }

    #[test]
    fn drops_records_above_max_level() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Info);

        // When
        record(&logger, Level::Trace, "dispatching");
        record(&logger, Level::Debug, "ignoring");

        // Then
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn disconnected_receiver_is_ignored() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Trace);
        drop(receiver);

        // When / Then
        record(&logger, Level::Error, "nobody listening");
    }
}
