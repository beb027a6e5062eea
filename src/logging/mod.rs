use std::{fmt::Write as _, thread, time::Duration};

use chrono::{format::DelayedFormat, DateTime, Local};
use crossbeam_channel::{bounded, unbounded, Sender};
use once_cell::sync::Lazy;
use strum::Display;

use crate::logging::rotate::Rotate;

pub mod rotate;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// flush 時等待寫入執行緒回應的上限
const FLUSH_TIMEOUT: Duration = Duration::from_secs(3);
/// 累積到這個大小就寫入檔案
const BATCH_SIZE: usize = 4096;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

enum Message {
    Line(LogMessage),
    Flush(Sender<()>),
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

pub struct Logger {
    writer: Sender<Message>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        let (tx, rx) = unbounded::<Message>();
        let mut rotate = Rotate::new(format!("log/%Y-%m-%d-{}.log", log_name));

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut line = String::with_capacity(BATCH_SIZE);

            for received in &rx {
                match received {
                    Message::Line(lm) => {
                        if writeln!(
                            &mut line,
                            "{} {} {}",
                            lm.created_at.format("%F %X%.6f"),
                            lm.level,
                            lm.msg
                        )
                        .is_err()
                        {
                            continue;
                        }

                        if rx.is_empty() || line.len() >= BATCH_SIZE {
                            write_line(&mut rotate, &mut line);
                        }
                    }
                    Message::Flush(ack) => {
                        write_line(&mut rotate, &mut line);
                        rotate.flush();
                        let _ = ack.send(());
                    }
                }
            }
        });

        Logger { writer: tx }
    }

    pub fn info(&self, log: impl Into<String>) {
        self.send(Level::Info, log.into());
    }

    pub fn warn(&self, log: impl Into<String>) {
        self.send(Level::Warn, log.into());
    }

    pub fn error(&self, log: impl Into<String>) {
        self.send(Level::Error, log.into());
    }

    pub fn debug(&self, log: impl Into<String>) {
        self.send(Level::Debug, log.into());
    }

    fn send(&self, level: Level, msg: String) {
        if let Err(why) = self.writer.send(Message::Line(LogMessage::new(level, msg))) {
            error_console(why.to_string());
        }
    }

    /// 等待目前已送出的訊息都寫入檔案
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded::<()>(1);
        if self.writer.send(Message::Flush(ack_tx)).is_err() {
            return;
        }

        if ack_rx.recv_timeout(FLUSH_TIMEOUT).is_err() {
            error_console("Timed out waiting for the log writer to flush".to_string());
        }
    }
}

fn write_line(rotate: &mut Rotate, line: &mut String) {
    if line.is_empty() {
        return;
    }

    if let Err(why) = rotate.write_msg(Local::now(), line.as_bytes()) {
        error_console(format!(
            "Failed to write to log file. because:{:#?}\r\nmsg:{}",
            why, line
        ));
    }

    line.clear();
}

pub fn info_file_async(log: impl Into<String>) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: impl Into<String>) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: impl Into<String>) {
    LOGGER.error(log);
}

pub fn debug_file_async(log: impl Into<String>) {
    LOGGER.debug(log);
}

/// 程序結束前呼叫，確保日誌不會遺失
pub fn flush() {
    LOGGER.flush();
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}
