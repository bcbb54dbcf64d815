use std::{fmt::Write as _, thread};

use chrono::{format::DelayedFormat, Local};
use crossbeam_channel::{unbounded, Sender};
use once_cell::sync::Lazy;

use crate::logging::rotate::Rotate;

pub mod rotate;

const LOG_DIR: &str = "log";

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::in_dir(LOG_DIR));

pub struct Logger {
    info_writer: Sender<String>,
    error_writer: Sender<String>,
}

impl Logger {
    /// 只有 info 與 error 兩個等級，各自一個寫入線程
    fn in_dir(dir: &str) -> Self {
        Logger {
            info_writer: Self::create_writer(dir, "info"),
            error_writer: Self::create_writer(dir, "error"),
        }
    }

    fn info(&self, log: String) {
        self.send(log, &self.info_writer);
    }

    fn error(&self, log: String) {
        self.send(log, &self.error_writer);
    }

    fn send(&self, msg: String, writer: &Sender<String>) {
        if let Err(why) = writer.send(msg) {
            error_console(why.to_string());
        }
    }

    fn create_writer(dir: &str, level: &str) -> Sender<String> {
        let pattern = format!("{}/%Y-%m-%d-{}.log", dir, level);
        let (tx, rx) = unbounded::<String>();

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut rotate = Rotate::new(pattern);
            let mut line = String::with_capacity(2048);

            for received in &rx {
                if writeln!(
                    &mut line,
                    "{} {}",
                    Local::now().format("%F %X%.6f"),
                    received
                )
                .is_err()
                {
                    continue;
                }

                if rx.is_empty() || line.len() >= 2048 {
                    if let Err(why) = rotate.write_msg(Local::now(), line.as_bytes()) {
                        error_console(format!(
                            "Failed to write to log file. because:{:#?}\r\nmsg:{}",
                            why, line
                        ));
                    }

                    line.clear();
                }
            }
        });

        tx
    }
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}
