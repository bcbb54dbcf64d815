use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeDelta};
use rayon::prelude::*;

use crate::logging;

/// 預設單檔最大大小：10 MB
const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;
/// 預設保留天數：7 天
const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// 依日期切檔、超過大小時遞增世代的檔案寫入器。
///
/// 由單一寫入線程持有，因此不需要內部鎖。
pub struct Rotate {
    /// 檔名模式，例如 "log/%Y-%m-%d-error.log"
    fn_pattern: String,
    /// 當前基礎檔名（不含 generation，由日期決定）
    cur_base_fn: String,
    /// 當前完整檔名（含 generation）
    cur_fn: String,
    out_fh: Option<BufWriter<File>>,
    /// 當前世代編號 (0, 1, 2, ...)，只增不減
    generation: u32,
    max_size: u64,
    current_size: u64,
    max_age: TimeDelta,
    /// 檔名中最後一個日期格式之後的固定部分，例如 "-info" 與 "log"
    own_stem_tail: String,
    own_ext: String,
}

impl Rotate {
    pub fn new(fn_pattern: String) -> Self {
        Self::with_options(fn_pattern, DEFAULT_MAX_SIZE, DEFAULT_MAX_AGE_DAYS)
    }

    /// # Arguments
    /// * `fn_pattern` - 檔名模式，例如 "log/%Y-%m-%d-info.log"
    /// * `max_size` - 單檔最大大小 (bytes)
    /// * `max_age_days` - 日誌保留天數
    pub fn with_options(fn_pattern: String, max_size: u64, max_age_days: i64) -> Self {
        let (own_stem_tail, own_ext) = Self::literal_tail(&fn_pattern);

        Rotate {
            fn_pattern,
            cur_base_fn: String::new(),
            cur_fn: String::new(),
            out_fh: None,
            generation: 0,
            max_size,
            current_size: 0,
            max_age: TimeDelta::try_days(max_age_days).unwrap_or(TimeDelta::days(7)),
            own_stem_tail,
            own_ext,
        }
    }

    /// "log/%Y-%m-%d-info.log" => ("-info", "log")
    fn literal_tail(fn_pattern: &str) -> (String, String) {
        let file_name = Path::new(fn_pattern)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(fn_pattern);
        let tail = match file_name.rfind('%') {
            Some(i) => file_name.get(i + 2..).unwrap_or(""),
            None => file_name,
        };

        match tail.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), ext.to_string()),
            None => (tail.to_string(), String::new()),
        }
    }

    /// 是否為此寫入器產生的檔案：`<date><tail>.<ext>` 或 `<date><tail>.<n>.<ext>`
    fn is_own_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            return false;
        };
        let stem = if self.own_ext.is_empty() {
            name
        } else {
            match name
                .strip_suffix(self.own_ext.as_str())
                .and_then(|n| n.strip_suffix('.'))
            {
                Some(stem) => stem,
                None => return false,
            }
        };

        if stem.ends_with(self.own_stem_tail.as_str()) {
            return true;
        }

        match stem.rsplit_once('.') {
            Some((base, generation)) => {
                !generation.is_empty()
                    && generation.bytes().all(|b| b.is_ascii_digit())
                    && base.ends_with(self.own_stem_tail.as_str())
            }
            None => false,
        }
    }

    /// 寫入日誌訊息，自動處理日期切換與大小輪轉
    pub fn write_msg(&mut self, now: DateTime<Local>, msg: &[u8]) -> Result<()> {
        let base_fn = now.format(&self.fn_pattern).to_string();

        // 日期變更：重設 generation
        if base_fn != self.cur_base_fn {
            self.generation = 0;
            self.cur_base_fn = base_fn;
            self.open_new_file()?;
            self.cleanup_old_files(now);
        }

        if self.current_size > 0 && self.current_size + msg.len() as u64 > self.max_size {
            self.generation += 1;
            self.open_new_file()?;
        }

        let writer = self
            .out_fh
            .as_mut()
            .ok_or_else(|| anyhow!("No log file is open for {}", self.cur_fn))?;
        writer.write_all(msg)?;
        writer.flush()?;
        self.current_size += msg.len() as u64;

        Ok(())
    }

    pub fn current_file(&self) -> &str {
        &self.cur_fn
    }

    /// generation = 0: "log/2025-02-03-info.log"
    /// generation = 1: "log/2025-02-03-info.1.log"
    fn full_fn(&self) -> String {
        if self.generation == 0 {
            return self.cur_base_fn.clone();
        }

        let path = Path::new(&self.cur_base_fn);
        let parent = path.parent().unwrap_or(Path::new(""));
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("log");

        parent
            .join(format!("{}.{}.{}", stem, self.generation, ext))
            .to_string_lossy()
            .to_string()
    }

    fn open_new_file(&mut self) -> Result<()> {
        if let Some(mut old) = self.out_fh.take() {
            let _ = old.flush();
        }

        let filename = self.full_fn();
        if let Some(parent) = Path::new(&filename).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)?;

        self.current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.out_fh = Some(BufWriter::with_capacity(4096, file));
        self.cur_fn = filename;

        Ok(())
    }

    /// 清理超過 max_age 的舊檔案
    fn cleanup_old_files(&self, now: DateTime<Local>) {
        let files = match Self::files_in_directory(&self.cur_fn) {
            Ok(files) => files,
            Err(why) => {
                logging::error_console(format!(
                    "Failed to list_files_in_directory because {:?}",
                    why
                ));
                return;
            }
        };

        let cut_off = (now - self.max_age).timestamp().max(0) as u64;
        let to_unlink: Vec<PathBuf> = files
            .into_iter()
            .filter(|file| self.is_own_file(file))
            .filter(|file| {
                fs::metadata(file)
                    .and_then(|metadata| metadata.modified())
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() <= cut_off)
                    .unwrap_or(false)
            })
            .collect();

        to_unlink
            .par_iter()
            .with_min_len(num_cpus::get())
            .for_each(|unlink| {
                if let Err(why) = fs::remove_file(unlink) {
                    logging::error_console(format!(
                        "couldn't remove the file({}). because {:?}",
                        unlink.display(),
                        why
                    ));
                }
            });
    }

    fn files_in_directory<P: AsRef<Path>>(file_path: P) -> Result<Vec<PathBuf>, io::Error> {
        let parent_dir = file_path
            .as_ref()
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Parent directory not found"))?;

        let mut files = Vec::new();
        for entry in fs::read_dir(parent_dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }

        Ok(files)
    }
}

impl Drop for Rotate {
    fn drop(&mut self) {
        if let Some(ref mut w) = self.out_fh {
            let _ = w.flush();
        }
    }
}
