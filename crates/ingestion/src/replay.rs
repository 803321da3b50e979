//! Replay Feed - 从录制文件回放消息流
//!
//! 读取 recording 监听器写出的 JSONL 文件，
//! 按原始时间戳回放消息。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{FeedCallback, FeedEvent, MessageSource, StreamError, StreamMessage};
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};

/// Replay 配置
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// 回放速度倍率 (1.0 = 原速)
    pub speed: f64,

    /// 是否循环回放
    pub loop_playback: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            loop_playback: false,
        }
    }
}

/// 录制文件中的一条记录
///
/// 损坏的行保留在原位置，回放到该处时上报解码故障。
#[derive(Debug, Clone)]
enum ReplayRecord {
    Message(StreamMessage),
    Corrupt { line: usize, reason: String },
}

/// Replay Feed - 从录制文件回放消息流
#[derive(Debug)]
pub struct ReplayFeed {
    source_id: String,
    path: PathBuf,
    records: Vec<ReplayRecord>,
    config: ReplayConfig,
    listening: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReplayFeed {
    /// 从录制文件加载
    ///
    /// 保留文件中的记录顺序，不按时间戳重排。
    pub fn load(path: &Path, source_id: String, config: ReplayConfig) -> Result<Self> {
        let file = File::open(path).map_err(|e| FeedError::ReplayOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        let mut corrupt = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<StreamMessage>(&line) {
                Ok(message) => records.push(ReplayRecord::Message(message)),
                Err(e) => {
                    corrupt += 1;
                    records.push(ReplayRecord::Corrupt {
                        line: idx + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            source_id = %source_id,
            path = %path.display(),
            records = records.len(),
            corrupt,
            "loaded replay recording"
        );

        Ok(Self {
            source_id,
            path: path.to_path_buf(),
            records,
            config,
            listening: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        })
    }

    /// 录制文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 加载的记录条数 (含损坏行)
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl MessageSource for ReplayFeed {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn listen(&self, callback: FeedCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let listening = self.listening.clone();
        let source_id = self.source_id.clone();
        let records = self.records.clone();
        let speed = self.config.speed.max(0.1);
        let loop_playback = self.config.loop_playback;

        let handle = thread::spawn(move || {
            debug!(source_id = %source_id, "replay thread started");

            // 以第一条完好记录的时间戳为基准
            let first_timestamp = records.iter().find_map(|record| match record {
                ReplayRecord::Message(message) => Some(message.timestamp()),
                ReplayRecord::Corrupt { .. } => None,
            });

            loop {
                if records.is_empty() {
                    warn!(source_id = %source_id, "no records to replay");
                    break;
                }

                let start_time = Instant::now();

                for record in &records {
                    if !listening.load(Ordering::Relaxed) {
                        debug!(source_id = %source_id, "replay stopped");
                        return;
                    }

                    match record {
                        ReplayRecord::Message(message) => {
                            // 计算等待时间；早于基准的记录立即发送
                            if let Some(first) = first_timestamp {
                                let record_offset = (message.timestamp() - first).max(0.0);
                                let target_elapsed = Duration::from_secs_f64(record_offset / speed);
                                let actual_elapsed = start_time.elapsed();

                                if target_elapsed > actual_elapsed {
                                    thread::sleep(target_elapsed - actual_elapsed);
                                }
                            }

                            callback(FeedEvent::Message(message.clone()));
                        }
                        ReplayRecord::Corrupt { line, reason } => {
                            callback(FeedEvent::Fault(StreamError::decode(format!(
                                "record line {line}: {reason}"
                            ))));
                        }
                    }
                }

                if !loop_playback {
                    info!(source_id = %source_id, "replay completed");
                    break;
                }

                debug!(source_id = %source_id, "looping replay");
            }

            listening.store(false, Ordering::SeqCst);
        });

        *self.thread_handle.lock().unwrap() = Some(handle);
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);

        // 等待回放线程结束
        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
