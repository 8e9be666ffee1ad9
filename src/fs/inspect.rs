//! 文件系统巡检
//!
//! 查询卷用量、遍历根目录一层子项，并把结果写到日志。
//! 通过 [`Volume`] 特征与具体文件系统解耦，便于用假卷做测试。

use crate::util::log::*;

use super::littlefs::FsError;

/// 卷用量快照 (总字节数 / 已用字节数)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageSnapshot {
    /// 卷总容量 (字节)
    pub total_bytes: u64,
    /// 已用容量 (字节)
    pub used_bytes: u64,
}

impl UsageSnapshot {
    /// 全零快照 (查询不可用时的退化值)
    pub const ZERO: Self = Self {
        total_bytes: 0,
        used_bytes: 0,
    };

    /// 已用百分比，以百分之一为单位 (0..=10000)
    ///
    /// 整数表示，两位小数在日志层拆出。总容量为 0 时返回 0，避免除零。
    pub fn used_percent_hundredths(&self) -> u32 {
        if self.total_bytes == 0 {
            return 0;
        }
        (self.used_bytes.saturating_mul(10_000) / self.total_bytes) as u32
    }
}

/// 单个目录子项 (名称借用自遍历游标，仅在回调期间有效)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEntry<'a> {
    /// 条目名称
    pub name: &'a str,
    /// 是否为子目录
    pub is_directory: bool,
    /// 文件大小 (字节，目录无意义)
    pub size_bytes: u64,
}

/// 目录遍历结果
///
/// 空目录与打开失败是两个可区分的信号：
/// 前者是 `Empty`，后者是 `Err(FsError)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// 成功遍历到的子项数量
    Entries(usize),
    /// 目录存在但没有子项
    Empty,
}

/// 可巡检的卷
pub trait Volume {
    /// 查询卷用量
    ///
    /// 底层不支持或查询失败时静默返回全零快照。
    fn usage(&self) -> UsageSnapshot;

    /// 遍历 `path` 的直接子项 (不递归，不排序，按文件系统原生顺序)
    ///
    /// 路径打不开或不是目录时返回错误且不产生任何回调。
    fn visit_children(
        &self,
        path: &str,
        visit: &mut dyn FnMut(ChildEntry<'_>),
    ) -> Result<ListOutcome, FsError>;
}

/// 输出卷用量报告 (三行)
pub fn report_usage(volume: &impl Volume) {
    let snapshot = volume.usage();
    log_info!("LittleFS total bytes: {}", snapshot.total_bytes);
    log_info!("LittleFS used bytes : {}", snapshot.used_bytes);
    // 百分比按两位小数逐位输出，格式串对所有日志后端保持兼容
    let percent = snapshot.used_percent_hundredths();
    log_info!(
        "LittleFS usage      : {}.{}{}%",
        percent / 100,
        percent % 100 / 10,
        percent % 10
    );
}

/// 输出目录列表 (每个子项一行)
pub fn report_children(volume: &impl Volume, path: &str) {
    let outcome = volume.visit_children(path, &mut |entry| {
        if entry.is_directory {
            log_info!("DIR : {}", entry.name);
        } else {
            log_info!("FILE: {}\tSIZE: {}", entry.name, entry.size_bytes);
        }
    });

    match outcome {
        Ok(ListOutcome::Entries(_)) => {}
        Ok(ListOutcome::Empty) => log_info!("Info: No files found."),
        Err(e) => log_error!("Error: Could not open root directory. ({})", e),
    }
}

/// 完整巡检: 用量报告 + 目录列表
pub fn report(volume: &impl Volume, path: &str) {
    report_usage(volume);
    report_children(volume, path);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 假卷: 固定的用量和子项列表
    struct FakeVolume {
        total: u64,
        used: u64,
        entries: &'static [(&'static str, bool, u64)],
        error: Option<FsError>,
    }

    impl FakeVolume {
        fn with_usage(total: u64, used: u64) -> Self {
            Self {
                total,
                used,
                entries: &[],
                error: None,
            }
        }

        fn with_entries(entries: &'static [(&'static str, bool, u64)]) -> Self {
            Self {
                total: 0,
                used: 0,
                entries,
                error: None,
            }
        }

        fn failing(error: FsError) -> Self {
            Self {
                total: 0,
                used: 0,
                entries: &[],
                error: Some(error),
            }
        }
    }

    impl Volume for FakeVolume {
        fn usage(&self) -> UsageSnapshot {
            UsageSnapshot {
                total_bytes: self.total,
                used_bytes: self.used,
            }
        }

        fn visit_children(
            &self,
            _path: &str,
            visit: &mut dyn FnMut(ChildEntry<'_>),
        ) -> Result<ListOutcome, FsError> {
            if let Some(e) = self.error {
                return Err(e);
            }
            for &(name, is_directory, size_bytes) in self.entries {
                visit(ChildEntry {
                    name,
                    is_directory,
                    size_bytes,
                });
            }
            if self.entries.is_empty() {
                Ok(ListOutcome::Empty)
            } else {
                Ok(ListOutcome::Entries(self.entries.len()))
            }
        }
    }

    #[test]
    fn percent_stays_in_bounds() {
        assert_eq!(
            FakeVolume::with_usage(1000, 0).usage().used_percent_hundredths(),
            0
        );
        assert_eq!(
            FakeVolume::with_usage(1000, 1000)
                .usage()
                .used_percent_hundredths(),
            10_000
        );
        assert_eq!(
            FakeVolume::with_usage(1000, 500)
                .usage()
                .used_percent_hundredths(),
            5_000
        );
    }

    #[test]
    fn zero_total_yields_zero_percent() {
        // 除零保护: 空卷报告 0%
        assert_eq!(
            FakeVolume::with_usage(0, 0).usage().used_percent_hundredths(),
            0
        );
    }

    #[test]
    fn percent_renders_two_decimal_digits() {
        use core::fmt::Write;

        // 与用量报告相同的逐位拆分，小数位固定两位
        let render = |total, used| {
            let h = FakeVolume::with_usage(total, used)
                .usage()
                .used_percent_hundredths();
            let mut line: heapless::String<16> = heapless::String::new();
            write!(line, "{}.{}{}%", h / 100, h % 100 / 10, h % 10).unwrap();
            line
        };

        assert_eq!(render(10_000, 1_234).as_str(), "12.34%");
        assert_eq!(render(10_000, 42).as_str(), "0.42%");
        assert_eq!(render(1000, 1000).as_str(), "100.00%");
        assert_eq!(render(0, 0).as_str(), "0.00%");
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let volume = FakeVolume::with_entries(&[]);
        let mut visited = 0usize;
        let outcome = volume.visit_children("/", &mut |_| visited += 1);
        assert_eq!(outcome, Ok(ListOutcome::Empty));
        assert_eq!(visited, 0);
    }

    #[test]
    fn missing_path_reports_error_and_no_entries() {
        let volume = FakeVolume::failing(FsError::NotFound);
        let mut visited = 0usize;
        let outcome = volume.visit_children("/none", &mut |_| visited += 1);
        assert_eq!(outcome, Err(FsError::NotFound));
        assert_eq!(visited, 0);
    }

    #[test]
    fn non_directory_path_reports_error() {
        let volume = FakeVolume::failing(FsError::NotADirectory);
        let mut visited = 0usize;
        let outcome = volume.visit_children("/config.txt", &mut |_| visited += 1);
        assert_eq!(outcome, Err(FsError::NotADirectory));
        assert_eq!(visited, 0);
    }

    #[test]
    fn lists_file_and_directory_in_native_order() {
        let volume =
            FakeVolume::with_entries(&[("config.txt", false, 42), ("logs", true, 0)]);

        let mut seen: heapless::Vec<(heapless::String<32>, bool, u64), 4> =
            heapless::Vec::new();
        let outcome = volume.visit_children("/", &mut |entry| {
            let mut name = heapless::String::new();
            name.push_str(entry.name).unwrap();
            seen.push((name, entry.is_directory, entry.size_bytes)).unwrap();
        });

        assert_eq!(outcome, Ok(ListOutcome::Entries(2)));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0.as_str(), "config.txt");
        assert!(!seen[0].1);
        assert_eq!(seen[0].2, 42);
        assert_eq!(seen[1].0.as_str(), "logs");
        assert!(seen[1].1);
    }

    #[test]
    fn report_survives_failing_volume() {
        // 巡检对错误卷只产生日志，不会 panic
        report(&FakeVolume::failing(FsError::NotFound), "/");
    }
}
