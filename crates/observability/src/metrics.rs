//! 分发指标收集模块
//!
//! 基于 DispatchSummary 和单条 Outcome 记录批量通知的运行指标。

use contracts::{DispatchSummary, FailureReason, Outcome};
use metrics::{counter, gauge, histogram};

/// 从 DispatchSummary 记录指标
///
/// 每次分发结束 (rendezvous 完成) 后调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_dispatch_metrics;
///
/// let report = dispatcher.send(recipients, notifier).await?;
/// record_dispatch_metrics("mail", &report.summary, report.elapsed.as_secs_f64() * 1000.0);
/// ```
pub fn record_dispatch_metrics(notifier: &str, summary: &DispatchSummary, elapsed_ms: f64) {
    let label = notifier.to_string();

    // 分发次数
    counter!("course_notify_dispatches_total", "notifier" => label.clone()).increment(1);

    // 收件人结果
    counter!(
        "course_notify_notifications_total",
        "notifier" => label.clone(),
        "status" => "sent"
    )
    .increment(summary.sent as u64);
    counter!(
        "course_notify_notifications_total",
        "notifier" => label.clone(),
        "status" => "failed"
    )
    .increment(summary.failed as u64);
    counter!(
        "course_notify_notifications_total",
        "notifier" => label.clone(),
        "status" => "cancelled"
    )
    .increment(summary.cancelled as u64);

    // worker 数量 (= 分区数量)
    gauge!("course_notify_last_dispatch_workers", "notifier" => label.clone())
        .set(summary.workers as f64);
    histogram!("course_notify_dispatch_recipients", "notifier" => label.clone())
        .record(summary.total as f64);

    // 耗时
    histogram!("course_notify_dispatch_duration_ms", "notifier" => label).record(elapsed_ms);
}

/// 按失败类型记录单条结果
pub fn record_outcome(notifier: &str, outcome: &Outcome) {
    let kind = match outcome.reason() {
        None => return,
        Some(FailureReason::Transport(_)) => "transport",
        Some(FailureReason::Rejected(_)) => "rejected",
        Some(FailureReason::WorkerAborted(_)) => "worker_aborted",
        Some(FailureReason::Cancelled) => "cancelled",
    };
    counter!(
        "course_notify_failures_total",
        "notifier" => notifier.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// 分发指标聚合器
///
/// 在内存中聚合多次分发的结果，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// 分发次数
    pub dispatches: u64,
    /// 收件人总数
    pub recipients: u64,
    pub sent: u64,
    pub failed: u64,
    pub cancelled: u64,
    /// 单次分发耗时 (毫秒)
    pub duration_ms: RunningStats,
}

impl DispatchStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合器
    pub fn update(&mut self, summary: &DispatchSummary, elapsed_ms: f64) {
        self.dispatches += 1;
        self.recipients += summary.total as u64;
        self.sent += summary.sent as u64;
        self.failed += summary.failed as u64;
        self.cancelled += summary.cancelled as u64;
        self.duration_ms.push(elapsed_ms);
    }

    /// 投递成功率 (%)
    pub fn success_rate(&self) -> f64 {
        if self.recipients == 0 {
            0.0
        } else {
            self.sent as f64 / self.recipients as f64 * 100.0
        }
    }
}

impl std::fmt::Display for DispatchStatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Dispatches: {}", self.dispatches)?;
        writeln!(f, "Recipients: {}", self.recipients)?;
        writeln!(
            f,
            "Sent: {} ({:.2}%)",
            self.sent,
            self.success_rate()
        )?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Cancelled: {}", self.cancelled)?;
        write!(
            f,
            "Duration (ms): mean={:.2}, min={:.2}, max={:.2}",
            self.duration_ms.mean(),
            self.duration_ms.min(),
            self.duration_ms.max()
        )
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [4.0, 8.0, 6.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 3);
        assert!((stats.mean() - 6.0).abs() < 1e-10);
        assert!((stats.min() - 4.0).abs() < 1e-10);
        assert!((stats.max() - 8.0).abs() < 1e-10);
        assert!((stats.variance() - 4.0).abs() < 1e-10);
        assert!((stats.std_dev() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DispatchStatsAggregator::new();
        let summary = DispatchSummary {
            total: 10,
            sent: 7,
            failed: 2,
            cancelled: 1,
            workers: 4,
        };

        aggregator.update(&summary, 12.5);
        aggregator.update(&summary, 7.5);

        assert_eq!(aggregator.dispatches, 2);
        assert_eq!(aggregator.recipients, 20);
        assert_eq!(aggregator.sent, 14);
        assert!((aggregator.success_rate() - 70.0).abs() < 1e-10);
        assert!((aggregator.duration_ms.mean() - 10.0).abs() < 1e-10);

        let output = aggregator.to_string();
        assert!(output.contains("Recipients: 20"));
        assert!(output.contains("70.00%"));
    }

    #[test]
    fn test_record_without_recorder() {
        // No global recorder installed: recording is a no-op
        record_dispatch_metrics("mail", &DispatchSummary::default(), 1.0);
        record_outcome("mail", &Outcome::cancelled());
    }
}
