//! ServiceConfig - Config Loader 输出
//!
//! 描述完整的服务配置：分发策略、邮件发送、可观测性。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的服务配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 批量分发配置
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// 邮件发送配置
    #[serde(default)]
    pub mailer: MailerSettings,

    /// 可观测性配置
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

/// 批量分发配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// 每个 worker 处理的最大收件人数量，必须 > 0
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// 同时运行的 worker 上限 (None = 每个分区一个 worker，不限制)
    #[serde(default)]
    pub max_concurrent_workers: Option<usize>,

    /// 整体超时 (毫秒)，超时后未完成的收件人记为 cancelled
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_max_batch_size() -> usize {
    10
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            max_concurrent_workers: None,
            timeout_ms: None,
        }
    }
}

/// 邮件发送配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerSettings {
    /// 发件人地址
    #[serde(default = "default_sender")]
    pub sender: String,

    /// 传输方式
    #[serde(default)]
    pub transport: TransportKind,

    /// spool 目录 (transport = spool 时必填)
    #[serde(default)]
    pub spool_dir: Option<PathBuf>,
}

fn default_sender() -> String {
    "noreply@example.com".to_string()
}

impl Default for MailerSettings {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            transport: TransportKind::default(),
            spool_dir: None,
        }
    }
}

/// 邮件传输方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// 仅输出日志
    #[default]
    Log,
    /// 每封邮件写入 spool 目录中的 .eml 文件
    Spool,
}

/// 可观测性配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilitySettings {
    /// Prometheus 端口 (None = 禁用)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}
