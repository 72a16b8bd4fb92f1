//! 配置校验模块
//!
//! 校验规则：
//! - dispatch.max_batch_size > 0
//! - dispatch.max_concurrent_workers > 0 (若配置)
//! - mailer.sender 为合法邮箱地址
//! - transport = spool 时 spool_dir 必填

use contracts::{ContractError, ServiceConfig, TransportKind};
use ::validator::ValidateEmail;

/// 校验 ServiceConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ServiceConfig) -> Result<(), ContractError> {
    validate_dispatch(config)?;
    validate_mailer(config)?;
    Ok(())
}

/// 校验分发配置
fn validate_dispatch(config: &ServiceConfig) -> Result<(), ContractError> {
    let dispatch = &config.dispatch;

    if dispatch.max_batch_size == 0 {
        return Err(ContractError::config_validation(
            "dispatch.max_batch_size",
            "max_batch_size must be > 0",
        ));
    }

    if dispatch.max_concurrent_workers == Some(0) {
        return Err(ContractError::config_validation(
            "dispatch.max_concurrent_workers",
            "max_concurrent_workers must be > 0 when set",
        ));
    }

    if dispatch.timeout_ms == Some(0) {
        return Err(ContractError::config_validation(
            "dispatch.timeout_ms",
            "timeout_ms must be > 0 when set",
        ));
    }

    Ok(())
}

/// 校验邮件配置
fn validate_mailer(config: &ServiceConfig) -> Result<(), ContractError> {
    let mailer = &config.mailer;

    if !mailer.sender.validate_email() {
        return Err(ContractError::config_validation(
            "mailer.sender",
            format!("'{}' is not a valid email address", mailer.sender),
        ));
    }

    if mailer.transport == TransportKind::Spool && mailer.spool_dir.is_none() {
        return Err(ContractError::config_validation(
            "mailer.spool_dir",
            "spool_dir is required when transport = \"spool\"",
        ));
    }

    Ok(())
}
