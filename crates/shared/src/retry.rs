//! 上游调用的退避重试
//!
//! 只有 `is_retryable` 认可的错误才会重试，通常是传输层失败（连接拒绝、超时、连接重置）。
//! 已经拿到 HTTP 响应的错误（404、409 等）直接返回给调用方。

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::AppError;

/// 退避参数
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 首次执行之外最多再试几次
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// 默认退避参数，只改重试次数
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// 同样的退避参数，但只执行一次
    pub fn once(&self) -> Self {
        Self {
            max_retries: 0,
            ..self.clone()
        }
    }

    /// 第 `attempt` 次重试前的等待（从 0 起算），不超过 `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        Duration::try_from_secs_f64(self.initial_delay.as_secs_f64() * factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// 按 `policy` 执行 `operation`，可重试的错误在退避后重新执行
pub async fn retry_with_policy<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    is_retryable: impl Fn(&AppError) -> bool,
    mut operation: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt: u32 = 0;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(operation = operation_name, attempt, "重试后成功");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !is_retryable(&err) {
            return Err(err);
        }
        if attempt >= policy.max_retries {
            warn!(operation = operation_name, attempt, error = %err, "重试次数用尽");
            return Err(err);
        }

        let delay = policy.delay_for_attempt(attempt);
        warn!(
            operation = operation_name,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "调用失败，退避后重试"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
