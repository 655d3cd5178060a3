//! Headless 控制台模式
//!
//! 没有窗口时用异步 sleep 循环充当呈现上下文，状态栏变化直接打印到终端。

use std::time::{Duration, Instant};

use tokio::sync::broadcast::error::TryRecvError;

use es_vision::{CaptureController, EventBus, TickOutcome};

/// 运行采集循环直到 Ctrl+C、到达时长或会话结束
pub async fn run(
    mut controller: CaptureController,
    events: EventBus,
    duration: Option<Duration>,
) -> anyhow::Result<()> {
    let mut rx = events.subscribe();
    let display = controller.display().clone();
    let deadline = duration.map(|d| Instant::now() + d);

    println!("{}", display.label());
    if let Err(e) = controller.start() {
        // 设备不可用只体现在状态栏上
        println!("{}", display.label());
        tracing::warn!(error = %e, "headless run aborted");
        return Ok(());
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_status = display.label();
    loop {
        let delay = match controller.tick() {
            TickOutcome::Reschedule(delay) => delay,
            TickOutcome::Halt => break,
        };

        let status = display.label();
        if status != last_status {
            println!("{status}");
            last_status = status;
        }

        loop {
            match rx.try_recv() {
                Ok(event) => tracing::debug!(
                    kind = event.kind.as_str(),
                    payload = %event.payload,
                    "session event"
                ),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "event consumer lagged")
                }
                Err(_) => break,
            }
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::info!("headless duration reached");
            break;
        }

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Ctrl+C received");
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    controller.stop();
    Ok(())
}
