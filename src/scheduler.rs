use std::{future::Future, sync::Arc};

use anyhow::{Error, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{event::gold_price::Pipeline, logging};

/// 依 cron 表示式(含秒，UTC)重複執行，直到收到 Ctrl-C
pub async fn start(pipeline: Pipeline, cron_expr: &str) -> Result<()> {
    let pipeline = Arc::new(pipeline);
    let mut sched = JobScheduler::new().await?;

    let job = create_job(cron_expr, move || {
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.execute().await.map(|_| ()) }
    })?;
    sched.add(job).await?;
    sched.start().await?;

    logging::info_console(format!("Scheduled gold price crawler with '{}'", cron_expr));

    tokio::signal::ctrl_c().await?;
    logging::info_console("Shutting down the scheduler".to_string());
    sched.shutdown().await?;

    Ok(())
}

fn create_job<F, Fut>(cron_expr: &str, task: F) -> Result<Job>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    let expr = cron_expr.to_string();
    Ok(Job::new_async(cron_expr, move |_uuid, _l| {
        let task = task.clone();
        let expr = expr.clone();
        Box::pin(async move {
            if let Err(why) = task().await {
                logging::error_file_async(format!(
                    "Failed to execute task({}) because {:?}",
                    expr, why
                ));
            }
        })
    })?)
}
