use anyhow::Result;

use crate::event::gold_price::Pipeline;

pub mod config;
pub mod crawler;
pub mod database;
pub mod declare;
pub mod error;
pub mod event;
pub mod feed;
pub mod logging;
pub mod scheduler;
pub mod store;
pub mod util;

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let result = run().await;
    if let Err(why) = &result {
        logging::error_file_async(format!("{:?}", why));
        logging::error_console(format!("{:#}", why));
    }

    logging::flush();
    result
}

async fn run() -> Result<()> {
    let app = config::App::load()?;
    let pipeline = Pipeline::from_config(&app)?;

    if app.system.cron.trim().is_empty() {
        pipeline.execute().await?;
        return Ok(());
    }

    scheduler::start(pipeline, app.system.cron.trim()).await
}
