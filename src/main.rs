use mimalloc::MiMalloc;
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use abstats::{
    config::{Config, ConfigError},
    search::{configured_accumulator, run_session},
    utils::default_thread_count,
};
use log::{error, info, warn};
use parking_lot::Mutex;

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(ConfigError::Io { path, .. }) => {
            warn!("未找到 {path}，使用默认配置", path = path.display());
            Config::default()
        }
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = load_config();
    let exit_flag = Arc::new(AtomicBool::new(false));
    let flag = exit_flag.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        println!("\n收到 Ctrl+C，正在退出...");
    })
    .expect("无法设置 Ctrl+C 处理程序");

    let num_threads = config.search.num_threads.unwrap_or_else(default_thread_count);
    info!(
        "{tricks} 墩搜索，每轮 {searches} 次，共 {rounds} 轮，使用 {num_threads} 个线程",
        tricks = config.search.tricks,
        searches = config.search.searches,
        rounds = config.search.rounds,
    );
    let stats = Mutex::new(configured_accumulator(&config.stats));
    for round in 0..config.search.rounds {
        if exit_flag.load(Ordering::SeqCst) {
            break;
        }
        match run_session(&config.search, round, num_threads, &stats, &exit_flag) {
            Ok(completed) => info!("第 {round} 轮完成 {completed} 次搜索"),
            Err(err) => {
                error!("搜索统计出错: {err}");
                break;
            }
        }
        let mut stats = stats.lock();
        stats.generate_report();
        stats.reset_epoch();
    }
}
