use std::sync::Arc;
use student_store::engine::FileStore;
use student_store::server::Router;
use clap::Parser;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding the student records
    #[arg(short, long, env = "STUDENT_STORE_DATA_FILE", default_value = "students.json")]
    data_file: String,

    #[arg(long, env = "STUDENT_STORE_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, env = "STUDENT_STORE_PORT", default_value = "5000")]
    port: u16,

    /// Directory served for every non-API path
    #[arg(short, long, env = "STUDENT_STORE_STATIC_DIR", default_value = "static")]
    static_dir: String,

    #[arg(long, env = "STUDENT_STORE_MAX_CONNECTIONS", default_value_t = 100)]
    max_connections: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = FileStore::open(&args.data_file)?;
    println!("Starting Student Store Daemon...");
    println!("Loaded {} students from {}.", store.list().len(), args.data_file);

    let router = Router::new(Arc::new(store), &args.static_dir).max_connections(args.max_connections);
    let addr = format!("{}:{}", args.host, args.port);

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        println!("\nShutdown signal received. Finishing in-flight requests...");
    };

    if let Err(e) = router.listen(&addr, shutdown).await {
        eprintln!("HTTP Server failed: {}", e);
        return Err(e.into());
    }
    println!("All writes complete. Exiting.");

    Ok(())
}
