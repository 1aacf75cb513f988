use log::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = sputils::cli::run().await {
        error!("{e:?}");
        eprintln!("sputils: {e}");
        std::process::exit(1);
    }
}
