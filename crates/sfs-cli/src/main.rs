#[tokio::main]
async fn main() {
    std::process::exit(sfs_cli::run().await);
}
