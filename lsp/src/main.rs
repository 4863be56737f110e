#[tokio::main]
async fn main() {
    pps_lsp::run().await;
}
