#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kubectl_np_viewer::Args::parse_and_run().await
}
