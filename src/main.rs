#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), tvisionbot_rs::BoxError> {
    tvisionbot_rs::run().await
}
