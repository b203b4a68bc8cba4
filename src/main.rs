#[actix_web::main]
async fn main() -> std::io::Result<()> {
    reports_api::run().await
}
