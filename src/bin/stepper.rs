use anyhow::Result;
use diagram_stepper::app::run;

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}
