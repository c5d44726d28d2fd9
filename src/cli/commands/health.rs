use serde_json::json;

use crate::cli::context::Portal;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

pub async fn handle(portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = portal.client.base_url().to_string();
    match portal.client.health_check().await {
        Ok(health) => match output_format {
            OutputFormat::Json => output_json(&json!({ "url": url, "reachable": true, "health": health })),
            OutputFormat::Text => {
                println!("Service: {}", url);
                println!("Status: UP ({})", health.status);
                Ok(())
            }
        },
        Err(e) => {
            if let OutputFormat::Json = output_format {
                output_json(&json!({
                    "url": url,
                    "reachable": false,
                    "error": e.user_message(),
                    "error_code": e.error_code(),
                }))?;
            }
            Err(anyhow::anyhow!("Service at {} is not healthy: {}", url, e.user_message()))
        }
    }
}
