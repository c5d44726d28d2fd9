use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::views::ViewState;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print any serializable value as pretty JSON
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render a view state: JSON as-is, text through `text` once ready.
///
/// A failed view is printed and then reported as the command's error.
pub fn output_view<T: Serialize>(
    output_format: &OutputFormat,
    view: &str,
    state: &ViewState<T>,
    text: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if let OutputFormat::Json = output_format {
        output_json(&json!({ "view": view, "state": state }))?;
    }

    match state {
        ViewState::Error(err) => Err(anyhow::anyhow!("{}", err.message)),
        _ if matches!(output_format, OutputFormat::Json) => Ok(()),
        ViewState::Idle => {
            println!("No student selected. Run `portal students select <ID>` first");
            Ok(())
        }
        ViewState::Loading => {
            println!("Loading...");
            Ok(())
        }
        ViewState::Ready(data) => {
            text(data);
            Ok(())
        }
    }
}

/// Value or `-` for optional columns
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}
