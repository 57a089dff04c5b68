use anyhow::Result;

// Print the OpenAPI document for the default route prefix.
fn main() -> Result<()> {
    let doc = core_service::api::openapi();
    let json = serde_json::to_string_pretty(&doc)?;
    println!("{json}");
    Ok(())
}
