use super::{json_pretty, EXIT_SUCCESS};
use herald_schema::Config;
use std::path::Path;

pub fn run(config_path: &Path, json: bool) -> Result<u8, String> {
    let raw = herald_schema::parse_config_file(config_path)
        .map_err(|e| format!("config error: {e}"))?;
    let config = Config::from_raw(raw).map_err(|e| format!("config error: {e}"))?;

    if json {
        let payload = serde_json::json!({
            "valid": true,
            "artifact_name": config.artifact_name,
            "artifact_type": config.artifact_type,
            "project_name": config.project_name,
            "project_version": config.project_version,
            "kv_address": config.kv_address,
            "kv_scheme": config.kv_scheme,
            "build_id": config.build_id,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "configuration valid: {} ({}) -> {}://{}",
            config.artifact_name, config.artifact_type, config.kv_scheme, config.kv_address,
        );
        if let Some(build_id) = config.build_id {
            println!("build id {build_id}");
        }
    }
    Ok(EXIT_SUCCESS)
}
