use super::{json_pretty, spin_fail, spin_ok, spinner, FileArtifact, SpinnerUi, EXIT_SUCCESS};
use herald_core::{CoreError, Publisher};
use std::path::Path;

pub fn run(config_path: &Path, artifact_path: &Path, json: bool) -> Result<u8, String> {
    let raw = herald_schema::parse_config_file(config_path)
        .map_err(|e| format!("config error: {e}"))?;
    let artifact = FileArtifact::load(artifact_path)?;
    tracing::debug!(
        "loaded config {} and artifact descriptor {}",
        config_path.display(),
        artifact_path.display()
    );
    let publisher = Publisher::configure(raw).map_err(|e| format!("configure failed: {e}"))?;

    let pb = spinner("publishing image metadata…");
    let ui = SpinnerUi::new(&pb);
    let published = publisher.publish(&ui, &artifact).map_err(|e| {
        spin_fail(&pb, "publish failed");
        match e {
            CoreError::Store(store) => format!("store error: {store}"),
            other => format!("publish failed: {other}"),
        }
    })?;
    spin_ok(&pb, "publish complete");

    if json {
        let payload = serde_json::json!({
            "name": published.name,
            "type": published.artifact_type,
            "version": published.version,
            "build_id": published.build_id,
            "metadata": published.metadata,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "published {} ({}) version {}",
            published.name, published.artifact_type, published.version,
        );
        if let Some(build_id) = published.build_id {
            println!("build id {build_id}");
        }
        for (key, value) in &published.metadata {
            println!("  {key} = {value}");
        }
    }
    Ok(EXIT_SUCCESS)
}
