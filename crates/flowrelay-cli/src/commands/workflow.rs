//! `flowrelay workflow`: Workflow commands against the upstream API.

use std::path::Path;

use flowrelay_core::UpstreamClient;

use super::{print_body, upstream_error};

pub async fn list(client: &UpstreamClient) -> Result<(), String> {
    let body = client.list_workflows().await.map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}

pub async fn get(client: &UpstreamClient, id: &str) -> Result<(), String> {
    let body = client.get_workflow(id).await.map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}

pub async fn create(client: &UpstreamClient, file: &Path) -> Result<(), String> {
    let definition = read_json_file(file)?;
    let body = client
        .create_workflow(&definition)
        .await
        .map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}

pub async fn update(client: &UpstreamClient, id: &str, file: &Path) -> Result<(), String> {
    let definition = read_json_file(file)?;
    let body = client
        .update_workflow(id, &definition)
        .await
        .map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}

/// Backs both `workflow activate` and `workflow deactivate`.
pub async fn set_active(client: &UpstreamClient, id: &str, active: bool) -> Result<(), String> {
    let body = client
        .toggle_workflow(id, active)
        .await
        .map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}

pub async fn execute(client: &UpstreamClient, id: &str, input: Option<&str>) -> Result<(), String> {
    let input = input
        .map(|raw| {
            serde_json::from_str::<serde_json::Value>(raw)
                .map_err(|e| format!("Invalid --input JSON: {}", e))
        })
        .transpose()?;

    let body = client
        .execute_workflow(id, input.as_ref())
        .await
        .map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}

pub async fn delete(client: &UpstreamClient, id: &str) -> Result<(), String> {
    let body = client.delete_workflow(id).await.map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}

/// Read a workflow definition from a JSON file.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse '{}' as JSON: {}", path.display(), e))
}
