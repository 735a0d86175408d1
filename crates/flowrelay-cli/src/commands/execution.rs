//! `flowrelay execution`: Execution commands against the upstream API.

use flowrelay_core::{ExecutionFilter, UpstreamClient};

use super::{print_body, upstream_error};

pub async fn list(client: &UpstreamClient, filter: &ExecutionFilter) -> Result<(), String> {
    let body = client
        .list_executions(filter)
        .await
        .map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}

pub async fn get(client: &UpstreamClient, id: &str) -> Result<(), String> {
    let body = client.get_execution(id).await.map_err(upstream_error)?;
    print_body(&body);
    Ok(())
}
