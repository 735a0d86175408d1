//! `flowrelay serve`: Start the proxy server.

use flowrelay_core::UpstreamConfig;

pub async fn run(host: String, port: u16, upstream: UpstreamConfig) -> Result<(), String> {
    let config = flowrelay_server::ServerConfig {
        host: host.clone(),
        port,
        upstream,
    };

    println!("Starting flowrelay on {}:{}...", host, port);

    let addr = flowrelay_server::start_server(config).await?;
    println!("flowrelay listening on http://{}", addr);

    // Keep the process running until interrupted
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}
