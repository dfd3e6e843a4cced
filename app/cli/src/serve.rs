//! Newline-delimited JSON request loop.
//!
//! Each input line is one [`PluginRequest`]; each gets exactly one
//! [`PluginResponse`] line back, in order. Blank lines are ignored.

use plugsync_error::StatusCode;
use plugsync_plugin::PluginOrchestrator;
use plugsync_plugin::PluginRequest;
use plugsync_plugin::PluginResponse;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use tracing::info;

/// Answer requests from `reader` until end of input.
pub async fn serve<R, W>(
    orchestrator: &PluginOrchestrator,
    reader: R,
    mut writer: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<PluginRequest>(line) {
            Ok(request) => {
                debug!(?request, "Handling request");
                orchestrator.handle(request).await
            }
            Err(e) => {
                PluginResponse::error(format!("Invalid request: {e}"), StatusCode::ParseError)
            }
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        handled += 1;
    }

    info!(handled, "Request stream closed");
    Ok(())
}

#[cfg(test)]
#[path = "serve.test.rs"]
mod tests;
