// src/exec/output.rs

//! Where the provisioning script's output goes.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Boxed async writer receiving one of the script's output streams.
pub type Sink = Box<dyn AsyncWrite + Send + Unpin>;

/// Destinations for forwarded stdout and stderr.
pub struct OutputSinks {
    pub stdout: Sink,
    pub stderr: Sink,
}

impl OutputSinks {
    pub fn new(
        stdout: impl AsyncWrite + Send + Unpin + 'static,
        stderr: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        }
    }
}

/// How the child's stdout/stderr are connected.
pub enum OutputTarget {
    /// The child writes straight to the tool's own stdout/stderr.
    Inherit,
    /// The child's output is piped and copied into the given sinks as it
    /// arrives.
    Forward(OutputSinks),
}

impl std::fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputTarget::Inherit => f.write_str("Inherit"),
            OutputTarget::Forward(_) => f.write_str("Forward(..)"),
        }
    }
}

/// Copy `reader` into `writer` chunk by chunk, flushing after each chunk so
/// partial lines reach the sink immediately.
///
/// Stops at EOF or on the first read/write error; errors are logged, not
/// propagated, since losing a sink must not change the run's outcome.
pub async fn pump<R, W>(mut reader: R, mut writer: W, stream: &'static str)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; 8192];
    let mut total = 0usize;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(stream, error = %e, "failed to read script output");
                break;
            }
        };

        if let Err(e) = writer.write_all(&buf[..n]).await {
            warn!(stream, error = %e, "failed to forward script output");
            break;
        }
        if let Err(e) = writer.flush().await {
            warn!(stream, error = %e, "failed to flush script output");
            break;
        }
        total += n;
    }

    let _ = writer.shutdown().await;
    debug!(stream, bytes = total, "output stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;

    #[tokio::test]
    async fn pump_delivers_partial_lines_before_eof() {
        let (mut child_side, pipe_reader) = tokio::io::duplex(64);
        let (sink, sink_reader) = tokio::io::duplex(64);

        let handle = tokio::spawn(pump(pipe_reader, sink, "stdout"));

        child_side.write_all(b"Waiting for services").await.unwrap();
        let mut sink_reader = tokio::io::BufReader::new(sink_reader);
        let mut got = vec![0u8; 20];
        sink_reader.read_exact(&mut got).await.unwrap();
        assert_eq!(&got, b"Waiting for services");

        child_side.write_all(b" to start...\n").await.unwrap();
        drop(child_side);

        let mut rest = String::new();
        sink_reader.read_line(&mut rest).await.unwrap();
        assert_eq!(rest, " to start...\n");

        handle.await.unwrap();
    }
}
