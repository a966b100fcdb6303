//! In-memory sinks for forwarded script output.

use tokio::io::{AsyncReadExt, DuplexStream};

use pcfdev::exec::{OutputSinks, OutputTarget};

const CAPACITY: usize = 64 * 1024;

/// Read ends of the sinks handed to the runner.
pub struct CapturedOutput {
    pub stdout: DuplexStream,
    pub stderr: DuplexStream,
}

impl CapturedOutput {
    /// Read stdout until the runner closes it.
    pub async fn stdout_to_string(&mut self) -> String {
        let mut out = String::new();
        self.stdout
            .read_to_string(&mut out)
            .await
            .expect("reading captured stdout");
        out
    }

    /// Read stderr until the runner closes it.
    pub async fn stderr_to_string(&mut self) -> String {
        let mut out = String::new();
        self.stderr
            .read_to_string(&mut out)
            .await
            .expect("reading captured stderr");
        out
    }
}

/// Build a `Forward` output target whose data can be read back from the
/// returned [`CapturedOutput`].
pub fn capture() -> (OutputTarget, CapturedOutput) {
    let (stdout_sink, stdout) = tokio::io::duplex(CAPACITY);
    let (stderr_sink, stderr) = tokio::io::duplex(CAPACITY);
    (
        OutputTarget::Forward(OutputSinks::new(stdout_sink, stderr_sink)),
        CapturedOutput { stdout, stderr },
    )
}
