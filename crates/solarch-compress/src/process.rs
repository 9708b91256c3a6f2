//! Piping bytes through an external filter process.
//!
//! Input writing, stdout draining and stderr draining run as joined futures
//! on the calling task, so a filter that blocks on a full stdout pipe never
//! stalls the writer.

use crate::error::{CompressError, CompressResult};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Run `command`, feed it `input` (or nothing), and stream its stdout into
/// `sink`. Returns the number of bytes written to `sink`.
///
/// Fails on spawn errors, on a non-zero exit status, and when writing `input`
/// hits a closed pipe even though the process exits cleanly. Input that fits
/// in the pipe buffer may be dropped unread without an error.
pub async fn pipe_through<W>(
    mut command: Command,
    input: Option<&[u8]>,
    sink: &mut W,
) -> CompressResult<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| CompressError::Spawn {
        program: program.clone(),
        source,
    })?;
    let stdin = child.stdin.take();
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("child stdout not captured"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("child stderr not captured"))?;

    let write = async move {
        let (Some(mut stdin), Some(data)) = (stdin, input) else {
            return Ok::<bool, std::io::Error>(true);
        };
        match stdin.write_all(data).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(false),
            Err(e) => return Err(e),
        }
        match stdin.shutdown().await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(false),
            Err(e) => Err(e),
        }
    };
    let copy = tokio::io::copy(&mut stdout, &mut *sink);
    let drain_stderr = async {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await?;
        Ok::<Vec<u8>, std::io::Error>(buf)
    };

    let (input_consumed, written, stderr_bytes) = tokio::try_join!(write, copy, drain_stderr)?;
    let status = child.wait().await?;
    let stderr_text = String::from_utf8_lossy(&stderr_bytes).trim().to_string();

    if !status.success() {
        return Err(CompressError::ExitStatus {
            program,
            code: status.code(),
            stderr: stderr_text,
        });
    }
    if !input_consumed {
        return Err(CompressError::InputClosed { program });
    }
    if !stderr_text.is_empty() {
        warn!(%program, stderr = %stderr_text, "filter wrote to stderr");
    }
    sink.flush().await?;
    debug!(
        %program,
        input_bytes = input.map_or(0, <[u8]>::len),
        output_bytes = written,
        "filter finished"
    );
    Ok(written)
}

/// Run a filter over an in-memory buffer and collect its output.
pub async fn filter_bytes(command: Command, input: &[u8]) -> CompressResult<Vec<u8>> {
    let mut out = Vec::new();
    pipe_through(command, Some(input), &mut out).await?;
    Ok(out)
}
