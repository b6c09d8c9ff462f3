//! Drains an inbound message stream into memory

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::types::RawMessage;

/// Upper bound on the buffer reserved up front from the declared size
const MAX_PREALLOC: usize = 32 * 1024 * 1024;

/// Read the whole stream. `declared_size` only sizes the initial buffer;
/// the stream's actual length is authoritative.
pub async fn read_raw<R>(stream: &mut R, declared_size: usize) -> std::io::Result<RawMessage>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut bytes = Vec::with_capacity(declared_size.min(MAX_PREALLOC));
    stream.read_to_end(&mut bytes).await?;
    if bytes.len() != declared_size {
        debug!(
            "Raw message is {} bytes, transport declared {declared_size}",
            bytes.len()
        );
    }
    Ok(RawMessage::new(bytes, declared_size))
}
