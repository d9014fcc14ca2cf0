//! RFC 7858 / RFC 1035 §4.2.2 stream framing: a 2-byte big-endian length
//! followed by the message.

use polydns_domain::DomainError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const MAX_STREAM_MESSAGE_SIZE: usize = 65535;

pub async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::Validation(format!(
            "DNS message too large for stream framing: {} bytes",
            message_bytes.len()
        ))
    })?;

    let mut framed = Vec::with_capacity(2 + message_bytes.len());
    framed.extend_from_slice(&length.to_be_bytes());
    framed.extend_from_slice(message_bytes);

    stream
        .write_all(&framed)
        .await
        .map_err(|e| DomainError::transport("stream", format!("write failed: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::transport("stream", format!("flush failed: {}", e)))?;

    Ok(())
}

pub async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await.map_err(|e| {
        DomainError::transport("stream", format!("failed to read response length: {}", e))
    })?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len > MAX_STREAM_MESSAGE_SIZE {
        return Err(DomainError::UpstreamProtocol(format!(
            "Response too large: {} bytes (max {})",
            response_len, MAX_STREAM_MESSAGE_SIZE
        )));
    }

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await.map_err(|e| {
        DomainError::transport("stream", format!("failed to read response body: {}", e))
    })?;

    Ok(response)
}
