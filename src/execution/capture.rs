//! Bounded capture of child output streams

use tokio::io::{AsyncRead, AsyncReadExt};

/// One captured stream: up to the cap in bytes, plus whether it was cut off
#[derive(Debug, Clone, Default)]
pub struct CapturedStream {
    pub text: String,
    pub truncated: bool,
}

/// Drain a child stream to completion, keeping at most `cap` bytes.
///
/// Reading continues past the cap so the child never blocks on a full pipe;
/// surplus bytes are discarded and the truncation flag is set instead.
pub async fn drain_capped<R>(mut stream: R, cap: usize) -> std::io::Result<CapturedStream>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    let mut collected: Vec<u8> = Vec::new();
    let mut truncated = false;

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }

        let room = cap.saturating_sub(collected.len());
        if n <= room {
            collected.extend_from_slice(&chunk[..n]);
        } else {
            collected.extend_from_slice(&chunk[..room]);
            truncated = true;
        }
    }

    Ok(CapturedStream {
        text: String::from_utf8_lossy(&collected).into_owned(),
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_short_stream_whole() {
        let captured = drain_capped(&b"hello\n"[..], 1024).await.unwrap();

        assert_eq!(captured.text, "hello\n");
        assert!(!captured.truncated);
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_text() {
        let captured = drain_capped(&b""[..], 1024).await.unwrap();

        assert!(captured.text.is_empty());
        assert!(!captured.truncated);
    }

    #[tokio::test]
    async fn cuts_stream_at_cap() {
        let data = vec![b'a'; 100];
        let captured = drain_capped(&data[..], 16).await.unwrap();

        assert_eq!(captured.text.len(), 16);
        assert!(captured.truncated);
    }

    #[tokio::test]
    async fn stream_exactly_at_cap_is_not_truncated() {
        let data = vec![b'b'; 32];
        let captured = drain_capped(&data[..], 32).await.unwrap();

        assert_eq!(captured.text.len(), 32);
        assert!(!captured.truncated);
    }

    #[tokio::test]
    async fn lossy_decodes_invalid_utf8() {
        let data = [0x66, 0x6f, 0x6f, 0xff];
        let captured = drain_capped(&data[..], 1024).await.unwrap();

        assert!(captured.text.starts_with("foo"));
    }
}
