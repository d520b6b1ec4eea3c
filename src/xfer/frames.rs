use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::catalog::CatalogEntry;

/// Scrive una risposta testuale: intestazione `TXT <N>\n` seguita da
/// esattamente N byte di testo. N è la lunghezza in byte, non in
/// caratteri.
pub async fn write_txt<W>(writer: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let header = format!("TXT {}\n", text.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(text.as_bytes()).await?;
    Ok(())
}

/// Annuncia quanti file seguono in risposta a una GET
pub async fn write_files_header<W>(writer: &mut W, count: usize) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let header = format!("FILES {}\n", count);
    writer.write_all(header.as_bytes()).await
}

/// Intestazione di un singolo file in arrivo: nome, checksum e
/// dimensione in byte del contenuto che segue
pub async fn write_hash_header<W>(writer: &mut W, entry: &CatalogEntry) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let header = format!("HASH {} {} {}\n", entry.name, entry.checksum, entry.size);
    writer.write_all(header.as_bytes()).await
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tokio::io::{AsyncReadExt, duplex};

    use super::*;

    async fn drain(far: &mut tokio::io::DuplexStream) -> Vec<u8> {
        let mut bytes = Vec::new();
        far.read_to_end(&mut bytes).await.unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_write_txt_frames_header_and_body() {
        let (mut near, mut far) = duplex(4096);
        write_txt(&mut near, "hello").await.unwrap();
        drop(near);
        assert_eq!(drain(&mut far).await, b"TXT 5\nhello");
    }

    #[tokio::test]
    async fn test_write_txt_empty_text() {
        let (mut near, mut far) = duplex(4096);
        write_txt(&mut near, "").await.unwrap();
        drop(near);
        assert_eq!(drain(&mut far).await, b"TXT 0\n");
    }

    #[tokio::test]
    async fn test_write_txt_counts_bytes_not_characters() {
        // "è" occupa due byte in UTF-8
        let (mut near, mut far) = duplex(4096);
        write_txt(&mut near, "è").await.unwrap();
        drop(near);
        assert_eq!(drain(&mut far).await, "TXT 2\nè".as_bytes());
    }

    #[tokio::test]
    async fn test_write_files_header() {
        let (mut near, mut far) = duplex(4096);
        write_files_header(&mut near, 3).await.unwrap();
        drop(near);
        assert_eq!(drain(&mut far).await, b"FILES 3\n");
    }

    #[tokio::test]
    async fn test_write_hash_header() {
        let entry = CatalogEntry {
            name: "a.txt".to_string(),
            path: PathBuf::from("/srv/a.txt"),
            size: 42,
            checksum: "abc123".to_string(),
        };
        let (mut near, mut far) = duplex(4096);
        write_hash_header(&mut near, &entry).await.unwrap();
        drop(near);
        assert_eq!(drain(&mut far).await, b"HASH a.txt abc123 42\n");
    }
}
