//! SSH primitive encodings (RFC 4251 Section 5).
//!
//! Length-prefixed `string` reads and writes shared by the auth codec, key
//! blobs, and signature marshaling.

use bytes::{BufMut, BytesMut};
use ferry_platform::{FerryError, FerryResult};

pub(crate) fn put_str(buf: &mut BytesMut, s: &str) {
    let bytes = s.as_bytes();
    buf.put_u32(bytes.len() as u32);
    buf.put_slice(bytes);
}

pub(crate) fn put_bytes(buf: &mut BytesMut, bytes: &[u8]) {
    buf.put_u32(bytes.len() as u32);
    buf.put_slice(bytes);
}

pub(crate) fn read_string(data: &[u8], offset: &mut usize) -> FerryResult<String> {
    let bytes = read_bytes(data, offset)?;
    String::from_utf8(bytes)
        .map_err(|_| FerryError::Protocol("string contains invalid UTF-8".to_string()))
}

pub(crate) fn read_bytes(data: &[u8], offset: &mut usize) -> FerryResult<Vec<u8>> {
    if *offset + 4 > data.len() {
        return Err(FerryError::Protocol(format!(
            "cannot read length at offset {}",
            offset
        )));
    }

    let length = u32::from_be_bytes([
        data[*offset],
        data[*offset + 1],
        data[*offset + 2],
        data[*offset + 3],
    ]) as usize;
    *offset += 4;

    if *offset + length > data.len() {
        return Err(FerryError::Protocol(format!(
            "data truncated: expected {} bytes at offset {}",
            length, offset
        )));
    }

    let bytes = data[*offset..*offset + length].to_vec();
    *offset += length;

    Ok(bytes)
}

pub(crate) fn read_u32(data: &[u8], offset: &mut usize) -> FerryResult<u32> {
    if *offset + 4 > data.len() {
        return Err(FerryError::Protocol(format!(
            "cannot read uint32 at offset {}",
            offset
        )));
    }
    let value = u32::from_be_bytes([
        data[*offset],
        data[*offset + 1],
        data[*offset + 2],
        data[*offset + 3],
    ]);
    *offset += 4;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_round_trip() {
        let mut buf = BytesMut::new();
        put_str(&mut buf, "ssh-connection");

        let mut offset = 0;
        let parsed = read_string(&buf, &mut offset).unwrap();
        assert_eq!(parsed, "ssh-connection");
        assert_eq!(offset, buf.len());
    }

    #[test]
    fn test_read_bytes_truncated() {
        let data = [0u8, 0, 0, 10, 1, 2, 3];
        let mut offset = 0;
        assert!(read_bytes(&data, &mut offset).is_err());
    }

    #[test]
    fn test_read_bytes_missing_length() {
        let data = [0u8, 0];
        let mut offset = 0;
        assert!(read_bytes(&data, &mut offset).is_err());
    }

    #[test]
    fn test_read_u32() {
        let data = [0u8, 0, 0x01, 0x02];
        let mut offset = 0;
        assert_eq!(read_u32(&data, &mut offset).unwrap(), 0x0102);
        assert!(read_u32(&data, &mut offset).is_err());
    }
}
