//! File Decoder Port - 上传文件解码

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported encoding, expected UTF-8 or GBK")]
    UnsupportedEncoding,
}

/// File Decoder Port
///
/// 把上传的原始字节解码为文本
pub trait FileDecoderPort: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError>;
}
