//! Text Decoder - 上传文件解码
//!
//! 先按 UTF-8（可带 BOM）严格解码，失败后按 GBK 严格解码

use encoding_rs::GBK;

use crate::application::ports::{DecodeError, FileDecoderPort};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// UTF-8 → GBK 解码器
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8GbkDecoder;

impl FileDecoderPort for Utf8GbkDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        let utf8 = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        if let Ok(text) = std::str::from_utf8(utf8) {
            return Ok(text.to_string());
        }

        GBK.decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or(DecodeError::UnsupportedEncoding)
    }
}
