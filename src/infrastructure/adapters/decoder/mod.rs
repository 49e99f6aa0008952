//! Decoder Adapter - 上传文件解码

mod text_decoder;

pub use text_decoder::Utf8GbkDecoder;
