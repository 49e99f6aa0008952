//! Import Commands

/// 从上传文件导入小说
#[derive(Debug, Clone)]
pub struct ImportNovel {
    /// 调用方身份
    pub user_id: i64,
    /// 上传的文件名（用于默认标题和项目描述）
    pub filename: String,
    /// 文件原始字节
    pub bytes: Vec<u8>,
}
