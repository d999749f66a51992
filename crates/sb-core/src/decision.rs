use serde::{Deserialize, Serialize};

/// Domain 对外需要的统一“用户决策”
///
/// 注意：
/// - 不包含 IO / async
/// - 不包含对话框与窗口细节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionDecision {
    /// 是否把截图写入文档
    pub commit: bool,
    /// 用户输入的标注文字（可为空）
    pub caption: String,
}

impl CaptionDecision {
    pub fn commit(caption: impl Into<String>) -> Self {
        Self {
            commit: true,
            caption: caption.into(),
        }
    }

    pub fn discard() -> Self {
        Self {
            commit: false,
            caption: String::new(),
        }
    }
}

/// 检测到外部修改后用户的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// 把外部修改合并进内存文档
    Merge,
    /// 用内存文档覆盖外部修改
    Overwrite,
    /// 放弃本次保存
    Cancel,
}

/// 合并失败后的降级选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFailureChoice {
    /// 用合并前的内存文档覆盖
    Overwrite,
    /// 放弃本次保存
    Cancel,
}

/// 关闭文档时对未保存内容的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// 截图入档模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// 每张截图都弹出标注确认
    Manual,
    /// 跳过确认，自动使用时间戳标注
    Auto,
}

impl Default for CaptureMode {
    fn default() -> Self {
        Self::Manual
    }
}
