//! 通用 API 响应模型
//!
//! 定义统一的 API 响应格式

use serde::{Deserialize, Serialize};
use chrono::Utc;
use chrono_tz::Asia::Shanghai;

/// 获取北京时间字符串（ISO 8601 格式）
pub(crate) fn beijing_now() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 统一 API 响应结构
///
/// 所有接口返回统一格式，包含：
/// - success: 请求是否成功
/// - data: 响应数据（成功时有值）
/// - message: 响应消息
/// - timestamp: 响应时间戳（北京时间）
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 响应数据
    pub data: Option<T>,
    /// 响应消息
    pub message: String,
    /// 响应时间戳（ISO 8601 格式）
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    ///
    /// # 参数
    /// - data: 响应数据
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: beijing_now(),
        }
    }

    /// 创建带提示消息的成功响应
    ///
    /// # 参数
    /// - data: 响应数据
    /// - message: 提示消息（展示给操作员）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            timestamp: beijing_now(),
        }
    }

    /// 创建错误响应
    ///
    /// # 参数
    /// - message: 错误信息
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            timestamp: beijing_now(),
        }
    }

    /// 创建带数据的失败响应（如批量导入全部失败时附带错误明细）
    pub fn failure(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            message: message.into(),
            timestamp: beijing_now(),
        }
    }
}
