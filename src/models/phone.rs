//! 手机库存数据模型
//!
//! 定义手机记录及其平台挂牌状态的数据结构

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 手机成色等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    New,
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Condition {
    /// 全部成色，按由好到差排列
    pub const ALL: [Condition; 5] = [
        Condition::New,
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }

    /// 从文本解析成色（CSV 导入用），要求精确匹配
    pub fn parse(text: &str) -> Option<Condition> {
        Condition::ALL.iter().copied().find(|c| c.as_str() == text)
    }

    /// 合法成色取值列表，用于错误提示
    pub fn allowed_values() -> String {
        Condition::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 单个平台上的挂牌记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformListing {
    /// 是否已挂牌
    pub listed: bool,
    /// 平台挂牌价（底价加手续费）
    pub platform_price: f64,
    /// 该平台对应的成色叫法，None 表示此成色不能在该平台挂牌
    pub platform_condition: Option<String>,
    /// 挂牌时间（ISO 8601 格式）
    pub listing_date: Option<String>,
}

/// 手机库存记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phone {
    /// 记录编号
    pub id: u64,
    /// 型号名称
    pub model_name: String,
    /// 品牌
    pub brand: String,
    /// 成色
    pub condition: Condition,
    /// 存储容量
    pub storage: String,
    /// 颜色
    pub color: String,
    /// 库存数量
    pub stock_quantity: u32,
    /// 采购底价
    pub base_price: f64,
    /// 规格说明
    pub specifications: String,
    /// 标签（自由文本）
    pub tags: String,
    /// 创建时间（ISO 8601 格式）
    pub created_at: String,
    /// 各平台挂牌状态，键为平台标识
    pub platforms: BTreeMap<String, PlatformListing>,
}

/// 新增/更新手机的请求体
#[derive(Debug, Clone, Deserialize)]
pub struct PhoneInput {
    /// 型号名称（必填）
    pub model_name: String,
    /// 品牌（必填）
    pub brand: String,
    /// 成色（必填）
    pub condition: Condition,
    /// 存储容量
    #[serde(default)]
    pub storage: String,
    /// 颜色
    #[serde(default)]
    pub color: String,
    /// 库存数量
    #[serde(default)]
    pub stock_quantity: u32,
    /// 采购底价（必须为正数）
    pub base_price: f64,
    /// 规格说明
    #[serde(default)]
    pub specifications: String,
    /// 标签
    #[serde(default)]
    pub tags: String,
}

/// 手机列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct PhoneQuery {
    /// 按型号/品牌模糊搜索
    pub search: Option<String>,
    /// 按成色过滤
    pub condition: Option<Condition>,
    /// 只看已挂牌到指定平台的记录
    pub platform: Option<String>,
}

/// 手机列表视图：平台状态摊平为 平台标识 -> 是否挂牌
#[derive(Debug, Serialize)]
pub struct PhoneView {
    pub id: u64,
    pub model_name: String,
    pub brand: String,
    pub condition: Condition,
    pub storage: String,
    pub color: String,
    pub stock_quantity: u32,
    pub base_price: f64,
    pub specifications: String,
    pub tags: String,
    pub created_at: String,
    pub platforms: BTreeMap<String, bool>,
}

impl PhoneView {
    pub fn from_phone(phone: &Phone) -> Self {
        Self {
            id: phone.id,
            model_name: phone.model_name.clone(),
            brand: phone.brand.clone(),
            condition: phone.condition,
            storage: phone.storage.clone(),
            color: phone.color.clone(),
            stock_quantity: phone.stock_quantity,
            base_price: phone.base_price,
            specifications: phone.specifications.clone(),
            tags: phone.tags.clone(),
            created_at: phone.created_at.clone(),
            platforms: phone
                .platforms
                .iter()
                .map(|(id, listing)| (id.clone(), listing.listed))
                .collect(),
        }
    }
}

/// 批量导入结果
#[derive(Debug, Serialize)]
pub struct BulkUploadReport {
    /// 导入成功的行数
    pub success_count: usize,
    /// 失败行数
    pub error_count: usize,
    /// 失败明细（最多保留前 10 条）
    pub errors: Vec<String>,
}
