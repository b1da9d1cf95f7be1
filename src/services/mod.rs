//! 业务逻辑服务模块
//!
//! 定价评估、库存存取、平台运营与批量导入

pub mod pricing;            // 定价与收益评估（纯函数）
pub mod inventory_service;  // 库存存取
pub mod platform_service;   // 平台运营
pub mod csv_import;         // CSV 批量导入
