//! 翻新机库存后端服务
//!
//! 提供手机库存管理、多平台挂牌与收益分析的 RESTful API 服务
//! 平台：X / Y / Z，各自费率与成色规则见平台目录

mod config;     // 配置加载
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::models::PlatformCatalog;
use crate::services::inventory_service::PhoneStore;

/// 应用共享状态
///
/// 启动时建立，整个生命周期内只读注入各处理器；
/// 库存本身的可变性由 PhoneStore 内部的锁管理
pub struct AppState {
    /// 手机库存
    pub store: PhoneStore,
    /// 平台目录（费率与成色规则的唯一来源）
    pub catalog: PlatformCatalog,
    /// 挂牌所需的最低利润率
    pub min_margin: f64,
}

/// 应用程序入口
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 初始化日志系统，默认日志级别为 info
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let app_config = AppConfig::load();

    let state = web::Data::new(AppState {
        store: PhoneStore::new(),
        catalog: PlatformCatalog::standard(),
        min_margin: app_config.pricing.min_profit_margin,
    });

    log::info!(
        "启动翻新机库存后端服务，监听 {}，最低利润率 {}",
        app_config.bind_addr(),
        state.min_margin
    );

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(state.clone())
            .configure(handlers::config)  // 配置路由
    })
    .bind(app_config.bind_addr())?;

    if app_config.server.workers > 0 {
        server = server.workers(app_config.server.workers);
    }

    server.run().await
}
