use actix_web::{web, HttpResponse, Result};
use futures::StreamExt;

use crate::models::{ApiResponse, BulkUploadReport, PhoneInput, PhoneQuery, PhoneView};
use crate::services::csv_import;
use crate::services::platform_service::{self, ListOutcome};
use crate::AppState;

pub async fn list_phones(
    state: web::Data<AppState>,
    query: web::Query<PhoneQuery>,
) -> Result<HttpResponse> {
    match state.store.list(&query) {
        Ok(phones) => {
            let views: Vec<PhoneView> = phones.iter().map(PhoneView::from_phone).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(views)))
        }
        Err(e) => Ok(HttpResponse::InternalServerError()
            .json(ApiResponse::<Vec<PhoneView>>::error(e.to_string()))),
    }
}

pub async fn add_phone(
    state: web::Data<AppState>,
    payload: web::Json<PhoneInput>,
) -> Result<HttpResponse> {
    match state.store.add(&payload, &state.catalog) {
        Ok(phone) => Ok(HttpResponse::Ok().json(ApiResponse::success(PhoneView::from_phone(&phone)))),
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::<PhoneView>::error(e.to_string()))),
    }
}

pub async fn update_phone(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<PhoneInput>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match state.store.update(id, &payload, &state.catalog) {
        Ok(Some(phone)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(PhoneView::from_phone(&phone))))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<PhoneView>::error(format!("Phone {} not found", id)))),
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::<PhoneView>::error(e.to_string()))),
    }
}

pub async fn delete_phone(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match state.store.remove(id) {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success(id))),
        Ok(false) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<u64>::error(format!("Phone {} not found", id)))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::<u64>::error(e.to_string()))),
    }
}

/// CSV 批量导入：请求体为 CSV 原始字节
pub async fn bulk_upload(
    state: web::Data<AppState>,
    mut payload: web::Payload,
) -> Result<HttpResponse> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        body.extend_from_slice(&chunk?);
    }

    if body.is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<BulkUploadReport>::error("No file uploaded")));
    }

    match csv_import::import(&body, &state.store, &state.catalog) {
        Ok(report) if report.success_count == 0 => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::failure(report, "No phones were uploaded successfully"))),
        Ok(report) => {
            let mut message = format!("Successfully uploaded {} phones", report.success_count);
            if report.error_count > 0 {
                message.push_str(&format!(" ({} rows had errors)", report.error_count));
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(report, message)))
        }
        Err(e) => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<BulkUploadReport>::error(e.to_string()))),
    }
}

/// 一键挂牌：由评估器选出利润最高的可挂牌平台
pub async fn quick_list(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match platform_service::quick_list(&state.store, &state.catalog, state.min_margin, id) {
        Ok(ListOutcome::Listed { platform_id, platform_name }) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                platform_id,
                format!("Phone listed on {}", platform_name),
            )))
        }
        Ok(ListOutcome::PhoneNotFound) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<String>::error(format!("Phone {} not found", id)))),
        // 没有合适平台不是服务端错误
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::<String>::error(
            "No suitable platform found for this phone",
        ))),
        Err(e) => Ok(HttpResponse::InternalServerError()
            .json(ApiResponse::<String>::error(e.to_string()))),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/phones")
            .route("", web::get().to(list_phones))
            .route("", web::post().to(add_phone))
            .route("/bulk-upload", web::post().to(bulk_upload))
            .route("/{id}", web::put().to(update_phone))
            .route("/{id}", web::delete().to(delete_phone))
            .route("/{id}/quick-list", web::post().to(quick_list)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlatformCatalog;
    use crate::services::inventory_service::PhoneStore;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState {
            store: PhoneStore::new(),
            catalog: PlatformCatalog::standard(),
            min_margin: 0.1,
        })
    }

    #[actix_web::test]
    async fn add_then_list_phones() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/phones")
            .set_json(json!({
                "model_name": "iPhone 12",
                "brand": "Apple",
                "condition": "Good",
                "stock_quantity": 5,
                "base_price": 100.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/v1/phones").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], json!(true));
        let phones = body["data"].as_array().unwrap();
        assert_eq!(phones.len(), 1);
        assert_eq!(phones[0]["model_name"], json!("iPhone 12"));
        assert_eq!(phones[0]["platforms"]["X"], json!(false));
    }

    #[actix_web::test]
    async fn add_rejects_missing_price() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/phones")
            .set_json(json!({
                "model_name": "iPhone 12",
                "brand": "Apple",
                "condition": "Good",
                "base_price": 0.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn delete_missing_phone_is_404() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::delete()
            .uri("/api/v1/phones/42")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn bulk_upload_reports_counts() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let csv = "model_name,brand,condition,base_price\niPhone 12,Apple,Good,100\n,Apple,Good,100\n";
        let req = test::TestRequest::post()
            .uri("/api/v1/phones/bulk-upload")
            .set_payload(csv)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["success_count"], json!(1));
        assert_eq!(body["data"]["error_count"], json!(1));
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Successfully uploaded 1 phones"));
    }

    #[actix_web::test]
    async fn quick_list_picks_best_platform() {
        let state = test_state();
        let phone = state
            .store
            .add(
                &PhoneInput {
                    model_name: "iPhone 12".to_string(),
                    brand: "Apple".to_string(),
                    condition: crate::models::Condition::Good,
                    storage: String::new(),
                    color: String::new(),
                    stock_quantity: 5,
                    base_price: 100.0,
                    specifications: String::new(),
                    tags: String::new(),
                },
                &state.catalog,
            )
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/phones/{}/quick-list", phone.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"], json!("Z"));
    }
}
