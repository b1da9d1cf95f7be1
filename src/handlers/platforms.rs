use actix_web::{web, HttpResponse, Result};
use std::collections::BTreeMap;

use crate::models::{ApiResponse, ListPhoneRequest, PhoneProfitability, PlatformSummary};
use crate::services::platform_service::{self, ListOutcome};
use crate::AppState;

pub async fn platform_summary(state: web::Data<AppState>) -> Result<HttpResponse> {
    match platform_service::platform_summary(&state.store, &state.catalog) {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary))),
        Err(e) => Ok(HttpResponse::InternalServerError()
            .json(ApiResponse::<BTreeMap<String, PlatformSummary>>::error(e.to_string()))),
    }
}

/// 手动指定平台挂牌
pub async fn list_phone(
    state: web::Data<AppState>,
    payload: web::Json<ListPhoneRequest>,
) -> Result<HttpResponse> {
    match platform_service::list_phone(
        &state.store,
        &state.catalog,
        state.min_margin,
        payload.phone_id,
        &payload.platform,
    ) {
        Ok(ListOutcome::Listed { platform_id, platform_name }) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                platform_id,
                format!("Phone listed on {}", platform_name),
            )))
        }
        Ok(ListOutcome::UnknownPlatform) => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<String>::error("Invalid platform"))),
        Ok(ListOutcome::PhoneNotFound) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<String>::error(format!("Phone {} not found", payload.phone_id)))),
        Ok(ListOutcome::NotListable) => Ok(HttpResponse::Ok().json(ApiResponse::<String>::error(
            "Phone is not eligible for this platform",
        ))),
        Err(e) => Ok(HttpResponse::InternalServerError()
            .json(ApiResponse::<String>::error(e.to_string()))),
    }
}

pub async fn bulk_list(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let platform_id = path.into_inner();

    match platform_service::bulk_list(&state.store, &state.catalog, state.min_margin, &platform_id) {
        Ok(Some(listed)) => {
            let name = state
                .catalog
                .get(&platform_id)
                .map(|config| config.name.clone())
                .unwrap_or(platform_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                listed,
                format!("Successfully listed {} phones on {}", listed, name),
            )))
        }
        Ok(None) => Ok(HttpResponse::BadRequest().json(ApiResponse::<usize>::error("Invalid platform"))),
        Err(e) => Ok(HttpResponse::InternalServerError()
            .json(ApiResponse::<usize>::error(e.to_string()))),
    }
}

pub async fn update_prices(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let platform_id = path.into_inner();

    match platform_service::update_prices(&state.store, &state.catalog, &platform_id) {
        Ok(Some(updated)) => {
            let name = state
                .catalog
                .get(&platform_id)
                .map(|config| config.name.clone())
                .unwrap_or(platform_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                updated,
                format!("Updated prices for {} phones on {}", updated, name),
            )))
        }
        Ok(None) => Ok(HttpResponse::BadRequest().json(ApiResponse::<usize>::error("Invalid platform"))),
        Err(e) => Ok(HttpResponse::InternalServerError()
            .json(ApiResponse::<usize>::error(e.to_string()))),
    }
}

pub async fn profitability_analysis(state: web::Data<AppState>) -> Result<HttpResponse> {
    match platform_service::profitability_analysis(&state.store, &state.catalog, state.min_margin) {
        Ok(analysis) => Ok(HttpResponse::Ok().json(ApiResponse::success(analysis))),
        Err(e) => Ok(HttpResponse::InternalServerError()
            .json(ApiResponse::<Vec<PhoneProfitability>>::error(e.to_string()))),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/platform-summary", web::get().to(platform_summary))
        .route("/list-phone", web::post().to(list_phone))
        .route("/analysis/profitability", web::get().to(profitability_analysis))
        .service(
            web::scope("/platforms")
                .route("/{platform}/bulk-list", web::post().to(bulk_list))
                .route("/{platform}/update-prices", web::post().to(update_prices)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, PhoneInput, PlatformCatalog};
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

    fn seed(state: &AppState, model: &str, condition: Condition, stock: u32, base_price: f64) -> u64 {
        state
            .store
            .add(
                &PhoneInput {
                    model_name: model.to_string(),
                    brand: "TestBrand".to_string(),
                    condition,
                    storage: String::new(),
                    color: String::new(),
                    stock_quantity: stock,
                    base_price,
                    specifications: String::new(),
                    tags: String::new(),
                },
                &state.catalog,
            )
            .unwrap()
            .id
    }

    #[actix_web::test]
    async fn summary_reflects_listings() {
        let state = test_state();
        let id = seed(&state, "iPhone 12", Condition::Good, 5, 100.0);
        state.store.mark_listed(id, "X").unwrap();

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/platform-summary")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["X"]["listed_phones"], json!(1));
        assert_eq!(body["data"]["X"]["total_phones"], json!(1));
        assert_eq!(body["data"]["X"]["avg_price"], json!(110.0));
        assert_eq!(body["data"]["Y"]["fee_structure"], json!("8% + $2"));
    }

    #[actix_web::test]
    async fn list_phone_rejects_unknown_platform() {
        let state = test_state();
        let id = seed(&state, "iPhone 12", Condition::Good, 5, 100.0);

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/list-phone")
            .set_json(json!({ "phone_id": id, "platform": "W" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn bulk_list_reports_listed_count() {
        let state = test_state();
        seed(&state, "Good phone", Condition::Good, 5, 100.0);
        seed(&state, "Poor phone", Condition::Poor, 5, 100.0);

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/platforms/Z/bulk-list")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"], json!(1));

        let req = test::TestRequest::get()
            .uri("/api/v1/phones?platform=Z")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn profitability_analysis_lists_all_platforms() {
        let state = test_state();
        seed(&state, "iPhone 12", Condition::Good, 5, 100.0);

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/analysis/profitability")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let entry = &body["data"][0];
        assert_eq!(entry["platforms"]["Z"]["price"], json!(112.0));
        assert_eq!(entry["platforms"]["Z"]["profitable"], json!(true));
        assert_eq!(entry["platforms"]["X"]["profit"], json!(10.0));
    }
}
