//! Admin panel: dashboard, product CRUD and the order table.
//!
//! Every handler first confirms through `/users/me/` that the caller is
//! staff.

use crate::error::{shop_error_to_response, ApiError};
use crate::handlers::account::{signed_in, OrderView};
use crate::session::SessionApi;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use joia_client::{ImageUpload, ProductForm};
use joia_core::{
    search_by_name, search_orders, sort_newest_first, DashboardStats, Product, ShopError,
    ShopResult, User,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

/// Orders shown under "recent" on the dashboard
pub const RECENT_ORDERS: usize = 5;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub staff_name: String,
    pub stats: DashboardStats,
    pub revenue_display: String,
    pub average_ticket_display: String,
    pub recent_orders: Vec<OrderView>,
}

async fn require_staff(api: &SessionApi) -> ShopResult<User> {
    let result = api.me().await;
    let user = api.finish(result).await?;
    if !user.is_staff {
        warn!("Non-staff user {} tried the admin panel", user.id);
        return Err(ShopError::Forbidden(format!("user {} is not staff", user.id)));
    }
    Ok(user)
}

async fn staff_api(state: &AppState, session: Session) -> Result<(SessionApi, User), ApiError> {
    let api = signed_in(state, session)
        .await
        .map_err(shop_error_to_response)?;
    let user = require_staff(&api).await.map_err(shop_error_to_response)?;
    Ok((api, user))
}

/// Read the admin product form.
///
/// Text fields map by name; every file under `uploaded_images` becomes an
/// upload. Unknown fields are ignored.
pub async fn read_product_form(mut multipart: Multipart) -> ShopResult<ProductForm> {
    let mut form = ProductForm::default();
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        ShopError::InvalidRequest(format!("Formulário inválido: {}", e))
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "uploaded_images" => {
                let file_name = field.file_name().unwrap_or("imagem").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                if !bytes.is_empty() {
                    form.images.push(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "name" => form.name = field.text().await.map_err(bad_form)?,
            "description" => form.description = field.text().await.map_err(bad_form)?,
            "base_price" => form.base_price = field.text().await.map_err(bad_form)?,
            "promotional_price" => {
                form.promotional_price = Some(field.text().await.map_err(bad_form)?)
            }
            "category" => {
                let raw = field.text().await.map_err(bad_form)?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let id = raw
                        .parse::<u64>()
                        .map_err(|_| ShopError::validation("category", "Categoria inválida."))?;
                    form.category = Some(id);
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DashboardPage>, ApiError> {
    let (api, user) = staff_api(&state, session).await?;

    let (orders, products) = tokio::join!(api.orders(), api.products());
    let mut orders = api.finish(orders).await.map_err(shop_error_to_response)?;

    let stats = DashboardStats::compute(&orders, &products);
    orders.sort_by(|a, b| b.id.cmp(&a.id));
    let recent_orders = orders
        .into_iter()
        .take(RECENT_ORDERS)
        .map(OrderView::from)
        .collect();

    Ok(Json(DashboardPage {
        staff_name: user.display_name(),
        revenue_display: stats.revenue.display(),
        average_ticket_display: stats.average_ticket.display(),
        stats,
        recent_orders,
    }))
}

/// Product table, filtered by name
pub async fn list_products(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let (api, _) = staff_api(&state, session).await?;
    let mut products = api.products().await;
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;

    sort_newest_first(&mut products);
    let matches = search_by_name(&products, &params.q)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(matches))
}

#[instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let (api, _) = staff_api(&state, session).await?;
    let form = read_product_form(multipart)
        .await
        .map_err(shop_error_to_response)?;

    let result = api.create_product(&form).await;
    let product = api.finish(result).await.map_err(shop_error_to_response)?;
    info!("Product {} created from admin panel", product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, session, multipart))]
pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<u64>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let (api, _) = staff_api(&state, session).await?;
    let form = read_product_form(multipart)
        .await
        .map_err(shop_error_to_response)?;

    let result = api.update_product(product_id, &form).await;
    api.finish(result)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

#[instrument(skip(state, session))]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let (api, _) = staff_api(&state, session).await?;
    let result = api.delete_product(product_id).await;
    api.finish(result).await.map_err(shop_error_to_response)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, session))]
pub async fn delete_product_image(
    State(state): State<AppState>,
    session: Session,
    Path(image_id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let (api, _) = staff_api(&state, session).await?;
    let result = api.delete_product_image(image_id).await;
    api.finish(result).await.map_err(shop_error_to_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Order table, filtered by order id or customer email
pub async fn list_orders(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let (api, _) = staff_api(&state, session).await?;
    let result = api.orders().await;
    let mut orders = api.finish(result).await.map_err(shop_error_to_response)?;

    orders.sort_by(|a, b| b.id.cmp(&a.id));
    let matches = search_orders(&orders, &params.q)
        .into_iter()
        .cloned()
        .map(OrderView::from)
        .collect();
    Ok(Json(matches))
}
