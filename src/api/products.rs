// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Product management endpoints.
//!
//! Listings are tenant-scoped like employees: non-admin identities with
//! an enterprise only see their own enterprise's products.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::{Action, Guard, Module};
use crate::error::ApiError;
use crate::models::{CreateProductRequest, Product, ProductView, UpdateProductRequest};
use crate::state::AppState;
use crate::storage::NewProduct;

use super::tenant_scope;

fn product_view(state: &AppState, product: Product) -> Result<ProductView, ApiError> {
    let enterprise_name = state
        .db
        .enterprises()
        .get(product.enterprise_id)?
        .map(|e| e.name);
    let employee_name = match product.employee_id {
        Some(employee_id) => state.db.employees().get(employee_id)?.map(|e| e.name),
        None => None,
    };
    Ok(ProductView {
        product,
        enterprise_name,
        employee_name,
    })
}

/// List products (scoped to the caller's enterprise for non-admins).
#[utoipa::path(
    get,
    path = "/v1/products",
    tag = "Products",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Products visible to the caller", body = [ProductView]),
        (status = 403, description = "No read permission for products"),
    )
)]
pub async fn list_products(
    Guard(identity): Guard<{ Module::Products as u8 }, { Action::Read as u8 }>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let products = match tenant_scope(&identity) {
        Some(enterprise_id) => state.db.products().list_by_enterprise(enterprise_id)?,
        None => state.db.products().list()?,
    };
    let mut views = Vec::with_capacity(products.len());
    for product in products {
        views.push(product_view(&state, product)?);
    }
    Ok(Json(views))
}

/// Get a product by id.
#[utoipa::path(
    get,
    path = "/v1/products/{id}",
    params(("id" = u64, Path, description = "Product id")),
    tag = "Products",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The product", body = ProductView),
        (status = 404, description = "Product not found"),
    )
)]
pub async fn get_product(
    Guard(_identity): Guard<{ Module::Products as u8 }, { Action::Read as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<ProductView>, ApiError> {
    let product = state
        .db
        .products()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(product_view(&state, product)?))
}

/// List the products of one enterprise.
#[utoipa::path(
    get,
    path = "/v1/products/enterprise/{enterprise_id}",
    params(("enterprise_id" = u64, Path, description = "Enterprise id")),
    tag = "Products",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Products of the enterprise", body = [Product]),
    )
)]
pub async fn list_products_by_enterprise(
    Guard(_identity): Guard<{ Module::Products as u8 }, { Action::Read as u8 }>,
    Path(enterprise_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.db.products().list_by_enterprise(enterprise_id)?))
}

/// List the products assigned to one employee.
#[utoipa::path(
    get,
    path = "/v1/products/employee/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee id")),
    tag = "Products",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Products assigned to the employee", body = [Product]),
    )
)]
pub async fn list_products_by_employee(
    Guard(_identity): Guard<{ Module::Products as u8 }, { Action::Read as u8 }>,
    Path(employee_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.db.products().list_by_employee(employee_id)?))
}

/// Create a new product.
#[utoipa::path(
    post,
    path = "/v1/products",
    request_body = CreateProductRequest,
    tag = "Products",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Missing name or enterprise"),
        (status = 404, description = "Enterprise or employee not found"),
        (status = 409, description = "SKU already exists"),
    )
)]
pub async fn create_product(
    Guard(_identity): Guard<{ Module::Products as u8 }, { Action::Create as u8 }>,
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Product name and enterprise ID are required",
        ));
    }
    if !state.db.enterprises().exists(request.enterprise_id)? {
        return Err(ApiError::not_found("Enterprise not found"));
    }
    if let Some(employee_id) = request.employee_id {
        if !state.db.employees().exists(employee_id)? {
            return Err(ApiError::not_found("Employee not found"));
        }
    }

    let product = state.db.products().create(NewProduct {
        name: request.name,
        sku: request.sku,
        price: request.price,
        category: request.category,
        enterprise_id: request.enterprise_id,
        employee_id: request.employee_id,
    })?;

    tracing::info!(product_id = product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product. Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/v1/products/{id}",
    params(("id" = u64, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    tag = "Products",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 404, description = "Product not found"),
        (status = 409, description = "SKU already exists"),
    )
)]
pub async fn update_product(
    Guard(_identity): Guard<{ Module::Products as u8 }, { Action::Update as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let mut product = state
        .db
        .products()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    if let Some(name) = request.name {
        product.name = name;
    }
    if let Some(sku) = request.sku {
        product.sku = Some(sku);
    }
    if let Some(price) = request.price {
        product.price = Some(price);
    }
    if let Some(category) = request.category {
        product.category = Some(category);
    }
    if let Some(enterprise_id) = request.enterprise_id {
        if !state.db.enterprises().exists(enterprise_id)? {
            return Err(ApiError::not_found("Enterprise not found"));
        }
        product.enterprise_id = enterprise_id;
    }
    if let Some(employee_id) = request.employee_id {
        if !state.db.employees().exists(employee_id)? {
            return Err(ApiError::not_found("Employee not found"));
        }
        product.employee_id = Some(employee_id);
    }

    state.db.products().update(&product)?;
    Ok(Json(product))
}

/// Delete a product.
#[utoipa::path(
    delete,
    path = "/v1/products/{id}",
    params(("id" = u64, Path, description = "Product id")),
    tag = "Products",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
    )
)]
pub async fn delete_product(
    Guard(_identity): Guard<{ Module::Products as u8 }, { Action::Delete as u8 }>,
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if state.db.products().get(id)?.is_none() {
        return Err(ApiError::not_found("Product not found"));
    }
    state.db.products().delete(id)?;
    tracing::info!(product_id = id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::models::UserStatus;
    use crate::state::test_support::test_state;

    fn identity(state: &AppState, role_name: &str, enterprise_id: Option<u64>) -> Identity {
        let role = match state.db.roles().get_by_name(role_name).unwrap() {
            Some(role) => role,
            None => state.db.roles().create(role_name, None, &[]).unwrap(),
        };
        Identity {
            id: 0,
            username: format!("user-{role_name}"),
            email: format!("{role_name}@example.com"),
            status: UserStatus::Active,
            role_id: Some(role.id),
            role_name: Some(role.name),
            enterprise_id,
            enterprise_name: None,
        }
    }

    fn create_request(name: &str, sku: Option<&str>, enterprise_id: u64) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            sku: sku.map(String::from),
            price: Some(19.99),
            category: Some("widgets".to_string()),
            enterprise_id,
            employee_id: None,
        }
    }

    #[tokio::test]
    async fn create_validates_references() {
        let (state, _dir) = test_state();
        let admin = identity(&state, "Admin", None);

        let missing_enterprise = create_product(
            Guard(admin.clone()),
            State(state.clone()),
            Json(create_request("Widget", None, 999)),
        )
        .await
        .unwrap_err();
        assert_eq!(missing_enterprise.status, StatusCode::NOT_FOUND);

        let acme = state.db.enterprises().create("Acme", None, None).unwrap();
        let mut with_ghost_employee = create_request("Widget", None, acme.id);
        with_ghost_employee.employee_id = Some(999);
        let missing_employee = create_product(
            Guard(admin),
            State(state),
            Json(with_ghost_employee),
        )
        .await
        .unwrap_err();
        assert_eq!(missing_employee.status, StatusCode::NOT_FOUND);
        assert_eq!(missing_employee.message, "Employee not found");
    }

    #[tokio::test]
    async fn duplicate_sku_is_conflict() {
        let (state, _dir) = test_state();
        let admin = identity(&state, "Admin", None);
        let acme = state.db.enterprises().create("Acme", None, None).unwrap();

        create_product(
            Guard(admin.clone()),
            State(state.clone()),
            Json(create_request("Widget", Some("W-1"), acme.id)),
        )
        .await
        .unwrap();

        let err = create_product(
            Guard(admin),
            State(state),
            Json(create_request("Gadget", Some("W-1"), acme.id)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "SKU already exists");
    }

    #[tokio::test]
    async fn listing_is_tenant_scoped_for_non_admins() {
        let (state, _dir) = test_state();
        let admin = identity(&state, "Admin", None);
        let acme = state.db.enterprises().create("Acme", None, None).unwrap();
        let globex = state.db.enterprises().create("Globex", None, None).unwrap();

        for (name, eid) in [("Widget", acme.id), ("Gadget", acme.id), ("Gizmo", globex.id)] {
            create_product(
                Guard(admin.clone()),
                State(state.clone()),
                Json(create_request(name, None, eid)),
            )
            .await
            .unwrap();
        }

        let Json(all) = list_products(Guard(admin), State(state.clone())).await.unwrap();
        assert_eq!(all.len(), 3);

        let scoped = identity(&state, "Clerk", Some(acme.id));
        // Give the clerk read access so the gate passes.
        state
            .db
            .roles()
            .update(
                scoped.role_id.unwrap(),
                None,
                None,
                Some(&[crate::models::PermissionGrant {
                    module: "products".to_string(),
                    can_read: true,
                    can_create: false,
                    can_update: false,
                    can_delete: false,
                }]),
            )
            .unwrap();

        let Json(mine) = list_products(Guard(scoped), State(state)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|v| v.product.enterprise_id == acme.id));
    }

    #[tokio::test]
    async fn update_and_delete_roundtrip() {
        let (state, _dir) = test_state();
        let admin = identity(&state, "Admin", None);
        let acme = state.db.enterprises().create("Acme", None, None).unwrap();

        let (_, Json(product)) = create_product(
            Guard(admin.clone()),
            State(state.clone()),
            Json(create_request("Widget", Some("W-1"), acme.id)),
        )
        .await
        .unwrap();

        let Json(updated) = update_product(
            Guard(admin.clone()),
            Path(product.id),
            State(state.clone()),
            Json(UpdateProductRequest {
                price: Some(24.99),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.price, Some(24.99));

        let status = delete_product(Guard(admin.clone()), Path(product.id), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_product(Guard(admin), Path(product.id), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
