// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Identity,
    models::{
        CreateEmployeeRequest, CreateEnterpriseRequest, CreateProductRequest, CreateRoleRequest,
        CreateUserRequest, Employee, EmployeeView, Enterprise, EnterpriseView, LoginRequest,
        LoginResponse, MessageResponse, PermissionGrant, Product, ProductView,
        ResetPasswordRequest, Role, RoleView, UpdateEmployeeRequest, UpdateEnterpriseRequest,
        UpdateProductRequest, UpdateRoleRequest, UpdateUserRequest, UpdateUserStatusRequest,
        UserStatus, UserView,
    },
    state::AppState,
};

pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod enterprises;
pub mod health;
pub mod products;
pub mod roles;
pub mod users;

/// Row-level tenant scope for listings: admins see everything, other
/// identities are confined to their own enterprise (when they have one).
pub(crate) fn tenant_scope(identity: &Identity) -> Option<u64> {
    if identity.is_admin() {
        None
    } else {
        identity.enterprise_id
    }
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/profile", get(auth::profile))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/enterprise/{enterprise_id}",
            get(users::list_users_by_enterprise),
        )
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/status", patch(users::update_user_status))
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route("/roles/modules", get(roles::list_modules))
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route(
            "/enterprises",
            get(enterprises::list_enterprises).post(enterprises::create_enterprise),
        )
        .route(
            "/enterprises/{id}",
            get(enterprises::get_enterprise)
                .put(enterprises::update_enterprise)
                .delete(enterprises::delete_enterprise),
        )
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/employees/enterprise/{enterprise_id}",
            get(employees::list_employees_by_enterprise),
        )
        .route(
            "/employees/{id}",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/enterprise/{enterprise_id}",
            get(products::list_products_by_enterprise),
        )
        .route(
            "/products/employee/{employee_id}",
            get(products::list_products_by_employee),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/dashboard", get(dashboard::dashboard))
        .route("/dashboard/permissions", get(dashboard::permissions))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        auth::reset_password,
        auth::profile,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::update_user_status,
        users::list_users_by_enterprise,
        roles::list_roles,
        roles::list_modules,
        roles::get_role,
        roles::create_role,
        roles::update_role,
        roles::delete_role,
        enterprises::list_enterprises,
        enterprises::get_enterprise,
        enterprises::create_enterprise,
        enterprises::update_enterprise,
        enterprises::delete_enterprise,
        employees::list_employees,
        employees::get_employee,
        employees::list_employees_by_enterprise,
        employees::create_employee,
        employees::update_employee,
        employees::delete_employee,
        products::list_products,
        products::get_product,
        products::list_products_by_enterprise,
        products::list_products_by_employee,
        products::create_product,
        products::update_product,
        products::delete_product,
        dashboard::dashboard,
        dashboard::permissions,
        health::health
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            ResetPasswordRequest,
            MessageResponse,
            UserStatus,
            UserView,
            CreateUserRequest,
            UpdateUserRequest,
            UpdateUserStatusRequest,
            Role,
            RoleView,
            PermissionGrant,
            CreateRoleRequest,
            UpdateRoleRequest,
            Enterprise,
            EnterpriseView,
            CreateEnterpriseRequest,
            UpdateEnterpriseRequest,
            Employee,
            EmployeeView,
            CreateEmployeeRequest,
            UpdateEmployeeRequest,
            Product,
            ProductView,
            CreateProductRequest,
            UpdateProductRequest,
            dashboard::DashboardResponse,
            dashboard::DashboardStats,
            dashboard::ModulePermissions,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout, password reset"),
        (name = "Users", description = "User account management"),
        (name = "Roles", description = "Roles and permission grants"),
        (name = "Enterprises", description = "Enterprise (tenant) management"),
        (name = "Employees", description = "Employee records"),
        (name = "Products", description = "Product records"),
        (name = "Dashboard", description = "Counts and effective permissions"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct ApiDoc;
