//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, members, staff};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblion API",
        version = "1.0.0",
        description = "Lending Library Transaction Service",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Books
        books::get_book,
        books::search_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        members::update_member,
        members::delete_member,
        // Loans
        loans::borrow_book,
        loans::return_book,
        loans::list_loans,
        loans::get_member_loans,
        // Staff
        staff::list_staff,
        staff::get_staff,
        staff::create_staff,
        staff::update_staff_profile,
        staff::admin_update_staff,
        staff::delete_staff,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Members
            crate::models::member::Member,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMember,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::BorrowBook,
            crate::models::loan::ReturnBook,
            // Staff
            crate::models::staff::StaffAccount,
            crate::models::staff::CreateStaffAccount,
            crate::models::staff::UpdateStaffProfile,
            crate::models::staff::AdminUpdateStaffAccount,
            staff::ProfileUpdateResponse,
            // Common
            crate::api::MutationResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Staff authentication"),
        (name = "books", description = "Book inventory management"),
        (name = "members", description = "Member management"),
        (name = "loans", description = "Borrow and return operations"),
        (name = "staff", description = "Staff account management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
