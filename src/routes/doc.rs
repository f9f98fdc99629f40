use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    catalog::sidebar::SidebarCategory,
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
        categories::{CategoryList, CreateCategoryRequest, Sidebar},
        customers::{CustomerList, UpdateCustomerRequest},
        orders::{CheckoutRequest, OrderList, OrderWithCart, UpdateOrderStatusRequest},
        products::{
            FormField, NotebookPayload, ProductCardList, ProductDetail, ProductFormSchema,
            SmartphonePayload,
        },
    },
    models::{
        Cart, CartProduct, Category, Customer, DeliveryType, Notebook, Order, OrderStatus,
        ProductCard, ProductKind, ProductRef, Smartphone, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, customer, health, orders, params, products},
    specs::SpecRow,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        products::list_categories,
        products::sidebar,
        products::latest_products,
        products::product_detail,
        products::product_image,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        customer::get_profile,
        customer::update_profile,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        admin::create_category,
        admin::delete_category,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::product_form,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::list_customers
    ),
    components(
        schemas(
            User,
            Category,
            Notebook,
            Smartphone,
            ProductKind,
            ProductRef,
            ProductCard,
            Customer,
            Cart,
            CartProduct,
            Order,
            OrderStatus,
            DeliveryType,
            SpecRow,
            SidebarCategory,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartView,
            CreateCategoryRequest,
            CategoryList,
            Sidebar,
            UpdateCustomerRequest,
            CustomerList,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithCart,
            NotebookPayload,
            SmartphonePayload,
            ProductCardList,
            ProductDetail,
            FormField,
            ProductFormSchema,
            admin::ProductUpload,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<OrderWithCart>,
            ApiResponse<OrderList>,
            ApiResponse<ProductDetail>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Catalog", description = "Categories, sidebar and product pages"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Customer", description = "Customer profile endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Admin", description = "Staff endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
