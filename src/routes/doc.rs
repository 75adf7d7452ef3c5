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
    cart::CartEntry,
    chatbot::{ChatReply, ChatSession, ChatState, RecoveryStep, ReplyKind},
    dto::{
        account::AccountOverview,
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        chat::{ChatMessageRequest, ChatOpenRequest, ChatRecoveryRequest, ChatTurn},
        orders::{CheckoutLine, CheckoutRequest, CheckoutResponse},
        products::{
            ExternalGame, ExternalGameList, GameDetails, NewsArticle, NewsList, PopularGame,
            ProductList,
        },
        support::{TicketRequest, TicketResponse},
    },
    error::ErrorData,
    models::{Product, PublicUser, Purchase},
    response::{ApiResponse, Meta},
    routes::{account, auth, catalog, chat, checkout, health, support},
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
        catalog::list_products,
        catalog::search_products,
        catalog::top_products,
        catalog::subscription_products,
        catalog::recommended_product,
        catalog::get_product,
        catalog::game_details,
        catalog::popular_games,
        catalog::external_games,
        catalog::game_news,
        auth::register,
        auth::login,
        auth::verify,
        account::get_account,
        checkout::checkout,
        support::open_ticket,
        chat::open_chat,
        chat::send_message,
        chat::password_recovery
    ),
    components(
        schemas(
            Product,
            PublicUser,
            Purchase,
            ProductList,
            GameDetails,
            PopularGame,
            ExternalGame,
            ExternalGameList,
            NewsArticle,
            NewsList,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            AccountOverview,
            CheckoutLine,
            CheckoutRequest,
            CheckoutResponse,
            CartEntry,
            TicketRequest,
            TicketResponse,
            ChatOpenRequest,
            ChatMessageRequest,
            ChatRecoveryRequest,
            ChatTurn,
            ChatSession,
            ChatState,
            RecoveryStep,
            ChatReply,
            ReplyKind,
            ErrorData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<AuthResponse>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<ChatTurn>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Store catalog endpoints"),
        (name = "Metadata", description = "Proxied third-party game metadata"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Account", description = "Account and purchase history"),
        (name = "Checkout", description = "Order creation"),
        (name = "Support", description = "Support tickets"),
        (name = "Chat", description = "Support chatbot"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
