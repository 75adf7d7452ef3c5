//! Support chatbot flow engine.
//!
//! A chat session is a small state machine. Guided flows (ticket tracking,
//! password recovery) consume input before anything else; outside a flow the
//! input is routed through the ordered intent table in [`intents`], and
//! unmatched text gets a canned fallback. Sessions are plain serializable
//! values so the HTTP layer can hand them back and forth without keeping
//! server-side state.

pub mod intents;

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{Product, Purchase},
    validation::is_valid_email,
};

pub use intents::{Intent, match_intent};

pub const MENU_TEXT: &str = "Choose an option:\n1️⃣ Help with purchases\n2️⃣ Track a support ticket\n3️⃣ Game recommendations\n4️⃣ Talk to a human";
pub const PURCHASE_HELP_TEXT: &str = "🛒 Sure! Click \"Buy\" on a game card to see its price and finish your purchase. Here is what you bought so far:";
pub const TICKET_PROMPT_TEXT: &str = "Please enter your ticket number.";
pub const TICKET_ACK_TEXT: &str =
    "Your ticket is being reviewed by our support team. You will get updates by e-mail.";
pub const HUMAN_SUPPORT_TEXT: &str =
    "Alright! A human agent has been notified. Average response time: 2 minutes ⏳";
pub const RECOVERY_INTRO_TEXT: &str = "🔒 Let's recover your password. Please tell us:";
pub const RECOVERY_NAME_PROMPT: &str = "Name:";
pub const RECOVERY_EMAIL_PROMPT: &str = "Email:";
pub const RECOVERY_INVALID_EMAIL_TEXT: &str = "⚠️ Invalid email. Please try again.\nEmail:";
pub const RECOVERY_DONE_TEXT: &str =
    "✅ Got it. Check your e-mail and follow the instructions to recover your password.";
pub const LOGIN_REQUIRED_TEXT: &str = "🔐 Please log in to see your purchase history.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum RecoveryStep {
    Name,
    Email { name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChatState {
    #[default]
    Idle,
    MainMenu,
    PasswordRecovery { recovery: RecoveryStep },
    TicketTracking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Text,
    Menu,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    pub kind: ReplyKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(ReplyKind::Text, text)
    }

    pub fn menu() -> Self {
        Self::with_kind(ReplyKind::Menu, MENU_TEXT)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::with_kind(ReplyKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with_kind(ReplyKind::Error, text)
    }

    fn with_kind(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            image: None,
        }
    }
}

/// Who is chatting, when logged in. Supplied by the server from the validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: i64,
    pub name: String,
}

/// Read-only lookups the chatbot performs as side effects.
pub trait ChatBackend {
    fn purchase_history(&self, user_id: i64) -> impl Future<Output = AppResult<Vec<Purchase>>> + Send;

    fn recommendation(&self) -> impl Future<Output = AppResult<Option<Product>>> + Send;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatSession {
    pub state: ChatState,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opening the panel greets the user and lands on the main menu.
    pub fn open(&mut self, user: Option<&ChatUser>, page: Option<&str>) -> Vec<ChatReply> {
        self.state = ChatState::MainMenu;

        let mut replies = vec![ChatReply::text(match user {
            Some(user) => format!("👋 Hi, {}! How can I help?", user.name),
            None => "👋 Hi! I'm Mago, the virtual assistant. How can I help today?".to_string(),
        })];
        if let Some(hint) = page.and_then(page_hint) {
            replies.push(ChatReply::text(hint));
        }
        replies.push(ChatReply::menu());
        replies
    }

    /// Entry point for the "forgot password" affordance; works from any state.
    pub fn start_password_recovery(&mut self) -> Vec<ChatReply> {
        self.state = ChatState::PasswordRecovery {
            recovery: RecoveryStep::Name,
        };
        vec![
            ChatReply::text(RECOVERY_INTRO_TEXT),
            ChatReply::text(RECOVERY_NAME_PROMPT),
        ]
    }

    pub async fn handle<B: ChatBackend>(
        &mut self,
        input: &str,
        user: Option<&ChatUser>,
        backend: &B,
    ) -> Vec<ChatReply> {
        let input = input.trim();
        if input.is_empty() {
            return Vec::new();
        }

        match std::mem::take(&mut self.state) {
            ChatState::TicketTracking => {
                self.state = ChatState::MainMenu;
                vec![ChatReply::text(TICKET_ACK_TEXT), ChatReply::menu()]
            }
            ChatState::PasswordRecovery { recovery } => self.advance_recovery(recovery, input),
            ChatState::Idle | ChatState::MainMenu => {
                self.state = ChatState::MainMenu;
                match match_intent(input) {
                    Some(intent) => self.run_intent(intent, user, backend).await,
                    None => vec![generic_reply(input)],
                }
            }
        }
    }

    fn advance_recovery(&mut self, step: RecoveryStep, input: &str) -> Vec<ChatReply> {
        match step {
            RecoveryStep::Name => {
                self.state = ChatState::PasswordRecovery {
                    recovery: RecoveryStep::Email {
                        name: input.to_string(),
                    },
                };
                vec![ChatReply::text(RECOVERY_EMAIL_PROMPT)]
            }
            RecoveryStep::Email { name } => {
                if is_valid_email(input) {
                    tracing::info!(requester = %name, "password recovery requested");
                    self.state = ChatState::MainMenu;
                    vec![ChatReply::success(RECOVERY_DONE_TEXT), ChatReply::menu()]
                } else {
                    self.state = ChatState::PasswordRecovery {
                        recovery: RecoveryStep::Email { name },
                    };
                    vec![ChatReply::error(RECOVERY_INVALID_EMAIL_TEXT)]
                }
            }
        }
    }

    async fn run_intent<B: ChatBackend>(
        &mut self,
        intent: Intent,
        user: Option<&ChatUser>,
        backend: &B,
    ) -> Vec<ChatReply> {
        match intent {
            Intent::PurchaseHistory => history_replies(user, backend).await,
            Intent::MenuPurchaseHelp => {
                let mut replies = vec![ChatReply::text(PURCHASE_HELP_TEXT)];
                replies.extend(history_replies(user, backend).await);
                replies.push(ChatReply::menu());
                replies
            }
            Intent::MenuTicket => {
                self.state = ChatState::TicketTracking;
                vec![ChatReply::text(TICKET_PROMPT_TEXT)]
            }
            Intent::MenuRecommendation => {
                let mut replies = vec![recommendation_reply(backend).await];
                replies.push(ChatReply::menu());
                replies
            }
            Intent::MenuHumanSupport => vec![ChatReply::text(HUMAN_SUPPORT_TEXT), ChatReply::menu()],
            Intent::ForgotPassword => self.start_password_recovery(),
        }
    }
}

async fn history_replies<B: ChatBackend>(user: Option<&ChatUser>, backend: &B) -> Vec<ChatReply> {
    let Some(user) = user else {
        return vec![ChatReply::text(LOGIN_REQUIRED_TEXT)];
    };

    match backend.purchase_history(user.id).await {
        Ok(purchases) if purchases.is_empty() => {
            vec![ChatReply::text("You have not bought anything yet 😢")]
        }
        Ok(purchases) => purchases
            .iter()
            .map(|p| ChatReply::text(format!("• {} — {}", p.title, format_price(p.subtotal()))))
            .collect(),
        Err(err) => {
            tracing::warn!(error = %err, user_id = user.id, "chat history lookup failed");
            vec![ChatReply::error("❌ Could not load your purchase history right now.")]
        }
    }
}

async fn recommendation_reply<B: ChatBackend>(backend: &B) -> ChatReply {
    match backend.recommendation().await {
        Ok(Some(product)) => ChatReply {
            kind: ReplyKind::Text,
            text: format!(
                "Today's pick: {} – {}",
                product.title,
                format_price(product.price)
            ),
            image: product.image.filter(|i| !i.is_empty()),
        },
        Ok(None) => ChatReply::error("❌ No recommendation available right now."),
        Err(err) => {
            tracing::warn!(error = %err, "chat recommendation lookup failed");
            ChatReply::error("❌ Could not fetch a recommendation.")
        }
    }
}

fn generic_reply(input: &str) -> ChatReply {
    let text = input.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if contains_any(&["preço", "preco", "quanto", "price", "how much"]) {
        ChatReply::text("Prices vary per game. Click \"Buy\" on the game card to see its price.")
    } else if text.contains("gta") {
        ChatReply::text("GTA V is sometimes on sale! Check the game card for price and platforms.")
    } else if contains_any(&["ajuda", "suporte", "help", "support"]) {
        ChatReply::text(
            "I can help with purchases, refunds and recommendations. What do you need?",
        )
    } else {
        ChatReply::text(format!(
            "Got your message: \"{input}\". I'm still learning; to buy, use the \"Buy\" button on the cards."
        ))
    }
}

fn page_hint(page: &str) -> Option<&'static str> {
    let page = page.to_lowercase();
    if page.contains("checkout") {
        Some("🧾 You are at checkout. I can help with payment methods and coupons.")
    } else if page.contains("login") {
        Some("🔐 Need help signing in or creating your account? Just ask.")
    } else if page.contains("account") || page.contains("conta") {
        Some("👤 This is your account page. I can help you find your latest purchases.")
    } else {
        None
    }
}

/// Formats a BRL amount as `R$ 1.234,50`.
pub fn format_price(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let text = format!("{rounded:.2}");
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("R$ {sign}{grouped},{frac_part}")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use rust_decimal::dec;

    use super::*;
    use crate::error::AppError;

    #[derive(Default)]
    struct FakeBackend {
        purchases: Vec<Purchase>,
        product: Option<Product>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl ChatBackend for FakeBackend {
        async fn purchase_history(&self, _user_id: i64) -> AppResult<Vec<Purchase>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Internal(anyhow::anyhow!("db down")));
            }
            Ok(self.purchases.clone())
        }

        async fn recommendation(&self) -> AppResult<Option<Product>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.product.clone())
        }
    }

    fn ana() -> ChatUser {
        ChatUser {
            id: 7,
            name: "ana".into(),
        }
    }

    fn menu_session() -> ChatSession {
        ChatSession {
            state: ChatState::MainMenu,
        }
    }

    #[tokio::test]
    async fn option_one_returns_purchase_help_then_menu() {
        let backend = FakeBackend::default();
        let mut session = menu_session();

        let replies = session.handle("1", None, &backend).await;

        assert_eq!(replies.first().unwrap().text, PURCHASE_HELP_TEXT);
        assert_eq!(replies.last().unwrap(), &ChatReply::menu());
        assert_eq!(session.state, ChatState::MainMenu);
    }

    #[tokio::test]
    async fn option_one_lists_history_for_logged_in_user() {
        let backend = FakeBackend {
            purchases: vec![Purchase {
                order_id: 1,
                product_id: 3,
                title: "Elden Ring".into(),
                image: None,
                quantity: 2,
                unit_price: dec!(50.00),
                created_at: Utc::now(),
            }],
            ..Default::default()
        };
        let mut session = menu_session();

        let replies = session.handle("1", Some(&ana()), &backend).await;

        assert_eq!(replies.len(), 3);
        assert_eq!(replies[1].text, "• Elden Ring — R$ 100,00");
    }

    #[tokio::test]
    async fn password_recovery_reprompts_until_email_is_valid() {
        let backend = FakeBackend::default();
        let mut session = menu_session();
        session.start_password_recovery();

        let replies = session.handle("Ana", None, &backend).await;
        assert_eq!(replies, vec![ChatReply::text(RECOVERY_EMAIL_PROMPT)]);

        let replies = session.handle("not-an-email", None, &backend).await;
        assert_eq!(replies, vec![ChatReply::error(RECOVERY_INVALID_EMAIL_TEXT)]);
        assert_eq!(
            session.state,
            ChatState::PasswordRecovery {
                recovery: RecoveryStep::Email { name: "Ana".into() }
            }
        );

        let replies = session.handle("ana@example.com", None, &backend).await;
        assert_eq!(replies[0], ChatReply::success(RECOVERY_DONE_TEXT));
        assert_eq!(session.state, ChatState::MainMenu);
    }

    #[tokio::test]
    async fn recovery_flow_takes_priority_over_intents() {
        let backend = FakeBackend::default();
        let mut session = menu_session();
        session.start_password_recovery();

        // "4" would normally reach human support; here it is the name.
        let replies = session.handle("4", None, &backend).await;
        assert_eq!(replies, vec![ChatReply::text(RECOVERY_EMAIL_PROMPT)]);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ticket_flow_accepts_one_input_then_returns_to_menu() {
        let backend = FakeBackend::default();
        let mut session = menu_session();

        let replies = session.handle("2", None, &backend).await;
        assert_eq!(replies, vec![ChatReply::text(TICKET_PROMPT_TEXT)]);
        assert_eq!(session.state, ChatState::TicketTracking);

        let replies = session.handle("3", None, &backend).await;
        assert_eq!(replies, vec![ChatReply::text(TICKET_ACK_TEXT), ChatReply::menu()]);
        assert_eq!(session.state, ChatState::MainMenu);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn recommendation_includes_image_and_menu() {
        let backend = FakeBackend {
            product: Some(Product {
                id: 1,
                title: "Hades".into(),
                price: dec!(47.49),
                platforms: vec!["pc".into()],
                image: Some("https://img/hades.jpg".into()),
                popularity: 10,
                is_subscription: false,
            }),
            ..Default::default()
        };
        let mut session = menu_session();

        let replies = session.handle("3", None, &backend).await;

        assert_eq!(replies[0].text, "Today's pick: Hades – R$ 47,49");
        assert_eq!(replies[0].image.as_deref(), Some("https://img/hades.jpg"));
        assert_eq!(replies[1], ChatReply::menu());
    }

    #[tokio::test]
    async fn history_requires_login_and_survives_backend_errors() {
        let backend = FakeBackend {
            fail: true,
            ..Default::default()
        };
        let mut session = menu_session();

        let replies = session.handle("minhas compras", None, &backend).await;
        assert_eq!(replies, vec![ChatReply::text(LOGIN_REQUIRED_TEXT)]);

        let replies = session.handle("minhas compras", Some(&ana()), &backend).await;
        assert_eq!(replies[0].kind, ReplyKind::Error);
    }

    #[tokio::test]
    async fn unmatched_input_echoes_and_keeps_state() {
        let backend = FakeBackend::default();
        let mut session = menu_session();

        let replies = session.handle("bom dia", None, &backend).await;
        assert!(replies[0].text.contains("\"bom dia\""));
        assert_eq!(session.state, ChatState::MainMenu);

        let replies = session.handle("quanto custa?", None, &backend).await;
        assert!(replies[0].text.starts_with("Prices vary"));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let backend = FakeBackend::default();
        let mut session = ChatSession::new();

        assert!(session.handle("   ", None, &backend).await.is_empty());
        assert_eq!(session.state, ChatState::Idle);
    }

    #[test]
    fn open_greets_by_name_and_shows_menu() {
        let mut session = ChatSession::new();
        let replies = session.open(Some(&ana()), Some("/checkout.html"));

        assert_eq!(replies.len(), 3);
        assert!(replies[0].text.contains("ana"));
        assert!(replies[1].text.contains("checkout"));
        assert_eq!(replies[2], ChatReply::menu());
        assert_eq!(session.state, ChatState::MainMenu);
    }

    #[test]
    fn session_state_round_trips_as_tagged_json() {
        let session = ChatSession {
            state: ChatState::PasswordRecovery {
                recovery: RecoveryStep::Email { name: "Ana".into() },
            },
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["state"]["state"], "password_recovery");
        assert_eq!(json["state"]["recovery"]["step"], "email");

        let back: ChatSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn formats_brl_prices() {
        assert_eq!(format_price(dec!(130)), "R$ 130,00");
        assert_eq!(format_price(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_price(dec!(0.999)), "R$ 1,00");
    }
}
