use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    PurchaseHistory,
    MenuPurchaseHelp,
    MenuTicket,
    MenuRecommendation,
    MenuHumanSupport,
    ForgotPassword,
}

struct IntentRule {
    intent: Intent,
    patterns: Vec<Regex>,
}

impl IntentRule {
    fn new(intent: Intent, patterns: &[&str]) -> Self {
        Self {
            intent,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).expect("Invalid intent regex"))
                .collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

/// Evaluated top to bottom; the first rule with a matching pattern wins.
static RULES: LazyLock<Vec<IntentRule>> = LazyLock::new(|| {
    vec![
        IntentRule::new(
            Intent::PurchaseHistory,
            &[
                r"\bmeu hist[oó]rico\b",
                r"\bminhas compras\b",
                r"\bhist[oó]rico de compras\b",
                r"\bhistorico\b",
                r"\bpurchase history\b",
                r"\bmy orders\b",
            ],
        ),
        IntentRule::new(
            Intent::MenuPurchaseHelp,
            &[
                r"^1\b",
                r"^1\x{FE0F}?\x{20E3}$",
                r"\bajuda com compras\b",
                r"\bhelp with purchases\b",
            ],
        ),
        IntentRule::new(
            Intent::MenuTicket,
            &[
                r"^2\b",
                r"^2\x{FE0F}?\x{20E3}$",
                r"\bacompanhar ticket\b",
                r"\bticket de suporte\b",
                r"\btrack (my )?ticket\b",
            ],
        ),
        IntentRule::new(
            Intent::MenuRecommendation,
            &[
                r"^3\b",
                r"^3\x{FE0F}?\x{20E3}$",
                r"\brecomenda[cç]\w*",
                r"\brecommend\w*",
            ],
        ),
        IntentRule::new(
            Intent::MenuHumanSupport,
            &[
                r"^4\b",
                r"^4\x{FE0F}?\x{20E3}$",
                r"\bsuporte humano\b",
                r"\bfalar com suporte\b",
                r"\bhuman support\b",
            ],
        ),
        IntentRule::new(
            Intent::ForgotPassword,
            &[
                r"\besqueci (a |minha )?senha\b",
                r"\brecuperar (a |minha )?senha\b",
                r"\bforgot (my )?password\b",
                r"\breset (my )?password\b",
            ],
        ),
    ]
});

pub fn match_intent(text: &str) -> Option<Intent> {
    let text = text.trim().to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&text))
        .map(|rule| rule.intent)
}
