//! HTML rendering
//!
//! Templates are compiled into the binary and rendered with Tera. Every page
//! gets the same base context (language, direction, navigation labels,
//! current user and currency) from [`Templates::page_context`].

use crate::core::auth::RequestContext;
use crate::core::error::AppResult;
use crate::core::facility::Facility;
use crate::core::locale::{Currency, ExchangeRates, Language};
use crate::core::tags::join_tags;
use crate::core::user::User;
use axum::response::Html;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};
use uuid::Uuid;

const TEMPLATES: [(&str, &str); 9] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("signup.html", include_str!("../../templates/signup.html")),
    (
        "forgot_password.html",
        include_str!("../../templates/forgot_password.html"),
    ),
    ("nurseries.html", include_str!("../../templates/nurseries.html")),
    (
        "nursery_detail.html",
        include_str!("../../templates/nursery_detail.html"),
    ),
    ("profile.html", include_str!("../../templates/profile.html")),
    ("about.html", include_str!("../../templates/about.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
];

/// Compiled page templates
pub struct Templates {
    tera: Tera,
    languages: Vec<Language>,
}

impl Templates {
    /// Compile the embedded templates
    pub fn new(languages: Vec<Language>) -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Self { tera, languages })
    }

    /// Base context shared by every page
    pub fn page_context(&self, ctx: &RequestContext) -> Context {
        let mut context = Context::new();
        context.insert("lang", ctx.language.code());
        context.insert("dir", ctx.language.direction());
        context.insert("t", &labels(ctx.language));
        context.insert("user_name", &ctx.identity.username());
        context.insert("currency", ctx.currency.code());
        let codes: Vec<&str> = self.languages.iter().map(Language::code).collect();
        context.insert("languages", &codes);
        context
    }

    pub fn render(&self, name: &str, context: &Context) -> AppResult<Html<String>> {
        Ok(Html(self.tera.render(name, context)?))
    }

    /// Render the 404 page
    pub fn not_found(&self, ctx: &RequestContext, message: &str) -> AppResult<Html<String>> {
        let mut context = self.page_context(ctx);
        context.insert("message", message);
        self.render("not_found.html", &context)
    }
}

/// A facility as shown on the list and detail pages
#[derive(Debug, Serialize)]
pub struct FacilityCard {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub curriculum: String,
    pub rating: f64,
    pub reviews_count: u32,
    pub capacity: u32,
    pub price: String,
    pub features: String,
    pub phone: String,
    pub age_groups: String,
    pub total_children: u32,
    pub staff_ratio: String,
    pub parent_satisfaction: u8,
    pub teacher_quality: u8,
    pub facilities_rating: u8,
    pub safety_rating: u8,
    pub description: String,
    pub google_maps_url: Option<String>,
}

impl FacilityCard {
    pub fn new(facility: &Facility, rates: &ExchangeRates, currency: Currency) -> Self {
        let details = &facility.details;
        Self {
            id: facility.id,
            name: facility.name.clone(),
            location: facility.location(),
            curriculum: join_tags(&facility.curriculum),
            rating: facility.rating,
            reviews_count: facility.reviews_count,
            capacity: facility.capacity,
            price: rates.format_price(facility.monthly_fee, currency),
            features: join_tags(&facility.features),
            phone: details.phone.clone(),
            age_groups: details.age_groups.clone(),
            total_children: details.total_children,
            staff_ratio: details.staff_ratio.clone(),
            parent_satisfaction: details.parent_satisfaction,
            teacher_quality: details.teacher_quality,
            facilities_rating: details.facilities_rating,
            safety_rating: details.safety_rating,
            description: details.description.clone(),
            google_maps_url: details.google_maps_url.clone(),
        }
    }
}

/// Profile form values
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub avatar_url: String,
    pub preferred_currency: &'static str,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
            avatar_url: user.avatar_url.clone().unwrap_or_default(),
            preferred_currency: user.preferred_currency.code(),
        }
    }
}

/// Navigation and form labels
fn labels(language: Language) -> HashMap<&'static str, &'static str> {
    let pairs: [(&str, &str); 18] = match language {
        Language::En => [
            ("nurseries", "Nurseries"),
            ("about", "About us"),
            ("profile", "Profile"),
            ("login", "Log in"),
            ("logout", "Log out"),
            ("signup", "Sign up"),
            ("forgot_password", "Forgot password?"),
            ("identifier", "Username or email"),
            ("password", "Password"),
            ("remember_me", "Remember me"),
            ("search", "Search"),
            ("all_curricula", "All curricula"),
            ("results", "results"),
            ("reviews", "reviews"),
            ("per_month", "/ month"),
            ("sort_rating", "Top rated"),
            ("sort_fee_asc", "Price: low to high"),
            ("sort_fee_desc", "Price: high to low"),
        ],
        Language::De => [
            ("nurseries", "Kitas"),
            ("about", "Über uns"),
            ("profile", "Profil"),
            ("login", "Anmelden"),
            ("logout", "Abmelden"),
            ("signup", "Registrieren"),
            ("forgot_password", "Passwort vergessen?"),
            ("identifier", "Benutzername oder E-Mail"),
            ("password", "Passwort"),
            ("remember_me", "Angemeldet bleiben"),
            ("search", "Suchen"),
            ("all_curricula", "Alle Konzepte"),
            ("results", "Ergebnisse"),
            ("reviews", "Bewertungen"),
            ("per_month", "/ Monat"),
            ("sort_rating", "Beste Bewertung"),
            ("sort_fee_asc", "Preis aufsteigend"),
            ("sort_fee_desc", "Preis absteigend"),
        ],
        Language::Ar => [
            ("nurseries", "الحضانات"),
            ("about", "من نحن"),
            ("profile", "الملف الشخصي"),
            ("login", "تسجيل الدخول"),
            ("logout", "تسجيل الخروج"),
            ("signup", "إنشاء حساب"),
            ("forgot_password", "نسيت كلمة المرور؟"),
            ("identifier", "اسم المستخدم أو البريد الإلكتروني"),
            ("password", "كلمة المرور"),
            ("remember_me", "تذكرني"),
            ("search", "بحث"),
            ("all_curricula", "كل المناهج"),
            ("results", "نتيجة"),
            ("reviews", "تقييمات"),
            ("per_month", "/ شهر"),
            ("sort_rating", "الأعلى تقييماً"),
            ("sort_fee_asc", "السعر: من الأقل"),
            ("sort_fee_desc", "السعر: من الأعلى"),
        ],
    };
    HashMap::from(pairs)
}

/// Label for a sort option in the current language
pub fn sort_label(language: Language, key: &str) -> String {
    let t = labels(language);
    let label = match key {
        "fee_asc" => t.get("sort_fee_asc"),
        "fee_desc" => t.get("sort_fee_desc"),
        "rating_desc" => t.get("sort_rating"),
        _ => None,
    };
    label.map(|l| l.to_string()).unwrap_or_else(|| "A-Z".to_string())
}
