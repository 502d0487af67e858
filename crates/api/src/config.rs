use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Payment gateway configuration.
    pub stripe: StripeConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            stripe: StripeConfig::from_env(),
        }
    }
}

/// Payment gateway configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key used for outbound gateway calls.
    pub secret_key: String,
    /// Signing secret for inbound webhook events.
    pub webhook_secret: String,
    /// Gateway API base URL. Overridable so tests can point at a stub.
    pub api_base: String,
    /// Browser redirect target after a successful payment. The gateway
    /// substitutes the session id into `{CHECKOUT_SESSION_ID}`.
    pub success_url: String,
    /// Browser redirect target after a cancelled payment.
    pub cancel_url: String,
    /// ISO currency code for checkout sessions.
    pub currency: String,
}

impl StripeConfig {
    /// Load gateway configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default                  |
    /// |-------------------------|----------|--------------------------|
    /// | `STRIPE_SECRET_KEY`     | **yes**  | --                       |
    /// | `STRIPE_WEBHOOK_SECRET` | **yes**  | --                       |
    /// | `STRIPE_API_BASE`       | no       | `https://api.stripe.com` |
    /// | `CHECKOUT_SUCCESS_URL`  | no       | dev dashboard URL        |
    /// | `CHECKOUT_CANCEL_URL`   | no       | dev dashboard URL        |
    /// | `CHECKOUT_CURRENCY`     | no       | `cad`                    |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing; a service that cannot
    /// verify webhook signatures must not start.
    pub fn from_env() -> Self {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .expect("STRIPE_SECRET_KEY must be set in the environment");
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .expect("STRIPE_WEBHOOK_SECRET must be set in the environment");

        let api_base = std::env::var("STRIPE_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com".into());

        let success_url = std::env::var("CHECKOUT_SUCCESS_URL").unwrap_or_else(|_| {
            "http://localhost:5173/dashboard?payment_success=true&session_id={CHECKOUT_SESSION_ID}"
                .into()
        });
        let cancel_url = std::env::var("CHECKOUT_CANCEL_URL").unwrap_or_else(|_| {
            "http://localhost:5173/dashboard?payment_cancelled=true".into()
        });

        let currency = std::env::var("CHECKOUT_CURRENCY").unwrap_or_else(|_| "cad".into());

        Self {
            secret_key,
            webhook_secret,
            api_base,
            success_url,
            cancel_url,
            currency,
        }
    }
}
