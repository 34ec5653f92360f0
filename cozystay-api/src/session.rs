//! Session credentials: a signed JWT carried in an HTTP-only cookie.
//!
//! Nothing is stored server-side. A credential is valid while its signature
//! checks out against the process-wide secret and `exp` is in the future.
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("missing session credential")]
    Missing,
    #[error("invalid session credential: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct SessionAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    cookie_name: String,
}

impl SessionAuthenticator {
    pub fn new(secret: &str, ttl_seconds: u64, cookie_name: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds as i64),
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Sign a credential for `identity`, valid for the configured TTL.
    pub fn issue(&self, identity: &str) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: identity.to_owned(),
            email: identity.to_owned(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Read and validate the credential from the request cookies.
    pub fn authenticate(&self, jar: &CookieJar) -> Result<SessionClaims, SessionError> {
        let cookie = jar.get(&self.cookie_name).ok_or(SessionError::Missing)?;
        self.validate(cookie.value())
    }

    /// Cookie holding a freshly issued credential. Cross-site requests must
    /// carry it, hence `SameSite=None` together with `Secure`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::None)
            .build()
    }

    /// Jar change that clears the session cookie on the client.
    /// Sent even when the request carried no cookie.
    pub fn revoke(&self, jar: CookieJar) -> CookieJar {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        jar.add(cookie)
    }
}
