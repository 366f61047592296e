//! Auth gateway: user directory, password hashing, and signed bearer tokens.
//!
//! Tokens are `base64url(claims JSON).base64url(signature)` with a keyed
//! SHA-256 signature; passwords are stored as PBKDF2-HMAC-SHA256 with a
//! per-user random salt. The match engine never sees any of this: the binary
//! authorizes requests before calling into the store.

use crate::store::LeagueError;
use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL};
use base64::Engine;
use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

const PBKDF2_ITERATIONS: u32 = 10_000;

/// Role granted to an API user.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

/// Unique identifier for an API user.
pub type UserId = u64;

/// A registered API user. The password hash never serializes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Registered users, keyed by id. Emails are unique and stored lowercased.
#[derive(Clone, Debug, Default)]
pub struct UserDirectory {
    users: BTreeMap<UserId, User>,
    next_id: UserId,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user with the plain `User` role.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, LeagueError> {
        self.add_user(name, email, password, vec![Role::User])
    }

    /// Insert a user with explicit roles (used for seeding the admin account).
    /// Fails with `EmailTaken` on a duplicate email.
    pub fn add_user(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        roles: Vec<Role>,
    ) -> Result<User, LeagueError> {
        let email = email.trim().to_lowercase();
        if self.users.values().any(|u| u.email == email) {
            return Err(LeagueError::EmailTaken);
        }
        self.next_id += 1;
        let user = User {
            id: self.next_id,
            name: name.trim().to_string(),
            email,
            password_hash: hash_password(password),
            roles,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim().to_lowercase();
        self.users.values().find(|u| u.email == email)
    }

    /// Check credentials. Unknown email and wrong password fail identically,
    /// so the response does not leak which accounts exist.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<&User, LeagueError> {
        let user = self
            .find_by_email(email)
            .ok_or(LeagueError::BadCredentials)?;
        if verify_password(password, &user.password_hash) {
            Ok(user)
        } else {
            Err(LeagueError::BadCredentials)
        }
    }
}

/// Claims carried inside a bearer token.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    pub roles: Vec<Role>,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
    /// Token id.
    pub jti: Uuid,
}

impl Claims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Issues and verifies signed bearer tokens.
#[derive(Clone, Debug)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl_secs,
        }
    }

    /// Issue a token for `subject` carrying `roles`, valid for the configured
    /// TTL from now.
    pub fn issue(&self, subject: &str, roles: &[Role]) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            roles: roles.to_vec(),
            iat: now,
            exp: now + self.ttl_secs,
            jti: Uuid::new_v4(),
        };
        let json = serde_json::to_vec(&claims).expect("claims serialize to plain JSON");
        let payload = BASE64_URL.encode(json);
        let sig = BASE64_URL.encode(self.sign(payload.as_bytes()));
        format!("{payload}.{sig}")
    }

    /// Verify signature and expiry; returns the claims on success.
    pub fn verify(&self, token: &str) -> Result<Claims, LeagueError> {
        let claims = self.decode(token)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(LeagueError::InvalidToken);
        }
        Ok(claims)
    }

    /// Expiry check alone. Unreadable tokens count as expired.
    pub fn is_expired(&self, token: &str) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.exp <= Utc::now().timestamp(),
            Err(_) => true,
        }
    }

    /// Signature check and claims parse, without the expiry test.
    fn decode(&self, token: &str) -> Result<Claims, LeagueError> {
        let (payload, sig_b64) = token.split_once('.').ok_or(LeagueError::InvalidToken)?;
        let sig = BASE64_URL
            .decode(sig_b64)
            .map_err(|_| LeagueError::InvalidToken)?;
        if !constant_time_eq(&self.sign(payload.as_bytes()), &sig) {
            return Err(LeagueError::InvalidToken);
        }
        let raw = BASE64_URL
            .decode(payload)
            .map_err(|_| LeagueError::InvalidToken)?;
        serde_json::from_slice(&raw).map_err(|_| LeagueError::InvalidToken)
    }

    /// Keyed double SHA-256 over the encoded payload.
    fn sign(&self, payload: &[u8]) -> [u8; 32] {
        let inner = Sha256::new()
            .chain_update(&self.secret)
            .chain_update(payload)
            .finalize();
        Sha256::new()
            .chain_update(&self.secret)
            .chain_update(inner)
            .finalize()
            .into()
    }
}

/// PBKDF2-HMAC-SHA256 with a fresh 16-byte salt; stored as
/// `base64(salt).base64(hash)`.
fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut out = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut out);
    format!("{}.{}", BASE64.encode(salt), BASE64.encode(out))
}

fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, hash_b64)) = stored.split_once('.') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (BASE64.decode(salt_b64), BASE64.decode(hash_b64)) else {
        return false;
    };
    let mut out = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut out);
    constant_time_eq(&out, &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
