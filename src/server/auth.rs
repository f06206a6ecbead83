use anyhow::{bail, Result};

use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use std::{collections::HashMap, time::SystemTime};

pub type UserId = String;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct AuthTokenValue(pub String);

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AuthToken {
    pub user_id: UserId,
    pub role: UserRole,
    pub created: SystemTime,
    pub last_used: Option<SystemTime>,
    pub value: AuthTokenValue,
}

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let rng = rand::rng();
        let random_string: String = rng
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    BrowseInventory,
    EditInventory,
}

const ADMIN_PERMISSIONS: &[Permission] = &[Permission::BrowseInventory, Permission::EditInventory];
const REGULAR_PERMISSIONS: &[Permission] = &[Permission::BrowseInventory];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Regular,
}

impl UserRole {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Admin => ADMIN_PERMISSIONS,
            UserRole::Regular => REGULAR_PERMISSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Regular => "Regular",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "regular" => Some(UserRole::Regular),
            _ => None,
        }
    }
}

mod inventory_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let argon2 = Argon2::default();
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        let hash_string = argon2
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let argon2 = Argon2::default();
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2.verify_password(plain_pw, &password_hash).is_ok())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub enum InventoryHasher {
    Argon2,
}

impl InventoryHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            InventoryHasher::Argon2 => inventory_argon2::generate_b64_salt(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            InventoryHasher::Argon2 => inventory_argon2::hash(plain, b64_salt),
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: T, target_hash: T, _salt: T) -> Result<bool> {
        match self {
            InventoryHasher::Argon2 => {
                inventory_argon2::verify(plain_pw.as_ref().as_bytes(), target_hash)
            }
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct UserAuthCredentials {
    pub user_id: UserId,
    pub role: UserRole,
    pub salt: String,
    pub hash: String,
    pub hasher: InventoryHasher,
}

pub trait AuthStore: Send {
    fn load_auth_credentials(&self) -> Result<HashMap<UserId, UserAuthCredentials>>;
    fn update_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()>;
    fn delete_auth_credentials(&self, user_id: &UserId) -> Result<()>;

    fn load_auth_tokens(&self) -> Result<HashMap<AuthTokenValue, AuthToken>>;
    fn add_auth_token(&self, token: &AuthToken) -> Result<()>;
    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<()>;
}

pub struct AuthManager {
    store: Box<dyn AuthStore>,
    credentials: HashMap<UserId, UserAuthCredentials>,
    auth_tokens: HashMap<AuthTokenValue, AuthToken>,
}

impl AuthManager {
    pub fn initialize(store: Box<dyn AuthStore>) -> Result<AuthManager> {
        let credentials = store.load_auth_credentials()?;
        let auth_tokens = store.load_auth_tokens()?;
        Ok(AuthManager {
            store,
            credentials,
            auth_tokens,
        })
    }

    pub fn get_user_credentials(&self, user_id: &str) -> Option<UserAuthCredentials> {
        self.credentials.get(user_id).cloned()
    }

    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Option<AuthToken> {
        self.auth_tokens.get(value).cloned()
    }

    pub fn generate_auth_token(&mut self, credentials: &UserAuthCredentials) -> Result<AuthToken> {
        let token = AuthToken {
            user_id: credentials.user_id.clone(),
            role: credentials.role,
            created: SystemTime::now(),
            last_used: None,
            value: AuthTokenValue::generate(),
        };
        self.store.add_auth_token(&token)?;
        self.auth_tokens.insert(token.value.clone(), token.clone());
        Ok(token)
    }

    pub fn delete_auth_token(&mut self, user_id: &str, value: &AuthTokenValue) -> Result<()> {
        match self.auth_tokens.get(value) {
            Some(token) if token.user_id == user_id => {}
            _ => bail!("No such auth token for user {}", user_id),
        }
        self.auth_tokens.remove(value);
        self.store.delete_auth_token(value)
    }

    pub fn create_password_credentials(
        &mut self,
        user_id: &str,
        password: String,
        role: UserRole,
    ) -> Result<()> {
        if self.credentials.contains_key(user_id) {
            bail!("User {} already has credentials, use update-login", user_id);
        }
        let credentials = Self::make_credentials(user_id, password, role)?;
        self.store.update_auth_credentials(credentials.clone())?;
        self.credentials.insert(user_id.to_owned(), credentials);
        Ok(())
    }

    pub fn update_password_credentials(&mut self, user_id: &str, password: String) -> Result<()> {
        let role = match self.credentials.get(user_id) {
            Some(existing) => existing.role,
            None => bail!("User {} has no credentials, use add-login first", user_id),
        };
        let credentials = Self::make_credentials(user_id, password, role)?;
        self.store.update_auth_credentials(credentials.clone())?;
        self.credentials.insert(user_id.to_owned(), credentials);
        Ok(())
    }

    pub fn delete_password_credentials(&mut self, user_id: &str) -> Result<()> {
        if self.credentials.remove(user_id).is_none() {
            bail!("User {} has no credentials", user_id);
        }
        self.store.delete_auth_credentials(&user_id.to_owned())
    }

    pub fn list_users(&self) -> Vec<(UserId, UserRole)> {
        let mut users: Vec<(UserId, UserRole)> = self
            .credentials
            .values()
            .map(|credentials| (credentials.user_id.clone(), credentials.role))
            .collect();
        users.sort_by(|a, b| a.0.cmp(&b.0));
        users
    }

    pub fn set_role(&mut self, user_id: &str, role: UserRole) -> Result<()> {
        let credentials = match self.credentials.get_mut(user_id) {
            Some(credentials) => credentials,
            None => bail!("User {} has no credentials", user_id),
        };
        credentials.role = role;
        self.store.update_auth_credentials(credentials.clone())
    }

    fn make_credentials(
        user_id: &str,
        password: String,
        role: UserRole,
    ) -> Result<UserAuthCredentials> {
        let hasher = InventoryHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(UserAuthCredentials {
            user_id: user_id.to_owned(),
            role,
            salt,
            hash,
            hasher,
        })
    }
}
