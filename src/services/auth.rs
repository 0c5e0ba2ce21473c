// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{begin_tenant_transaction, set_tenant},
        error::AppError,
    },
    db::{user_repo::NewUser, SettingsRepository, UserRepository},
    models::{
        auth::{AuthResponse, Claims, MeResponse, SubscriptionStatus, User},
        webhook::Plan,
    },
};

const TOKEN_DAYS: i64 = 7;

pub fn create_token(secret: &str, user_id: Uuid) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::days(TOKEN_DAYS);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    settings_repo: SettingsRepository,
    jwt_secret: String,
    trial_days: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        settings_repo: SettingsRepository,
        jwt_secret: String,
        trial_days: i64,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, settings_repo, jwt_secret, trial_days, pool }
    }

    /// Cadastro direto: conta em período de teste, com perfil e configurações iniciais.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<AuthResponse, AppError> {
        // 1. Hashing fora da transação
        let password_hash = hash_password(password).await?;
        let now = Utc::now();

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Usuário
        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                NewUser {
                    email,
                    password_hash: &password_hash,
                    plan: Plan::Trial.as_str(),
                    payment_date: None,
                    expires_at: now + Duration::days(self.trial_days),
                    must_change_password: false,
                },
            )
            .await?;

        // 3. Perfil e configurações (tabelas com RLS)
        set_tenant(&mut tx, user.id).await?;
        let full_name = full_name.map(str::trim).filter(|n| !n.is_empty());
        self.user_repo.create_profile(&mut *tx, user.id, full_name, None).await?;
        self.settings_repo
            .create_default(&mut *tx, user.id, full_name.unwrap_or("Minha Confeitaria"))
            .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(user_id = %user.id, trial_days = self.trial_days, "👤 Conta registrada");
        Ok(AuthResponse {
            token: create_token(&self.jwt_secret, user.id)?,
            must_change_password: false,
        })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(AuthResponse {
            token: create_token(&self.jwt_secret, user.id)?,
            must_change_password: user.must_change_password,
        })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;
        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn me(&self, user: User) -> Result<MeResponse, AppError> {
        let mut tx = begin_tenant_transaction(&self.pool, user.id).await?;
        let profile = self.user_repo.find_profile(&mut *tx, user.id).await?;
        tx.commit().await?;

        let subscription = SubscriptionStatus::from_user(&user, Utc::now());
        Ok(MeResponse { user, profile, subscription })
    }

    pub async fn change_password(&self, user: &User, current: &str, new_password: &str) -> Result<(), AppError> {
        if !verify_password(current, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = hash_password(new_password).await?;
        self.user_repo.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "🔑 Senha alterada");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_carries_the_user_id() {
        let user_id = Uuid::new_v4();
        let token = create_token("segredo", user_id).unwrap();
        let claims = decode_token("segredo", &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, (TOKEN_DAYS * 24 * 3600) as usize);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = create_token("segredo", Uuid::new_v4()).unwrap();
        assert!(matches!(decode_token("outro", &token), Err(AppError::InvalidToken)));
        assert!(matches!(decode_token("segredo", "lixo"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original() {
        let hashed = hash_password("docinho123").await.unwrap();
        assert!(verify_password("docinho123", &hashed).await.unwrap());
        assert!(!verify_password("docinho124", &hashed).await.unwrap());
    }
}
