use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::{doc, oid::ObjectId};

use crate::{models::User, AppState};

#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub fn make_jwt(state: &AppState, user_id: &ObjectId) -> Result<String, String> {
    let exp = (Utc::now() + Duration::minutes(state.settings.jwt_ttl_minutes)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_hex(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub async fn login_user(state: &AppState, email: &str, password: &str) -> Result<User, String> {
    let users = state.db.collection::<User>("users");

    let user = match users.find_one(doc! { "email": email }, None).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err("Invalid login credentials".to_string()),
        Err(_) => return Err("Server error. Please try again.".to_string()),
    };

    if !verify(password, &user.password_hash).unwrap_or(false) {
        return Err("Invalid login credentials".to_string());
    }

    Ok(user)
}

pub async fn register_user(state: &AppState, email: &str, password: &str) -> Result<User, String> {
    let users = state.db.collection::<User>("users");

    match users.find_one(doc! { "email": email }, None).await {
        Ok(Some(_)) => return Err("Email already registered".to_string()),
        Ok(None) => {}
        Err(e) => return Err(e.to_string()),
    }

    let pw_hash = hash(password, DEFAULT_COST).map_err(|e| e.to_string())?;

    let user = User {
        id: ObjectId::new(),
        email: email.to_string(),
        password_hash: pw_hash,
        created_at: Utc::now().timestamp(),
    };

    users.insert_one(&user, None).await.map_err(|e| {
        let msg = e.to_string();
        // unique index on email catches a concurrent register
        if msg.contains("E11000") {
            "Email already registered".to_string()
        } else {
            msg
        }
    })?;

    Ok(user)
}
