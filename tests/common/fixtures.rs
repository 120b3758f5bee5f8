//! Test fixtures for creating test data
#![allow(dead_code)]
#![allow(clippy::needless_update)]

use actix_session::Session;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{test, web, HttpResponse};
use chatdesk::orm::{messages, usuarios};
use chrono::NaiveDateTime;
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

/// Create a user row the way the login system would
pub async fn create_test_user(
    db: &DatabaseConnection,
    nome: &str,
    role: &str,
) -> Result<usuarios::Model, DbErr> {
    let user = usuarios::ActiveModel {
        nome: Set(nome.to_string()),
        role: Set(role.to_string()),
        ..Default::default()
    };
    user.insert(db).await
}

/// Insert a message with an explicit timestamp
pub async fn insert_message_at(
    db: &DatabaseConnection,
    conversation_id: i32,
    user_id: i32,
    text: &str,
    created_at: NaiveDateTime,
) -> Result<messages::Model, DbErr> {
    let message = messages::ActiveModel {
        conversation_id: Set(conversation_id),
        user_id: Set(user_id),
        message: Set(text.to_string()),
        created_at: Set(created_at),
        ..Default::default()
    };
    message.insert(db).await
}

pub fn at(date_time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(date_time, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Stand-in for the external login system. Mount at `/test/login/{user_id}`.
pub async fn test_login(session: Session, user_id: web::Path<i32>) -> HttpResponse {
    chatdesk::session::remember_user(&session, user_id.into_inner()).unwrap();
    HttpResponse::Ok().finish()
}

pub fn login_request(user_id: i32) -> test::TestRequest {
    test::TestRequest::post().uri(&format!("/test/login/{}", user_id))
}

/// Session cookie set by a login response
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    assert!(resp.status().is_success(), "login failed: {}", resp.status());
    resp.response()
        .cookies()
        .next()
        .expect("login response should set a session cookie")
        .into_owned()
}

/// Stand-in for the login system's logout. Mount at `/test/logout`.
pub async fn test_logout(session: Session) -> HttpResponse {
    chatdesk::session::forget_user(&session);
    HttpResponse::Ok().finish()
}
