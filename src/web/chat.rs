//! Chat page and message routes

use crate::app_config::AppConfig;
use crate::conversations::{self, ConversationRef, ConversationSummary};
use crate::middleware::CurrentUser;
use crate::user::Profile;
use crate::web::error::ChatError;
use actix_web::{get, post, web, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.app_data(web::JsonConfig::default().error_handler(|err, _| {
        log::debug!("Rejected message body: {}", err);
        ChatError::BadRequest(err.to_string()).into()
    }))
    .service(view_chat)
    .service(get_messages)
    .service(post_message);
}

/// Template for the chat page, both the admin listing and the user's room
#[derive(Template)]
#[template(path = "chat/chat.html")]
struct ChatTemplate {
    user: Profile,
    is_admin: bool,
    conversations: Vec<ConversationSummary>,
    room: Option<ConversationRef>,
}

/// GET /chat - Admins get every conversation, everyone else their room with an admin
#[get("/chat")]
pub async fn view_chat(
    client: CurrentUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<impl Responder, ChatError> {
    if client.is_admin() {
        let conversations = conversations::list_conversations(db.get_ref()).await?;
        return Ok(ChatTemplate {
            user: client.get_profile().clone(),
            is_admin: true,
            conversations,
            room: None,
        }
        .to_response());
    }

    let admin = Profile::first_admin(db.get_ref(), &config.chat.admin_role)
        .await?
        .ok_or(ChatError::MissingAdmin)?;

    let room =
        conversations::get_or_create_conversation(db.get_ref(), client.get_id(), admin.id).await?;

    Ok(ChatTemplate {
        user: client.get_profile().clone(),
        is_admin: false,
        conversations: Vec::new(),
        room: Some(room),
    }
    .to_response())
}

/// Admins may read any existing conversation; everyone else only their own.
async fn require_access(
    db: &DatabaseConnection,
    client: &CurrentUser,
    conversation_id: i32,
) -> Result<(), ChatError> {
    if client.is_admin() {
        return match conversations::find_conversation(db, conversation_id).await? {
            Some(_) => Ok(()),
            None => Err(ChatError::NotFound),
        };
    }

    if conversations::is_participant(db, client.get_id(), conversation_id).await? {
        Ok(())
    } else {
        Err(ChatError::Forbidden(
            "You are not a participant in this conversation".to_string(),
        ))
    }
}

/// GET /chat/mensagens/{id} - Messages of a conversation as JSON, oldest first
#[get("/chat/mensagens/{conversation_id}")]
pub async fn get_messages(
    client: CurrentUser,
    db: web::Data<DatabaseConnection>,
    conversation_id: web::Path<i32>,
) -> Result<impl Responder, ChatError> {
    let conversation_id = conversation_id.into_inner();
    log::debug!("Fetching messages of conversation {}", conversation_id);

    require_access(db.get_ref(), &client, conversation_id).await?;

    let messages = conversations::get_conversation_messages(db.get_ref(), conversation_id).await?;
    log::debug!(
        "{} messages found in conversation {}",
        messages.len(),
        conversation_id
    );

    Ok(HttpResponse::Ok().json(messages))
}

/// Body of a posted message
#[derive(Deserialize)]
pub struct NewMessageForm {
    message: String,
}

/// POST /chat/mensagens/{id} - Append a message to a conversation
#[post("/chat/mensagens/{conversation_id}")]
pub async fn post_message(
    client: CurrentUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    conversation_id: web::Path<i32>,
    form: web::Json<NewMessageForm>,
) -> Result<impl Responder, ChatError> {
    let conversation_id = conversation_id.into_inner();
    let content = form.message.trim();

    if content.is_empty() {
        return Err(ChatError::BadRequest("Message cannot be empty".to_string()));
    }
    if content.chars().count() > config.chat.message_max_length {
        return Err(ChatError::BadRequest(format!(
            "Message is longer than {} characters",
            config.chat.message_max_length
        )));
    }

    require_access(db.get_ref(), &client, conversation_id).await?;

    let message =
        conversations::send_message(db.get_ref(), conversation_id, client.get_profile(), content)
            .await?;

    Ok(HttpResponse::Created().json(message))
}
