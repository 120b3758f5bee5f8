//! One-to-one conversations between a user and an administrator.
//!
//! A conversation is identified by its unordered pair of participants. The
//! pair is stored normalized in `conversations.pair_key`, which carries a
//! unique constraint, so looking up (a, b) and (b, a) finds the same row and
//! two racing creators can never both succeed.

use crate::constants::ROOM_LABEL_PREFIX;
use crate::orm::{conversation_participants, conversations, messages, usuarios};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbErr,
    FromQueryResult, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;

/// A resolved conversation: its id and room label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversationRef {
    pub id: i32,
    pub room: String,
}

impl From<conversations::Model> for ConversationRef {
    fn from(model: conversations::Model) -> Self {
        Self {
            id: model.id,
            room: model.room,
        }
    }
}

/// Order-independent identity of the pair {user_a, user_b}.
pub fn pair_key(user_a: i32, user_b: i32) -> String {
    let (low, high) = if user_a <= user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };
    format!("{}:{}", low, high)
}

/// Label for a new room between `user_a` and `user_b`, in that order.
pub fn room_label(user_a: i32, user_b: i32) -> String {
    format!("{}_{}_{}", ROOM_LABEL_PREFIX, user_a, user_b)
}

/// Return the conversation between `user_a` and `user_b`, creating it with
/// both participants on first use.
///
/// The room label of a new conversation follows the argument order of the
/// call that created it; later calls in either order get the stored label.
pub async fn get_or_create_conversation(
    db: &DatabaseConnection,
    user_a: i32,
    user_b: i32,
) -> Result<ConversationRef, DbErr> {
    if user_a == user_b {
        return Err(DbErr::Custom(
            "A conversation needs two distinct participants".to_string(),
        ));
    }

    let key = pair_key(user_a, user_b);
    if let Some(existing) = find_by_pair_key(db, &key).await? {
        return Ok(existing.into());
    }

    let room = room_label(user_a, user_b);
    match create_conversation(db, &key, &room, &[user_a, user_b]).await {
        Ok(created) => {
            log::info!("Created conversation {} ({})", created.id, created.room);
            Ok(created)
        }
        Err(err) => {
            // Losing the race for the unique pair key rolls our inserts back;
            // the winner's row is the answer.
            match find_by_pair_key(db, &key).await? {
                Some(existing) => {
                    log::debug!(
                        "Conversation {} was created concurrently ({})",
                        existing.id,
                        err
                    );
                    Ok(existing.into())
                }
                None => Err(err),
            }
        }
    }
}

async fn find_by_pair_key<C>(db: &C, key: &str) -> Result<Option<conversations::Model>, DbErr>
where
    C: ConnectionTrait,
{
    conversations::Entity::find()
        .filter(conversations::Column::PairKey.eq(key))
        .one(db)
        .await
}

/// Insert the conversation row and its participant links in one transaction.
async fn create_conversation(
    db: &DatabaseConnection,
    key: &str,
    room: &str,
    participant_ids: &[i32],
) -> Result<ConversationRef, DbErr> {
    let txn = db.begin().await?;

    let conversation = conversations::ActiveModel {
        room: Set(room.to_string()),
        pair_key: Set(key.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let conversation_model = conversation.insert(&txn).await?;

    for &user_id in participant_ids {
        let participant = conversation_participants::ActiveModel {
            conversation_id: Set(conversation_model.id),
            user_id: Set(user_id),
            ..Default::default()
        };
        participant.insert(&txn).await?;
    }

    txn.commit().await?;

    Ok(conversation_model.into())
}

pub async fn find_conversation<C>(
    db: &C,
    conversation_id: i32,
) -> Result<Option<ConversationRef>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(conversations::Entity::find_by_id(conversation_id)
        .one(db)
        .await?
        .map(ConversationRef::from))
}

/// Verify that a user is a participant in a conversation
pub async fn is_participant<C>(db: &C, user_id: i32, conversation_id: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let participant = conversation_participants::Entity::find()
        .filter(conversation_participants::Column::ConversationId.eq(conversation_id))
        .filter(conversation_participants::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    Ok(participant.is_some())
}

/// Conversation row for the administrator's listing.
#[derive(Clone, Debug, Serialize)]
pub struct ConversationSummary {
    pub id: i32,
    pub room: String,
    /// Participant names joined with ", "
    pub participants: String,
}

/// Every conversation with at least one participant, newest first.
pub async fn list_conversations<C>(db: &C) -> Result<Vec<ConversationSummary>, DbErr>
where
    C: ConnectionTrait,
{
    let conversations = conversations::Entity::find()
        .order_by_desc(conversations::Column::CreatedAt)
        .order_by_desc(conversations::Column::Id)
        .all(db)
        .await?;

    let links = conversation_participants::Entity::find()
        .find_also_related(usuarios::Entity)
        .order_by_asc(conversation_participants::Column::ConversationId)
        .order_by_asc(conversation_participants::Column::Id)
        .all(db)
        .await?;

    let mut names: HashMap<i32, Vec<String>> = HashMap::new();
    for (link, user) in links {
        if let Some(user) = user {
            names.entry(link.conversation_id).or_default().push(user.nome);
        }
    }

    Ok(conversations
        .into_iter()
        .filter_map(|conv| {
            let participants = names.remove(&conv.id)?;
            Some(ConversationSummary {
                id: conv.id,
                room: conv.room,
                participants: participants.join(", "),
            })
        })
        .collect())
}

/// A message as returned by `GET /chat/mensagens/{id}`.
#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
pub struct MessageDisplay {
    /// Author's display name
    pub user: String,
    pub message: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Messages of a conversation, oldest first.
pub async fn get_conversation_messages<C>(
    db: &C,
    conversation_id: i32,
) -> Result<Vec<MessageDisplay>, DbErr>
where
    C: ConnectionTrait,
{
    messages::Entity::find()
        .select_only()
        .column_as(usuarios::Column::Nome, "user")
        .column(messages::Column::Message)
        .column(messages::Column::CreatedAt)
        .join(JoinType::InnerJoin, messages::Relation::Usuario.def())
        .filter(messages::Column::ConversationId.eq(conversation_id))
        .order_by_asc(messages::Column::CreatedAt)
        .order_by_asc(messages::Column::Id)
        .into_model::<MessageDisplay>()
        .all(db)
        .await
}

/// Append a message to a conversation. Returns the stored message.
pub async fn send_message<C>(
    db: &C,
    conversation_id: i32,
    sender: &crate::user::Profile,
    content: &str,
) -> Result<MessageDisplay, DbErr>
where
    C: ConnectionTrait,
{
    let message = messages::ActiveModel {
        conversation_id: Set(conversation_id),
        user_id: Set(sender.id),
        message: Set(content.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let message_model = message.insert(db).await?;

    Ok(MessageDisplay {
        user: sender.name.clone(),
        message: message_model.message,
        created_at: message_model.created_at,
    })
}
