use crate::app_config::AppConfig;
use crate::constants::ADMIN_ROLE;
use crate::session::get_user_id;
use crate::user::Profile;
use crate::web::error::ChatError;
use actix_session::Session;
use actix_web::dev::Payload;
use actix_web::web::Data;
use actix_web::{error, Error, FromRequest, HttpRequest};
use futures::future::{ready, LocalBoxFuture};
use sea_orm::DatabaseConnection;

/// The logged-in user making the request.
///
/// Extracting it is how a route requires a session: guests are turned away
/// with 401 before the database is touched.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    profile: Profile,
    is_admin: bool,
}

impl CurrentUser {
    pub fn new(profile: Profile, is_admin: bool) -> Self {
        Self { profile, is_admin }
    }

    pub fn get_id(&self) -> i32 {
        self.profile.id
    }

    pub fn get_name(&self) -> &str {
        &self.profile.name
    }

    pub fn get_profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Loads the session's user and decides whether they hold `admin_role`.
    async fn load(
        db: Option<Data<DatabaseConnection>>,
        user_id: i32,
        admin_role: String,
    ) -> Result<Self, Error> {
        let db = db.ok_or_else(|| error::ErrorServiceUnavailable("Database is not configured."))?;

        let profile = Profile::get_by_id(db.get_ref(), user_id)
            .await
            .map_err(ChatError::from)?
            .ok_or_else(|| {
                log::debug!("Session refers to missing user {}", user_id);
                ChatError::Unauthorized
            })?;

        let is_admin = profile.has_role(&admin_role);
        Ok(Self::new(profile, is_admin))
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user_id = match Session::extract(req).into_inner() {
            Ok(session) => get_user_id(&session).unwrap_or_else(|err| {
                log::warn!("Unreadable user id in session: {}", err);
                None
            }),
            Err(err) => {
                log::error!("Unable to extract Session data: {}", err);
                None
            }
        };

        let Some(user_id) = user_id else {
            return Box::pin(ready(Err(ChatError::Unauthorized.into())));
        };

        let db = req.app_data::<Data<DatabaseConnection>>().cloned();
        let admin_role = req
            .app_data::<Data<AppConfig>>()
            .map(|config| config.chat.admin_role.clone())
            .unwrap_or_else(|| ADMIN_ROLE.to_string());

        Box::pin(Self::load(db, user_id, admin_role))
    }
}
