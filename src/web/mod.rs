pub mod chat;
pub mod error;
pub mod upload;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    chat::configure(conf);
    upload::configure(conf);
}
