/// Builds the outgoing reservation email.
pub mod message;
/// SMTP implementation of the notification service.
pub mod service;


pub use service::MailNotificationService;
