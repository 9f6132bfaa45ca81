use careslot_common::services::{EmailMessage, NotificationError};
use lettre::message::{header::ContentType, Mailbox};
use lettre::Message;

/// Parses one address, reporting it back verbatim on failure.
pub fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|_| NotificationError::InvalidAddress(address.to_string()))
}

/// The sender mailbox, with an optional display name.
pub fn sender(address: &str, name: Option<&str>) -> Result<Mailbox, NotificationError> {
    let mailbox = parse_mailbox(address)?;
    Ok(match name {
        Some(name) if !name.trim().is_empty() => Mailbox::new(Some(name.to_string()), mailbox.email),
        _ => mailbox,
    })
}

/// Turns an [`EmailMessage`] into a plain-text MIME message.
pub fn build_message(from: &Mailbox, email: &EmailMessage) -> Result<Message, NotificationError> {
    if email.to.is_empty() {
        return Err(NotificationError::InvalidAddress(
            "message has no recipient".to_string(),
        ));
    }

    let mut builder = Message::builder()
        .from(from.clone())
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN);

    for to in &email.to {
        builder = builder.to(parse_mailbox(to)?);
    }
    for cc in &email.cc {
        builder = builder.cc(parse_mailbox(cc)?);
    }
    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }

    builder
        .body(email.body.clone())
        .map_err(|e| NotificationError::Send(e.to_string()))
}
