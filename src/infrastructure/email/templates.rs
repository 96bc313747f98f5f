use chrono::{DateTime, Utc};

use crate::{entities::contact::ContactMessage, infrastructure::email::mailer::OutgoingEmail};

/// Escapes visitor-supplied text for an HTML body, keeping line breaks.
fn escape_multiline(text: &str) -> String {
    text.lines()
        .map(ammonia::clean_text)
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Notification for the site owner about a new contact submission.
pub fn owner_notification(message: &ContactMessage, admin_email: &str, sent_at: DateTime<Utc>) -> OutgoingEmail {
    let html = format!(
        "<h2>New Contact Form Submission</h2>\
         <p><strong>Name:</strong> {name}</p>\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Subject:</strong> {subject}</p>\
         <p><strong>Message:</strong></p>\
         <p>{body}</p>\
         <hr>\
         <p><small>Submitted at: {at}</small></p>",
        name = ammonia::clean_text(&message.name),
        email = ammonia::clean_text(&message.email),
        subject = ammonia::clean_text(&message.subject),
        body = escape_multiline(&message.message),
        at = sent_at.to_rfc3339(),
    );

    let text = format!(
        "New Contact Form Submission\n\nName: {}\nEmail: {}\nSubject: {}\n\n{}\n\nSubmitted at: {}",
        message.name,
        message.email,
        message.subject,
        message.message,
        sent_at.to_rfc3339(),
    );

    OutgoingEmail {
        to: admin_email.to_string(),
        subject: format!("New Contact Form: {}", message.subject),
        html,
        text,
    }
}

/// Acknowledgement sent back to the visitor with a copy of their message.
pub fn auto_reply(message: &ContactMessage, owner_name: &str) -> OutgoingEmail {
    let html = format!(
        "<h2>Hello {name}!</h2>\
         <p>Thank you for getting in touch. I've received your message and will get back to you as soon as possible.</p>\
         <p>Here's a copy of your message:</p>\
         <blockquote style=\"border-left: 3px solid #00FFE0; padding-left: 15px; margin: 20px 0;\">\
         <p><strong>Subject:</strong> {subject}</p>\
         <p>{body}</p>\
         </blockquote>\
         <p>Best regards,<br>{owner}</p>",
        name = ammonia::clean_text(&message.name),
        subject = ammonia::clean_text(&message.subject),
        body = escape_multiline(&message.message),
        owner = ammonia::clean_text(owner_name),
    );

    let text = format!(
        "Hello {}!\n\nThank you for getting in touch. I've received your message and will get back to you as soon as possible.\n\n\
         Subject: {}\n\n{}\n\nBest regards,\n{}",
        message.name, message.subject, message.message, owner_name,
    );

    OutgoingEmail {
        to: message.email.clone(),
        subject: "Thanks for reaching out!".to_string(),
        html,
        text,
    }
}
