//! Email templates
//!
//! Plain Rust formatting; no templating engine. Each template yields a
//! subject plus HTML and text renditions of the same content.

use shared::models::OrderType;

const STUDIO_NAME: &str = "Everlasting Ink";

/// Rendered email content
#[derive(Debug, Clone)]
pub struct EmailBody {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Confirmation sent to the customer once their submission is persisted
pub fn order_confirmation(order_type: OrderType, order_id: &str, first_name: &str) -> EmailBody {
    let subject = format!("{} — we received your {} order", STUDIO_NAME, order_type.label());

    let lead = match order_type {
        OrderType::Living => {
            "Thank you for trusting us with your tattoo. Our artists will review \
             your photographs and reach out with next steps and your downpayment \
             invoice."
        }
        OrderType::Memoriam => {
            "Thank you for trusting us during this difficult time. Our artists \
             will review the submitted photographs and coordinate with the \
             funeral home where needed."
        }
    };

    let html = format!(
        "<p>Dear {first_name},</p>\
         <p>{lead}</p>\
         <p>Your order reference is <strong>{order_id}</strong>. Please keep it \
         for any questions about your memorial artwork.</p>\
         <p>— The {STUDIO_NAME} team</p>"
    );
    let text = format!(
        "Dear {first_name},\n\n{lead}\n\nYour order reference is {order_id}. \
         Please keep it for any questions about your memorial artwork.\n\n\
         — The {STUDIO_NAME} team"
    );

    EmailBody { subject, html, text }
}

/// Free-form staff message, wrapped in the studio frame
pub fn staff_message(subject: &str, message: &str) -> EmailBody {
    let html = format!(
        "<p>{}</p><p>— The {STUDIO_NAME} team</p>",
        html_escape(message).replace('\n', "<br>")
    );
    let text = format!("{message}\n\n— The {STUDIO_NAME} team");

    EmailBody {
        subject: subject.to_string(),
        html,
        text,
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
