//! Prompts for the booking assistant using Handlebars for
//! templating. Output is sent to the model as plain text so HTML
//! escaping is turned off.

use std::fmt;

use handlebars::{Handlebars, RenderError, no_escape};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::booking::Booking;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    Invitation,
    Ideas,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const INVITATION_PROMPT: &str = "أنت شاعر ومبدع في كتابة الرسائل. اكتب رسالة دعوة قصيرة وودية للقاء الدورية الشهرية للأسرة. المضيف هو {{host}}، وسيكون اللقاء في {{location}} يوم {{day}} نهاية شهر {{month}} الهجري. اجعل الرسالة ترحيبية ودافئة، ومناسبة للنسخ والإرسال في الواتساب.";

const IDEAS_PROMPT: &str = "أنت مساعد لتنظيم اللقاءات العائلية. سيستضيف {{host}} الدورية الشهرية في شهر {{month}}. اقترح 3 أفكار إبداعية ومناسبة للعائلة السعودية للقاء، مع ذكر نشاط مقترح لكل فكرة. اجعل الاقتراحات قصيرة وفي نقاط واضحة.";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(no_escape);
    registry
        .register_template_string(&PromptKind::Invitation.to_string(), INVITATION_PROMPT)
        .expect("Failed to register template");
    registry
        .register_template_string(&PromptKind::Ideas.to_string(), IDEAS_PROMPT)
        .expect("Failed to register template");
    registry
}

pub fn render(kind: PromptKind, booking: &Booking) -> Result<String, RenderError> {
    let data = json!({
        "host": booking.host,
        "location": booking.location,
        "day": booking.day.label(),
        "month": booking.month,
    });
    templates().render(&kind.to_string(), &data)
}
