//! JSON views shared by the virtual components.

use serde_json::Value;

use switchyard_domain::component::ComponentSummary;
use switchyard_domain::message::Payload;

pub(crate) const STATE_ON: &str = "on";
pub(crate) const STATE_OFF: &str = "off";

pub(crate) fn state_name(on: bool) -> &'static str {
    if on { STATE_ON } else { STATE_OFF }
}

/// `INFO` payload: identity fields followed by the component's own `fields`.
pub(crate) fn component_view(summary: &ComponentSummary, fields: Payload) -> Payload {
    let mut view = Payload::object()
        .with("ff_id", summary.id.as_str())
        .with("alias", summary.alias.as_str())
        .with("title", summary.title.as_str())
        .with("type", summary.kind.to_string())
        .with("package", summary.package.as_str());
    if let Value::Object(fields) = fields.into_value() {
        for (key, value) in fields {
            view.insert(key, value);
        }
    }
    view
}

/// `alexa-view` payload for a device exposed to voice assistants.
pub(crate) fn alexa_view(summary: &ComponentSummary, category: &str, on: bool) -> Payload {
    Payload::object()
        .with("ff_id", summary.id.as_str())
        .with("name", summary.alias.as_str())
        .with("categories", vec![category])
        .with("state", state_name(on))
}
