
#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::event::{Event, EventData};
    use crate::kernel::context::Context;

    #[test]
    fn test_event_accessors() {
        let mut data = EventData::new();
        data.insert("plugin".to_string(), json!("auth"));
        data.insert("attempt".to_string(), json!(2));

        let event = Event::new("plugin.started", data, Context::background());

        assert_eq!(event.name(), "plugin.started");
        assert_eq!(event.get_str("plugin"), Some("auth"));
        assert_eq!(event.get("attempt"), Some(&json!(2)));
        // Not a string
        assert_eq!(event.get_str("attempt"), None);
        assert!(event.get("missing").is_none());
        assert!(!event.context().is_cancelled());
    }
}
