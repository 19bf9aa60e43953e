use mailform_models::contact::ContactRequest;
use serde::Deserialize;
use serde_json::Value;

/// The raw form submission. Fields are kept as arbitrary JSON so that a
/// missing, `null`, `false`, `0` or empty field is reported as a validation
/// failure instead of a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiContactRequest {
    /// Full name of the recipient
    #[serde(default)]
    pub name: Option<Value>,
    /// Email address of the recipient
    #[serde(default)]
    pub email: Option<Value>,
}

impl ApiContactRequest {
    pub fn validate(self) -> Option<ContactRequest> {
        ContactRequest::from_fields(field(self.name), field(self.email))
    }
}

/// Any other non-string value is forwarded in its JSON text form.
fn field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::String(value) => Some(value),
        value => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> Option<ContactRequest> {
        serde_json::from_value::<ApiContactRequest>(value)
            .unwrap()
            .validate()
    }

    #[test]
    fn falsy_fields_are_missing() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert_eq!(
                parse(json!({"name": value, "email": "max@example.de"})),
                None,
                "{value}"
            );
            assert_eq!(parse(json!({"name": "Max", "email": value})), None, "{value}");
        }
    }

    #[test]
    fn non_string_values_are_stringified() {
        let request = parse(json!({"name": 42, "email": "max@example.de"})).unwrap();
        assert_eq!(*request.name, "42");
        assert_eq!(*request.email, "max@example.de");

        let request = parse(json!({"name": true, "email": "max@example.de"})).unwrap();
        assert_eq!(*request.name, "true");
    }
}
