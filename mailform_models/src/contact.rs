use nutype::nutype;

/// A name/email pair submitted through the contact form.
///
/// Only presence is enforced here. Whether `email` is a well-formed address is
/// checked by the form client (see [`EmailAddress`](crate::email_address::EmailAddress)),
/// the dispatch endpoint forwards it to the provider as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub name: ContactName,
    pub email: ContactEmail,
}

#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactName(String);

#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactEmail(String);

impl ContactRequest {
    /// Builds a request from optional raw fields, returning `None` if either
    /// field is missing or empty.
    pub fn from_fields(name: Option<String>, email: Option<String>) -> Option<Self> {
        Some(Self {
            name: ContactName::try_new(name?).ok()?,
            email: ContactEmail::try_new(email?).ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fields() {
        let ok = ContactRequest::from_fields(
            Some("Max Mustermann".into()),
            Some("max.mustermann@example.de".into()),
        )
        .unwrap();
        assert_eq!(*ok.name, "Max Mustermann");
        assert_eq!(*ok.email, "max.mustermann@example.de");

        for (name, email) in [
            (None, Some("max@example.de")),
            (Some("Max"), None),
            (None, None),
            (Some(""), Some("max@example.de")),
            (Some("Max"), Some("")),
        ] {
            assert_eq!(
                ContactRequest::from_fields(name.map(Into::into), email.map(Into::into)),
                None
            );
        }
    }

    #[test]
    fn email_format_is_not_checked() {
        let request =
            ContactRequest::from_fields(Some("Max".into()), Some("not an address".into()));
        assert!(request.is_some());
    }
}
