/// An auth token and its optional expiry, as returned by a
/// [`crate::CredentialsProvider`].
#[derive(Debug, Clone)]
pub struct Token {
    pub value: String,
    pub expiry: Option<time::OffsetDateTime>,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expiry: None,
        }
    }

    pub fn with_expiry(value: impl Into<String>, expiry: time::OffsetDateTime) -> Self {
        Self {
            value: value.into(),
            expiry: Some(expiry),
        }
    }

    /// The literal string sent as `x-ydb-auth-ticket`.
    pub fn as_header_value(&self) -> &str {
        &self.value
    }

    pub fn valid(&self) -> bool {
        !self.value.is_empty() && !self.expired()
    }

    fn expired(&self) -> bool {
        match self.expiry {
            None => false,
            Some(expiry) => {
                let now = time::OffsetDateTime::now_utc();
                let skewed = expiry - time::Duration::seconds(10);
                now > skewed
            }
        }
    }
}
