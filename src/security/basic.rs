use crate::config::DEFAULT_REALM;
use crate::{context, response};
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use tracing::debug;

/// Scheme prefix of a Basic `Authorization` header, matched case-sensitively
pub const BASIC_PREFIX: &str = "Basic ";

/// Body of the 401 challenge
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";

/// Standard alphabet that tolerates missing padding and non-zero trailing bits
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Username and password decoded from a Basic credential.
///
/// Stored as bytes: credentials are compared byte-wise and need not be UTF-8.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: Vec<u8>,
    pub password: Vec<u8>,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &String::from_utf8_lossy(&self.username))
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicCredentials {
    /// Parse a full `Authorization` header value.
    ///
    /// Returns `None` for a missing prefix, an empty decode, or a decoded
    /// text without `:`.
    #[must_use]
    pub fn parse(header: &str) -> Option<Self> {
        let encoded = header.strip_prefix(BASIC_PREFIX)?;
        let decoded = Self::decode_lenient(encoded);
        let sep = decoded.iter().position(|b| *b == b':')?;
        Some(Self {
            username: decoded[..sep].to_vec(),
            password: decoded[sep + 1..].to_vec(),
        })
    }

    /// Decode the longest valid Base64 prefix of `encoded`.
    #[must_use]
    pub fn decode_lenient(encoded: &str) -> Vec<u8> {
        let mut len = encoded
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
            .count();
        // a single dangling symbol carries fewer than 8 bits
        if len % 4 == 1 {
            len -= 1;
        }
        LENIENT.decode(&encoded[..len]).unwrap_or_default()
    }

    /// `Basic <base64(user:pass)>`, as a client would send it.
    #[must_use]
    pub fn encode(username: &str, password: &str) -> String {
        format!(
            "{BASIC_PREFIX}{}",
            STANDARD.encode(format!("{username}:{password}"))
        )
    }

    /// Byte-wise comparison against the expected pair
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username.as_bytes() && self.password == password.as_bytes()
    }
}

/// Check the current request's Basic credentials against `username`/`password`.
///
/// Always `false` outside a dispatch.
#[must_use]
pub fn authenticate(username: &str, password: &str) -> bool {
    let Some(request) = context::current() else {
        return false;
    };
    let Some(header) = request.header("authorization") else {
        debug!(dispatch_id = %request.id, "No Authorization header");
        return false;
    };
    match BasicCredentials::parse(header) {
        Some(creds) => {
            let ok = creds.matches(username, password);
            debug!(dispatch_id = %request.id, authenticated = ok, "Basic credentials checked");
            ok
        }
        None => {
            debug!(dispatch_id = %request.id, "Malformed Basic credentials");
            false
        }
    }
}

/// `WWW-Authenticate` value for `realm`
#[must_use]
pub fn challenge_header(realm: &str) -> String {
    format!("Basic realm=\"{realm}\"")
}

/// Answer the current request with a 401 Basic challenge.
///
/// The handler should return right after calling this.
pub fn request_authentication() {
    let realm = context::realm();
    let realm = realm.as_deref().unwrap_or(DEFAULT_REALM);
    response::send_header("WWW-Authenticate", &challenge_header(realm));
    response::send(401, "text/plain", UNAUTHORIZED_BODY);
}
