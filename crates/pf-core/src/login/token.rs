use super::error::LoginError;

/// Value shipped in the sample configuration file.
const PLACEHOLDER_TOKEN: &str = "YOUR_REFRESH_TOKEN";

/// Real refresh tokens are far longer than this.
const MIN_TOKEN_LEN: usize = 10;

/// Validate a refresh token before any request is made.
///
/// Returns the trimmed token.
pub fn validate_token(raw: &str) -> Result<String, LoginError> {
    let token = raw.trim();

    if token.is_empty() {
        return Err(LoginError::Validation("token is empty".to_string()));
    }
    if token.chars().any(char::is_whitespace) {
        return Err(LoginError::Validation(
            "token must not contain whitespace".to_string(),
        ));
    }
    if token == PLACEHOLDER_TOKEN {
        return Err(LoginError::Validation(
            "token is the configuration placeholder".to_string(),
        ));
    }
    if token.len() < MIN_TOKEN_LEN {
        return Err(LoginError::Validation(format!(
            "token is shorter than {MIN_TOKEN_LEN} characters"
        )));
    }

    Ok(token.to_string())
}
