mod token;

pub use token::{
    token_lifetime, AuthError, Claims, IssuedToken, TokenIssuer, BEARER_TOKEN_TYPE,
    DEFAULT_TOKEN_LIFETIME_MINUTES, MAX_TOKEN_LIFETIME_MINUTES,
};
