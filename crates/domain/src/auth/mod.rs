//! Authentication domain types

mod types;

pub use types::{
    AuthErrorReport, LoginParams, ResetPasswordParams, SESSION_MISSING_ERROR, SetPasswordParams,
    Tokens, UserIdentity,
};
