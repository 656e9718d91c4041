//! Random username and password generation.
//!
//! Characters are drawn independently and uniformly, with replacement, from
//! the pool assembled out of the enabled character classes. The public
//! entry points use the thread-local generator; the `_with` variants take
//! any [`Rng`] so callers can supply a seeded one.

use rand::Rng;
use toolbelt_proto::{
    IntegerLike, PasswordRequest, PasswordResponse, UsernameRequest, UsernameResponse,
};

use crate::ApiError;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const USERNAME_SYMBOLS: &str = "_-";
/// The 32 ASCII punctuation characters.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 4;
pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// Upper bound on generated credential length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimits {
    pub max_length: usize,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// Union of enabled ASCII character classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterPool {
    chars: Vec<u8>,
}

impl CharacterPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: &str, enabled: bool) -> Self {
        if enabled {
            self.chars.extend_from_slice(class.as_bytes());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.chars.contains(&(c as u8))
    }

    /// Draws `count` characters. The pool must not be empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> String {
        (0..count)
            .map(|_| self.chars[rng.random_range(0..self.chars.len())] as char)
            .collect()
    }
}

pub fn username_pool(include_numbers: bool, include_special: bool) -> CharacterPool {
    CharacterPool::new()
        .with(LOWERCASE, true)
        .with(DIGITS, include_numbers)
        .with(USERNAME_SYMBOLS, include_special)
}

pub fn password_pool(req: &PasswordRequest) -> CharacterPool {
    CharacterPool::new()
        .with(UPPERCASE, req.include_uppercase)
        .with(LOWERCASE, req.include_lowercase)
        .with(DIGITS, req.include_numbers)
        .with(PUNCTUATION, req.include_special)
}

fn checked_length(
    length: &IntegerLike,
    subject: &'static str,
    min: usize,
    limits: GenerationLimits,
) -> Result<usize, ApiError> {
    let length = length.to_i64().ok_or(ApiError::InvalidGeneratorInput)?;
    if length < min as i64 {
        return Err(ApiError::LengthTooShort { subject, min });
    }
    let length = usize::try_from(length).map_err(|_| ApiError::InvalidGeneratorInput)?;
    if length > limits.max_length {
        return Err(ApiError::LengthTooLong {
            subject,
            max: limits.max_length,
        });
    }
    Ok(length)
}

pub fn generate_username(
    req: &UsernameRequest,
    limits: GenerationLimits,
) -> Result<UsernameResponse, ApiError> {
    generate_username_with(req, limits, &mut rand::rng())
}

pub fn generate_username_with<R: Rng + ?Sized>(
    req: &UsernameRequest,
    limits: GenerationLimits,
    rng: &mut R,
) -> Result<UsernameResponse, ApiError> {
    let length = checked_length(&req.length, "Username", MIN_USERNAME_LENGTH, limits)?;
    let remaining = length
        .checked_sub(req.prefix.chars().count())
        .ok_or(ApiError::PrefixTooLong)?;

    let pool = username_pool(req.include_numbers, req.include_special);
    let mut username = String::with_capacity(req.prefix.len() + remaining);
    username.push_str(&req.prefix);
    username.push_str(&pool.sample(rng, remaining));
    Ok(UsernameResponse::new(username))
}

pub fn generate_password(
    req: &PasswordRequest,
    limits: GenerationLimits,
) -> Result<PasswordResponse, ApiError> {
    generate_password_with(req, limits, &mut rand::rng())
}

pub fn generate_password_with<R: Rng + ?Sized>(
    req: &PasswordRequest,
    limits: GenerationLimits,
    rng: &mut R,
) -> Result<PasswordResponse, ApiError> {
    let length = checked_length(&req.length, "Password", MIN_PASSWORD_LENGTH, limits)?;
    let pool = password_pool(req);
    if pool.is_empty() {
        return Err(ApiError::EmptyCharacterPool);
    }
    Ok(PasswordResponse::new(pool.sample(rng, length)))
}
