//! Token ids and the placeholders shared by every codec.

/// Integer id consumed by a downstream embedding lookup.
pub type Token = usize;

/// Decoded form of the "missing value" sentinel.
pub const MISSING: &str = "__missing__";
/// Decoded form of the "unseen category" sentinel.
pub const UNKNOWN: &str = "__unknown__";
/// Decoded form of any token that does not map back to a value.
pub const INVALID: &str = "__invalid__";

/// Token containers that can be moved into and out of a shared token space.
///
/// Implemented for every `Codec::Tokens` type so that [`crate::Offset`] can
/// shift a codec's output without knowing its shape.
pub trait TokenShift: Sized {
    /// Adds `offset` to every token; `offset` stays within [`crate::MAX_OFFSET`].
    fn shift_up(&self, offset: Token) -> Self;

    /// Subtracts `offset` from every token, or `None` if any token lies below it.
    fn shift_down(&self, offset: Token) -> Option<Self>;
}

impl TokenShift for Token {
    fn shift_up(&self, offset: Token) -> Self {
        self + offset
    }

    fn shift_down(&self, offset: Token) -> Option<Self> {
        self.checked_sub(offset)
    }
}

impl TokenShift for Vec<Token> {
    fn shift_up(&self, offset: Token) -> Self {
        self.iter().map(|t| t + offset).collect()
    }

    fn shift_down(&self, offset: Token) -> Option<Self> {
        self.iter().map(|t| t.checked_sub(offset)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shift() {
        let token: Token = 3;
        assert_eq!(token.shift_up(10), 13);
        assert_eq!(token.shift_up(10).shift_down(10), Some(3));
        assert_eq!(token.shift_down(4), None);
    }

    #[test]
    fn test_vec_shift_rejects_any_underflow() {
        let tokens: Vec<Token> = vec![10, 12, 15];
        assert_eq!(tokens.shift_down(10), Some(vec![0, 2, 5]));
        assert_eq!(tokens.shift_down(11), None);
        let low: Vec<Token> = vec![0, 2];
        assert_eq!(low.shift_up(4), vec![4, 6]);
    }
}
