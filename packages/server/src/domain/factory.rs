//! Domain factories for creating domain entities and value objects.

use super::{RoomCode, error::ValueObjectError};

/// Number of hex characters in a generated room code
pub const ROOM_CODE_LEN: usize = 6;

/// Factory for generating RoomCode instances.
///
/// This factory encapsulates the logic for generating new room codes,
/// separating the generation concern from the validation logic in RoomCode.
pub struct RoomCodeFactory;

impl RoomCodeFactory {
    /// Generate a new short, upper-case room code from a random UUID v4.
    ///
    /// # Errors
    ///
    /// This method should not fail in practice, but returns Result for consistency
    /// with the domain error handling pattern.
    pub fn generate() -> Result<RoomCode, ValueObjectError> {
        let code: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(ROOM_CODE_LEN)
            .collect();
        RoomCode::new(code.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_factory_generate() {
        // テスト項目: RoomCodeFactory::generate() で 6 文字の大文字 16 進ルームコードを生成できる
        // when (操作):
        let result = RoomCodeFactory::generate();

        // then (期待する結果):
        assert!(result.is_ok());
        let room_code = result.unwrap();
        let code = room_code.as_str();
        assert_eq!(code.len(), ROOM_CODE_LEN);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[test]
    fn test_room_code_factory_generate_uniqueness() {
        // テスト項目: RoomCodeFactory::generate() は連続して呼んでも同じコードを返し続けない
        // when (操作):
        let codes: std::collections::HashSet<String> = (0..16)
            .map(|_| RoomCodeFactory::generate().unwrap().as_str().to_string())
            .collect();

        // then (期待する結果):
        assert!(codes.len() > 1);
    }
}
