use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub(crate) password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
