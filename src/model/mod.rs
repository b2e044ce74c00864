pub mod card;
pub mod record;
