pub mod identity;
pub mod nda;
pub mod types;

pub use identity::{Identity, Session};
pub use nda::{
    EmailError, NewNda, Nda, NdaPatch, NdaStatus, sort_by_sent_date_desc, validate_email,
};
pub use types::{NdaId, UserId};
