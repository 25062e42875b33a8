/// Data models for Tasklist
///
/// # Models
///
/// - `account`: Registered identities, their credential hash and sessions
/// - `task`: Task items owned by exactly one account
///
/// Persistence lives in [`crate::store`]; these types only describe rows
/// and the write-time rules that apply to them.

pub mod account;
pub mod task;
