//! Repository implementations

mod user;
mod wallet;
mod order;
mod trade;
mod market;
mod candle;
mod deposit;
mod withdrawal;
mod receipt;
mod audit;
mod arena;

pub use user::UserRepo;
pub use wallet::WalletRepo;
pub use order::OrderRepo;
pub use trade::TradeRepo;
pub use market::MarketRepo;
pub use candle::CandleRepo;
pub use deposit::DepositRepo;
pub use withdrawal::WithdrawalRepo;
pub use receipt::ReceiptRepo;
pub use audit::AuditRepo;
pub use arena::ArenaRepo;
