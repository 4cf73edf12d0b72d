mod account;
mod cashout;
mod chore;
mod holding;
mod price_point;
mod snapshot;
mod stock;
mod transaction;

pub use account::Account;
pub use cashout::{CashOutRequest, CashoutEligibility, CashoutStatus, PendingCashout, ReviewAction};
pub use chore::{AssignmentStatus, AssignmentWithChore, Chore, ChoreAssignment, CreateChore};
pub use holding::{Holding, HoldingPosition};
pub use price_point::PricePoint;
pub use snapshot::PortfolioSnapshot;
pub use stock::Stock;
pub use transaction::{LedgerTransaction, TransactionKind};
